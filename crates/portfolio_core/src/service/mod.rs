//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into portfolio use-cases.
//! - Keep the CLI decoupled from storage and rendering details.

pub mod dashboard;
pub mod portfolio_service;
pub mod update_query;

pub use dashboard::{CompanyOverview, DashboardSummary, ReminderEntry};
pub use portfolio_service::{NewCompany, NewUpdate, PortfolioService, ServiceError, ServiceResult};
pub use update_query::{UpdateFilter, UpdateListResult, UpdateView};
