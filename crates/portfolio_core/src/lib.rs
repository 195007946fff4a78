//! Core domain logic for the portfolio update CRM.
//! Companies, their periodic updates, due-date tracking and report output.

pub mod config;
pub mod db;
pub mod export;
pub mod link;
pub mod logging;
pub mod model;
pub mod repo;
pub mod report;
pub mod schedule;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use export::ExportFormat;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::company::{Company, CompanyId};
pub use model::update::{Update, UpdateId};
pub use model::validation::ValidationError;
pub use repo::record_store::{RecordStore, StoreError, StoreResult};
pub use repo::{open_store, StoreBackend};
pub use report::{render_update, RenderError, RenderedReport};
pub use schedule::cadence::Cadence;
pub use schedule::due_status::DueStatus;
pub use service::{
    DashboardSummary, NewCompany, NewUpdate, PortfolioService, ReminderEntry, ServiceError,
    UpdateFilter,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
