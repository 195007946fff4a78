//! Update report rendering.
//!
//! # Responsibility
//! - Turn one update record into a PDF document.
//! - Name exported documents in a filesystem-safe way.
//!
//! # Invariants
//! - Rendering never fails because of unencodable text: the whole document
//!   is transliterated to ASCII and rendered again.
//! - Output depends only on the update, the company name and `generated_at`.

pub mod layout;
pub mod naming;
mod pdf;
pub mod text;

use crate::model::update::Update;
use chrono::NaiveDateTime;
use layout::build_layout;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub use naming::{report_file_name, slugify};

#[derive(Debug)]
pub enum RenderError {
    /// Text in the labelled entry cannot be encoded by the document font.
    ///
    /// Handled inside [`render_update`]; callers never observe it.
    Unencodable { label: &'static str },
    Pdf(lopdf::Error),
    Io(std::io::Error),
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unencodable { label } => write!(f, "`{label}` cannot be encoded by the report font"),
            Self::Pdf(err) => write!(f, "pdf generation failed: {err}"),
            Self::Io(err) => write!(f, "pdf generation failed: {err}"),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unencodable { .. } => None,
            Self::Pdf(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<lopdf::Error> for RenderError {
    fn from(value: lopdf::Error) -> Self {
        Self::Pdf(value)
    }
}

impl From<std::io::Error> for RenderError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Rendered document plus rendering metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Whether the ASCII fallback was used.
    pub transliterated: bool,
}

/// Renders `update` for `company_name` as a PDF.
pub fn render_update(
    update: &Update,
    company_name: &str,
    generated_at: NaiveDateTime,
) -> Result<RenderedReport, RenderError> {
    let started_at = Instant::now();
    let layout = build_layout(update, company_name);

    let (rendered, transliterated) = match pdf::render_pdf(&layout, generated_at) {
        Ok(rendered) => (rendered, false),
        Err(RenderError::Unencodable { label }) => {
            warn!(
                "event=report_render module=report status=fallback reason=unencodable field={} update_id={}",
                label, update.update_id
            );
            (pdf::render_pdf(&layout.transliterated(), generated_at)?, true)
        }
        Err(err) => return Err(err),
    };
    let (bytes, page_count) = rendered;

    info!(
        "event=report_render module=report status=ok update_id={} pages={} bytes={} transliterated={} duration_ms={}",
        update.update_id,
        page_count,
        bytes.len(),
        transliterated,
        started_at.elapsed().as_millis()
    );
    Ok(RenderedReport {
        file_name: report_file_name(company_name, generated_at),
        bytes,
        page_count,
        transliterated,
    })
}
