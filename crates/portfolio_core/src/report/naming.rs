//! File names for exported report documents.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_SLUG_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]").expect("valid slug regex"));

/// Used when a company name has no filename-safe characters at all.
pub const FALLBACK_SLUG: &str = "company";

/// Maps every character outside `[A-Za-z0-9_-]` to `_` and trims boundary
/// underscores. Interior runs are kept as-is.
pub fn slugify(name: &str) -> String {
    let replaced = UNSAFE_SLUG_CHAR_RE.replace_all(name, "_");
    let trimmed = replaced.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `update_<slug>_<YYYYMMDD_HHMMSS>.pdf`
pub fn report_file_name(company_name: &str, generated_at: NaiveDateTime) -> String {
    format!(
        "update_{}_{}.pdf",
        slugify(company_name),
        generated_at.format("%Y%m%d_%H%M%S")
    )
}
