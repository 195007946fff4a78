pub mod company;
pub mod dashboard;
pub mod export;
pub mod update;

use anyhow::anyhow;
use portfolio_core::{Company, PortfolioService, RecordStore};
use uuid::Uuid;

/// Looks a company up by id, or by case-insensitive name when exactly one matches.
pub fn resolve_company(
    service: &PortfolioService<Box<dyn RecordStore>>,
    key: &str,
) -> anyhow::Result<Company> {
    if let Ok(id) = key.trim().parse::<Uuid>() {
        return Ok(service.get_company(id)?);
    }
    let mut matches = service.find_companies_by_name(key)?;
    match matches.len() {
        0 => Err(anyhow!("no company named '{}'", key.trim())),
        1 => Ok(matches.remove(0)),
        n => {
            let ids: Vec<String> = matches.iter().map(|c| c.company_id.to_string()).collect();
            Err(anyhow!(
                "company name '{}' is ambiguous ({n} matches: {}); use the id",
                key.trim(),
                ids.join(", ")
            ))
        }
    }
}

pub fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |date| date.to_string())
}
