use crate::cmd::resolve_company;
use crate::context::Context;
use anyhow::Context as _;
use portfolio_core::ExportFormat;
use std::io::Write;
use std::path::Path;

pub fn run(
    ctx: &Context,
    format: ExportFormat,
    company: Option<&str>,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let company_id = company
        .map(|key| resolve_company(&ctx.service, key))
        .transpose()?
        .map(|company| company.company_id);
    let bytes = ctx.service.export_updates(format, company_id)?;

    match out {
        Some(path) => {
            std::fs::write(path, &bytes)
                .with_context(|| format!("writing export to '{}'", path.display()))?;
            eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
