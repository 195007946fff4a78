use crate::cmd::{date_or_dash, resolve_company};
use crate::context::{today, Context};
use crate::output::{print_json, print_table, preview};
use clap::Subcommand;
use portfolio_core::{Cadence, NewCompany};
use serde_json::json;

#[derive(Subcommand)]
pub enum CompanySubcommand {
    /// Onboard a company; its first update is due one cadence from today
    Add {
        name: String,
        #[arg(long, default_value = "")]
        contact_name: String,
        #[arg(long, default_value = "")]
        contact_email: String,
        /// Portfolio manager responsible for the company
        #[arg(long = "manager", default_value = "")]
        portfolio_manager: String,
        #[arg(long, default_value = "")]
        fund: String,
        /// Weekly, Biweekly, Monthly or Quarterly (anything else means 30 days)
        #[arg(long, default_value = "Monthly")]
        cadence: String,
    },
    /// List companies with their due status
    List,
    /// Show one company (name or id)
    Show { company: String },
    /// Delete a company and every update it submitted
    Delete { company: String },
    /// Print the company's secure submission link
    Link { company: String },
    /// Stop counting the company on the dashboard and in reminders
    Deactivate { company: String },
    /// Count the company again
    Activate { company: String },
}

pub fn run(ctx: &Context, subcmd: CompanySubcommand) -> anyhow::Result<()> {
    match subcmd {
        CompanySubcommand::Add {
            name,
            contact_name,
            contact_email,
            portfolio_manager,
            fund,
            cadence,
        } => add(
            ctx,
            NewCompany {
                company_name: name,
                contact_name,
                contact_email,
                portfolio_manager,
                fund,
                reporting_cadence: Cadence::parse(&cadence),
            },
        ),
        CompanySubcommand::List => list(ctx),
        CompanySubcommand::Show { company } => show(ctx, &company),
        CompanySubcommand::Delete { company } => delete(ctx, &company),
        CompanySubcommand::Link { company } => link(ctx, &company),
        CompanySubcommand::Deactivate { company } => set_active(ctx, &company, false),
        CompanySubcommand::Activate { company } => set_active(ctx, &company, true),
    }
}

fn add(ctx: &Context, request: NewCompany) -> anyhow::Result<()> {
    let company = ctx.service.onboard_company(&request, today())?;
    if ctx.json {
        return print_json(&company);
    }
    println!(
        "Onboarded {} ({}); first update due {}",
        company.company_name,
        company.company_id,
        date_or_dash(company.next_due_date)
    );
    if !company.reporting_cadence.is_known() {
        println!(
            "note: cadence '{}' is not recognized; using a 30-day cycle",
            company.reporting_cadence
        );
    }
    Ok(())
}

fn list(ctx: &Context) -> anyhow::Result<()> {
    let rows = ctx.service.list_companies(today())?;
    if ctx.json {
        let items: Vec<_> = rows
            .iter()
            .map(|row| {
                json!({
                    "company": row.company,
                    "status": row.status,
                    "days_until_due": row.days_until_due,
                    "update_count": row.update_count,
                    "last_submission": row.last_submission,
                })
            })
            .collect();
        return print_json(&items);
    }
    if rows.is_empty() {
        println!("No companies yet. Add one with `portfolio company add <name>`.");
        return Ok(());
    }
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                preview(&row.company.company_name, 32),
                row.company.reporting_cadence.to_string(),
                date_or_dash(row.company.next_due_date),
                row.status.to_string(),
                row.update_count.to_string(),
                date_or_dash(row.last_submission),
                if row.company.is_active { "yes" } else { "no" }.to_string(),
                row.company.company_id.to_string(),
            ]
        })
        .collect();
    print_table(
        &[
            "NAME", "CADENCE", "NEXT DUE", "STATUS", "UPDATES", "LAST", "ACTIVE", "ID",
        ],
        &table,
    );
    Ok(())
}

fn show(ctx: &Context, key: &str) -> anyhow::Result<()> {
    let company = resolve_company(&ctx.service, key)?;
    if ctx.json {
        return print_json(&company);
    }
    let fields = [
        ("ID", company.company_id.to_string()),
        ("Name", company.company_name.clone()),
        ("Contact", company.contact_name.clone()),
        ("Email", company.contact_email.clone()),
        ("Manager", company.portfolio_manager.clone()),
        ("Fund", company.fund.clone()),
        ("Cadence", company.reporting_cadence.to_string()),
        ("Next due", date_or_dash(company.next_due_date)),
        ("Active", company.is_active.to_string()),
        ("Created", company.created_at.to_string()),
    ];
    for (label, value) in fields {
        println!("{label:<9} {value}");
    }
    Ok(())
}

fn delete(ctx: &Context, key: &str) -> anyhow::Result<()> {
    let company = resolve_company(&ctx.service, key)?;
    let removed = ctx.service.delete_company(company.company_id)?;
    if ctx.json {
        return print_json(&json!({
            "company_id": company.company_id,
            "updates_removed": removed,
        }));
    }
    println!(
        "Deleted {} and {} update(s)",
        company.company_name, removed
    );
    Ok(())
}

fn set_active(ctx: &Context, key: &str, is_active: bool) -> anyhow::Result<()> {
    let company = resolve_company(&ctx.service, key)?;
    let company = ctx.service.set_company_active(company.company_id, is_active)?;
    if ctx.json {
        return print_json(&company);
    }
    let state = if company.is_active { "active" } else { "inactive" };
    println!("{} is now {state}", company.company_name);
    Ok(())
}

fn link(ctx: &Context, key: &str) -> anyhow::Result<()> {
    let company = resolve_company(&ctx.service, key)?;
    let link = ctx.service.submission_link(company.company_id)?;
    if ctx.json {
        return print_json(&json!({ "company_id": company.company_id, "link": link }));
    }
    println!("{link}");
    Ok(())
}
