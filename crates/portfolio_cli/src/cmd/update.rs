use crate::cmd::resolve_company;
use crate::context::{now, today, Context};
use crate::output::{print_json, print_table, preview};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use portfolio_core::{NewUpdate, UpdateFilter};
use serde_json::json;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum UpdateSubcommand {
    /// Submit an update; moves the company's next due date forward
    Submit(SubmitArgs),
    /// List updates, newest first
    List {
        /// Only this company (name or id)
        #[arg(long)]
        company: Option<String>,
        /// Case-insensitive text in company, period, submitter or narrative
        #[arg(long)]
        search: Option<String>,
        /// Submitted on or after (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Submitted on or before (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Delete one update
    Delete { update_id: Uuid },
    /// Render an update to PDF
    Render {
        update_id: Uuid,
        /// Output directory (default: reports.output_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct SubmitArgs {
    /// Company name or id
    company: String,
    /// Reporting period, e.g. "Q2 2025"
    #[arg(long)]
    period: String,
    /// Who is submitting
    #[arg(long = "by")]
    submitted_by: String,
    #[arg(long, default_value = "")]
    revenue: String,
    #[arg(long, default_value = "")]
    expenses: String,
    #[arg(long, default_value = "")]
    cash: String,
    /// Runway in months
    #[arg(long, default_value_t = 0)]
    runway: u32,
    #[arg(long, default_value = "")]
    wins: String,
    #[arg(long, default_value = "")]
    challenges: String,
    #[arg(long, default_value = "")]
    asks: String,
    #[arg(long, default_value = "")]
    investment_update: String,
    #[arg(long, default_value = "")]
    narrative: String,
    #[arg(long, default_value = "")]
    meeting_agenda: String,
    #[arg(long, default_value = "")]
    meeting_minutes: String,
    /// Data warehouse link (http or https)
    #[arg(long)]
    link: Option<String>,
}

pub fn run(ctx: &Context, subcmd: UpdateSubcommand) -> anyhow::Result<()> {
    match subcmd {
        UpdateSubcommand::Submit(args) => submit(ctx, args),
        UpdateSubcommand::List {
            company,
            search,
            from,
            to,
        } => list(ctx, company.as_deref(), search, from, to),
        UpdateSubcommand::Delete { update_id } => delete(ctx, update_id),
        UpdateSubcommand::Render { update_id, out } => render(ctx, update_id, out),
    }
}

fn submit(ctx: &Context, args: SubmitArgs) -> anyhow::Result<()> {
    let company = resolve_company(&ctx.service, &args.company)?;
    let request = NewUpdate {
        company_id: company.company_id,
        reporting_period: args.period,
        revenue: args.revenue,
        expenses: args.expenses,
        cash: args.cash,
        runway_months: args.runway,
        wins: args.wins,
        challenges: args.challenges,
        asks: args.asks,
        investment_update: args.investment_update,
        narrative: args.narrative,
        meeting_agenda: args.meeting_agenda,
        meeting_minutes: args.meeting_minutes,
        data_warehouse_link: args.link,
        submitted_by: args.submitted_by,
    };
    let update = ctx.service.submit_update(&request, today())?;
    let refreshed = ctx.service.get_company(company.company_id)?;

    if ctx.json {
        return print_json(&json!({
            "update": update,
            "next_due_date": refreshed.next_due_date,
        }));
    }
    println!(
        "Recorded {} update for {} ({})",
        update.reporting_period, company.company_name, update.update_id
    );
    if let Some(due) = refreshed.next_due_date {
        println!("Next update due {due}");
    }
    Ok(())
}

fn list(
    ctx: &Context,
    company: Option<&str>,
    search: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let company_id = company
        .map(|key| resolve_company(&ctx.service, key))
        .transpose()?
        .map(|company| company.company_id);
    let result = ctx.service.list_updates(&UpdateFilter {
        company_id,
        text: search,
        submitted_from: from,
        submitted_to: to,
    })?;

    if ctx.json {
        let items: Vec<_> = result
            .items
            .iter()
            .map(|view| json!({ "company_name": view.company_name, "update": view.update }))
            .collect();
        return print_json(&json!({ "total": result.total, "items": items }));
    }
    println!("Showing {} of {} update(s)", result.items.len(), result.total);
    if result.items.is_empty() {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = result
        .items
        .iter()
        .map(|view| {
            vec![
                view.update.submission_date.to_string(),
                preview(&view.company_name, 28),
                preview(&view.update.reporting_period, 16),
                preview(&view.update.submitted_by, 20),
                view.update.runway_months.to_string(),
                view.update.update_id.to_string(),
            ]
        })
        .collect();
    print_table(
        &["SUBMITTED", "COMPANY", "PERIOD", "BY", "RUNWAY", "ID"],
        &rows,
    );
    Ok(())
}

fn delete(ctx: &Context, update_id: Uuid) -> anyhow::Result<()> {
    let deleted = ctx.service.delete_update(update_id)?;
    if ctx.json {
        return print_json(&json!({ "update_id": update_id, "deleted": deleted }));
    }
    if deleted {
        println!("Deleted update {update_id}");
    } else {
        println!("No update {update_id}; nothing deleted");
    }
    Ok(())
}

fn render(ctx: &Context, update_id: Uuid, out: Option<PathBuf>) -> anyhow::Result<()> {
    let out_dir = out.unwrap_or_else(|| ctx.config.reports.output_dir.clone());
    let (path, report) = ctx.service.export_report(update_id, &out_dir, now())?;

    if ctx.json {
        return print_json(&json!({
            "path": path,
            "pages": report.page_count,
            "bytes": report.bytes.len(),
            "transliterated": report.transliterated,
        }));
    }
    println!("{}", path.display());
    if report.transliterated {
        eprintln!("note: characters outside the report font were transliterated to ASCII");
    }
    Ok(())
}
