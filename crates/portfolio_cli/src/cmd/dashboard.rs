use crate::cmd::date_or_dash;
use crate::context::{today, Context};
use crate::output::{print_json, print_table, preview};
use portfolio_core::DueStatus;
use serde_json::json;

pub fn run_dashboard(ctx: &Context) -> anyhow::Result<()> {
    let today = today();
    let summary = ctx.service.dashboard(today)?;
    let rows = ctx.service.list_companies(today)?;

    if ctx.json {
        let companies: Vec<_> = rows
            .iter()
            .map(|row| {
                json!({
                    "company_id": row.company.company_id,
                    "company_name": row.company.company_name,
                    "status": row.status,
                    "next_due_date": row.company.next_due_date,
                    "update_count": row.update_count,
                })
            })
            .collect();
        return print_json(&json!({ "summary": summary, "companies": companies }));
    }

    println!(
        "Companies: {} ({} active)   Updates: {}",
        summary.total_companies, summary.active_companies, summary.total_updates
    );
    println!(
        "Overdue: {}   Upcoming: {}   On track: {}   Unknown: {}",
        summary.count(DueStatus::Overdue),
        summary.count(DueStatus::Upcoming),
        summary.count(DueStatus::OnTrack),
        summary.count(DueStatus::Unknown)
    );
    if rows.is_empty() {
        return Ok(());
    }
    println!();
    let table: Vec<Vec<String>> = rows
        .iter()
        .filter(|row| row.company.is_active)
        .map(|row| {
            vec![
                preview(&row.company.company_name, 32),
                row.status.to_string(),
                date_or_dash(row.company.next_due_date),
                row.update_count.to_string(),
                date_or_dash(row.last_submission),
            ]
        })
        .collect();
    print_table(&["COMPANY", "STATUS", "NEXT DUE", "UPDATES", "LAST"], &table);
    Ok(())
}

pub fn run_reminders(ctx: &Context) -> anyhow::Result<()> {
    let reminders = ctx.service.reminders(today())?;

    if ctx.json {
        let items: Vec<_> = reminders
            .iter()
            .map(|entry| {
                json!({
                    "company_id": entry.company.company_id,
                    "company_name": entry.company.company_name,
                    "contact_email": entry.company.contact_email,
                    "status": entry.status,
                    "due_date": entry.due_date,
                    "days_until_due": entry.days_until_due,
                    "submission_link": entry.submission_link,
                })
            })
            .collect();
        return print_json(&items);
    }

    if reminders.is_empty() {
        println!("Nothing due in the next week.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = reminders
        .iter()
        .map(|entry| {
            vec![
                entry.status.to_string(),
                preview(&entry.company.company_name, 32),
                entry.due_date.to_string(),
                relative_days(entry.days_until_due),
                entry.company.contact_email.clone(),
                entry.submission_link.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["STATUS", "COMPANY", "DUE", "WHEN", "CONTACT", "LINK"], &rows);
    Ok(())
}

fn relative_days(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "1 day ago".to_string(),
        d if d < 0 => format!("{} days ago", -d),
        d => format!("in {d} days"),
    }
}
