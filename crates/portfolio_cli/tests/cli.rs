use assert_cmd::Command;
use chrono::{Duration, Local};
use predicates::prelude::*;
use tempfile::TempDir;

fn portfolio(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("portfolio").unwrap();
    cmd.current_dir(dir.path())
        .env("PORTFOLIO_DATA_DIR", dir.path().join("data"))
        .env("PORTFOLIO_LOG_DIR", dir.path().join("logs"))
        .env_remove("PORTFOLIO_BACKEND")
        .env_remove("PORTFOLIO_BASE_URL")
        .env_remove("PORTFOLIO_LOG_LEVEL");
    cmd
}

fn add_company(dir: &TempDir, name: &str, cadence: &str) -> String {
    let output = portfolio(dir)
        .args(["--json", "company", "add", name, "--cadence", cadence])
        .args(["--contact-email", "founder@example.com"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    let company: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    company["company_id"].as_str().unwrap().to_string()
}

fn submit_update(dir: &TempDir, company: &str, period: &str, wins: &str) -> String {
    let output = portfolio(dir)
        .args(["--json", "update", "submit", company])
        .args(["--period", period, "--by", "Robin", "--wins", wins])
        .args(["--runway", "18"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    body["update"]["update_id"].as_str().unwrap().to_string()
}

#[test]
fn company_add_sets_first_due_date_from_cadence() {
    let dir = TempDir::new().unwrap();
    let expected = (Local::now().date_naive() + Duration::days(7)).to_string();

    portfolio(&dir)
        .args(["company", "add", "Acme Robotics", "--cadence", "weekly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Onboarded Acme Robotics"))
        .stdout(predicate::str::contains(expected));

    portfolio(&dir)
        .args(["company", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Robotics"))
        .stdout(predicate::str::contains("upcoming"));
}

#[test]
fn unknown_cadence_is_accepted_with_a_note() {
    let dir = TempDir::new().unwrap();
    portfolio(&dir)
        .args(["company", "add", "Odd Co", "--cadence", "semiannual"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30-day cycle"));
}

#[test]
fn invalid_email_is_rejected_with_hint() {
    let dir = TempDir::new().unwrap();
    portfolio(&dir)
        .args(["company", "add", "Acme", "--contact-email", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid contact email"))
        .stderr(predicate::str::contains("hint:"));

    portfolio(&dir)
        .args(["--json", "company", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn submitting_update_moves_due_date_and_is_searchable() {
    let dir = TempDir::new().unwrap();
    add_company(&dir, "Acme", "quarterly");
    submit_update(&dir, "acme", "Q2 2025", "Closed a design partner");
    let expected = (Local::now().date_naive() + Duration::days(90)).to_string();

    portfolio(&dir)
        .args(["company", "show", "Acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));

    portfolio(&dir)
        .args(["update", "list", "--search", "DESIGN PARTNER"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 1 of 1 update(s)"))
        .stdout(predicate::str::contains("Q2 2025"));

    portfolio(&dir)
        .args(["update", "list", "--search", "nothing matches"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 0 of 1 update(s)"));
}

#[test]
fn blank_reporting_period_is_rejected() {
    let dir = TempDir::new().unwrap();
    add_company(&dir, "Acme", "monthly");
    portfolio(&dir)
        .args(["update", "submit", "Acme", "--period", "  ", "--by", "Robin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reporting_period"));
}

#[test]
fn submitting_for_unknown_company_fails() {
    let dir = TempDir::new().unwrap();
    portfolio(&dir)
        .args(["update", "submit", "Ghost", "--period", "Q1", "--by", "Robin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no company named 'Ghost'"));
}

#[test]
fn link_requires_base_url_and_encodes_name() {
    let dir = TempDir::new().unwrap();
    add_company(&dir, "O'Brien & Co", "monthly");

    portfolio(&dir)
        .args(["company", "link", "O'Brien & Co"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PORTFOLIO_BASE_URL"));

    portfolio(&dir)
        .env("PORTFOLIO_BASE_URL", "https://updates.example.com/submit")
        .args(["company", "link", "o'brien & co"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "https://updates.example.com/submit?company=O%27Brien+%26+Co&token=",
        ));
}

#[test]
fn render_writes_pdf_into_output_directory() {
    let dir = TempDir::new().unwrap();
    add_company(&dir, "Acme", "monthly");
    let update_id = submit_update(&dir, "Acme", "May 2025", "Shipped v2");
    let out = dir.path().join("pdfs");

    let output = portfolio(&dir)
        .args(["update", "render", &update_id, "--out"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let printed = String::from_utf8(output.stdout).unwrap();
    let path = std::path::PathBuf::from(printed.trim());
    assert!(path.starts_with(&out));
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("update_Acme_") && name.ends_with(".pdf"));
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF-"));
}

#[test]
fn export_csv_to_stdout_and_json_to_file() {
    let dir = TempDir::new().unwrap();
    add_company(&dir, "Acme", "monthly");
    add_company(&dir, "Beta", "monthly");
    submit_update(&dir, "Acme", "May", "one");
    submit_update(&dir, "Beta", "May", "two");

    portfolio(&dir)
        .args(["export", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("update_id,company_id,"));

    let out = dir.path().join("acme.json");
    portfolio(&dir)
        .args(["export", "--format", "json", "--company", "Acme", "--out"])
        .arg(&out)
        .assert()
        .success();
    let rows: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["wins"], "one");
}

#[test]
fn deleting_company_removes_its_updates() {
    let dir = TempDir::new().unwrap();
    add_company(&dir, "Acme", "monthly");
    submit_update(&dir, "Acme", "April", "a");
    submit_update(&dir, "Acme", "May", "b");

    portfolio(&dir)
        .args(["company", "delete", "Acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted Acme and 2 update(s)"));

    portfolio(&dir)
        .args(["update", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 0 of 0 update(s)"));
}

#[test]
fn deleting_missing_update_is_a_noop() {
    let dir = TempDir::new().unwrap();
    portfolio(&dir)
        .args(["update", "delete", "00000000-0000-0000-0000-000000000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing deleted"));
}

#[test]
fn sqlite_backend_flag_creates_database_and_dashboard_counts() {
    let dir = TempDir::new().unwrap();
    portfolio(&dir)
        .args(["--backend", "sqlite", "company", "add", "Acme"])
        .assert()
        .success();
    assert!(dir.path().join("data").join("portfolio.sqlite3").exists());

    let output = portfolio(&dir)
        .args(["--backend", "sqlite", "--json", "dashboard"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["summary"]["total_companies"], 1);
    assert_eq!(body["summary"]["on_track"], 1);
}

#[test]
fn reminders_are_empty_for_fresh_monthly_company() {
    let dir = TempDir::new().unwrap();
    add_company(&dir, "Acme", "monthly");
    portfolio(&dir)
        .arg("reminders")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing due in the next week."));
}

#[test]
fn unsupported_backend_is_rejected_by_argument_parser() {
    let dir = TempDir::new().unwrap();
    portfolio(&dir)
        .args(["--backend", "mongo", "dashboard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported store backend"));
}

#[test]
fn config_file_selects_backend_and_data_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("portfolio.toml"),
        "[store]\nbackend = \"csv\"\ndata_dir = \"csv-data\"\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("portfolio").unwrap();
    cmd.current_dir(dir.path())
        .env("PORTFOLIO_LOG_DIR", dir.path().join("logs"))
        .env_remove("PORTFOLIO_DATA_DIR")
        .env_remove("PORTFOLIO_BACKEND")
        .args(["company", "add", "Acme"])
        .assert()
        .success();
    assert!(dir.path().join("csv-data").join("companies.csv").exists());
}

#[test]
fn duplicate_company_names_require_an_id() {
    let dir = TempDir::new().unwrap();
    let first = add_company(&dir, "Acme", "monthly");
    let second = add_company(&dir, "acme", "weekly");
    submit_update(&dir, &first, "May", "kept");

    portfolio(&dir)
        .args(["company", "delete", "Acme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ambiguous"))
        .stderr(predicate::str::contains(first.as_str()))
        .stderr(predicate::str::contains(second.as_str()));

    portfolio(&dir)
        .args(["update", "submit", "ACME", "--period", "June", "--by", "Robin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("use the id"));

    portfolio(&dir)
        .args(["update", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 1 of 1 update(s)"));

    portfolio(&dir)
        .args(["company", "delete", &second])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted acme and 0 update(s)"));

    portfolio(&dir)
        .args(["company", "show", "Acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains(first.as_str()));
}

#[test]
fn deactivated_company_drops_out_of_dashboard_counts() {
    let dir = TempDir::new().unwrap();
    add_company(&dir, "Acme", "weekly");

    portfolio(&dir)
        .args(["company", "deactivate", "Acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme is now inactive"));

    let output = portfolio(&dir)
        .args(["--json", "dashboard"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["summary"]["total_companies"], 1);
    assert_eq!(body["summary"]["active_companies"], 0);
    assert_eq!(body["summary"]["upcoming"], 0);

    portfolio(&dir)
        .args(["company", "activate", "acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme is now active"));
}
