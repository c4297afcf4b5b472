//! End-to-end checks of config loading, snapshot loading and export.

use std::fs;

use billbook_cli::commands::{self, DocumentRef};
use billbook_cli::{BillbookConfig, CliError};
use billbook_core::ReportPeriod;
use chrono::NaiveDate;
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
    "clients": [
        { "id": "c-1", "name": "Acme Traders" },
        { "id": "c-2", "name": "Globex" }
    ],
    "invoices": [
        {
            "id": "inv-1",
            "invoice_number": "INV-0001",
            "client_id": "c-1",
            "client_name": "Acme Traders",
            "items": [
                { "description": "Design", "quantity": 2, "rate": 10000, "tax_type": "gst", "tax_rate_bps": 1800 },
                { "description": "Hosting", "quantity": 1, "rate": 5000 }
            ],
            "status": "paid",
            "issue_date": "2026-01-12",
            "due_date": "2026-01-31",
            "payment_date": "2026-01-20",
            "amount": 28600
        },
        {
            "id": "inv-2",
            "invoice_number": "INV-0002",
            "client_name": "globex",
            "status": "pending",
            "issue_date": "2026-02-01",
            "due_date": "2026-02-15",
            "amount": 50000
        }
    ],
    "payables": [
        {
            "id": "bill-1",
            "vendor_name": "Paper Mill",
            "bill_number": "PM-77",
            "bill_date": "2026-02-03",
            "due_date": "2026-02-10",
            "bill_amount": 45050,
            "amount_paid": 45050,
            "status": "paid"
        },
        {
            "id": "bill-2",
            "vendor_name": "Ink Supply",
            "bill_date": "2026-03-01",
            "due_date": "2026-03-05",
            "bill_amount": 12000,
            "status": "pending"
        }
    ]
}"#;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> (TempDir, BillbookConfig) {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("books.json");
    fs::write(&data, SNAPSHOT).unwrap();

    let config_path = dir.path().join("billbook.toml");
    fs::write(
        &config_path,
        format!(
            "[business]\nname = \"Acme Studio\"\ncurrency_symbol = \"$\"\n\n[data]\nfile = {:?}\n\n[report]\ndefault_period = \"yearly\"\n",
            data.display().to_string()
        ),
    )
    .unwrap();

    let config = BillbookConfig::from_file(&config_path).unwrap();
    (dir, config)
}

#[test]
fn test_config_file_layer() {
    let (_dir, config) = setup();
    assert_eq!(config.business.name, "Acme Studio");
    assert_eq!(config.report.default_period, ReportPeriod::Yearly);
    assert!(config.data.file.ends_with("books.json"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_with_explicit_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(
        BillbookConfig::load(Some(missing)),
        Err(CliError::InvalidConfig(_))
    ));
}

#[test]
fn test_save_then_reload() {
    let (dir, mut config) = setup();
    config.report.default_period = ReportPeriod::Weekly;

    let path = dir.path().join("nested").join("billbook.toml");
    config.save(&path).unwrap();

    let reloaded = BillbookConfig::from_file(&path).unwrap();
    assert_eq!(reloaded.report.default_period, ReportPeriod::Weekly);
    assert_eq!(reloaded.data.file, config.data.file);
}

#[test]
fn test_missing_snapshot() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        commands::load_snapshot(&dir.path().join("absent.json")),
        Err(CliError::SnapshotNotFound(_))
    ));
}

#[test]
fn test_csv_export_written_to_output_dir() {
    let (dir, config) = setup();
    let snapshot = commands::load_snapshot(&config.data.file).unwrap();
    let output_dir = dir.path().join("exports");

    let path = commands::export_report(&snapshot, ReportPeriod::Yearly, date(2026, 3, 9), &output_dir).unwrap();
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("financial-report-yearly-2026-03-09.csv")
    );

    let csv = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 13);
    assert_eq!(lines[0], "Month,Revenue,Expenses,Profit");
    assert_eq!(lines[1], "Jan,286.00,0.00,286.00");
    assert_eq!(lines[2], "Feb,0.00,450.50,-450.50");
    assert_eq!(lines[3], "Mar,0.00,0.00,0.00");
    assert!(csv.ends_with("Dec,0.00,0.00,0.00\n"));
}

#[test]
fn test_text_commands() {
    let (_dir, config) = setup();
    let snapshot = commands::load_snapshot(&config.data.file).unwrap();
    let today = date(2026, 3, 20);

    let report = commands::report(&config, &snapshot, ReportPeriod::Yearly, today, false).unwrap();
    assert!(report.starts_with("Acme Studio - yearly report (2026-03-20)"));
    assert!(report.contains("$286.00"));

    // Globex has one invoice 33 days overdue
    let score = commands::score(&snapshot, "globex", today, false, false).unwrap();
    assert_eq!(score, "Globex: 6/10 (good) as of 2026-03-20\n");

    let trend = commands::score(&snapshot, "c-2", today, true, true).unwrap();
    let points: serde_json::Value = serde_json::from_str(&trend).unwrap();
    assert_eq!(points.as_array().map(|p| p.len()), Some(6));

    let totals = commands::totals(&config, &snapshot, &DocumentRef::Invoice("INV-0001".into()), false).unwrap();
    assert!(totals.contains("GST 18%"));
    assert!(totals.contains("$286.00"));

    let payables = commands::payables(&config, &snapshot, today, false).unwrap();
    assert!(payables.contains("Ink Supply"));

    let clients = commands::clients(&config, &snapshot, today, true).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&clients).unwrap();
    assert_eq!(rows[1]["outstanding"], 50000);
}

#[test]
fn test_totals_without_items_use_saved_total() {
    let (_dir, config) = setup();
    let snapshot = commands::load_snapshot(&config.data.file).unwrap();
    let document = DocumentRef::Invoice("INV-0002".into());

    let json = commands::totals(&config, &snapshot, &document, true).unwrap();
    let totals: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(totals["item_count"], 0);
    assert_eq!(totals["total"], 50000);
    assert_eq!(totals["tax"], 0);

    let text = commands::totals(&config, &snapshot, &document, false).unwrap();
    assert!(text.contains("no line items, saved total $500.00"));
}

#[test]
fn test_unknown_client_is_an_error() {
    let (_dir, config) = setup();
    let snapshot = commands::load_snapshot(&config.data.file).unwrap();
    assert!(matches!(
        commands::score(&snapshot, "Initech", date(2026, 3, 20), false, false),
        Err(CliError::Core(_))
    ));
}
