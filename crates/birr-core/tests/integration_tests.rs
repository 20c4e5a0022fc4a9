//! Integration tests for birr-core
//!
//! These tests exercise the full export file → statistics → charts workflow.

use std::path::Path;

use birr_core::{Analyzer, Error, TimeZoneSetting, NO_MERCHANT};
use tempfile::TempDir;

/// A small telebirr/CBE style export.
///
/// Timestamps are UTC:
/// - 1705312800000 = 2024-01-15 10:00 (Monday)
/// - 1705316400000 = 2024-01-15 11:00 (Monday)
/// - 1705402800000 = 2024-01-16 11:00 (Tuesday)
/// - 1707130800000 = 2024-02-05 11:00 (Monday)
fn sample_export() -> &'static str {
    r#"{
  "sms": [
    {"body": "Dear Customer, you have paid ETB 1,234.56 to Shop X. Your balance is ETB 4,000.00", "date": 1705312800000},
    {"body": "You have transferred ETB 120.00 to Abebe Kebede. Thank you", "date": 1705316400000},
    {"body": "You have paid ETB 45 at Shop X", "date": "1705402800000"},
    {"body": "Your one-time password is 884422", "date": 1705402800000},
    {"body": "Recharge of ETB 1.234.56 for airtime completed", "date": 1707130800000},
    {"body": "ETB service notice: no charges apply", "date": 1707130800000}
  ]
}"#
}

fn write_export(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write export");
    path
}

fn assert_png(path: &Path) {
    let bytes = std::fs::read(path).expect("Chart was not written");
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_full_analysis_workflow() {
    let uploads = TempDir::new().unwrap();
    let graphs = TempDir::new().unwrap();
    let path = write_export(&uploads, "export.json", sample_export());

    let analyzer = Analyzer::new(TimeZoneSetting::Utc, graphs.path()).unwrap();
    let report = analyzer
        .analyze_transactions(&path)
        .expect("Analysis should succeed");

    // OTP and the notice without digits are dropped
    assert_eq!(report.message_count, 6);
    assert_eq!(report.transaction_count, 4);

    let stats = &report.stats;
    let amounts = [1234.56, 120.0, 45.0, 1.23456];
    let expected_total: f64 = amounts.iter().sum();

    assert!((stats.total_spent - expected_total).abs() < 1e-9);
    assert_eq!(stats.largest_transaction, 1234.56);
    // Three distinct days
    assert!((stats.daily_average - expected_total / 3.0).abs() < 1e-9);
    assert!((stats.transactions_per_day - 4.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats.most_active_day, "Monday");
    assert_eq!(stats.peak_hour, 11);
    assert_eq!(stats.biggest_spending_day, "2024-01-15");
    assert_eq!(stats.top_merchant, "Shop X");

    let small_total = 120.0 + 45.0 + 1.23456;
    assert_eq!(
        stats.savings_opportunity.potential_yearly_savings,
        0.3 * small_total
    );
    // Small purchases on 01-15 (120), 01-16 (45) and 02-05 (1.23456)
    assert!(
        (stats.savings_opportunity.daily_coffee_cost - small_total / 3.0).abs() < 1e-9
    );

    assert_png(&graphs.path().join(&report.graphs.monthly));
    assert_png(&graphs.path().join(&report.graphs.distribution));
    assert_png(&graphs.path().join(&report.graphs.heatmap));
}

#[test]
fn test_rerun_overwrites_charts() {
    let uploads = TempDir::new().unwrap();
    let graphs = TempDir::new().unwrap();
    let path = write_export(&uploads, "export.json", sample_export());
    let analyzer = Analyzer::new(TimeZoneSetting::Utc, graphs.path()).unwrap();

    let first = analyzer.analyze_transactions(&path).unwrap();
    let second = analyzer.analyze_transactions(&path).unwrap();

    assert_eq!(first.graphs, second.graphs);
    assert_eq!(std::fs::read_dir(graphs.path()).unwrap().count(), 3);
}

#[test]
fn test_no_merchant_sentinel() {
    let uploads = TempDir::new().unwrap();
    let graphs = TempDir::new().unwrap();
    let path = write_export(
        &uploads,
        "export.json",
        r#"{"sms": [{"body": "Debited ETB 300.00 from your account", "date": 1705312800000}]}"#,
    );

    let analyzer = Analyzer::new(TimeZoneSetting::Utc, graphs.path()).unwrap();
    let report = analyzer.analyze_transactions(&path).unwrap();
    assert_eq!(report.stats.top_merchant, NO_MERCHANT);
}

#[test]
fn test_error_taxonomy() {
    let uploads = TempDir::new().unwrap();
    let graphs = TempDir::new().unwrap();
    let analyzer = Analyzer::new(TimeZoneSetting::Utc, graphs.path()).unwrap();

    let garbage = write_export(&uploads, "photo.json", "\u{1F4F7} not json");
    let err = analyzer.analyze_transactions(&garbage).unwrap_err();
    assert!(matches!(err, Error::InvalidFormat(_)));

    let empty = write_export(&uploads, "empty.json", r#"{"sms": []}"#);
    let err = analyzer.analyze_transactions(&empty).unwrap_err();
    assert!(matches!(err, Error::NoTransactions));

    let other_key = write_export(&uploads, "calls.json", r#"{"calls": [1, 2, 3]}"#);
    let err = analyzer.analyze_transactions(&other_key).unwrap_err();
    assert!(matches!(err, Error::NoTransactions));

    // Nothing was rendered for failed runs
    assert_eq!(std::fs::read_dir(graphs.path()).unwrap().count(), 0);
}

#[test]
fn test_fixed_offset_shifts_calendar_day() {
    let uploads = TempDir::new().unwrap();
    let graphs = TempDir::new().unwrap();
    // 2024-01-15 22:30 UTC is 2024-01-16 01:30 in Addis Ababa
    let path = write_export(
        &uploads,
        "late.json",
        r#"{"sms": [{"body": "Paid ETB 80 at Cafe", "date": 1705357800000}]}"#,
    );

    let analyzer =
        Analyzer::new("+03:00".parse::<TimeZoneSetting>().unwrap(), graphs.path()).unwrap();
    let report = analyzer.analyze_transactions(&path).unwrap();
    assert_eq!(report.stats.biggest_spending_day, "2024-01-16");
    assert_eq!(report.stats.peak_hour, 1);
    assert_eq!(report.stats.most_active_day, "Tuesday");
}
