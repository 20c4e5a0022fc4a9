//! Offline analysis command

use std::path::Path;

use anyhow::{Context, Result};
use birr_core::{AnalysisReport, Analyzer, TimeZoneSetting};

use super::graph_dir_from;

pub fn cmd_analyze(
    file: &Path,
    graph_dir: Option<&Path>,
    timezone: TimeZoneSetting,
    json: bool,
) -> Result<()> {
    let report = run_analysis(file, graph_dir, timezone)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &graph_dir_from(graph_dir));
    }
    Ok(())
}

/// Analyze `file`, writing charts into the resolved graph directory
pub fn run_analysis(
    file: &Path,
    graph_dir: Option<&Path>,
    timezone: TimeZoneSetting,
) -> Result<AnalysisReport> {
    let graph_dir = graph_dir_from(graph_dir);
    let analyzer = Analyzer::new(timezone, &graph_dir)?;
    analyzer
        .renderer()
        .ensure_dir()
        .with_context(|| format!("Failed to create graph directory {}", graph_dir.display()))?;

    analyzer
        .analyze_transactions(file)
        .with_context(|| format!("Failed to analyze {}", file.display()))
}

fn print_report(report: &AnalysisReport, graph_dir: &Path) {
    let stats = &report.stats;
    let savings = &stats.savings_opportunity;

    println!();
    println!("📱 Birr Lens Report");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Messages: {}   Transactions: {}",
        report.message_count, report.transaction_count
    );
    println!();
    println!("   Total spent:           ETB {:.2}", stats.total_spent);
    println!("   Daily average:         ETB {:.2}", stats.daily_average);
    println!("   Largest transaction:   ETB {:.2}", stats.largest_transaction);
    println!("   Most active day:       {}", stats.most_active_day);
    println!("   Transactions per day:  {:.1}", stats.transactions_per_day);
    println!("   Top merchant:          {}", stats.top_merchant);
    println!("   Peak hour:             {:02}:00", stats.peak_hour);
    println!("   Biggest spending day:  {}", stats.biggest_spending_day);
    println!();
    println!("   💡 Small purchases (< ETB 500)");
    println!("      Daily cost:         ETB {:.2}", savings.daily_coffee_cost);
    println!(
        "      Yearly savings:     ETB {:.2} (cutting 30%)",
        savings.potential_yearly_savings
    );
    println!();
    println!("   📊 Charts");
    for name in [
        &report.graphs.monthly,
        &report.graphs.distribution,
        &report.graphs.heatmap,
    ] {
        println!("      {}", graph_dir.join(name).display());
    }
    println!();
}
