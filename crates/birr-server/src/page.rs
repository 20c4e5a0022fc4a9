//! HTML rendering for the upload page
//!
//! One page serves every state: the empty form, an error message, or the
//! analysis results with the three charts.

use birr_core::{AnalysisReport, Statistics};

/// What the index page should show below the form
#[derive(Debug, Default)]
pub enum PageContent<'a> {
    #[default]
    Empty,
    Error(String),
    Report(&'a AnalysisReport),
}

/// Render the complete index page
pub fn render_index(content: &PageContent<'_>) -> String {
    let body = match content {
        PageContent::Empty => String::new(),
        PageContent::Error(message) => format!(
            r#"<div class="error" role="alert">{}</div>"#,
            escape_html(message)
        ),
        PageContent::Report(report) => render_report(report),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Birr Lens</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; color: #1b1b1b; }}
h1 {{ color: #00893c; }}
.error {{ background: #fdecea; border: 1px solid #f5c2c0; padding: .75rem 1rem; border-radius: 6px; margin: 1rem 0; }}
.stats {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: .75rem; margin: 1.5rem 0; }}
.stat {{ background: #f2fbf5; border-radius: 6px; padding: .75rem 1rem; }}
.stat .label {{ font-size: .8rem; color: #555; text-transform: uppercase; }}
.stat .value {{ font-size: 1.25rem; font-weight: 600; }}
.graphs img {{ width: 100%; margin: 1rem 0; border: 1px solid #e3e3e3; }}
</style>
</head>
<body>
<h1>Birr Lens</h1>
<p>Upload an SMS export (JSON with an <code>sms</code> list) to see where your birr goes.</p>
<form method="post" action="/" enctype="multipart/form-data">
<input type="file" name="file" accept=".json,application/json">
<button type="submit">Analyze</button>
</form>
{body}
</body>
</html>
"#
    )
}

fn render_report(report: &AnalysisReport) -> String {
    let graphs = &report.graphs;
    format!(
        r#"<section class="stats">
{stats}
</section>
<p>{transactions} transactions found in {messages} messages.</p>
<section class="graphs">
<img src="/graphs/{monthly}" alt="Monthly spending">
<img src="/graphs/{distribution}" alt="Transaction size distribution">
<img src="/graphs/{heatmap}" alt="Transaction frequency heatmap">
</section>"#,
        stats = render_stats(&report.stats),
        transactions = report.transaction_count,
        messages = report.message_count,
        monthly = escape_html(&graphs.monthly),
        distribution = escape_html(&graphs.distribution),
        heatmap = escape_html(&graphs.heatmap),
    )
}

fn render_stats(stats: &Statistics) -> String {
    let savings = &stats.savings_opportunity;
    let rows = [
        ("Total spent", format_birr(stats.total_spent)),
        ("Daily average", format_birr(stats.daily_average)),
        ("Largest transaction", format_birr(stats.largest_transaction)),
        ("Most active day", stats.most_active_day.clone()),
        (
            "Transactions per day",
            format!("{:.1}", stats.transactions_per_day),
        ),
        ("Top merchant", stats.top_merchant.clone()),
        ("Peak hour", format!("{:02}:00", stats.peak_hour)),
        ("Biggest spending day", stats.biggest_spending_day.clone()),
        ("Daily small purchases", format_birr(savings.daily_coffee_cost)),
        (
            "Potential yearly savings",
            format_birr(savings.potential_yearly_savings),
        ),
    ];

    rows.iter()
        .map(|(label, value)| {
            format!(
                r#"<div class="stat"><div class="label">{}</div><div class="value">{}</div></div>"#,
                label,
                escape_html(value)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// "ETB 1,234.56"
pub fn format_birr(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("ETB {}{}.{}", sign, grouped, fraction)
}

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_birr() {
        assert_eq!(format_birr(0.0), "ETB 0.00");
        assert_eq!(format_birr(12.5), "ETB 12.50");
        assert_eq!(format_birr(1234.56), "ETB 1,234.56");
        assert_eq!(format_birr(1234567.891), "ETB 1,234,567.89");
        assert_eq!(format_birr(-500.0), "ETB -500.00");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_empty_page_has_form() {
        let html = render_index(&PageContent::Empty);
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains(r#"name="file""#));
        assert!(!html.contains("role=\"alert\""));
    }

    #[test]
    fn test_render_error_is_escaped() {
        let html = render_index(&PageContent::Error("System Error: <oops>".into()));
        assert!(html.contains("System Error: &lt;oops&gt;"));
    }
}
