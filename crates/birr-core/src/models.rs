//! Domain models for Birr Lens

use chrono::{DateTime, FixedOffset, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level shape of an SMS export document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmsExport {
    #[serde(default)]
    pub sms: Vec<RawMessage>,
}

/// One SMS as it appears in the export
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub body: String,
    /// Milliseconds since the Unix epoch. Exporters disagree on whether this
    /// is a number or a numeric string, so it is kept loosely typed.
    #[serde(default)]
    pub date: Option<Value>,
}

impl RawMessage {
    pub fn new(body: impl Into<String>, date_ms: i64) -> Self {
        Self {
            body: body.into(),
            date: Some(Value::from(date_ms)),
        }
    }

    /// Message timestamp in milliseconds.
    ///
    /// A missing date counts as 0. Returns None when the field is present but
    /// not an integer-like value.
    pub fn timestamp_millis(&self) -> Option<i64> {
        match &self.date {
            None => Some(0),
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(_) => None,
        }
    }
}

/// A spending record extracted from one SMS
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// Wall-clock time in the analysis timezone
    pub date: NaiveDateTime,
    pub amount: f64,
}

/// Timezone used to turn message timestamps into calendar dates and hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZoneSetting {
    /// The host's local timezone
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl TimeZoneSetting {
    /// Convert epoch milliseconds to wall-clock time in this timezone
    pub fn localize(&self, millis: i64) -> Option<NaiveDateTime> {
        let utc = DateTime::from_timestamp_millis(millis)?;
        Some(match self {
            Self::Local => utc.with_timezone(&chrono::Local).naive_local(),
            Self::Utc => utc.naive_utc(),
            Self::Fixed(offset) => utc.with_timezone(offset).naive_local(),
        })
    }
}

impl std::str::FromStr for TimeZoneSetting {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "utc" | "z" => Ok(Self::Utc),
            other => other
                .parse::<FixedOffset>()
                .map(Self::Fixed)
                .map_err(|_| format!("Unknown timezone: {} (use local, utc or +HH:MM)", s)),
        }
    }
}

impl std::fmt::Display for TimeZoneSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Utc => write!(f, "utc"),
            Self::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// Rough estimate of what small everyday purchases cost
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsOpportunity {
    /// Mean per-day total of transactions under the small-purchase threshold
    pub daily_coffee_cost: f64,
    pub potential_yearly_savings: f64,
}

/// Summary statistics over a transaction table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_spent: f64,
    pub daily_average: f64,
    pub largest_transaction: f64,
    pub most_active_day: String,
    pub transactions_per_day: f64,
    pub top_merchant: String,
    pub peak_hour: u32,
    /// Formatted as YYYY-MM-DD
    pub biggest_spending_day: String,
    pub savings_opportunity: SavingsOpportunity,
}

/// File names of the rendered charts, relative to the graph directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphFilenames {
    pub monthly: String,
    pub distribution: String,
    pub heatmap: String,
}

/// Everything a successful analysis produces
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub stats: Statistics,
    pub graphs: GraphFilenames,
    pub message_count: usize,
    pub transaction_count: usize,
}

/// Full English weekday name ("Monday")
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_millis_variants() {
        let msg: RawMessage = serde_json::from_str(r#"{"body": "x"}"#).unwrap();
        assert_eq!(msg.timestamp_millis(), Some(0));

        let msg: RawMessage =
            serde_json::from_str(r#"{"body": "x", "date": 1700000000000}"#).unwrap();
        assert_eq!(msg.timestamp_millis(), Some(1_700_000_000_000));

        let msg: RawMessage =
            serde_json::from_str(r#"{"body": "x", "date": "1700000000000"}"#).unwrap();
        assert_eq!(msg.timestamp_millis(), Some(1_700_000_000_000));

        let msg: RawMessage = serde_json::from_str(r#"{"body": "x", "date": "soon"}"#).unwrap();
        assert_eq!(msg.timestamp_millis(), None);
    }

    #[test]
    fn test_sms_export_missing_key_is_empty() {
        let export: SmsExport = serde_json::from_str(r#"{"calls": []}"#).unwrap();
        assert!(export.sms.is_empty());
    }

    #[test]
    fn test_timezone_from_str() {
        assert_eq!("local".parse::<TimeZoneSetting>(), Ok(TimeZoneSetting::Local));
        assert_eq!("UTC".parse::<TimeZoneSetting>(), Ok(TimeZoneSetting::Utc));
        assert_eq!(
            "+03:00".parse::<TimeZoneSetting>(),
            Ok(TimeZoneSetting::Fixed(FixedOffset::east_opt(3 * 3600).unwrap()))
        );
        assert!("mars".parse::<TimeZoneSetting>().is_err());
    }

    #[test]
    fn test_localize_fixed_offset() {
        let addis = TimeZoneSetting::Fixed(FixedOffset::east_opt(3 * 3600).unwrap());
        // 2024-01-15 22:30:00 UTC
        let local = addis.localize(1_705_357_800_000).unwrap();
        assert_eq!(local.to_string(), "2024-01-16 01:30:00");
    }
}
