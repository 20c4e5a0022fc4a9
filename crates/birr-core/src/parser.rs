//! SMS message parser
//!
//! Mobile-money notifications look like:
//!   "You have paid ETB 1,234.56 to Shop X on 15/01/2024. Your balance is ETB 98.00"
//!
//! Only the first "ETB" segment of a body is considered for the amount. The
//! merchant is matched independently against the whole body.

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::models::{RawMessage, TimeZoneSetting, Transaction};

/// Currency code that marks a transaction SMS
pub const CURRENCY_MARKER: &str = "ETB";

/// Returned by [`MessageParser::top_merchant`] when no body names a merchant
pub const NO_MERCHANT: &str = "N/A";

/// Digits with thousands commas, followed by any number of `.digits` groups
const AMOUNT_PATTERN: &str = r"[\d,]+(?:\.\d*)*";

const MERCHANT_PATTERN: &str = r"ETB\s[\d,]+\.?\d*\s(?:to|at|for)\s([A-Za-z0-9\s]+)";

/// Extracts transactions and merchant names from SMS bodies
pub struct MessageParser {
    amount_re: Regex,
    merchant_re: Regex,
    timezone: TimeZoneSetting,
}

impl MessageParser {
    pub fn new(timezone: TimeZoneSetting) -> Result<Self> {
        Ok(Self {
            amount_re: Regex::new(AMOUNT_PATTERN)?,
            merchant_re: Regex::new(MERCHANT_PATTERN)?,
            timezone,
        })
    }

    pub fn timezone(&self) -> TimeZoneSetting {
        self.timezone
    }

    /// Find the amount that follows the first "ETB" in a body.
    ///
    /// The search stops at the next "ETB" so a trailing balance notice is
    /// never mistaken for the transaction amount. Digit runs too long for an
    /// `f64` are rejected.
    pub fn parse_amount(&self, body: &str) -> Option<f64> {
        let segment = body.split(CURRENCY_MARKER).nth(1)?;
        let raw = self.amount_re.find(segment)?.as_str();
        normalize_amount(raw)
            .parse()
            .ok()
            .filter(|amount: &f64| amount.is_finite())
    }

    /// Parse one message into a transaction, or None if it isn't one
    pub fn parse_message(&self, message: &RawMessage) -> Option<Transaction> {
        if !message.body.contains(CURRENCY_MARKER) {
            return None;
        }

        let Some(amount) = self.parse_amount(&message.body) else {
            debug!(body = %message.body, "Skipping message without a parseable amount");
            return None;
        };

        let Some(date) = message
            .timestamp_millis()
            .and_then(|ms| self.timezone.localize(ms))
        else {
            debug!(date = ?message.date, "Skipping message with an unusable date");
            return None;
        };

        Some(Transaction { date, amount })
    }

    /// Parse every message, keeping input order and dropping non-transactions
    pub fn parse_all(&self, messages: &[RawMessage]) -> Vec<Transaction> {
        messages
            .iter()
            .filter_map(|m| self.parse_message(m))
            .collect()
    }

    /// Merchant named in "ETB <amount> to|at|for <name>", trimmed
    pub fn extract_merchant(&self, body: &str) -> Option<String> {
        let caps = self.merchant_re.captures(body)?;
        let name = caps.get(1)?.as_str().trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    /// Most frequently named merchant across all messages.
    ///
    /// Ties go to the merchant seen first. Returns [`NO_MERCHANT`] when no
    /// message names one.
    pub fn top_merchant(&self, messages: &[RawMessage]) -> String {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();

        for message in messages {
            if let Some(merchant) = self.extract_merchant(&message.body) {
                let count = counts.entry(merchant.clone()).or_insert(0);
                if *count == 0 {
                    first_seen.push(merchant);
                }
                *count += 1;
            }
        }

        let mut best: Option<(&str, usize)> = None;
        for merchant in &first_seen {
            let count = counts[merchant];
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((merchant, count));
            }
        }

        best.map(|(m, _)| m.to_string())
            .unwrap_or_else(|| NO_MERCHANT.to_string())
    }
}

/// Strip thousands separators and fold extra decimal points.
///
/// "1,234.56" becomes "1234.56". With more than one '.', the first one is the
/// decimal separator and every later digit group is appended to the fraction:
/// "1.234.56" becomes "1.23456".
pub fn normalize_amount(raw: &str) -> String {
    let cleaned = raw.replace(',', "");
    if cleaned.matches('.').count() <= 1 {
        return cleaned;
    }

    let mut parts = cleaned.split('.');
    let whole = parts.next().unwrap_or_default();
    let fraction: String = parts.collect();
    format!("{}.{}", whole, fraction)
}
