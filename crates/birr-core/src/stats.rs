//! Transaction aggregation
//!
//! Turns a transaction table into the fixed set of summary statistics shown
//! on the results page.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Timelike};

use crate::error::{Error, Result};
use crate::models::{weekday_name, SavingsOpportunity, Statistics, Transaction};

/// Transactions strictly below this amount count as small everyday purchases
pub const SMALL_PURCHASE_LIMIT: f64 = 500.0;

/// Share of small-purchase spending assumed to be avoidable
pub const SAVINGS_RATE: f64 = 0.3;

/// Compute summary statistics for a non-empty table.
///
/// `top_merchant` comes from a separate pass over the raw messages and is
/// passed through unchanged.
pub fn compute_statistics(transactions: &[Transaction], top_merchant: &str) -> Result<Statistics> {
    if transactions.is_empty() {
        return Err(Error::NoTransactions);
    }

    let total_spent: f64 = transactions.iter().map(|t| t.amount).sum();
    let count = transactions.len() as f64;
    let active_days = distinct_dates(transactions).len() as f64;

    let largest_transaction = transactions
        .iter()
        .map(|t| t.amount)
        .fold(f64::NEG_INFINITY, f64::max);

    Ok(Statistics {
        total_spent,
        daily_average: total_spent / active_days,
        largest_transaction,
        most_active_day: most_active_day(transactions),
        transactions_per_day: count / active_days,
        top_merchant: top_merchant.to_string(),
        peak_hour: peak_hour(transactions),
        biggest_spending_day: biggest_spending_day(transactions)
            .format("%Y-%m-%d")
            .to_string(),
        savings_opportunity: savings_opportunity(transactions),
    })
}

fn distinct_dates(transactions: &[Transaction]) -> BTreeSet<NaiveDate> {
    transactions.iter().map(|t| t.date.date()).collect()
}

/// Summed amount per calendar date, in date order
pub fn daily_totals<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> BTreeMap<NaiveDate, f64> {
    let mut totals = BTreeMap::new();
    for tx in transactions {
        *totals.entry(tx.date.date()).or_insert(0.0) += tx.amount;
    }
    totals
}

/// Weekday with the most transactions. Ties resolve to the alphabetically
/// first weekday name.
pub fn most_active_day(transactions: &[Transaction]) -> String {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for tx in transactions {
        *counts.entry(weekday_name(tx.date.weekday())).or_insert(0) += 1;
    }
    mode(counts).map(str::to_string).unwrap_or_default()
}

/// Hour of day (0-23) with the most transactions. Ties resolve to the
/// earliest hour.
pub fn peak_hour(transactions: &[Transaction]) -> u32 {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for tx in transactions {
        *counts.entry(tx.date.hour()).or_insert(0) += 1;
    }
    mode(counts).unwrap_or_default()
}

/// Most frequent key; the smallest key wins a tie
fn mode<K: Ord + Copy>(counts: BTreeMap<K, usize>) -> Option<K> {
    let mut best: Option<(K, usize)> = None;
    for (key, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((key, count));
        }
    }
    best.map(|(k, _)| k)
}

/// Date with the highest summed spending; the earliest date wins a tie
fn biggest_spending_day(transactions: &[Transaction]) -> NaiveDate {
    let mut best: Option<(NaiveDate, f64)> = None;
    for (date, total) in daily_totals(transactions) {
        if best.map_or(true, |(_, t)| total > t) {
            best = Some((date, total));
        }
    }
    best.map(|(d, _)| d).unwrap_or_default()
}

/// Small-purchase habits: the average daily spend on sub-500 transactions
/// (over days that had any) and 30% of their total as a yearly savings figure.
pub fn savings_opportunity(transactions: &[Transaction]) -> SavingsOpportunity {
    let small: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.amount < SMALL_PURCHASE_LIMIT)
        .collect();

    let small_total: f64 = small.iter().map(|t| t.amount).sum();
    let per_day = daily_totals(small.iter().copied());

    let daily_coffee_cost = if per_day.is_empty() {
        0.0
    } else {
        per_day.values().sum::<f64>() / per_day.len() as f64
    };

    SavingsOpportunity {
        daily_coffee_cost,
        potential_yearly_savings: small_total * SAVINGS_RATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn tx(date: &str, amount: f64) -> Transaction {
        Transaction {
            date: NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M").unwrap(),
            amount,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            // Monday 2024-01-15
            tx("2024-01-15 08:10", 50.0),
            tx("2024-01-15 08:45", 1200.0),
            tx("2024-01-15 13:00", 200.0),
            // Tuesday 2024-01-16
            tx("2024-01-16 08:30", 30.0),
            // Monday 2024-01-22
            tx("2024-01-22 19:00", 6000.0),
        ]
    }

    #[test]
    fn test_empty_table_is_an_error() {
        let err = compute_statistics(&[], "N/A").unwrap_err();
        assert!(matches!(err, Error::NoTransactions));
    }

    #[test]
    fn test_compute_statistics() {
        let stats = compute_statistics(&sample(), "Shop X").unwrap();

        assert_eq!(stats.total_spent, 7480.0);
        assert_eq!(stats.largest_transaction, 6000.0);
        // Three distinct dates
        assert!((stats.daily_average - 7480.0 / 3.0).abs() < 1e-9);
        assert!((stats.transactions_per_day - 5.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.most_active_day, "Monday");
        assert_eq!(stats.peak_hour, 8);
        assert_eq!(stats.biggest_spending_day, "2024-01-22");
        assert_eq!(stats.top_merchant, "Shop X");
    }

    #[test]
    fn test_savings_opportunity() {
        let savings = savings_opportunity(&sample());
        // Small: 50 + 200 on the 15th, 30 on the 16th
        assert_eq!(savings.potential_yearly_savings, 0.3 * (50.0 + 200.0 + 30.0));
        assert_eq!(savings.daily_coffee_cost, (250.0 + 30.0) / 2.0);
    }

    #[test]
    fn test_savings_without_small_purchases() {
        let savings = savings_opportunity(&[tx("2024-01-15 08:10", 900.0)]);
        assert_eq!(savings.daily_coffee_cost, 0.0);
        assert_eq!(savings.potential_yearly_savings, 0.0);
    }

    #[test]
    fn test_weekday_tie_prefers_alphabetical_name() {
        // One Tuesday, one Friday
        let txs = vec![tx("2024-01-16 10:00", 1.0), tx("2024-01-19 10:00", 1.0)];
        assert_eq!(most_active_day(&txs), "Friday");
    }

    #[test]
    fn test_peak_hour_tie_prefers_earliest() {
        let txs = vec![tx("2024-01-16 17:00", 1.0), tx("2024-01-16 09:00", 1.0)];
        assert_eq!(peak_hour(&txs), 9);
    }

    #[test]
    fn test_biggest_day_tie_prefers_earliest() {
        let txs = vec![tx("2024-02-02 10:00", 100.0), tx("2024-02-01 10:00", 100.0)];
        let stats = compute_statistics(&txs, "N/A").unwrap();
        assert_eq!(stats.biggest_spending_day, "2024-02-01");
    }

    #[test]
    fn test_duplicates_are_counted() {
        let txs = vec![tx("2024-01-15 08:10", 40.0), tx("2024-01-15 08:10", 40.0)];
        let stats = compute_statistics(&txs, "N/A").unwrap();
        assert_eq!(stats.total_spent, 80.0);
        assert_eq!(stats.transactions_per_day, 2.0);
    }
}
