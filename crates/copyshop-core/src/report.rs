//! # Report Summary
//!
//! Totals over a set of transactions, with a per-day breakdown.

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::Transaction;

/// Sales of one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub count: usize,
    pub revenue: Money,
}

/// Totals over a set of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub count: usize,
    pub revenue: Money,
    pub payments: Money,
    pub change: Money,
    /// Ordered by date, oldest first.
    pub days: Vec<DailyTotal>,
}

impl ReportSummary {
    /// Mean sale value, rounded down. Zero when there are no sales.
    pub fn average_sale(&self) -> Money {
        match self.count {
            0 => Money::zero(),
            n => Money::from_minor(self.revenue.minor() / n as i64),
        }
    }
}

/// Summarizes transactions, bucketing days in the given UTC offset.
pub fn summarize(transactions: &[Transaction], offset: FixedOffset) -> ReportSummary {
    let mut days: BTreeMap<NaiveDate, DailyTotal> = BTreeMap::new();
    let mut summary = ReportSummary::default();

    for tx in transactions {
        summary.count += 1;
        summary.revenue += tx.total_amount;
        summary.payments += tx.payment_amount;
        summary.change += tx.change_amount;

        let date = tx.created_at.with_timezone(&offset).date_naive();
        let day = days.entry(date).or_insert_with(|| DailyTotal {
            date,
            count: 0,
            revenue: Money::zero(),
        });
        day.count += 1;
        day.revenue += tx.total_amount;
    }

    summary.days = days.into_values().collect();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn transaction(y: i32, m: u32, d: u32, h: u32, total: i64, paid: i64) -> Transaction {
        Transaction {
            id: crate::types::new_id(),
            created_at: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
            total_amount: Money::from_minor(total),
            payment_amount: Money::from_minor(paid),
            change_amount: Money::from_minor(paid - total),
        }
    }

    #[test]
    fn test_summarize_totals_and_days() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let transactions = vec![
            transaction(2026, 10, 2, 9, 3000, 5000),
            transaction(2026, 10, 1, 10, 1500, 2000),
            transaction(2026, 10, 2, 15, 500, 500),
        ];

        let summary = summarize(&transactions, utc);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.revenue, Money::from_minor(5000));
        assert_eq!(summary.payments, Money::from_minor(7500));
        assert_eq!(summary.change, Money::from_minor(2500));
        assert_eq!(summary.average_sale(), Money::from_minor(1666));

        assert_eq!(summary.days.len(), 2);
        assert_eq!(summary.days[0].date, NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(summary.days[0].count, 1);
        assert_eq!(summary.days[1].count, 2);
        assert_eq!(summary.days[1].revenue, Money::from_minor(3500));
    }

    #[test]
    fn test_summarize_uses_offset_for_day_boundaries() {
        // 20:00 UTC is already the next day in UTC+7
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        let transactions = vec![transaction(2026, 10, 1, 20, 1000, 1000)];

        let summary = summarize(&transactions, wib);
        assert_eq!(summary.days[0].date, NaiveDate::from_ymd_opt(2026, 10, 2).unwrap());
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[], FixedOffset::east_opt(0).unwrap());
        assert_eq!(summary, ReportSummary::default());
        assert_eq!(summary.average_sale(), Money::zero());
    }
}
