//! crates/study_tracker_core/src/stats.rs
//!
//! Pure rollup of focus-session time and studied-day counts into the
//! monthly/yearly snapshot. Deterministic; "now" is injected.

use chrono::{Datelike, NaiveDate};

use crate::domain::StatsSnapshot;

/// Rolls the raw store outputs into a [`StatsSnapshot`].
///
/// Dates outside the current year never contribute to the per-month counts;
/// only the current month/year feeds `studied_days_this_month`.
pub fn aggregate(
    total_seconds: i64,
    studied_dates: &[NaiveDate],
    today: NaiveDate,
) -> StatsSnapshot {
    let total_hours = format!("{:.1}", total_seconds as f64 / 3600.0);

    let mut per_month = [0u32; 12];
    let mut this_month = 0u32;
    for date in studied_dates {
        if date.year() != today.year() {
            continue;
        }
        per_month[date.month0() as usize] += 1;
        if date.month0() == today.month0() {
            this_month += 1;
        }
    }

    StatsSnapshot {
        total_hours,
        studied_days_this_month: this_month,
        studied_days_per_month: per_month,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn hours_rounded_to_one_decimal() {
        let today = date(2024, 3, 15);
        assert_eq!(aggregate(5400, &[], today).total_hours, "1.5");
        assert_eq!(aggregate(7200, &[], today).total_hours, "2.0");
        assert_eq!(aggregate(0, &[], today).total_hours, "0.0");
        // 1000s = 0.2777..h
        assert_eq!(aggregate(1000, &[], today).total_hours, "0.3");
    }

    #[test]
    fn this_month_counts_only_current_month_and_year() {
        let today = date(2024, 3, 15);
        let dates = [
            date(2024, 3, 5),
            date(2024, 3, 12),
            date(2024, 2, 20), // other month
            date(2023, 3, 5),  // other year
        ];
        let snapshot = aggregate(0, &dates, today);
        assert_eq!(snapshot.studied_days_this_month, 2);
    }

    #[test]
    fn per_month_buckets_restricted_to_current_year() {
        let today = date(2024, 6, 1);
        let dates = [
            date(2024, 1, 10),
            date(2024, 1, 11),
            date(2024, 6, 1),
            date(2023, 1, 10), // must not leak into January's bucket
            date(2025, 6, 2),  // nor a future year
        ];
        let snapshot = aggregate(0, &dates, today);
        let mut expected = [0u32; 12];
        expected[0] = 2;
        expected[5] = 1;
        assert_eq!(snapshot.studied_days_per_month, expected);
    }

    #[test]
    fn empty_inputs_produce_zeroed_snapshot() {
        let snapshot = aggregate(0, &[], date(2024, 1, 1));
        assert_eq!(snapshot.studied_days_this_month, 0);
        assert_eq!(snapshot.studied_days_per_month, [0u32; 12]);
    }
}
