//! crates/study_tracker_core/src/calendar.rs
//!
//! Pure month-grid arithmetic. Everything here is deterministic given its
//! inputs; "today" is always passed in, never read from a clock, so the whole
//! module is unit-testable with fixed dates.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeSet;

use crate::domain::{CalendarView, MonthRef};
use crate::ports::{CoreError, CoreResult};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// First day of the month and first day of the following month, as a
/// half-open date range. Fails `InvalidInput` for `month0 > 11` or a year
/// chrono cannot represent.
pub fn month_bounds(month0: u32, year: i32) -> CoreResult<(NaiveDate, NaiveDate)> {
    if month0 > 11 {
        return Err(CoreError::InvalidInput(format!(
            "month must be 0-11, got {month0}"
        )));
    }
    let first = NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .ok_or_else(|| CoreError::InvalidInput(format!("year {year} is out of range")))?;
    let first_of_next = if month0 == 11 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month0 + 2, 1)
    }
    .ok_or_else(|| CoreError::InvalidInput(format!("year {year} is out of range")))?;
    Ok((first, first_of_next))
}

/// Number of days in the month, taken from the last valid date of the month
/// (first of the next month stepped back one day) rather than a lookup table,
/// so leap years fall out of the date math.
pub fn days_in_month(month0: u32, year: i32) -> CoreResult<u32> {
    let (_, first_of_next) = month_bounds(month0, year)?;
    Ok((first_of_next - Duration::days(1)).day())
}

/// Weekday column of the 1st of the month, Sunday = 0.
pub fn first_weekday(month0: u32, year: i32) -> CoreResult<u32> {
    let (first, _) = month_bounds(month0, year)?;
    Ok(first.weekday().num_days_from_sunday())
}

/// The month before, wrapping the year across the Jan boundary.
pub fn previous_month(month0: u32, year: i32) -> MonthRef {
    if month0 == 0 {
        MonthRef { month0: 11, year: year - 1 }
    } else {
        MonthRef { month0: month0 - 1, year }
    }
}

/// The month after, wrapping the year across the Dec boundary.
pub fn next_month(month0: u32, year: i32) -> MonthRef {
    if month0 == 11 {
        MonthRef { month0: 0, year: year + 1 }
    } else {
        MonthRef { month0: month0 + 1, year }
    }
}

pub fn month_name(month0: u32) -> &'static str {
    MONTH_NAMES.get(month0 as usize).copied().unwrap_or("Invalid Month")
}

/// Assembles the full month grid: leading `None` placeholders up to the
/// weekday of the 1st, then `Some(1..=n)`.
pub fn build_month(
    month0: u32,
    year: i32,
    today: NaiveDate,
    studied: BTreeSet<u32>,
) -> CoreResult<CalendarView> {
    let padding = first_weekday(month0, year)?;
    let last_day = days_in_month(month0, year)?;

    let mut days: Vec<Option<u32>> = vec![None; padding as usize];
    days.extend((1..=last_day).map(Some));

    let today_in_view =
        (today.month0() == month0 && today.year() == year).then(|| today.day());

    Ok(CalendarView {
        month0,
        year,
        month_name: month_name(month0),
        days,
        studied,
        today: today_in_view,
        prev: previous_month(month0, year),
        next: next_month(month0, year),
    })
}
