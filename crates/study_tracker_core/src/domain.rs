//! crates/study_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use std::collections::BTreeSet;
use uuid::Uuid;

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub hashed_password: String,
}

/// A (month, year) pair used for calendar navigation. `month0` is
/// zero-based (0 = January, 11 = December).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRef {
    pub month0: u32,
    pub year: i32,
}

/// The month grid handed to the presentation layer. Derived, never persisted.
///
/// `days` is left-padded with `None` placeholders so the first real day
/// lines up with its weekday column (Sunday = column 0).
#[derive(Debug, Clone)]
pub struct CalendarView {
    pub month0: u32,
    pub year: i32,
    pub month_name: &'static str,
    pub days: Vec<Option<u32>>,
    pub studied: BTreeSet<u32>,
    /// `Some(day)` when the viewed month/year contain the current date.
    pub today: Option<u32>,
    pub prev: MonthRef,
    pub next: MonthRef,
}

impl CalendarView {
    pub fn is_today(&self, day: u32) -> bool {
        self.today == Some(day)
    }

    pub fn is_studied(&self, day: u32) -> bool {
        self.studied.contains(&day)
    }
}

/// Aggregate progress numbers for one user. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Total focus time formatted to one decimal, e.g. "1.5".
    pub total_hours: String,
    /// Studied-day count in the current month.
    pub studied_days_this_month: u32,
    /// Studied-day counts for the current year, indexed by zero-based month.
    pub studied_days_per_month: [u32; 12],
}
