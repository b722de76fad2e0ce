//! crates/study_tracker_core/src/service.rs
//!
//! The attendance orchestrator: the only component that touches the stores
//! and the pure builders. Identity and "today" are injected into every call,
//! so the service holds no request state of its own.

use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{CalendarView, StatsSnapshot};
use crate::ports::{CoreError, CoreResult, SessionTimeStore, StudyDayStore};
use crate::{calendar, stats};

/// Month views are clamped to years chrono date math is comfortable with.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

#[derive(Clone)]
pub struct AttendanceService {
    study_days: Arc<dyn StudyDayStore>,
    sessions: Arc<dyn SessionTimeStore>,
}

impl AttendanceService {
    pub fn new(study_days: Arc<dyn StudyDayStore>, sessions: Arc<dyn SessionTimeStore>) -> Self {
        Self { study_days, sessions }
    }

    /// Marks a calendar day as studied. Re-marking an already-marked day is
    /// a success, not an error, so a retried request after a timeout never
    /// double-counts.
    ///
    /// All validation happens before the store is touched; the single write
    /// completes before this returns.
    pub async fn mark_day(&self, user: Option<Uuid>, date_str: &str) -> CoreResult<()> {
        let user_id = user.ok_or(CoreError::Unauthenticated)?;
        let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
            .map_err(|_| CoreError::InvalidInput(format!("unparseable date: {date_str:?}")))?;
        self.study_days.mark_studied(user_id, date).await
    }

    /// The month grid for the requested month, defaulting to the month that
    /// contains `today` when the caller omits either component.
    pub async fn month_view(
        &self,
        user: Option<Uuid>,
        month0: Option<u32>,
        year: Option<i32>,
        today: NaiveDate,
    ) -> CoreResult<CalendarView> {
        let user_id = user.ok_or(CoreError::Unauthenticated)?;
        let month0 = month0.unwrap_or_else(|| today.month0());
        let year = year.unwrap_or_else(|| today.year());
        if month0 > 11 {
            return Err(CoreError::InvalidInput(format!("month must be 0-11, got {month0}")));
        }
        if !YEAR_RANGE.contains(&year) {
            return Err(CoreError::InvalidInput(format!("year {year} is out of range")));
        }

        let studied = self
            .study_days
            .studied_days_in_month(user_id, month0, year)
            .await?;
        calendar::build_month(month0, year, today, studied)
    }

    /// The aggregate progress snapshot. The two store reads are independent
    /// and run concurrently.
    pub async fn stats(&self, user: Option<Uuid>, today: NaiveDate) -> CoreResult<StatsSnapshot> {
        let user_id = user.ok_or(CoreError::Unauthenticated)?;
        let (total_seconds, studied_dates) = futures::join!(
            self.sessions.total_seconds_for(user_id),
            self.study_days.all_studied_dates(user_id),
        );
        Ok(stats::aggregate(total_seconds?, &studied_dates?, today))
    }

    /// Entry point for the focus-session collaborator: appends one completed
    /// session's duration.
    pub async fn record_focus_session(
        &self,
        user: Option<Uuid>,
        seconds_spent: i64,
    ) -> CoreResult<()> {
        let user_id = user.ok_or(CoreError::Unauthenticated)?;
        if seconds_spent < 0 {
            return Err(CoreError::InvalidInput(format!(
                "seconds_spent must be non-negative, got {seconds_spent}"
            )));
        }
        self.sessions.record_session(user_id, seconds_spent).await
    }
}
