//! crates/study_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::domain::{User, UserCredentials};

//=========================================================================================
// Generic Core Error and Result Types
//=========================================================================================

/// The error type shared by all core operations and port implementations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No valid user identity was supplied for an operation that requires one.
    /// The core only signals the condition; the caller decides how to challenge.
    #[error("Not authenticated")]
    Unauthenticated,
    /// Malformed date, out-of-range month, negative duration, and the like.
    /// Always raised before any store mutation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    /// An underlying store read or write failed. Propagated verbatim,
    /// never retried inside the core.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// A convenience type alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

//=========================================================================================
// Store Ports (Traits)
//=========================================================================================

/// Persistent set of (user, date) "studied" marks.
///
/// The at-most-one-row-per-pair invariant must be enforced by the storage
/// layer itself (uniqueness constraint or equivalent atomic insert), so that
/// two concurrent marks of the same day cannot race into a duplicate.
#[async_trait]
pub trait StudyDayStore: Send + Sync {
    /// Inserts the pair if absent. Marking an already-marked day succeeds
    /// without creating a second record.
    async fn mark_studied(&self, user_id: Uuid, date: NaiveDate) -> CoreResult<()>;

    /// Day-of-month numbers the user studied in the given month.
    async fn studied_days_in_month(
        &self,
        user_id: Uuid,
        month0: u32,
        year: i32,
    ) -> CoreResult<BTreeSet<u32>>;

    /// Every studied date for the user, in no particular order.
    async fn all_studied_dates(&self, user_id: Uuid) -> CoreResult<Vec<NaiveDate>>;
}

/// Append-only log of completed focus-session durations.
#[async_trait]
pub trait SessionTimeStore: Send + Sync {
    /// Appends one completed session. Fails `InvalidInput` when
    /// `seconds_spent` is negative; nothing is persisted in that case.
    async fn record_session(&self, user_id: Uuid, seconds_spent: i64) -> CoreResult<()>;

    /// Sum of all recorded durations for the user; 0 when there are none.
    async fn total_seconds_for(&self, user_id: Uuid) -> CoreResult<i64>;
}

/// User accounts and browser login sessions.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Creates an account. Fails `InvalidInput` when the email is taken.
    async fn create_user(
        &self,
        email: &str,
        display_name: &str,
        hashed_password: &str,
    ) -> CoreResult<User>;

    async fn get_user_by_email(&self, email: &str) -> CoreResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()>;

    /// Resolves an unexpired session id to its user. Fails `NotFound` for
    /// unknown or expired sessions.
    async fn validate_auth_session(&self, session_id: &str) -> CoreResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> CoreResult<()>;
}
