//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;
use study_tracker_core::ports::AuthStore;
use study_tracker_core::service::AttendanceService;

/// The shared application state, created once at startup and passed to all handlers.
///
/// Requests share nothing mutable: handlers only reach the stores through
/// `attendance` and `auth`, and both are behind immutable trait objects.
#[derive(Clone)]
pub struct AppState {
    pub attendance: AttendanceService,
    pub auth: Arc<dyn AuthStore>,
}
