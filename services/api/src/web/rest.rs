//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the attendance and focus-session endpoints
//! and the master definition for the OpenAPI specification.

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_tracker_core::domain::{CalendarView, StatsSnapshot};
use study_tracker_core::ports::CoreError;
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        calendar_handler,
        mark_day_handler,
        stats_handler,
        record_session_handler,
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
    ),
    components(
        schemas(
            CalendarResponse,
            StatsResponse,
            MarkDayRequest,
            RecordSessionRequest,
            crate::web::auth::SignupRequest,
            crate::web::auth::LoginRequest,
            crate::web::auth::AuthResponse,
        )
    ),
    tags(
        (name = "Study Tracker API", description = "API endpoints for studied-day tracking and focus-session statistics.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, IntoParams)]
pub struct CalendarQuery {
    /// Zero-based month (0 = January). Defaults to the current month.
    pub month: Option<u32>,
    /// Defaults to the current year.
    pub year: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct MarkDayRequest {
    /// The studied day, formatted `YYYY-MM-DD`. A request without it is a
    /// plain 400, the same as a request without an identity.
    pub date: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct RecordSessionRequest {
    /// Duration of the completed focus session, in seconds.
    pub seconds_spent: i64,
}

/// The month grid as the frontend renders it: `days` carries `null`
/// placeholders before the 1st so slots align to weekday columns.
#[derive(Serialize, ToSchema)]
pub struct CalendarResponse {
    month: u32,
    year: i32,
    month_name: String,
    days: Vec<Option<u32>>,
    studied: Vec<u32>,
    today: Option<u32>,
    prev_month: u32,
    prev_year: i32,
    next_month: u32,
    next_year: i32,
}

impl From<CalendarView> for CalendarResponse {
    fn from(view: CalendarView) -> Self {
        Self {
            month: view.month0,
            year: view.year,
            month_name: view.month_name.to_string(),
            days: view.days,
            studied: view.studied.into_iter().collect(),
            today: view.today,
            prev_month: view.prev.month0,
            prev_year: view.prev.year,
            next_month: view.next.month0,
            next_year: view.next.year,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    total_hours: String,
    studied_days_this_month: u32,
    studied_days_per_month: Vec<u32>,
}

impl From<StatsSnapshot> for StatsResponse {
    fn from(snapshot: StatsSnapshot) -> Self {
        Self {
            total_hours: snapshot.total_hours,
            studied_days_this_month: snapshot.studied_days_this_month,
            studied_days_per_month: snapshot.studied_days_per_month.to_vec(),
        }
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

/// The JSON endpoints answer a missing identity with a 401 challenge.
fn error_status(e: CoreError) -> (StatusCode, String) {
    match e {
        CoreError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Not authenticated".to_string()),
        CoreError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
        CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        CoreError::Storage(msg) => {
            error!("Storage failure: {}", msg);
            (StatusCode::INTERNAL_SERVER_ERROR, "Storage failure".to_string())
        }
    }
}

/// Mark-day keeps the original contract: a request without a valid user or
/// date is a plain 400, and storage failures are 500.
fn mark_day_error_status(e: CoreError) -> (StatusCode, String) {
    match e {
        CoreError::Unauthenticated => (StatusCode::BAD_REQUEST, "Invalid request".to_string()),
        other => error_status(other),
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Get the month-grid calendar with studied-day flags.
#[utoipa::path(
    get,
    path = "/attendance/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Calendar for the requested month", body = CalendarResponse),
        (status = 400, description = "Month or year out of range"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn calendar_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let today = Local::now().date_naive();
    let view = state
        .attendance
        .month_view(user, query.month, query.year, today)
        .await
        .map_err(error_status)?;
    Ok(Json(CalendarResponse::from(view)))
}

/// Mark a calendar day as studied. Marking the same day twice is a success.
#[utoipa::path(
    post,
    path = "/attendance/days",
    request_body = MarkDayRequest,
    responses(
        (status = 200, description = "Day recorded (or already recorded)"),
        (status = 400, description = "Missing identity or malformed date"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn mark_day_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<MarkDayRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let date = req
        .date
        .ok_or((StatusCode::BAD_REQUEST, "Invalid request".to_string()))?;
    state
        .attendance
        .mark_day(user, &date)
        .await
        .map_err(mark_day_error_status)?;
    Ok(StatusCode::OK)
}

/// Get the aggregate progress statistics for the current user.
#[utoipa::path(
    get,
    path = "/attendance/stats",
    responses(
        (status = 200, description = "Progress snapshot", body = StatsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let today = Local::now().date_naive();
    let snapshot = state
        .attendance
        .stats(user, today)
        .await
        .map_err(error_status)?;
    Ok(Json(StatsResponse::from(snapshot)))
}

/// Record one completed focus session.
#[utoipa::path(
    post,
    path = "/focus/sessions",
    request_body = RecordSessionRequest,
    responses(
        (status = 201, description = "Session recorded"),
        (status = 400, description = "Negative duration"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn record_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<RecordSessionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .attendance
        .record_focus_session(user, req.seconds_spent)
        .await
        .map_err(error_status)?;
    Ok(StatusCode::CREATED)
}
