//! services/api/src/web/middleware.rs
//!
//! Identity-resolution middleware for the attendance and focus routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use study_tracker_core::ports::CoreError;
use tracing::error;
use uuid::Uuid;

use crate::web::state::AppState;

/// The identity resolved from the session cookie, or `None` when the request
/// carries no valid session.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Option<Uuid>);

/// Middleware that resolves the `session=` cookie to a user id.
///
/// It never rejects a request by itself: the service layer owns the
/// unauthenticated guard, which keeps the "no store access without a user"
/// property in one place. A missing, unknown, or expired session simply
/// resolves to `CurrentUser(None)`.
pub async fn resolve_user(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let session_id = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|header| {
            header.split(';').find_map(|c| c.trim().strip_prefix("session="))
        })
        .map(str::to_owned);

    let user_id = match session_id {
        Some(id) => match state.auth.validate_auth_session(&id).await {
            Ok(user_id) => Some(user_id),
            Err(CoreError::NotFound(_)) => None,
            Err(e) => {
                error!("Failed to validate auth session: {:?}", e);
                None
            }
        },
        None => None,
    };

    req.extensions_mut().insert(CurrentUser(user_id));
    next.run(req).await
}
