pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::{resolve_user, CurrentUser};

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::web::state::AppState;

/// Builds the API router. The attendance and focus routes sit behind the
/// identity-resolution middleware; the auth routes are public.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    let protected_routes = Router::new()
        .route("/attendance/calendar", get(rest::calendar_handler))
        .route("/attendance/days", post(rest::mark_day_handler))
        .route("/attendance/stats", get(rest::stats_handler))
        .route("/focus/sessions", post(rest::record_session_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            resolve_user,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
