//! End-to-end scenarios over the real router: signup/login round trips,
//! calendar shape, stats rollups, and the error-status contract.

use api_lib::{
    adapters::db::DbAdapter,
    web::{api_router, state::AppState},
};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Datelike, Local};
use serde_json::{json, Value};
use std::sync::Arc;
use study_tracker_core::service::AttendanceService;
use tower::ServiceExt;
use uuid::Uuid;

/// Builds the full application over a uniquely named in-memory database.
async fn test_app() -> Router {
    let db_url = format!("file:memdb_{}?mode=memory&cache=shared", Uuid::new_v4());
    let db = Arc::new(DbAdapter::connect(&db_url).await.expect("test db setup failed"));
    let app_state = Arc::new(AppState {
        attendance: AttendanceService::new(db.clone(), db.clone()),
        auth: db,
    });
    api_router(app_state)
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Creates an account and returns the `session=...` cookie pair.
async fn signup(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            None,
            json!({ "email": email, "display_name": "Tester", "password": "hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("signup must set a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn mark_day(app: &Router, cookie: &str, date: &str) -> StatusCode {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/attendance/days",
            Some(cookie),
            json!({ "date": date }),
        ))
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn march_2024_calendar_has_studied_days_and_correct_shape() {
    let app = test_app().await;
    let cookie = signup(&app, "march@example.com").await;

    for date in ["2024-03-05", "2024-03-12", "2024-03-19"] {
        assert_eq!(mark_day(&app, &cookie, date).await, StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get_request("/attendance/calendar?month=2&year=2024", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["month"], 2);
    assert_eq!(body["year"], 2024);
    assert_eq!(body["month_name"], "March");
    assert_eq!(body["studied"], json!([5, 12, 19]));

    // March 2024 starts on a Friday: 5 placeholders then 31 days.
    let days = body["days"].as_array().unwrap();
    assert_eq!(days.len(), 36);
    assert!(days[..5].iter().all(Value::is_null));
    assert_eq!(days[5], json!(1));

    // December wraps into January of the next year and vice versa.
    assert_eq!(body["prev_month"], 1);
    assert_eq!(body["prev_year"], 2024);
    assert_eq!(body["next_month"], 3);
    assert_eq!(body["next_year"], 2024);
}

#[tokio::test]
async fn calendar_wraps_across_the_year_boundary() {
    let app = test_app().await;
    let cookie = signup(&app, "wrap@example.com").await;

    let response = app
        .clone()
        .oneshot(get_request("/attendance/calendar?month=11&year=2024", Some(&cookie)))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["next_month"], 0);
    assert_eq!(body["next_year"], 2025);

    let response = app
        .clone()
        .oneshot(get_request("/attendance/calendar?month=0&year=2024", Some(&cookie)))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["prev_month"], 11);
    assert_eq!(body["prev_year"], 2023);
}

#[tokio::test]
async fn marking_the_same_day_twice_succeeds_and_stores_one_mark() {
    let app = test_app().await;
    let cookie = signup(&app, "twice@example.com").await;

    assert_eq!(mark_day(&app, &cookie, "2024-03-05").await, StatusCode::OK);
    assert_eq!(mark_day(&app, &cookie, "2024-03-05").await, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/attendance/calendar?month=2&year=2024", Some(&cookie)))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["studied"], json!([5]));
}

#[tokio::test]
async fn stats_roll_up_focus_time_and_studied_days() {
    let app = test_app().await;
    let cookie = signup(&app, "stats@example.com").await;

    for _ in 0..2 {
        let status = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/focus/sessions",
                Some(&cookie),
                json!({ "seconds_spent": 3600 }),
            ))
            .await
            .unwrap()
            .status();
        assert_eq!(status, StatusCode::CREATED);
    }

    // Four studied days in the current month; days 1-4 exist in every month.
    let today = Local::now().date_naive();
    for day in 1..=4 {
        let date = format!("{:04}-{:02}-{:02}", today.year(), today.month(), day);
        assert_eq!(mark_day(&app, &cookie, &date).await, StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get_request("/attendance/stats", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total_hours"], "2.0");
    assert_eq!(body["studied_days_this_month"], 4);
    assert_eq!(
        body["studied_days_per_month"][today.month0() as usize],
        json!(4)
    );
}

#[tokio::test]
async fn requests_without_a_session_get_the_documented_statuses() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/attendance/calendar", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get_request("/attendance/stats", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Mark-day answers missing identity with a plain 400.
    let response = app
        .clone()
        .oneshot(json_request("POST", "/attendance/days", None, json!({ "date": "2024-03-05" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/focus/sessions", None, json!({ "seconds_spent": 60 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_dates_and_negative_durations_are_bad_requests() {
    let app = test_app().await;
    let cookie = signup(&app, "invalid@example.com").await;

    assert_eq!(mark_day(&app, &cookie, "not-a-date").await, StatusCode::BAD_REQUEST);
    assert_eq!(mark_day(&app, &cookie, "2024-02-30").await, StatusCode::BAD_REQUEST);

    // A body without the date field is a 400 too, never a 422.
    let response = app
        .clone()
        .oneshot(json_request("POST", "/attendance/days", Some(&cookie), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/focus/sessions",
            Some(&cookie),
            json!({ "seconds_spent": -1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing leaked into the stats.
    let response = app
        .clone()
        .oneshot(get_request("/attendance/stats", Some(&cookie)))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["total_hours"], "0.0");
    assert_eq!(body["studied_days_this_month"], 0);
}

#[tokio::test]
async fn duplicate_signup_email_is_rejected() {
    let app = test_app().await;
    signup(&app, "dup@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            None,
            json!({ "email": "dup@example.com", "display_name": "Again", "password": "other" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_verifies_the_password() {
    let app = test_app().await;
    signup(&app, "login@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "login@example.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "login@example.com", "password": "hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn logout_invalidates_the_session_cookie() {
    let app = test_app().await;
    let cookie = signup(&app, "logout@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/auth/logout", Some(&cookie), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/attendance/calendar", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
