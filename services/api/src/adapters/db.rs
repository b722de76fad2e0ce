//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the store ports from the `core` crate. It handles all interactions with the
//! SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::migrate::MigrateDatabase;
use sqlx::{FromRow, Sqlite, SqlitePool};
use std::collections::BTreeSet;
use study_tracker_core::calendar;
use study_tracker_core::domain::{User, UserCredentials};
use study_tracker_core::ports::{
    AuthStore, CoreError, CoreResult, SessionTimeStore, StudyDayStore,
};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the store ports over a SQLite pool.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Connects to the database at `url`, creating it and the schema if needed.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?;
        }
        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Creates the tables the service needs.
    ///
    /// The composite primary key on `studied_days` is what makes `mark_studied`
    /// idempotent under concurrent duplicate requests; the application never
    /// does a check-then-insert.
    async fn setup_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                display_name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS auth_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS studied_days (
                user_id TEXT NOT NULL,
                study_date TEXT NOT NULL,
                PRIMARY KEY (user_id, study_date)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS focus_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                seconds_spent INTEGER NOT NULL,
                completed_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn storage_err(e: sqlx::Error) -> CoreError {
    CoreError::Storage(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
    display_name: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
            display_name: self.display_name,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    display_name: String,
    password_hash: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            display_name: self.display_name,
            hashed_password: self.password_hash,
        }
    }
}

//=========================================================================================
// `StudyDayStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl StudyDayStore for DbAdapter {
    async fn mark_studied(&self, user_id: Uuid, date: NaiveDate) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO studied_days (user_id, study_date) VALUES (?, ?) \
             ON CONFLICT (user_id, study_date) DO NOTHING",
        )
        .bind(user_id)
        .bind(date)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn studied_days_in_month(
        &self,
        user_id: Uuid,
        month0: u32,
        year: i32,
    ) -> CoreResult<BTreeSet<u32>> {
        let (first, first_of_next) = calendar::month_bounds(month0, year)?;
        let dates: Vec<NaiveDate> = sqlx::query_scalar(
            "SELECT study_date FROM studied_days \
             WHERE user_id = ? AND study_date >= ? AND study_date < ?",
        )
        .bind(user_id)
        .bind(first)
        .bind(first_of_next)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(dates.into_iter().map(|d| chrono::Datelike::day(&d)).collect())
    }

    async fn all_studied_dates(&self, user_id: Uuid) -> CoreResult<Vec<NaiveDate>> {
        sqlx::query_scalar("SELECT study_date FROM studied_days WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)
    }
}

//=========================================================================================
// `SessionTimeStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionTimeStore for DbAdapter {
    async fn record_session(&self, user_id: Uuid, seconds_spent: i64) -> CoreResult<()> {
        if seconds_spent < 0 {
            return Err(CoreError::InvalidInput(format!(
                "seconds_spent must be non-negative, got {seconds_spent}"
            )));
        }
        sqlx::query(
            "INSERT INTO focus_sessions (id, user_id, seconds_spent, completed_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(seconds_spent)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn total_seconds_for(&self, user_id: Uuid) -> CoreResult<i64> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(seconds_spent), 0) FROM focus_sessions WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)
    }
}

//=========================================================================================
// `AuthStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthStore for DbAdapter {
    async fn create_user(
        &self,
        email: &str,
        display_name: &str,
        hashed_password: &str,
    ) -> CoreResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, display_name, password_hash, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING user_id, email, display_name",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(display_name)
        .bind(hashed_password)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                CoreError::InvalidInput(format!("email {email} is already registered"))
            }
            _ => storage_err(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> CoreResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, display_name, password_hash FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                CoreError::NotFound(format!("No user with email {email}"))
            }
            _ => storage_err(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> CoreResult<Uuid> {
        sqlx::query_scalar("SELECT user_id FROM auth_sessions WHERE id = ? AND expires_at > ?")
            .bind(session_id)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    CoreError::NotFound("Unknown or expired session".to_string())
                }
                _ => storage_err(e),
            })
    }

    async fn delete_auth_session(&self, session_id: &str) -> CoreResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    // Each test gets its own uniquely named in-memory database.
    async fn setup_test() -> DbAdapter {
        let test_id = Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);
        DbAdapter::connect(&db_url).await.expect("test db setup failed")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn studied_row_count(db: &DbAdapter) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM studied_days")
            .fetch_one(&db.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn mark_studied_is_idempotent_at_the_storage_layer() {
        let db = setup_test().await;
        let user = Uuid::new_v4();

        db.mark_studied(user, date(2024, 3, 5)).await.unwrap();
        db.mark_studied(user, date(2024, 3, 5)).await.unwrap();

        assert_eq!(studied_row_count(&db).await, 1);
    }

    #[tokio::test]
    async fn studied_days_restricted_to_the_requested_month() {
        let db = setup_test().await;
        let user = Uuid::new_v4();

        db.mark_studied(user, date(2024, 3, 5)).await.unwrap();
        db.mark_studied(user, date(2024, 3, 19)).await.unwrap();
        db.mark_studied(user, date(2024, 2, 29)).await.unwrap();
        db.mark_studied(user, date(2024, 4, 1)).await.unwrap();
        db.mark_studied(user, date(2023, 3, 5)).await.unwrap();
        db.mark_studied(Uuid::new_v4(), date(2024, 3, 7)).await.unwrap();

        let days = db.studied_days_in_month(user, 2, 2024).await.unwrap();
        assert_eq!(days, [5, 19].into_iter().collect());
    }

    #[tokio::test]
    async fn all_studied_dates_returns_every_mark_for_the_user() {
        let db = setup_test().await;
        let user = Uuid::new_v4();

        db.mark_studied(user, date(2024, 3, 5)).await.unwrap();
        db.mark_studied(user, date(2023, 12, 31)).await.unwrap();
        db.mark_studied(Uuid::new_v4(), date(2024, 3, 5)).await.unwrap();

        let mut dates = db.all_studied_dates(user).await.unwrap();
        dates.sort();
        assert_eq!(dates, vec![date(2023, 12, 31), date(2024, 3, 5)]);
    }

    #[tokio::test]
    async fn session_totals_sum_per_user() {
        let db = setup_test().await;
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert_eq!(db.total_seconds_for(user).await.unwrap(), 0);

        db.record_session(user, 1500).await.unwrap();
        db.record_session(user, 3900).await.unwrap();
        db.record_session(other, 600).await.unwrap();

        assert_eq!(db.total_seconds_for(user).await.unwrap(), 5400);
    }

    #[tokio::test]
    async fn negative_durations_are_rejected_and_not_persisted() {
        let db = setup_test().await;
        let user = Uuid::new_v4();

        let err = db.record_session(user, -5).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert_eq!(db.total_seconds_for(user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_email_is_invalid_input() {
        let db = setup_test().await;

        db.create_user("a@example.com", "A", "hash").await.unwrap();
        let err = db.create_user("a@example.com", "B", "hash").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn credentials_round_trip() {
        let db = setup_test().await;

        let user = db.create_user("a@example.com", "Ana", "hash123").await.unwrap();
        let creds = db.get_user_by_email("a@example.com").await.unwrap();
        assert_eq!(creds.user_id, user.user_id);
        assert_eq!(creds.display_name, "Ana");
        assert_eq!(creds.hashed_password, "hash123");

        let err = db.get_user_by_email("missing@example.com").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn auth_sessions_validate_and_expire() {
        let db = setup_test().await;
        let user = Uuid::new_v4();

        db.create_auth_session("live", user, Utc::now() + Duration::days(30))
            .await
            .unwrap();
        assert_eq!(db.validate_auth_session("live").await.unwrap(), user);

        db.create_auth_session("stale", user, Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        assert!(matches!(
            db.validate_auth_session("stale").await,
            Err(CoreError::NotFound(_))
        ));

        db.delete_auth_session("live").await.unwrap();
        assert!(matches!(
            db.validate_auth_session("live").await,
            Err(CoreError::NotFound(_))
        ));
    }
}
