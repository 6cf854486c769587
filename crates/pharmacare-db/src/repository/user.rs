//! # User Repository
//!
//! Sign-up, login and the login-screen email suggestions.
//!
//! ## Login Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  authenticate(email, password)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... FROM users WHERE email = ?   (exact, case-sensitive)       │
//! │       │                                                                 │
//! │       ├── found     → Argon2 verify against stored hash                │
//! │       │                  ├── match    → Ok(User)                       │
//! │       │                  └── mismatch → AuthenticationFailed           │
//! │       │                                                                 │
//! │       └── not found → Argon2 hash of the attempt (same cost)           │
//! │                          └──────────→ AuthenticationFailed             │
//! │                                                                         │
//! │  Both failures look the same to the caller, and take the same time.    │
//! │                                                                         │
//! │  record_login(email)  → login_history upsert, feeds list_known_emails  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::password::{hash_password_blocking, verify_password_blocking, PasswordCost};
use pharmacare_core::validation::{validate_email, validate_registration};
use pharmacare_core::User;

/// Row shape including the hash, never handed out of this module.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    full_name: String,
    email: String,
    password_hash: String,
    created_at: chrono::DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
    password_cost: PasswordCost,
}

impl UserRepository {
    /// Creates a new UserRepository hashing new passwords at `password_cost`.
    pub fn new(pool: SqlitePool, password_cost: PasswordCost) -> Self {
        UserRepository {
            pool,
            password_cost,
        }
    }

    /// Registers a new user.
    ///
    /// ## Arguments
    /// * `full_name` - Display name, trimmed
    /// * `email` - Login identity, trimmed, stored as given otherwise
    /// * `password` - At least 6 characters, never stored in clear
    ///
    /// ## Returns
    /// The new user's id.
    ///
    /// ## Errors
    /// * `DbError::Validation` - blank fields, malformed email, short password
    /// * `DbError::UniqueViolation { field: "email" }` - email already registered
    pub async fn register(&self, full_name: &str, email: &str, password: &str) -> DbResult<String> {
        validate_registration(full_name, email, password)?;

        let full_name = full_name.trim();
        let email = email.trim();
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, email = %email, "Registering user");

        let password_hash = hash_password_blocking(password, self.password_cost).await?;

        sqlx::query(
            "INSERT INTO users (id, full_name, email, password_hash, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(full_name)
        .bind(email)
        .bind(&password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, email),
            other => other,
        })?;

        info!(id = %id, email = %email, "User registered");
        Ok(id)
    }

    /// Checks an email and password.
    ///
    /// ## Returns
    /// * `Ok(User)` - Credentials match
    /// * `Err(DbError::AuthenticationFailed)` - Unknown email or wrong password
    pub async fn authenticate(&self, email: &str, password: &str) -> DbResult<User> {
        let email = email.trim();

        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, full_name, email, password_hash, created_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            // Spend the same Argon2 work as a real verification
            let _ = hash_password_blocking(password, self.password_cost).await?;
            warn!(email = %email, "Login failed");
            return Err(DbError::AuthenticationFailed);
        };

        if !verify_password_blocking(password, &row.password_hash).await? {
            warn!(email = %email, "Login failed");
            return Err(DbError::AuthenticationFailed);
        }

        debug!(id = %row.id, "User authenticated");
        Ok(row.into())
    }

    /// Remembers `email` as the most recent login.
    pub async fn record_login(&self, email: &str) -> DbResult<()> {
        let email = email.trim();
        validate_email("email", email)?;

        sqlx::query(
            "INSERT INTO login_history (email, last_login_at) VALUES (?1, ?2) \
             ON CONFLICT (email) DO UPDATE SET last_login_at = excluded.last_login_at",
        )
        .bind(email)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(email = %email, "Login recorded");
        Ok(())
    }

    /// Emails that have logged in before, most recent first.
    pub async fn list_known_emails(&self) -> DbResult<Vec<String>> {
        let emails: Vec<String> =
            sqlx::query_scalar("SELECT email FROM login_history ORDER BY last_login_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(emails)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, full_name, email, password_hash, created_at FROM users WHERE email = ?1",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;
    use pharmacare_core::ValidationError;

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let db = test_db().await;
        let users = db.users();

        let id = users
            .register("Admin User", "admin@pharmacare.com", "admin123")
            .await
            .unwrap();

        let user = users
            .authenticate("admin@pharmacare.com", "admin123")
            .await
            .unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.full_name, "Admin User");
        assert_eq!(user.email, "admin@pharmacare.com");
    }

    #[tokio::test]
    async fn test_password_is_not_stored_in_clear() {
        let db = test_db().await;
        db.users()
            .register("Admin User", "admin@pharmacare.com", "admin123")
            .await
            .unwrap();

        let stored: String = sqlx::query_scalar("SELECT password_hash FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert!(!stored.contains("admin123"));
        assert!(stored.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_fail_alike() {
        let db = test_db().await;
        let users = db.users();
        users.register("A", "a@x.com", "secret1").await.unwrap();

        let wrong = users.authenticate("a@x.com", "secret2").await.unwrap_err();
        let unknown = users.authenticate("b@x.com", "secret1").await.unwrap_err();

        assert!(matches!(wrong, DbError::AuthenticationFailed));
        assert!(matches!(unknown, DbError::AuthenticationFailed));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let db = test_db().await;
        let users = db.users();
        users.register("A", "a@x.com", "secret1").await.unwrap();

        assert!(matches!(
            users.authenticate("A@X.COM", "secret1").await,
            Err(DbError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_db().await;
        let users = db.users();
        users.register("A", "a@x.com", "secret1").await.unwrap();

        let err = users.register("B", "a@x.com", "secret2").await.unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "email");
                assert_eq!(value, "a@x.com");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
        assert_eq!(users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let db = test_db().await;
        let users = db.users();

        assert!(matches!(
            users.register("A", "a@x.com", "12345").await,
            Err(DbError::Validation(ValidationError::TooShort { .. }))
        ));
        assert!(matches!(
            users.register("", "a@x.com", "123456").await,
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            users.register("A", "not-an-email", "123456").await,
            Err(DbError::Validation(_))
        ));
        assert_eq!(users.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_login_history_most_recent_first() {
        let db = test_db().await;
        let users = db.users();

        users.record_login("first@x.com").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        users.record_login("second@x.com").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        users.record_login("first@x.com").await.unwrap();

        assert_eq!(
            users.list_known_emails().await.unwrap(),
            vec!["first@x.com", "second@x.com"]
        );
    }

    #[tokio::test]
    async fn test_get_by_email() {
        let db = test_db().await;
        let users = db.users();
        users.register("A", "a@x.com", "secret1").await.unwrap();

        assert!(users.get_by_email("a@x.com").await.unwrap().is_some());
        assert!(users.get_by_email("z@x.com").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_logins_run_alongside_other_tasks() {
        let db = test_db().await;
        db.users()
            .register("Admin User", "admin@pharmacare.com", "admin123")
            .await
            .unwrap();

        let logins: Vec<_> = (0..4)
            .map(|i| {
                let users = db.users();
                tokio::spawn(async move {
                    let password = if i % 2 == 0 { "admin123" } else { "wrong-pass" };
                    users.authenticate("admin@pharmacare.com", password).await
                })
            })
            .collect();

        // Executor threads stay free while the hashes run
        let ticker = tokio::spawn(async {
            for _ in 0..5 {
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            }
        });

        let mut ok = 0;
        for login in logins {
            match login.await.unwrap() {
                Ok(user) => {
                    assert_eq!(user.email, "admin@pharmacare.com");
                    ok += 1;
                }
                Err(e) => assert!(matches!(e, DbError::AuthenticationFailed)),
            }
        }
        ticker.await.unwrap();
        assert_eq!(ok, 2);
    }
}
