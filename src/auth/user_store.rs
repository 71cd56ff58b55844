//! Credential Store
//! Mission: Persist registered accounts with salted password hashes

use crate::auth::models::User;
use anyhow::{Context, Result};
use bcrypt::{hash, verify};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Fixed bcrypt cost factor (each hash carries its own random salt).
const BCRYPT_COST: u32 = 10;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Credential store with SQLite backend, keyed uniquely by email.
pub struct UserStore {
    db_path: String,
    /// Hash verified against when an email is unknown, so the unknown-email
    /// and wrong-password login paths cost the same.
    dummy_hash: String,
}

/// Failure modes of account creation.
#[derive(Debug)]
pub enum CreateUserError {
    /// An account with this email already exists.
    DuplicateEmail,
    /// The underlying store failed.
    Store(anyhow::Error),
}

impl std::fmt::Display for CreateUserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateUserError::DuplicateEmail => write!(f, "email already registered"),
            CreateUserError::Store(err) => write!(f, "credential store error: {err}"),
        }
    }
}

impl std::error::Error for CreateUserError {}

impl UserStore {
    /// Create a new store and initialize the schema. Idempotent: reopening
    /// an existing database leaves its contents untouched.
    pub fn new(db_path: &str) -> Result<Self> {
        let dummy_hash = hash("", BCRYPT_COST).context("Failed to prepare dummy hash")?;
        let store = Self {
            db_path: db_path.to_string(),
            dummy_hash,
        };
        store.init_db()?;
        Ok(store)
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Initialize database schema.
    ///
    /// The UNIQUE constraint on email is the atomicity backstop for signup:
    /// concurrent check-then-insert races resolve inside SQLite, not in
    /// application code.
    fn init_db(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Get user by email.
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.open()?;

        let mut stmt = conn.prepare(
            "SELECT id, username, email, password_hash, created_at
             FROM users WHERE email = ?1",
        )?;

        let user_result = stmt.query_row(params![email], |row| {
            let id: String = row.get(0)?;
            let id = Uuid::parse_str(&id).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
            })?;
            Ok(User {
                id,
                username: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                created_at: row.get(4)?,
            })
        });

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify an email/password pair, returning the matching user.
    ///
    /// Returns `None` for an unknown email or a wrong password without
    /// distinguishing the two; the unknown-email path still performs one
    /// bcrypt comparison against a dummy hash so the caller's timing does
    /// not reveal whether the account exists.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        match self.find_by_email(email)? {
            Some(user) => {
                let valid = verify(password, &user.password_hash)
                    .context("Failed to verify password")?;
                Ok(valid.then_some(user))
            }
            None => {
                let _ = verify(password, &self.dummy_hash);
                Ok(None)
            }
        }
    }

    /// Create a new account.
    ///
    /// Fails with `DuplicateEmail` if an account with this email exists;
    /// the check is the insert itself hitting the unique constraint.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, CreateUserError> {
        let password_hash = hash(password, BCRYPT_COST)
            .context("Failed to hash password")
            .map_err(CreateUserError::Store)?;

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.open().map_err(CreateUserError::Store)?;
        let inserted = conn.execute(
            "INSERT INTO users (id, username, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.username,
                user.email,
                user.password_hash,
                user.created_at,
            ],
        );

        match inserted {
            Ok(_) => {
                info!("✅ Created user: {} <{}>", user.username, user.email);
                Ok(user)
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(CreateUserError::DuplicateEmail)
            }
            Err(e) => Err(CreateUserError::Store(
                anyhow::Error::new(e).context("Failed to insert user"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = UserStore::new(db_path).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_create_and_find_user() {
        let (store, _temp) = create_test_store();

        let created = store.create_user("ada", "ada@x.com", "s3cret").unwrap();
        assert_eq!(created.username, "ada");
        assert_eq!(created.email, "ada@x.com");

        let found = store.find_by_email("ada@x.com").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.username, "ada");

        assert!(store.find_by_email("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn test_password_stored_hashed() {
        let (store, _temp) = create_test_store();

        store.create_user("ada", "ada@x.com", "s3cret").unwrap();
        let user = store.find_by_email("ada@x.com").unwrap().unwrap();

        assert_ne!(user.password_hash, "s3cret");
        assert!(verify("s3cret", &user.password_hash).unwrap());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (store, _temp) = create_test_store();

        store.create_user("ada", "ada@x.com", "s3cret").unwrap();
        let err = store.create_user("eve", "ada@x.com", "other").unwrap_err();
        assert!(matches!(err, CreateUserError::DuplicateEmail));

        // Same username with a different email is fine.
        store.create_user("ada", "ada2@x.com", "s3cret").unwrap();
    }

    #[test]
    fn test_authenticate() {
        let (store, _temp) = create_test_store();
        store.create_user("ada", "ada@x.com", "s3cret").unwrap();

        assert!(store.authenticate("ada@x.com", "s3cret").unwrap().is_some());
        assert!(store.authenticate("ada@x.com", "wrong").unwrap().is_none());
        assert!(store.authenticate("nobody@x.com", "s3cret").unwrap().is_none());
    }

    #[test]
    fn test_schema_init_is_idempotent() {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();

        let store = UserStore::new(db_path).unwrap();
        store.create_user("ada", "ada@x.com", "s3cret").unwrap();

        // Reopening the same database keeps existing accounts.
        let reopened = UserStore::new(db_path).unwrap();
        assert!(reopened.find_by_email("ada@x.com").unwrap().is_some());
    }
}
