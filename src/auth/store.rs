//! SQLite-backed user registration store.
//!
//! Tables:
//! - `users`: id, username (unique), email, password

use super::error::{Result, StoreError};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::fmt;
use std::io::Write;
use std::path::Path;

/// A registered user.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of [`UserStore::add_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new row was written.
    Created(User),
    /// The username already exists; the store is unchanged.
    RejectedDuplicate,
}

impl AddOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Handle to a user database. Dropping it closes the connection.
pub struct UserStore {
    conn: Mutex<Connection>,
}

impl UserStore {
    /// Open (or create) the user database at the given path.
    ///
    /// The schema is not touched; call [`UserStore::initialize`] first on a
    /// fresh file.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        tracing::debug!(path = %db_path.display(), "Opened user store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create the `users` table if it does not exist yet. Safe to call
    /// multiple times.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email    TEXT NOT NULL,
                password TEXT NOT NULL
            );",
        )?;
        tracing::debug!("User schema ready");
        Ok(())
    }

    // ── User Management ─────────────────────────────────────────────

    /// Register a new user.
    ///
    /// A taken username yields [`AddOutcome::RejectedDuplicate`] and leaves
    /// the existing record as it was.
    pub fn add_user(&self, username: &str, email: &str, password: &str) -> Result<AddOutcome> {
        if username.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "username cannot be empty".to_string(),
            ));
        }
        if username.trim() != username {
            return Err(StoreError::InvalidInput(
                "username cannot start or end with whitespace".to_string(),
            ));
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        if find_by_username(&tx, username)?.is_some() {
            tracing::warn!(username, "Username already taken");
            return Ok(AddOutcome::RejectedDuplicate);
        }

        let result = tx.execute(
            "INSERT INTO users (username, email, password) VALUES (?1, ?2, ?3)",
            rusqlite::params![username, email, password],
        );

        match result {
            Ok(_) => {
                let id = tx.last_insert_rowid();
                tx.commit()?;
                tracing::info!(username, id, "User created");
                Ok(AddOutcome::Created(User {
                    id,
                    username: username.to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                }))
            }
            // Another connection to the same file can insert the name between
            // the lookup and this insert.
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                tracing::warn!(username, "Username already taken");
                Ok(AddOutcome::RejectedDuplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check a username + password pair. Both must match exactly.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        let conn = self.conn.lock();
        match find_by_username(&conn, username)? {
            Some(user) => {
                let ok = constant_time_eq(user.password.as_bytes(), password.as_bytes());
                tracing::debug!(username, ok, "Authentication attempt");
                Ok(ok)
            }
            None => {
                tracing::debug!(username, "Authentication attempt for unknown user");
                Ok(false)
            }
        }
    }

    /// Look up a user by username.
    pub fn find_user(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        find_by_username(&conn, username)
    }

    /// All users in registration order.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT id, username, email, password FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Count registered users.
    pub fn user_count(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ── Display ─────────────────────────────────────────────────────

    /// Write a human-readable listing of all users. Passwords are omitted.
    pub fn write_users<W: Write>(&self, out: &mut W) -> Result<()> {
        let users = self.list_users()?;
        if users.is_empty() {
            writeln!(out, "No registered users.")?;
            return Ok(());
        }

        writeln!(out, "Registered users ({}):", users.len())?;
        for user in &users {
            writeln!(out, "  {:>4}  {}  <{}>", user.id, user.username, user.email)?;
        }
        Ok(())
    }

    /// Print the user listing to stdout.
    pub fn display_users(&self) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.write_users(&mut out)?;
        out.flush()?;
        Ok(())
    }
}

// ── Row Helpers ─────────────────────────────────────────────────────

fn find_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    let row = conn.query_row(
        "SELECT id, username, email, password FROM users WHERE username = ?1",
        rusqlite::params![username],
        row_to_user,
    );

    match row {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
    })
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

// ── Tests ───────────────────────────────────────────────────────────
