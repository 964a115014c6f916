use crate::db::traits::DatabaseClient;
use crate::types::{AppError, ProfileUpdate, Result, User};
use async_trait::async_trait;
use chrono::Utc;
use libsql::{params::Params, Builder, Connection, Database, Row, Value};
use std::path::Path;

const USER_COLUMNS: &str = "id, password_hash, name, email, gender, age, address, city, state, zip, \
                            image_url, created_at, updated_at";

/// libsql-backed account store (in-memory, local file, or remote Turso).
pub struct TursoClient {
    _db: Database,
    // In-memory databases live and die with their connection, so one is kept
    conn: Connection,
}

impl TursoClient {
    /// Ephemeral in-memory database
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {}", e)))?;

        Self::from_database(db).await
    }

    /// File-backed SQLite database; the parent directory is created if missing
    pub async fn new_local(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::Database(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open {}: {}", path, e)))?;

        Self::from_database(db).await
    }

    #[cfg(feature = "turso")]
    pub async fn new_remote(url: String, auth_token: String) -> Result<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Turso: {}", e)))?;

        Self::from_database(db).await
    }

    async fn from_database(db: Database) -> Result<Self> {
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let client = Self { _db: db, conn };
        client.initialize_schema().await?;

        Ok(client)
    }

    async fn initialize_schema(&self) -> Result<()> {
        // The UNIQUE constraint on email is what serializes concurrent registrations
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    password_hash TEXT NOT NULL,
                    name TEXT NOT NULL,
                    email TEXT UNIQUE NOT NULL,
                    gender TEXT NOT NULL,
                    age INTEGER NOT NULL,
                    address TEXT NOT NULL,
                    city TEXT NOT NULL,
                    state TEXT NOT NULL,
                    zip TEXT NOT NULL,
                    image_url TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        Ok(())
    }

    async fn query_users(&self, sql: &str, params: Params) -> Result<Vec<User>> {
        let mut rows = self
            .conn
            .query(sql, params)
            .await
            .map_err(|e| AppError::Database(format!("Failed to query users: {}", e)))?;

        let mut users = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            users.push(user_from_row(&row)?);
        }

        Ok(users)
    }
}

fn user_from_row(row: &Row) -> Result<User> {
    let gender: String = row.get(4).map_err(|e| AppError::Database(e.to_string()))?;
    let age: i64 = row.get(5).map_err(|e| AppError::Database(e.to_string()))?;

    Ok(User {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        password_hash: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        name: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
        email: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
        gender: gender
            .parse()
            .map_err(|_| AppError::Database(format!("Unknown gender value in row: {}", gender)))?,
        age: u32::try_from(age)
            .map_err(|_| AppError::Database(format!("Age out of range in row: {}", age)))?,
        address: row.get(6).map_err(|e| AppError::Database(e.to_string()))?,
        city: row.get(7).map_err(|e| AppError::Database(e.to_string()))?,
        state: row.get(8).map_err(|e| AppError::Database(e.to_string()))?,
        zip: row.get(9).map_err(|e| AppError::Database(e.to_string()))?,
        image_url: row.get(10).map_err(|e| AppError::Database(e.to_string()))?,
        created_at: row.get(11).map_err(|e| AppError::Database(e.to_string()))?,
        updated_at: row.get(12).map_err(|e| AppError::Database(e.to_string()))?,
    })
}

/// Turns a write failure into `DuplicateAccount` when it is a unique-key clash.
fn map_write_error(err: libsql::Error, context: &str) -> AppError {
    let message = err.to_string();
    if message.contains("UNIQUE constraint failed") {
        AppError::DuplicateAccount
    } else {
        AppError::Database(format!("{}: {}", context, message))
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn optional_text(value: &Option<String>) -> Value {
    value.as_deref().map(text).unwrap_or(Value::Null)
}

#[async_trait]
impl DatabaseClient for TursoClient {
    async fn create_user(&self, user: &User) -> Result<()> {
        let params = Params::Positional(vec![
            text(&user.id),
            text(&user.password_hash),
            text(&user.name),
            text(&user.email),
            text(user.gender.as_str()),
            Value::Integer(i64::from(user.age)),
            text(&user.address),
            text(&user.city),
            text(&user.state),
            text(&user.zip),
            text(&user.image_url),
            Value::Integer(user.created_at),
            Value::Integer(user.updated_at),
        ]);

        self.conn
            .execute(
                &format!(
                    "INSERT INTO users ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    USER_COLUMNS
                ),
                params,
            )
            .await
            .map_err(|e| map_write_error(e, "Failed to create user"))?;

        Ok(())
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let users = self
            .query_users(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                Params::Positional(vec![text(id)]),
            )
            .await?;

        Ok(users.into_iter().next())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self
            .query_users(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                Params::Positional(vec![text(email)]),
            )
            .await?;

        Ok(users.into_iter().next())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.query_users(
            &format!(
                "SELECT {} FROM users ORDER BY created_at ASC, rowid ASC",
                USER_COLUMNS
            ),
            Params::None,
        )
        .await
    }

    async fn update_user(&self, id: &str, update: &ProfileUpdate) -> Result<bool> {
        let params = Params::Positional(vec![
            optional_text(&update.name),
            optional_text(&update.email),
            update
                .gender
                .map(|g| text(g.as_str()))
                .unwrap_or(Value::Null),
            update
                .age
                .map(|age| Value::Integer(i64::from(age)))
                .unwrap_or(Value::Null),
            optional_text(&update.address),
            optional_text(&update.city),
            optional_text(&update.state),
            optional_text(&update.zip),
            optional_text(&update.image_url),
            optional_text(&update.password_hash),
            Value::Integer(Utc::now().timestamp()),
            text(id),
        ]);

        let changed = self
            .conn
            .execute(
                "UPDATE users SET
                    name = COALESCE(?, name),
                    email = COALESCE(?, email),
                    gender = COALESCE(?, gender),
                    age = COALESCE(?, age),
                    address = COALESCE(?, address),
                    city = COALESCE(?, city),
                    state = COALESCE(?, state),
                    zip = COALESCE(?, zip),
                    image_url = COALESCE(?, image_url),
                    password_hash = COALESCE(?, password_hash),
                    updated_at = ?
                 WHERE id = ?",
                params,
            )
            .await
            .map_err(|e| map_write_error(e, "Failed to update user"))?;

        Ok(changed > 0)
    }

    async fn delete_user(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM users WHERE id = ?", [id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete user: {}", e)))?;

        Ok(deleted > 0)
    }
}
