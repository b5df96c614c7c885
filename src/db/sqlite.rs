use super::traits::{PostStore, UserStore};
use crate::types::{
    AppError, NewPost, NewUser, Page, Post, PostChanges, PostQuery, Result, User, UserChanges,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{params::Params, Builder, Connection, Database, Row, Value};
use std::path::Path;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "u.id, u.full_name, u.email, u.password_hash, u.profile_image, u.bio, u.created_at, u.updated_at";

const POST_SELECT: &str = "SELECT p.id, p.title, p.description, p.image_url, p.author_id,
        u.full_name, u.profile_image, p.created_at, p.updated_at
     FROM posts p
     JOIN users u ON u.id = p.author_id";

/// libsql-backed store for users and posts.
///
/// A single connection is opened up front and shared by every request. For
/// `:memory:` databases this is what keeps the data alive between calls.
pub struct SqliteStore {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl SqliteStore {
    /// Opens an ephemeral in-memory database.
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {}", e)))?;

        Self::from_database(db).await
    }

    /// Opens (or creates) a database file, creating parent directories.
    pub async fn new_local(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Database(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database {}: {}", path, e)))?;

        Self::from_database(db).await
    }

    async fn from_database(db: Database) -> Result<Self> {
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let store = Self { db, conn };
        store.initialize_schema().await?;

        Ok(store)
    }

    async fn initialize_schema(&self) -> Result<()> {
        self.conn
            .execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to enable foreign keys: {}", e)))?;

        // Users table
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    full_name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                    password_hash TEXT NOT NULL,
                    profile_image TEXT NOT NULL,
                    bio TEXT NOT NULL DEFAULT '',
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        // Posts table; removing a user removes their posts
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS posts (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL,
                    image_url TEXT,
                    author_id TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL,
                    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create posts table: {}", e)))?;

        self.conn
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id)",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create posts index: {}", e)))?;

        self.conn
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created_at)",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create posts index: {}", e)))?;

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
            users.push(user_from_row(&row, 0)?);
        }

        Ok(users)
    }

    async fn query_posts(&self, sql: &str, params: Params) -> Result<Vec<Post>> {
        let mut rows = self
            .conn
            .query(sql, params)
            .await
            .map_err(|e| AppError::Database(format!("Failed to query posts: {}", e)))?;

        let mut posts = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            posts.push(post_from_row(&row)?);
        }

        Ok(posts)
    }

    async fn query_count(&self, sql: &str, params: Params) -> Result<i64> {
        let mut rows = self
            .conn
            .query(sql, params)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count rows: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => row.get::<i64>(0).map_err(|e| AppError::Database(e.to_string())),
            None => Ok(0),
        }
    }
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| AppError::Database(format!("Invalid timestamp in database: {}", ms)))
}

fn user_from_row(row: &Row, offset: i32) -> Result<User> {
    let get_err = |e: libsql::Error| AppError::Database(e.to_string());

    Ok(User {
        id: row.get(offset).map_err(get_err)?,
        full_name: row.get(offset + 1).map_err(get_err)?,
        email: row.get(offset + 2).map_err(get_err)?,
        password_hash: row.get(offset + 3).map_err(get_err)?,
        profile_image: row.get(offset + 4).map_err(get_err)?,
        bio: row.get(offset + 5).map_err(get_err)?,
        created_at: millis_to_datetime(row.get(offset + 6).map_err(get_err)?)?,
        updated_at: millis_to_datetime(row.get(offset + 7).map_err(get_err)?)?,
    })
}

fn post_from_row(row: &Row) -> Result<Post> {
    let get_err = |e: libsql::Error| AppError::Database(e.to_string());

    Ok(Post {
        id: row.get(0).map_err(get_err)?,
        title: row.get(1).map_err(get_err)?,
        description: row.get(2).map_err(get_err)?,
        image_url: row.get::<Option<String>>(3).map_err(get_err)?,
        author_id: row.get(4).map_err(get_err)?,
        author_name: row.get(5).map_err(get_err)?,
        author_image: row.get(6).map_err(get_err)?,
        created_at: millis_to_datetime(row.get(7).map_err(get_err)?)?,
        updated_at: millis_to_datetime(row.get(8).map_err(get_err)?)?,
    })
}

fn is_unique_violation(err: &libsql::Error) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
}

/// Escapes LIKE wildcards so user input is matched literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp_millis();
        let email = user.email.trim().to_lowercase();

        self.conn
            .execute(
                "INSERT INTO users (id, full_name, email, password_hash, profile_image, bio, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                (
                    id.as_str(),
                    user.full_name.as_str(),
                    email.as_str(),
                    user.password_hash.as_str(),
                    user.profile_image.as_str(),
                    user.bio.as_str(),
                    now,
                    now,
                ),
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("An account with this email already exists".to_string())
                } else {
                    AppError::Database(format!("Failed to create user: {}", e))
                }
            })?;

        self.get_user_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Database("Inserted user could not be read back".to_string()))
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users u WHERE u.id = ?", USER_COLUMNS);
        let users = self
            .query_users(&sql, Params::Positional(vec![Value::from(id.to_string())]))
            .await?;

        Ok(users.into_iter().next())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users u WHERE u.email = ?", USER_COLUMNS);
        let users = self
            .query_users(
                &sql,
                Params::Positional(vec![Value::from(email.trim().to_lowercase())]),
            )
            .await?;

        Ok(users.into_iter().next())
    }

    async fn update_user(&self, id: &str, changes: &UserChanges) -> Result<Option<User>> {
        let mut sets = Vec::new();
        let mut values = Vec::new();

        if let Some(full_name) = &changes.full_name {
            sets.push("full_name = ?");
            values.push(Value::from(full_name.clone()));
        }
        if let Some(profile_image) = &changes.profile_image {
            sets.push("profile_image = ?");
            values.push(Value::from(profile_image.clone()));
        }
        if let Some(bio) = &changes.bio {
            sets.push("bio = ?");
            values.push(Value::from(bio.clone()));
        }
        if let Some(password_hash) = &changes.password_hash {
            sets.push("password_hash = ?");
            values.push(Value::from(password_hash.clone()));
        }

        sets.push("updated_at = ?");
        values.push(Value::Integer(Utc::now().timestamp_millis()));
        values.push(Value::from(id.to_string()));

        let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
        let affected = self
            .conn
            .execute(&sql, Params::Positional(values))
            .await
            .map_err(|e| AppError::Database(format!("Failed to update user: {}", e)))?;

        if affected == 0 {
            return Ok(None);
        }

        self.get_user_by_id(id).await
    }

    async fn list_users(&self) -> Result<Vec<(User, i64)>> {
        let sql = format!(
            "SELECT {}, (SELECT COUNT(*) FROM posts p WHERE p.author_id = u.id)
             FROM users u
             ORDER BY u.created_at DESC, u.rowid DESC",
            USER_COLUMNS
        );

        let mut rows = self
            .conn
            .query(&sql, ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list users: {}", e)))?;

        let mut users = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            let user = user_from_row(&row, 0)?;
            let posts_count: i64 = row.get(8).map_err(|e| AppError::Database(e.to_string()))?;
            users.push((user, posts_count));
        }

        Ok(users)
    }

    async fn search_users(&self, query: &str, limit: u32) -> Result<Vec<User>> {
        let pattern = like_pattern(query.trim());
        let sql = format!(
            "SELECT {} FROM users u
             WHERE u.full_name LIKE ?1 ESCAPE '\\' OR u.email LIKE ?1 ESCAPE '\\'
             ORDER BY u.created_at DESC, u.rowid DESC
             LIMIT ?2",
            USER_COLUMNS
        );

        self.query_users(
            &sql,
            Params::Positional(vec![Value::from(pattern), Value::Integer(i64::from(limit))]),
        )
        .await
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = self
            .query_count(
                "SELECT COUNT(*) FROM users WHERE email = ?",
                Params::Positional(vec![Value::from(email.trim().to_lowercase())]),
            )
            .await?;

        Ok(count > 0)
    }
}

#[async_trait]
impl PostStore for SqliteStore {
    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp_millis();

        self.conn
            .execute(
                "INSERT INTO posts (id, title, description, image_url, author_id, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                (
                    id.as_str(),
                    post.title.as_str(),
                    post.description.as_str(),
                    post.image_url.as_deref(),
                    post.author_id.as_str(),
                    now,
                    now,
                ),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create post: {}", e)))?;

        self.get_post(&id)
            .await?
            .ok_or_else(|| AppError::Database("Inserted post could not be read back".to_string()))
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        let sql = format!("{} WHERE p.id = ?", POST_SELECT);
        let posts = self
            .query_posts(&sql, Params::Positional(vec![Value::from(id.to_string())]))
            .await?;

        Ok(posts.into_iter().next())
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Page<Post>> {
        let (filter, mut values) = match &query.author_id {
            Some(author_id) => (
                " WHERE p.author_id = ?",
                vec![Value::from(author_id.clone())],
            ),
            None => ("", Vec::new()),
        };

        let count_sql = format!(
            "SELECT COUNT(*) FROM posts p JOIN users u ON u.id = p.author_id{}",
            filter
        );
        let total = self
            .query_count(&count_sql, Params::Positional(values.clone()))
            .await?;

        let limit = i64::from(query.limit.max(1));
        let offset = i64::from(query.page.max(1) - 1) * limit;
        values.push(Value::Integer(limit));
        values.push(Value::Integer(offset));

        let sql = format!(
            "{}{} ORDER BY {} LIMIT ? OFFSET ?",
            POST_SELECT,
            filter,
            query.sort.order_by()
        );
        let items = self.query_posts(&sql, Params::Positional(values)).await?;

        Ok(Page { items, total })
    }

    async fn update_post(&self, id: &str, changes: &PostChanges) -> Result<Option<Post>> {
        let mut sets = Vec::new();
        let mut values = Vec::new();

        if let Some(title) = &changes.title {
            sets.push("title = ?");
            values.push(Value::from(title.clone()));
        }
        if let Some(description) = &changes.description {
            sets.push("description = ?");
            values.push(Value::from(description.clone()));
        }
        if let Some(image_url) = &changes.image_url {
            sets.push("image_url = ?");
            if image_url.is_empty() {
                values.push(Value::Null);
            } else {
                values.push(Value::from(image_url.clone()));
            }
        }

        sets.push("updated_at = ?");
        values.push(Value::Integer(Utc::now().timestamp_millis()));
        values.push(Value::from(id.to_string()));

        let sql = format!("UPDATE posts SET {} WHERE id = ?", sets.join(", "));
        let affected = self
            .conn
            .execute(&sql, Params::Positional(values))
            .await
            .map_err(|e| AppError::Database(format!("Failed to update post: {}", e)))?;

        if affected == 0 {
            return Ok(None);
        }

        self.get_post(id).await
    }

    async fn delete_post(&self, id: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM posts WHERE id = ?", [id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete post: {}", e)))?;

        Ok(affected > 0)
    }

    async fn count_posts_by_author(&self, author_id: &str) -> Result<i64> {
        self.query_count(
            "SELECT COUNT(*) FROM posts WHERE author_id = ?",
            Params::Positional(vec![Value::from(author_id.to_string())]),
        )
        .await
    }
}
