//! Store abstraction traits
//!
//! Handlers and services only talk to the [`Store`] trait object, so the
//! backing database can be swapped (file SQLite, in-memory SQLite, or a test
//! double) without touching request code.
//!
//! # Example
//!
//! ```rust,ignore
//! use postboard::db::{DatabaseProvider, Store};
//!
//! let store = DatabaseProvider::Memory.create_store().await?;
//! let user = store.get_user_by_email("jane@x.com").await?;
//! ```

use crate::types::{
    NewPost, NewUser, Page, Post, PostChanges, PostQuery, Result, User, UserChanges,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Database provider configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
}

impl DatabaseProvider {
    /// Maps a configured database url to a provider. `:memory:` and the
    /// empty string select the in-memory database.
    pub fn from_url(url: &str) -> Self {
        let url = url.trim();
        if url.is_empty() || url == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::SQLite {
                path: url.to_string(),
            }
        }
    }

    /// Opens a store for this provider and initializes its schema.
    pub async fn create_store(&self) -> Result<Arc<dyn Store>> {
        match self {
            DatabaseProvider::Memory => {
                let store = super::sqlite::SqliteStore::new_memory().await?;
                Ok(Arc::new(store))
            }
            DatabaseProvider::SQLite { path } => {
                let store = super::sqlite::SqliteStore::new_local(path).await?;
                Ok(Arc::new(store))
            }
        }
    }
}

/// Persistence boundary for user records.
///
/// Emails are compared case-insensitively and are unique.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Fails with `AppError::Conflict` when the email is taken.
    async fn create_user(&self, user: &NewUser) -> Result<User>;

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Applies `changes` and returns the updated record, or `None` if the
    /// user does not exist.
    async fn update_user(&self, id: &str, changes: &UserChanges) -> Result<Option<User>>;

    /// All users, newest first, with their post counts.
    async fn list_users(&self) -> Result<Vec<(User, i64)>>;

    /// Case-insensitive substring search over full name and email.
    async fn search_users(&self, query: &str, limit: u32) -> Result<Vec<User>>;

    async fn email_exists(&self, email: &str) -> Result<bool>;
}

/// Persistence boundary for posts.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, post: &NewPost) -> Result<Post>;

    async fn get_post(&self, id: &str) -> Result<Option<Post>>;

    async fn list_posts(&self, query: &PostQuery) -> Result<Page<Post>>;

    /// Applies `changes`; the author is never modified.
    async fn update_post(&self, id: &str, changes: &PostChanges) -> Result<Option<Post>>;

    /// Returns `true` when a row was removed.
    async fn delete_post(&self, id: &str) -> Result<bool>;

    async fn count_posts_by_author(&self, author_id: &str) -> Result<i64>;
}

/// Everything the API needs from persistence.
pub trait Store: UserStore + PostStore {}

impl<T: UserStore + PostStore> Store for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_url() {
        assert_eq!(DatabaseProvider::from_url(":memory:"), DatabaseProvider::Memory);
        assert_eq!(DatabaseProvider::from_url("  "), DatabaseProvider::Memory);
        assert_eq!(
            DatabaseProvider::from_url("./data/postboard.db"),
            DatabaseProvider::SQLite {
                path: "./data/postboard.db".to_string()
            }
        );
    }
}
