//! Persistence for users and posts.
//!
//! - [`traits`] - the [`UserStore`] / [`PostStore`] boundary handlers talk to
//! - [`sqlite`] - libsql implementation (file or in-memory database)
//!
//! Open a store from configuration:
//! ```ignore
//! let store = DatabaseProvider::from_url(&config.database.url).create_store().await?;
//! ```

pub mod sqlite;
pub mod traits;

pub use sqlite::SqliteStore;
pub use traits::{DatabaseProvider, PostStore, Store, UserStore};
