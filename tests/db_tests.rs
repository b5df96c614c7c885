//! Database integration tests
//!
//! These tests exercise the libsql store against an on-disk database file.

use postboard::db::{PostStore, UserStore};
use postboard::types::{NewPost, NewUser, PostChanges, PostQuery, PostSort, UserChanges};
use postboard::{AppError, DatabaseProvider, SqliteStore, Store};
use std::sync::Arc;
use tempfile::TempDir;

async fn create_file_store(dir: &TempDir) -> SqliteStore {
    let path = dir.path().join("nested").join("postboard.db");
    SqliteStore::new_local(path.to_str().unwrap())
        .await
        .expect("Failed to create file database")
}

fn new_user(name: &str, email: &str) -> NewUser {
    NewUser {
        full_name: name.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        profile_image: "https://example.com/avatar.png".to_string(),
        bio: String::new(),
    }
}

fn new_post(author_id: &str, title: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        description: "Some description text".to_string(),
        image_url: None,
        author_id: author_id.to_string(),
    }
}

#[tokio::test]
async fn test_new_local_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    create_file_store(&dir).await;

    assert!(dir.path().join("nested").join("postboard.db").exists());
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let user_id = {
        let store = create_file_store(&dir).await;
        let user = store
            .create_user(&new_user("Persistent", "persist@example.com"))
            .await
            .unwrap();
        store.create_post(&new_post(&user.id, "Still here")).await.unwrap();
        user.id
    };

    let store = create_file_store(&dir).await;
    let user = store
        .get_user_by_email("PERSIST@example.com")
        .await
        .unwrap()
        .expect("user should persist");
    assert_eq!(user.id, user_id);
    assert_eq!(store.count_posts_by_author(&user_id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let dir = TempDir::new().unwrap();
    let store = create_file_store(&dir).await;

    store
        .create_user(&new_user("First", "same@example.com"))
        .await
        .unwrap();
    let err = store
        .create_user(&new_user("Second", "Same@Example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_update_user_partial() {
    let dir = TempDir::new().unwrap();
    let store = create_file_store(&dir).await;
    let user = store
        .create_user(&new_user("Before", "partial@example.com"))
        .await
        .unwrap();

    let updated = store
        .update_user(
            &user.id,
            &UserChanges {
                bio: Some("Updated bio".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.bio, "Updated bio");
    assert_eq!(updated.full_name, "Before");
    assert_eq!(updated.password_hash, user.password_hash);
    assert!(store
        .update_user("missing", &UserChanges::default())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_post_lifecycle() {
    let dir = TempDir::new().unwrap();
    let store = create_file_store(&dir).await;
    let user = store
        .create_user(&new_user("Writer", "writer@example.com"))
        .await
        .unwrap();

    let post = store.create_post(&new_post(&user.id, "Draft")).await.unwrap();
    assert_eq!(post.author_name, "Writer");

    let updated = store
        .update_post(
            &post.id,
            &PostChanges {
                title: Some("Final".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.description, post.description);
    assert!(updated.updated_at >= post.updated_at);

    assert!(store.delete_post(&post.id).await.unwrap());
    assert!(!store.delete_post(&post.id).await.unwrap());
    assert!(store.get_post(&post.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_posts_filters_by_author() {
    let dir = TempDir::new().unwrap();
    let store = create_file_store(&dir).await;
    let a = store.create_user(&new_user("Author A", "a@example.com")).await.unwrap();
    let b = store.create_user(&new_user("Author B", "b@example.com")).await.unwrap();

    store.create_post(&new_post(&a.id, "Zeta")).await.unwrap();
    store.create_post(&new_post(&a.id, "Alpha")).await.unwrap();
    store.create_post(&new_post(&b.id, "Other")).await.unwrap();

    let page = store
        .list_posts(&PostQuery {
            author_id: Some(a.id.clone()),
            sort: PostSort::TitleAsc,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    let titles: Vec<_> = page.items.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "Zeta"]);

    let users = store.list_users().await.unwrap();
    let counts: Vec<i64> = users
        .iter()
        .filter(|(u, _)| u.id == a.id)
        .map(|(_, n)| *n)
        .collect();
    assert_eq!(counts, vec![2]);
}

#[tokio::test]
async fn test_provider_from_url() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("provider.db");
    let url = path.to_str().unwrap();

    let store: Arc<dyn Store> = DatabaseProvider::from_url(url)
        .create_store()
        .await
        .unwrap();
    store
        .create_user(&new_user("Via Provider", "provider@example.com"))
        .await
        .unwrap();
    assert!(store.email_exists("provider@example.com").await.unwrap());
    assert!(path.exists());

    let memory = DatabaseProvider::from_url(":memory:")
        .create_store()
        .await
        .unwrap();
    assert!(!memory.email_exists("provider@example.com").await.unwrap());
}
