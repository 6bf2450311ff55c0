//! Integration tests for Post repository.
//!
//! Each test runs against its own file-backed SQLite database.

use chrono::{Duration, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use snapfeed_core::post::{FileType, NewPost, PostRepository as _};
use snapfeed_db::{PostRepository, connect, connect_with, entities::posts, migrate};
use snapfeed_shared::config::DatabaseConfig;
use tempfile::TempDir;
use uuid::Uuid;

/// Create a migrated database in a fresh temp directory.
async fn setup() -> (TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("posts.db").display());
    let db = connect(&url).await.expect("Failed to connect to database");
    migrate(&db).await.expect("Failed to run migrations");
    (dir, db)
}

fn new_post(caption: &str, offset_secs: i64) -> NewPost {
    NewPost {
        id: Uuid::new_v4(),
        caption: Some(caption.to_string()),
        url: format!("https://cdn.example.com/backend-upload/{caption}.png"),
        file_type: FileType::Image,
        file_name: format!("{caption}_a1b2.png"),
        created_at: Utc::now() + Duration::seconds(offset_secs),
    }
}

#[tokio::test]
async fn test_post_insert_returns_stored_row() {
    let (_dir, db) = setup().await;
    let repo = PostRepository::new(db.clone());

    let input = NewPost {
        file_type: FileType::Video,
        caption: None,
        ..new_post("clip", 0)
    };
    let post = repo.insert(input.clone()).await.expect("Failed to insert");

    assert_eq!(post.id, input.id);
    assert_eq!(post.file_type, FileType::Video);
    assert!(post.caption.is_none());
    assert_eq!(post.url, input.url);
    assert_eq!(post.file_name, input.file_name);
    assert_eq!(posts::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_post_feed_is_newest_first() {
    let (_dir, db) = setup().await;
    let repo = PostRepository::new(db);

    repo.insert(new_post("A", 0)).await.unwrap();
    repo.insert(new_post("B", 1)).await.unwrap();
    repo.insert(new_post("C", 2)).await.unwrap();

    let captions: Vec<String> = repo
        .list_newest_first()
        .await
        .unwrap()
        .into_iter()
        .filter_map(|p| p.caption)
        .collect();

    assert_eq!(captions, ["C", "B", "A"]);
}

#[tokio::test]
async fn test_post_feed_empty() {
    let (_dir, db) = setup().await;
    let repo = PostRepository::new(db);

    assert!(repo.list_newest_first().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_post_find_by_id() {
    let (_dir, db) = setup().await;
    let repo = PostRepository::new(db);

    let post = repo.insert(new_post("find", 0)).await.unwrap();

    let found = repo
        .find_by_id(post.id)
        .await
        .expect("Query should succeed")
        .expect("Post should exist");
    assert_eq!(found, post);

    let missing = repo.find_by_id(Uuid::new_v4()).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_post_delete() {
    let (_dir, db) = setup().await;
    let repo = PostRepository::new(db);

    let keep = repo.insert(new_post("keep", 0)).await.unwrap();
    let gone = repo.insert(new_post("gone", 1)).await.unwrap();

    assert!(repo.delete(gone.id).await.unwrap());
    assert!(!repo.delete(gone.id).await.unwrap());

    let remaining = repo.list_newest_first().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep.id);
}

#[tokio::test]
async fn test_post_delete_nonexistent() {
    let (_dir, db) = setup().await;
    let repo = PostRepository::new(db);

    assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_id_fails_without_partial_state() {
    let (_dir, db) = setup().await;
    let repo = PostRepository::new(db.clone());

    let first = new_post("first", 0);
    repo.insert(first.clone()).await.unwrap();

    let duplicate = NewPost {
        id: first.id,
        ..new_post("second", 1)
    };
    let err = repo.insert(duplicate).await;
    assert!(err.is_err());

    let all = repo.list_newest_first().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].caption.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_concurrent_inserts_are_isolated() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    // SQLite serializes writers; a single pooled connection queues them.
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("posts.db").display()),
        max_connections: 1,
        min_connections: 1,
        run_migrations: true,
    };
    let db = connect_with(&config).await.expect("Failed to connect");
    migrate(&db).await.expect("Failed to run migrations");
    let repo = PostRepository::new(db);

    let inserts = (0..8).map(|i| {
        let repo = repo.clone();
        async move { repo.insert(new_post(&format!("p{i}"), i)).await }
    });
    let results = futures::future::join_all(inserts).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(repo.list_newest_first().await.unwrap().len(), 8);
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let (_dir, db) = setup().await;
    migrate(&db).await.expect("Re-running migrations should be a no-op");
}
