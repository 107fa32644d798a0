#![allow(dead_code)]

use crossdb::config::StoreConfig;
use crossdb::entities::UserProxy;
use crossdb::foreign::ForeignStore;
use crossdb_core::{Reference, UuidStorage, codec};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// A fresh SQLite file path in the temp dir and its URL.
pub fn temp_db(prefix: &str) -> (PathBuf, String) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut path = std::env::temp_dir();
    path.push(format!(
        "crossdb-{prefix}-{}-{nanos}.sqlite",
        std::process::id()
    ));
    let url = format!("sqlite:{}", path.display());
    (path, url)
}

pub fn remove_db(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}

/// Creates the foreign `user_proxy` table with `uuid_storage` ids and inserts `rows`.
pub async fn seed_users(url: &str, uuid_storage: UuidStorage, rows: &[UserProxy]) {
    let opts = SqliteConnectOptions::from_str(url)
        .expect("valid sqlite url")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .expect("seed pool connects");

    let ddl = format!(
        "CREATE TABLE user_proxy (id {} PRIMARY KEY NOT NULL, user_id INTEGER NOT NULL UNIQUE, username TEXT NOT NULL)",
        uuid_storage.column_type()
    );
    sqlx::query(&ddl).execute(&pool).await.expect("create user_proxy");

    for row in rows {
        sqlx::query("INSERT INTO user_proxy (id, user_id, username) VALUES (?, ?, ?)")
            .bind(codec::encode(Some(row.id), uuid_storage))
            .bind(row.user_id)
            .bind(&row.username)
            .execute(&pool)
            .await
            .expect("insert user_proxy row");
    }

    pool.close().await;
}

pub fn user(id: Reference, user_id: i64, username: &str) -> UserProxy {
    UserProxy {
        id,
        user_id,
        username: username.to_string(),
    }
}

/// Seeds a users database and opens it read-only as store `users`.
pub async fn users_store(
    prefix: &str,
    uuid_storage: UuidStorage,
    rows: &[UserProxy],
) -> (ForeignStore, PathBuf) {
    let (path, url) = temp_db(prefix);
    seed_users(&url, uuid_storage, rows).await;
    let store = ForeignStore::connect("users", &StoreConfig::new(url, uuid_storage))
        .await
        .expect("foreign store connects");
    (store, path)
}
