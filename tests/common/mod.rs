#![allow(dead_code)]

use coopnet::{
    db,
    directory::{self, NewAccount},
    model::Account,
    provisioning,
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

/// In-memory database. A single connection, so every query in a test sees
/// the same instance.
pub async fn pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init(&pool).await.unwrap();
    pool
}

/// Creates an account the way registration does: directory insert followed by
/// friend-chat provisioning.
pub async fn register(pool: &SqlitePool, handle: &str) -> Account {
    let account = create_account(pool, handle).await;
    provisioning::provision_friend_chats(pool, account.id)
        .await
        .unwrap();
    account
}

/// Directory insert only, no provisioning.
pub async fn create_account(pool: &SqlitePool, handle: &str) -> Account {
    directory::create(
        pool,
        NewAccount {
            email: format!("{handle}@example.com"),
            name: handle.to_owned(),
            handle: handle.to_owned(),
            password_hash: "00$00".to_owned(),
            blurb: String::new(),
        },
    )
    .await
    .unwrap()
}
