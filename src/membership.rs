use sqlx::SqlitePool;

use crate::{
    directory,
    error::{AppResult, Error},
    model::{Account, AccountId, ChatId},
    registry,
};

/// Idempotent; a member appears at most once per chat. Referencing a missing
/// chat or account fails instead of silently creating anything.
pub async fn add_member(pool: &SqlitePool, chat_id: ChatId, account_id: AccountId) -> AppResult<()> {
    registry::lookup(pool, chat_id).await?;
    if !directory::exists(pool, account_id).await? {
        return Err(Error::not_found("account", account_id));
    }

    sqlx::query("INSERT OR IGNORE INTO memberships (chat_id, account_id) VALUES (?, ?)")
        .bind(chat_id)
        .bind(account_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn members_of(pool: &SqlitePool, chat_id: ChatId) -> AppResult<Vec<Account>> {
    registry::lookup(pool, chat_id).await?;

    Ok(sqlx::query_as::<_, Account>(
        "SELECT a.id, a.email, a.name, a.handle, a.blurb, a.registered_at \
         FROM memberships m JOIN accounts a ON a.id = m.account_id \
         WHERE m.chat_id = ? ORDER BY a.id",
    )
    .bind(chat_id)
    .fetch_all(pool)
    .await?)
}

pub async fn chats_of(pool: &SqlitePool, account_id: AccountId) -> AppResult<Vec<ChatId>> {
    if !directory::exists(pool, account_id).await? {
        return Err(Error::not_found("account", account_id));
    }

    let rows = sqlx::query_as::<_, (ChatId,)>(
        "SELECT chat_id FROM memberships WHERE account_id = ? ORDER BY chat_id",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Members of `chat_id` excluding `account_id`: the other side of a
/// peer-to-peer chat, or a group's recipients.
pub async fn other_members(
    pool: &SqlitePool,
    chat_id: ChatId,
    account_id: AccountId,
) -> AppResult<Vec<Account>> {
    registry::lookup(pool, chat_id).await?;

    Ok(sqlx::query_as::<_, Account>(
        "SELECT a.id, a.email, a.name, a.handle, a.blurb, a.registered_at \
         FROM memberships m JOIN accounts a ON a.id = m.account_id \
         WHERE m.chat_id = ? AND m.account_id <> ? ORDER BY a.id",
    )
    .bind(chat_id)
    .bind(account_id)
    .fetch_all(pool)
    .await?)
}

pub async fn is_member(
    pool: &SqlitePool,
    chat_id: ChatId,
    account_id: AccountId,
) -> AppResult<bool> {
    Ok(sqlx::query_as::<_, (i64,)>(
        "SELECT 1 FROM memberships WHERE chat_id = ? AND account_id = ?",
    )
    .bind(chat_id)
    .bind(account_id)
    .fetch_optional(pool)
    .await?
    .is_some())
}
