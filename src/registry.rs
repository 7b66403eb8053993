//! Chat creation and metadata. Peer-to-peer chats are keyed by the unordered
//! pair of member ids, so there is exactly one per pair.

use sqlx::SqlitePool;

use crate::{
    directory,
    error::{AppResult, Error, unique_conflict},
    membership,
    model::{AccountId, Chat, ChatId, ChatKind},
};

const CHAT_COLUMNS: &str = "id, kind, name, description, creator_id";

pub fn pair_key(a: AccountId, b: AccountId) -> String {
    format!("{}:{}", a.min(b), a.max(b))
}

/// Creates the unique peer-to-peer chat for `{a, b}` with both memberships,
/// all in one transaction. Fails with `Conflict` if the pair already has one.
pub async fn create_peer_to_peer(
    pool: &SqlitePool,
    a: AccountId,
    b: AccountId,
    creator: AccountId,
) -> AppResult<Chat> {
    if a == b {
        return Err(Error::Validation(
            "a peer-to-peer chat needs two distinct members".to_owned(),
        ));
    }
    for id in [a, b] {
        if !directory::exists(pool, id).await? {
            return Err(Error::not_found("account", id));
        }
    }

    let mut tx = pool.begin().await?;

    let chat = sqlx::query_as::<_, Chat>(&format!(
        "INSERT INTO chats (kind, name, description, creator_id, pair_key) \
         VALUES ('peer_to_peer', NULL, NULL, ?, ?) RETURNING {CHAT_COLUMNS}"
    ))
    .bind(creator)
    .bind(pair_key(a, b))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| unique_conflict(e, "a peer-to-peer chat for this pair already exists"))?;

    for member in [a, b] {
        sqlx::query("INSERT INTO memberships (chat_id, account_id) VALUES (?, ?)")
            .bind(chat.id)
            .bind(member)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(chat)
}

/// Creates a named group chat. The creator is always a member, whether or not
/// they appear in `initial_members`.
pub async fn create_group(
    pool: &SqlitePool,
    name: &str,
    description: Option<&str>,
    creator: AccountId,
    initial_members: &[AccountId],
) -> AppResult<Chat> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("a group chat needs a name".to_owned()));
    }
    if !directory::exists(pool, creator).await? {
        return Err(Error::not_found("account", creator));
    }
    for &member in initial_members {
        if !directory::exists(pool, member).await? {
            return Err(Error::not_found("account", member));
        }
    }

    let mut tx = pool.begin().await?;

    let chat = sqlx::query_as::<_, Chat>(&format!(
        "INSERT INTO chats (kind, name, description, creator_id, pair_key) \
         VALUES ('group', ?, ?, ?, NULL) RETURNING {CHAT_COLUMNS}"
    ))
    .bind(name)
    .bind(description)
    .bind(creator)
    .fetch_one(&mut *tx)
    .await?;

    for member in std::iter::once(creator).chain(initial_members.iter().copied()) {
        sqlx::query("INSERT OR IGNORE INTO memberships (chat_id, account_id) VALUES (?, ?)")
            .bind(chat.id)
            .bind(member)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(chat)
}

pub async fn lookup(pool: &SqlitePool, chat_id: ChatId) -> AppResult<Chat> {
    sqlx::query_as::<_, Chat>(&format!("SELECT {CHAT_COLUMNS} FROM chats WHERE id = ?"))
        .bind(chat_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::not_found("chat", chat_id))
}

/// The display name of a chat as `viewer` sees it: a group's stored name, or
/// the other member's handle for peer-to-peer chats (resolved dynamically,
/// never stored per-viewer).
pub async fn describe(pool: &SqlitePool, chat: &Chat, viewer: AccountId) -> AppResult<String> {
    match chat.kind {
        ChatKind::Group => Ok(chat.name.clone().unwrap_or_default()),
        ChatKind::PeerToPeer => membership::other_members(pool, chat.id, viewer)
            .await?
            .into_iter()
            .next()
            .map(|companion| companion.handle)
            .ok_or_else(|| Error::not_found("companion for chat", chat.id)),
    }
}

pub async fn update_avatar(pool: &SqlitePool, chat_id: ChatId, avatar: &[u8]) -> AppResult<()> {
    let result = sqlx::query("UPDATE chats SET avatar = ? WHERE id = ?")
        .bind(avatar)
        .bind(chat_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::not_found("chat", chat_id));
    }
    Ok(())
}

pub async fn clear_avatar(pool: &SqlitePool, chat_id: ChatId) -> AppResult<()> {
    let result = sqlx::query("UPDATE chats SET avatar = NULL WHERE id = ?")
        .bind(chat_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::not_found("chat", chat_id));
    }
    Ok(())
}

pub async fn avatar_of(pool: &SqlitePool, chat_id: ChatId) -> AppResult<Option<Vec<u8>>> {
    let row = sqlx::query_as::<_, (Option<Vec<u8>>,)>("SELECT avatar FROM chats WHERE id = ?")
        .bind(chat_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::not_found("chat", chat_id))?;
    Ok(row.0)
}

#[cfg(test)]
mod tests {
    use super::pair_key;

    #[test]
    fn pair_key_is_order_independent() {
        assert_eq!(pair_key(1, 2), pair_key(2, 1));
        assert_eq!(pair_key(7, 3), "3:7");
    }
}
