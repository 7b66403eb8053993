//! Per-chat message log. Message ids strictly increase in insertion order and
//! define the order of a chat; timestamps are display metadata.

use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::{
    error::{AppResult, Error},
    membership,
    model::{AccountId, ChatId, Message, MessageId},
    registry,
};

const MESSAGE_COLUMNS: &str = "id, chat_id, sender_id, content, sent_at, status";

/// Appends a message; the sender must be a member of the chat. New messages
/// start out `unread`.
pub async fn append(
    pool: &SqlitePool,
    chat_id: ChatId,
    sender: AccountId,
    content: &str,
) -> AppResult<Message> {
    registry::lookup(pool, chat_id).await?;
    if !membership::is_member(pool, chat_id, sender).await? {
        return Err(Error::Forbidden(format!(
            "account {sender} is not a member of chat {chat_id}"
        )));
    }
    if content.trim().is_empty() {
        return Err(Error::Validation("message content is empty".to_owned()));
    }

    Ok(sqlx::query_as::<_, Message>(&format!(
        "INSERT INTO messages (chat_id, sender_id, content, sent_at, status) \
         VALUES (?, ?, ?, ?, 'unread') RETURNING {MESSAGE_COLUMNS}"
    ))
    .bind(chat_id)
    .bind(sender)
    .bind(content)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(pool)
    .await?)
}

/// All messages of a chat, ascending by id.
pub async fn list_for(pool: &SqlitePool, chat_id: ChatId) -> AppResult<Vec<Message>> {
    registry::lookup(pool, chat_id).await?;

    Ok(sqlx::query_as::<_, Message>(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = ? ORDER BY id ASC"
    ))
    .bind(chat_id)
    .fetch_all(pool)
    .await?)
}

/// Marks every message not authored by `reader` as read. Idempotent; the
/// reader's own messages are never touched.
pub async fn mark_read(pool: &SqlitePool, chat_id: ChatId, reader: AccountId) -> AppResult<()> {
    registry::lookup(pool, chat_id).await?;
    if !membership::is_member(pool, chat_id, reader).await? {
        return Err(Error::Forbidden(format!(
            "account {reader} is not a member of chat {chat_id}"
        )));
    }

    sqlx::query(
        "UPDATE messages SET status = 'read' \
         WHERE chat_id = ? AND sender_id <> ? AND status = 'unread'",
    )
    .bind(chat_id)
    .bind(reader)
    .execute(pool)
    .await?;
    Ok(())
}

/// Hard delete. Only the sender may delete their own message.
pub async fn delete(pool: &SqlitePool, message_id: MessageId, caller: AccountId) -> AppResult<()> {
    let (sender_id,) =
        sqlx::query_as::<_, (AccountId,)>("SELECT sender_id FROM messages WHERE id = ?")
            .bind(message_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| Error::not_found("message", message_id))?;

    if sender_id != caller {
        return Err(Error::Forbidden(format!(
            "account {caller} did not send message {message_id}"
        )));
    }

    sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(message_id)
        .execute(pool)
        .await?;
    Ok(())
}
