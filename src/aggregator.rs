//! The conversation aggregator: one recency-ranked list spanning both chat
//! kinds, and the chat detail view.

use sqlx::SqlitePool;

use crate::{
    directory,
    error::{AppResult, Error},
    membership, message_log,
    model::{AccountId, ChatId, ChatKind, ChatView, ConversationSummary},
    registry,
};

/// Everything the caller is a member of, peer-to-peer and group chats merged
/// under one ordering key: the id of the chat's latest message (insertion
/// order, so ranking stays stable under identical timestamps). Chats with
/// messages come first, most recent first; message-less chats follow in
/// chat-id order.
///
/// A single batched query: memberships joined to chats, the latest message
/// per chat, the peer-to-peer companion's handle for the display name, and an
/// EXISTS probe for the unread flag. No per-chat round trips.
pub async fn conversations_for(
    pool: &SqlitePool,
    caller: AccountId,
) -> AppResult<Vec<ConversationSummary>> {
    if !directory::exists(pool, caller).await? {
        return Err(Error::not_found("account", caller));
    }

    Ok(sqlx::query_as::<_, ConversationSummary>(
        "SELECT c.id AS chat_id, \
                c.kind AS kind, \
                COALESCE(CASE c.kind WHEN 'group' THEN c.name ELSE peer.handle END, '') \
                    AS display_name, \
                last.id AS last_message_id, \
                last.content AS last_content, \
                last.sent_at AS last_sent_at, \
                EXISTS(SELECT 1 FROM messages u \
                       WHERE u.chat_id = c.id AND u.status = 'unread' AND u.sender_id <> ?1) \
                    AS has_unread \
         FROM memberships me \
         JOIN chats c ON c.id = me.chat_id \
         LEFT JOIN memberships other \
                ON other.chat_id = c.id AND other.account_id <> ?1 \
               AND c.kind = 'peer_to_peer' \
         LEFT JOIN accounts peer ON peer.id = other.account_id \
         LEFT JOIN messages last \
                ON last.chat_id = c.id \
               AND last.id = (SELECT MAX(m.id) FROM messages m WHERE m.chat_id = c.id) \
         WHERE me.account_id = ?1 \
         ORDER BY (last.id IS NULL) ASC, last.id DESC, c.id ASC",
    )
    .bind(caller)
    .fetch_all(pool)
    .await?)
}

/// The chat detail view. Opening a chat marks its messages read for the
/// caller; that side effect is the point of this operation, not an accident.
pub async fn open_chat(pool: &SqlitePool, chat_id: ChatId, caller: AccountId) -> AppResult<ChatView> {
    let chat = registry::lookup(pool, chat_id).await?;
    if !membership::is_member(pool, chat_id, caller).await? {
        return Err(Error::Forbidden(format!(
            "account {caller} is not a member of chat {chat_id}"
        )));
    }

    message_log::mark_read(pool, chat_id, caller).await?;

    let display_name = registry::describe(pool, &chat, caller).await?;
    let messages = message_log::list_for(pool, chat_id).await?;

    let (companion, members) = match chat.kind {
        ChatKind::PeerToPeer => {
            let companion = membership::other_members(pool, chat_id, caller)
                .await?
                .into_iter()
                .next();
            (companion, Vec::new())
        }
        ChatKind::Group => (None, membership::members_of(pool, chat_id).await?),
    };

    Ok(ChatView {
        chat,
        display_name,
        messages,
        companion,
        members,
    })
}
