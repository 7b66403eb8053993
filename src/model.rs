use serde::Serialize;
use time::OffsetDateTime;

pub type AccountId = i64;
pub type ChatId = i64;
pub type MessageId = i64;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    pub handle: String,
    pub blurb: String,
    #[serde(with = "time::serde::rfc3339")]
    pub registered_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    PeerToPeer,
    Group,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Chat {
    pub id: ChatId,
    pub kind: ChatKind,
    pub name: Option<String>,
    pub description: Option<String>,
    pub creator_id: AccountId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Unread,
    Read,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender_id: AccountId,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
    pub status: DeliveryStatus,
}

/// One row of the aggregated conversation list: the per-chat projection the
/// chat list is rendered from. `last_*` fields are absent for chats that have
/// no messages yet (e.g. freshly provisioned friend chats).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ConversationSummary {
    pub chat_id: ChatId,
    pub kind: ChatKind,
    pub display_name: String,
    pub last_message_id: Option<MessageId>,
    pub last_content: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_sent_at: Option<OffsetDateTime>,
    pub has_unread: bool,
}

/// The chat detail view. `companion` is the other member's profile for
/// peer-to-peer chats; `members` is populated for group chats.
#[derive(Debug, Serialize)]
pub struct ChatView {
    pub chat: Chat,
    pub display_name: String,
    pub messages: Vec<Message>,
    pub companion: Option<Account>,
    pub members: Vec<Account>,
}
