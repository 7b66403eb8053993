use axum::{
    Json, Router, debug_handler,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    AppState,
    error::AppResult,
    message_log,
    model::{ChatId, Message, MessageId},
    session,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chats/{id}/messages", post(send))
        .route("/messages/{id}", delete(remove))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendMessageForm {
    content: String,
}

#[debug_handler]
pub(crate) async fn send(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(chat_id): Path<ChatId>,
    Json(form): Json<SendMessageForm>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let caller = session::current_caller(&session, &db_pool).await?;
    let message = message_log::append(&db_pool, chat_id, caller.id, &form.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[debug_handler]
pub(crate) async fn remove(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(message_id): Path<MessageId>,
) -> AppResult<StatusCode> {
    let caller = session::current_caller(&session, &db_pool).await?;
    message_log::delete(&db_pool, message_id, caller.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
