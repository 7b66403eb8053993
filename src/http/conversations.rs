use axum::{
    Json, Router, debug_handler,
    extract::{Path, State},
    routing::get,
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    AppState, aggregator,
    error::AppResult,
    model::{ChatId, ChatView, ConversationSummary},
    session,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/conversations", get(list))
        .route("/chats/{id}", get(detail))
}

#[debug_handler]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Vec<ConversationSummary>>> {
    let caller = session::current_caller(&session, &db_pool).await?;
    Ok(Json(aggregator::conversations_for(&db_pool, caller.id).await?))
}

// Opening a chat marks it read for the caller.
#[debug_handler]
pub(crate) async fn detail(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(chat_id): Path<ChatId>,
) -> AppResult<Json<ChatView>> {
    let caller = session::current_caller(&session, &db_pool).await?;
    Ok(Json(aggregator::open_chat(&db_pool, chat_id, caller.id).await?))
}
