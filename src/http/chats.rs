use axum::{
    Json, Router,
    body::Bytes,
    debug_handler,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    AppState,
    error::{AppResult, Error},
    membership,
    model::{AccountId, Chat, ChatId},
    registry, session,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chats", post(create_group))
        .route("/chats/{id}/members", post(add_member))
        .route(
            "/chats/{id}/avatar",
            get(avatar).put(upload_avatar).delete(remove_avatar),
        )
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateGroupForm {
    name: String,
    description: Option<String>,
    #[serde(default)]
    members: Vec<AccountId>,
}

#[debug_handler]
pub(crate) async fn create_group(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(form): Json<CreateGroupForm>,
) -> AppResult<(StatusCode, Json<Chat>)> {
    let caller = session::current_caller(&session, &db_pool).await?;
    let chat = registry::create_group(
        &db_pool,
        &form.name,
        form.description.as_deref(),
        caller.id,
        &form.members,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(chat)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddMemberForm {
    account_id: AccountId,
}

#[debug_handler]
pub(crate) async fn add_member(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(chat_id): Path<ChatId>,
    Json(form): Json<AddMemberForm>,
) -> AppResult<StatusCode> {
    let caller = session::current_caller(&session, &db_pool).await?;
    member_guard(&db_pool, chat_id, caller.id).await?;
    membership::add_member(&db_pool, chat_id, form.account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn member_guard(pool: &SqlitePool, chat_id: ChatId, caller: AccountId) -> AppResult<()> {
    if !membership::is_member(pool, chat_id, caller).await? {
        return Err(Error::Forbidden(format!(
            "account {caller} is not a member of chat {chat_id}"
        )));
    }
    Ok(())
}

// The blob is opaque to the core, same as account avatars.
#[debug_handler]
pub(crate) async fn avatar(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(chat_id): Path<ChatId>,
) -> AppResult<Response> {
    let caller = session::current_caller(&session, &db_pool).await?;
    member_guard(&db_pool, chat_id, caller.id).await?;
    match registry::avatar_of(&db_pool, chat_id).await? {
        Some(bytes) => Ok((
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )
            .into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

#[debug_handler]
pub(crate) async fn upload_avatar(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(chat_id): Path<ChatId>,
    body: Bytes,
) -> AppResult<StatusCode> {
    let caller = session::current_caller(&session, &db_pool).await?;
    member_guard(&db_pool, chat_id, caller.id).await?;
    registry::update_avatar(&db_pool, chat_id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler]
pub(crate) async fn remove_avatar(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(chat_id): Path<ChatId>,
) -> AppResult<StatusCode> {
    let caller = session::current_caller(&session, &db_pool).await?;
    member_guard(&db_pool, chat_id, caller.id).await?;
    registry::clear_avatar(&db_pool, chat_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
