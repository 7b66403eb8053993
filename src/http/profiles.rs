use axum::{
    Json, Router,
    body::Bytes,
    debug_handler,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    AppState, directory,
    error::AppResult,
    model::{Account, AccountId},
    session,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(accounts))
        .route("/profiles/{id}", get(profile))
        .route("/profiles/{id}/avatar", get(avatar))
        .route(
            "/profiles/avatar",
            put(upload_avatar).delete(remove_avatar),
        )
}

// Everyone but the caller: the member picker for group creation.
#[debug_handler]
pub(crate) async fn accounts(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Vec<Account>>> {
    let caller = session::current_caller(&session, &db_pool).await?;
    Ok(Json(directory::all_except(&db_pool, caller.id).await?))
}

#[debug_handler]
pub(crate) async fn profile(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(account_id): Path<AccountId>,
) -> AppResult<Json<Account>> {
    session::current_caller(&session, &db_pool).await?;
    Ok(Json(directory::lookup(&db_pool, account_id).await?))
}

// The blob is opaque to the core; format checks belong to the client.
#[debug_handler]
pub(crate) async fn avatar(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(account_id): Path<AccountId>,
) -> AppResult<Response> {
    session::current_caller(&session, &db_pool).await?;
    match directory::avatar_of(&db_pool, account_id).await? {
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
    body: Bytes,
) -> AppResult<StatusCode> {
    let caller = session::current_caller(&session, &db_pool).await?;
    directory::update_avatar(&db_pool, caller.id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler]
pub(crate) async fn remove_avatar(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<StatusCode> {
    let caller = session::current_caller(&session, &db_pool).await?;
    directory::clear_avatar(&db_pool, caller.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
