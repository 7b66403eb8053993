use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    directory,
    error::{AppResult, Error},
    model::{Account, AccountId},
};

pub const ACCOUNT_ID: &str = "account_id";

pub async fn current_caller(session: &Session, pool: &SqlitePool) -> AppResult<Account> {
    let Some(id) = session.get::<AccountId>(ACCOUNT_ID).await? else {
        return Err(Error::Unauthenticated);
    };
    directory::lookup(pool, id).await
}
