//! Account creation and lookup. Stores whatever credential hash it is handed;
//! hashing itself happens in the presentation layer.

use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::{
    error::{AppResult, Error, unique_conflict},
    model::{Account, AccountId},
};

const ACCOUNT_COLUMNS: &str = "id, email, name, handle, blurb, registered_at";
const DEFAULT_BLURB: &str = "Tell us about yourself";

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub handle: String,
    pub password_hash: String,
    pub blurb: String,
}

pub async fn create(pool: &SqlitePool, new: NewAccount) -> AppResult<Account> {
    let blurb = if new.blurb.is_empty() {
        DEFAULT_BLURB.to_owned()
    } else {
        new.blurb
    };

    sqlx::query_as::<_, Account>(&format!(
        "INSERT INTO accounts (email, name, handle, password_hash, blurb, registered_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {ACCOUNT_COLUMNS}"
    ))
    .bind(new.email.to_lowercase())
    .bind(new.name)
    .bind(new.handle)
    .bind(new.password_hash)
    .bind(blurb)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(pool)
    .await
    .map_err(|e| unique_conflict(e, "an account with that email or handle already exists"))
}

pub async fn lookup(pool: &SqlitePool, id: AccountId) -> AppResult<Account> {
    sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::not_found("account", id))
}

pub async fn lookup_by_email(pool: &SqlitePool, email: &str) -> AppResult<Account> {
    sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::not_found("account", email))
}

pub async fn exists(pool: &SqlitePool, id: AccountId) -> AppResult<bool> {
    Ok(
        sqlx::query_as::<_, (i64,)>("SELECT 1 FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .is_some(),
    )
}

/// Login support: the stored credential hash for an email.
pub async fn credential_of(pool: &SqlitePool, email: &str) -> AppResult<(AccountId, String)> {
    sqlx::query_as::<_, (AccountId, String)>(
        "SELECT id, password_hash FROM accounts WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::not_found("account", email))
}

/// Everyone but `id`, in registration order. Feeds friend-chat provisioning
/// and the group-creation member picker.
pub async fn all_except(pool: &SqlitePool, id: AccountId) -> AppResult<Vec<Account>> {
    Ok(sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id <> ? ORDER BY id"
    ))
    .bind(id)
    .fetch_all(pool)
    .await?)
}

pub async fn update_avatar(pool: &SqlitePool, id: AccountId, avatar: &[u8]) -> AppResult<()> {
    let result = sqlx::query("UPDATE accounts SET avatar = ? WHERE id = ?")
        .bind(avatar)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::not_found("account", id));
    }
    Ok(())
}

pub async fn clear_avatar(pool: &SqlitePool, id: AccountId) -> AppResult<()> {
    let result = sqlx::query("UPDATE accounts SET avatar = NULL WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::not_found("account", id));
    }
    Ok(())
}

pub async fn avatar_of(pool: &SqlitePool, id: AccountId) -> AppResult<Option<Vec<u8>>> {
    let row = sqlx::query_as::<_, (Option<Vec<u8>>,)>("SELECT avatar FROM accounts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::not_found("account", id))?;
    Ok(row.0)
}
