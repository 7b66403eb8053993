use axum::{Json, Router, debug_handler, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    AppState, directory,
    directory::NewAccount,
    error::{AppResult, Error},
    model::Account,
    provisioning, session,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterForm {
    name: String,
    handle: String,
    email: String,
    password: String,
    confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginForm {
    email: String,
    password: String,
}

#[debug_handler]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    Json(form): Json<RegisterForm>,
) -> AppResult<(StatusCode, Json<Account>)> {
    validate(&form)?;

    let account = directory::create(
        &db_pool,
        NewAccount {
            email: form.email.trim().to_lowercase(),
            name: form.name.trim().to_owned(),
            handle: form.handle.trim().to_owned(),
            password_hash: hash_password(&form.password),
            blurb: String::new(),
        },
    )
    .await?;

    // Provisioning failures never fail the registration itself.
    match provisioning::provision_friend_chats(&db_pool, account.id).await {
        Ok(outcome) => tracing::info!(
            account = account.id,
            created = outcome.created,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "registered account and provisioned friend chats"
        ),
        Err(err) => tracing::warn!(%err, account = account.id, "friend chat provisioning aborted"),
    }

    Ok((StatusCode::CREATED, Json(account)))
}

#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> AppResult<Json<Account>> {
    let email = form.email.trim().to_lowercase();
    let (id, stored) = match directory::credential_of(&db_pool, &email).await {
        Ok(found) => found,
        Err(Error::NotFound { .. }) => return Err(Error::Unauthenticated),
        Err(err) => return Err(err),
    };

    if !verify_password(&stored, &form.password) {
        return Err(Error::Unauthenticated);
    }

    session.insert(session::ACCOUNT_ID, id).await?;
    let account = directory::lookup_by_email(&db_pool, &email).await?;
    tracing::info!(account = id, "login");
    Ok(Json(account))
}

#[debug_handler]
pub(crate) async fn logout(session: Session) -> StatusCode {
    session.clear().await;
    StatusCode::NO_CONTENT
}

fn validate(form: &RegisterForm) -> AppResult<()> {
    let fail = |msg: &str| Err(Error::Validation(msg.to_owned()));

    let name = form.name.trim();
    if name.is_empty() || name.len() > 60 {
        return fail("name must be between 1 and 60 characters");
    }
    let handle = form.handle.trim();
    if handle.is_empty() || handle.len() > 32 {
        return fail("handle must be between 1 and 32 characters");
    }
    let email = form.email.trim();
    if email.is_empty() || email.len() > 320 {
        return fail("email must be between 1 and 320 characters");
    }
    let Some((local, domain)) = email.split_once('@') else {
        return fail("email is missing an @");
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return fail("email is malformed");
    }
    if form.password.is_empty() {
        return fail("password must not be empty");
    }
    if form.password != form.confirm_password {
        return fail("passwords do not match");
    }
    Ok(())
}

// Salted SHA-256, stored as "{salt}${digest}" in lowercase hex. Good enough
// for a stored credential the core only ever compares, never reverses.
fn hash_password(password: &str) -> String {
    let salt: [u8; 16] = rand::random();
    format!("{}${}", hex(&salt), hex(&digest(&salt, password)))
}

fn verify_password(stored: &str, password: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Some(salt) = unhex(salt_hex) else {
        return false;
    };
    hex(&digest(&salt, password)) == digest_hex
}

fn digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::new(), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

fn unhex(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    if bytes.len() % 2 != 0 {
        return None;
    }
    bytes
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|p| u8::from_str_radix(p, 16).ok())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_roundtrip() {
        let stored = hash_password("hunter2");
        assert!(verify_password(&stored, "hunter2"));
        assert!(!verify_password(&stored, "hunter3"));
    }

    #[test]
    fn distinct_salts_per_hash() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn verify_rejects_garbage_storage() {
        assert!(!verify_password("not-a-hash", "anything"));
        assert!(!verify_password("zz$zz", "anything"));
        // Multi-byte salt text must not panic on the byte-pair split.
        assert!(!verify_password("éé$00", "anything"));
        assert!(!verify_password("é0$00", "anything"));
    }

    fn form(email: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            name: "Alice".to_owned(),
            handle: "alice".to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm.to_owned(),
        }
    }

    #[test]
    fn validate_accepts_reasonable_input() {
        assert!(validate(&form("alice@example.com", "pw", "pw")).is_ok());
    }

    #[test]
    fn validate_rejects_bad_email_and_mismatched_passwords() {
        assert!(validate(&form("alice", "pw", "pw")).is_err());
        assert!(validate(&form("alice@nodot", "pw", "pw")).is_err());
        assert!(validate(&form("alice@example.com", "pw", "other")).is_err());
    }
}
