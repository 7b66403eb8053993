use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    handle TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    blurb TEXT NOT NULL DEFAULT '',
    registered_at TEXT NOT NULL,
    avatar BLOB
);

CREATE TABLE IF NOT EXISTS chats (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL CHECK (kind IN ('peer_to_peer', 'group')),
    name TEXT,
    description TEXT,
    creator_id INTEGER NOT NULL REFERENCES accounts(id),
    -- "{min}:{max}" of the two member ids; NULL for groups. The UNIQUE
    -- constraint is what makes peer-to-peer provisioning idempotent.
    pair_key TEXT UNIQUE,
    avatar BLOB
);

CREATE TABLE IF NOT EXISTS memberships (
    chat_id INTEGER NOT NULL REFERENCES chats(id),
    account_id INTEGER NOT NULL REFERENCES accounts(id),
    PRIMARY KEY (chat_id, account_id)
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id INTEGER NOT NULL REFERENCES chats(id),
    sender_id INTEGER NOT NULL REFERENCES accounts(id),
    content TEXT NOT NULL,
    sent_at TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'unread' CHECK (status IN ('unread', 'read'))
);

CREATE INDEX IF NOT EXISTS idx_messages_chat ON messages (chat_id, id);
CREATE INDEX IF NOT EXISTS idx_memberships_account ON memberships (account_id);
"#;

pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(url)
        .await?;
    init(&pool).await?;
    Ok(pool)
}

/// Applies the schema. Idempotent.
pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
