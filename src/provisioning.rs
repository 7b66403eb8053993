use sqlx::SqlitePool;

use crate::{
    directory,
    error::{AppResult, Error},
    model::AccountId,
    registry,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionOutcome {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Attempts one peer-to-peer chat per pre-existing account. Each pair is its
/// own transaction: a failed pair rolls back alone, is logged, and the loop
/// moves on. An already-provisioned pair counts as skipped. Registration must
/// never fail because of this step.
pub async fn provision_friend_chats(
    pool: &SqlitePool,
    new_account: AccountId,
) -> AppResult<ProvisionOutcome> {
    let peers = directory::all_except(pool, new_account).await?;

    let mut outcome = ProvisionOutcome::default();
    for peer in peers.into_iter().map(|account| account.id) {
        match registry::create_peer_to_peer(pool, new_account, peer, new_account).await {
            Ok(chat) => {
                tracing::debug!(chat = chat.id, peer, "provisioned friend chat");
                outcome.created += 1;
            }
            Err(Error::Conflict(_)) => outcome.skipped += 1,
            Err(err) => {
                tracing::warn!(%err, peer, "friend chat provisioning failed for one pair");
                outcome.failed += 1;
            }
        }
    }
    Ok(outcome)
}
