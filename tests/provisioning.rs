mod common;

use coopnet::{Error, membership, model::ChatKind, provisioning, registry};

#[tokio::test]
async fn registering_second_account_provisions_one_friend_chat() {
    let pool = common::pool().await;
    let alice = common::register(&pool, "alice").await;
    let bob = common::register(&pool, "bob").await;

    let alice_chats = membership::chats_of(&pool, alice.id).await.unwrap();
    let bob_chats = membership::chats_of(&pool, bob.id).await.unwrap();
    assert_eq!(alice_chats, bob_chats);
    assert_eq!(alice_chats.len(), 1);

    let chat = registry::lookup(&pool, alice_chats[0]).await.unwrap();
    assert_eq!(chat.kind, ChatKind::PeerToPeer);

    let members = membership::members_of(&pool, chat.id).await.unwrap();
    let member_ids: Vec<_> = members.iter().map(|a| a.id).collect();
    assert_eq!(member_ids, vec![alice.id, bob.id]);
}

#[tokio::test]
async fn duplicate_pair_creation_is_a_conflict() {
    let pool = common::pool().await;
    let alice = common::register(&pool, "alice").await;
    let bob = common::register(&pool, "bob").await;

    let err = registry::create_peer_to_peer(&pool, alice.id, bob.id, alice.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    // Order of the pair doesn't matter either.
    let err = registry::create_peer_to_peer(&pool, bob.id, alice.id, bob.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn provisioning_covers_every_preexisting_account() {
    let pool = common::pool().await;
    let alice = common::register(&pool, "alice").await;
    let bob = common::register(&pool, "bob").await;
    let carol = common::register(&pool, "carol").await;

    assert_eq!(membership::chats_of(&pool, alice.id).await.unwrap().len(), 2);
    assert_eq!(membership::chats_of(&pool, bob.id).await.unwrap().len(), 2);
    assert_eq!(membership::chats_of(&pool, carol.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn an_already_provisioned_pair_does_not_abort_the_rest() {
    let pool = common::pool().await;
    let alice = common::register(&pool, "alice").await;
    let bob = common::register(&pool, "bob").await;

    // Dave gets a chat with alice ahead of time; provisioning must skip that
    // pair and still create the one with bob.
    let dave = common::create_account(&pool, "dave").await;
    registry::create_peer_to_peer(&pool, dave.id, alice.id, dave.id)
        .await
        .unwrap();

    let outcome = provisioning::provision_friend_chats(&pool, dave.id)
        .await
        .unwrap();
    assert_eq!(outcome.created, 1);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.failed, 0);

    let dave_chats = membership::chats_of(&pool, dave.id).await.unwrap();
    assert_eq!(dave_chats.len(), 2);
}

#[tokio::test]
async fn self_pair_is_rejected() {
    let pool = common::pool().await;
    let alice = common::register(&pool, "alice").await;

    let err = registry::create_peer_to_peer(&pool, alice.id, alice.id, alice.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
