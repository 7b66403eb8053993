mod common;

use coopnet::{
    Error, membership, message_log,
    model::{ChatId, DeliveryStatus},
    registry,
};
use sqlx::SqlitePool;

async fn friend_chat(pool: &SqlitePool, a: i64, b: i64) -> ChatId {
    let chats_a = membership::chats_of(pool, a).await.unwrap();
    let chats_b = membership::chats_of(pool, b).await.unwrap();
    *chats_a.iter().find(|id| chats_b.contains(id)).unwrap()
}

#[tokio::test]
async fn messages_keep_insertion_order_even_with_identical_timestamps() {
    let pool = common::pool().await;
    let alice = common::register(&pool, "alice").await;
    let bob = common::register(&pool, "bob").await;
    let chat = friend_chat(&pool, alice.id, bob.id).await;

    // Appended back to back; sub-second timestamps may collide, ids never do.
    let first = message_log::append(&pool, chat, alice.id, "first").await.unwrap();
    let second = message_log::append(&pool, chat, alice.id, "second").await.unwrap();
    assert!(second.id > first.id);

    let listed = message_log::list_for(&pool, chat).await.unwrap();
    let contents: Vec<_> = listed.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second"]);
}

#[tokio::test]
async fn new_messages_start_unread() {
    let pool = common::pool().await;
    let alice = common::register(&pool, "alice").await;
    let bob = common::register(&pool, "bob").await;
    let chat = friend_chat(&pool, alice.id, bob.id).await;

    let message = message_log::append(&pool, chat, alice.id, "hi").await.unwrap();
    assert_eq!(message.status, DeliveryStatus::Unread);
}

#[tokio::test]
async fn only_members_may_send() {
    let pool = common::pool().await;
    let alice = common::register(&pool, "alice").await;
    let bob = common::register(&pool, "bob").await;
    let chat = friend_chat(&pool, alice.id, bob.id).await;

    let group = registry::create_group(&pool, "trio", None, alice.id, &[bob.id])
        .await
        .unwrap();
    let outsider = common::register(&pool, "carol").await;

    let err = message_log::append(&pool, group.id, outsider.id, "let me in")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    // The friend chat stays untouched by the failed group send.
    assert!(message_log::list_for(&pool, chat).await.unwrap().is_empty());
}

#[tokio::test]
async fn mark_read_is_idempotent_and_spares_the_readers_own_messages() {
    let pool = common::pool().await;
    let alice = common::register(&pool, "alice").await;
    let bob = common::register(&pool, "bob").await;
    let chat = friend_chat(&pool, alice.id, bob.id).await;

    message_log::append(&pool, chat, alice.id, "from alice").await.unwrap();
    message_log::append(&pool, chat, bob.id, "from bob").await.unwrap();

    message_log::mark_read(&pool, chat, bob.id).await.unwrap();
    message_log::mark_read(&pool, chat, bob.id).await.unwrap();

    let statuses: Vec<_> = message_log::list_for(&pool, chat)
        .await
        .unwrap()
        .into_iter()
        .map(|m| (m.sender_id, m.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            (alice.id, DeliveryStatus::Read),
            (bob.id, DeliveryStatus::Unread),
        ]
    );
}

#[tokio::test]
async fn delete_removes_one_message_without_disturbing_siblings() {
    let pool = common::pool().await;
    let alice = common::register(&pool, "alice").await;
    let bob = common::register(&pool, "bob").await;
    let chat = friend_chat(&pool, alice.id, bob.id).await;

    let m1 = message_log::append(&pool, chat, alice.id, "one").await.unwrap();
    let m2 = message_log::append(&pool, chat, alice.id, "two").await.unwrap();
    let m3 = message_log::append(&pool, chat, alice.id, "three").await.unwrap();

    message_log::delete(&pool, m2.id, alice.id).await.unwrap();

    let remaining: Vec<_> = message_log::list_for(&pool, chat)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(remaining, vec![m1.id, m3.id]);
}

#[tokio::test]
async fn only_the_sender_may_delete() {
    let pool = common::pool().await;
    let alice = common::register(&pool, "alice").await;
    let bob = common::register(&pool, "bob").await;
    let chat = friend_chat(&pool, alice.id, bob.id).await;

    let message = message_log::append(&pool, chat, alice.id, "mine").await.unwrap();

    let err = message_log::delete(&pool, message.id, bob.id).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    message_log::delete(&pool, message.id, alice.id).await.unwrap();
    let err = message_log::delete(&pool, message.id, alice.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn empty_content_is_rejected() {
    let pool = common::pool().await;
    let alice = common::register(&pool, "alice").await;
    let bob = common::register(&pool, "bob").await;
    let chat = friend_chat(&pool, alice.id, bob.id).await;

    let err = message_log::append(&pool, chat, alice.id, "   ").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
