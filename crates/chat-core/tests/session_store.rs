use std::time::Duration;

use chat_core::{Message, Role, SessionId, SessionStore};

#[tokio::test]
async fn get_or_create_mints_and_reuses_ids() {
    let store = SessionStore::new();

    let (id, session) = store.get_or_create(None).await;
    assert_eq!(session.id(), id);
    assert!(session.is_empty().await);

    let (same, _) = store.get_or_create(Some(id)).await;
    assert_eq!(same, id);
    assert_eq!(store.session_count().await, 1);

    // An id the store never issued is replaced by a fresh one.
    let stranger = SessionId::new();
    let (fresh, _) = store.get_or_create(Some(stranger)).await;
    assert_ne!(fresh, stranger);
    assert_ne!(fresh, id);
    assert!(!store.contains(stranger).await);
    assert_eq!(store.session_count().await, 2);
}

#[tokio::test]
async fn existing_session_is_returned_unchanged() {
    let store = SessionStore::new();
    let (id, _) = store.get_or_create(None).await;
    store.append(id, Message::user("Merhaba")).await;

    let (_, session) = store.get_or_create(Some(id)).await;
    let messages = session.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text(), "Merhaba");
}

#[tokio::test]
async fn append_preserves_arrival_order() {
    let store = SessionStore::new();
    let (id, _) = store.get_or_create(None).await;

    for i in 0..10 {
        store.append(id, Message::user(format!("m{}", i))).await;
    }

    let texts: Vec<String> = store.list(id).await.iter().map(|m| m.text().to_string()).collect();
    let expected: Vec<String> = (0..10).map(|i| format!("m{}", i)).collect();
    assert_eq!(texts, expected);
}

#[tokio::test]
async fn append_to_unknown_id_creates_the_session() {
    let store = SessionStore::new();
    let id = SessionId::new();

    store.append(id, Message::user("ilk")).await;

    assert!(store.contains(id).await);
    let messages = store.list(id).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role(), Role::User);

    let (resolved, _) = store.get_or_create(Some(id)).await;
    assert_eq!(resolved, id);
}

#[tokio::test]
async fn list_of_unknown_id_is_empty_and_side_effect_free() {
    let store = SessionStore::new();
    let id = SessionId::new();

    assert!(store.list(id).await.is_empty());
    assert!(!store.contains(id).await);
    assert_eq!(store.session_count().await, 0);
}

#[tokio::test]
async fn clear_empties_but_keeps_the_session() {
    let store = SessionStore::new();
    let (id, _) = store.get_or_create(None).await;
    store.append(id, Message::user("soru")).await;
    store.append(id, Message::bot("cevap")).await;

    store.clear(id).await;

    assert!(store.list(id).await.is_empty());
    assert!(store.contains(id).await);
    let (same, _) = store.get_or_create(Some(id)).await;
    assert_eq!(same, id);

    // clearing twice is fine
    store.clear(id).await;
    assert!(store.list(id).await.is_empty());
}

#[tokio::test]
async fn clear_of_unknown_id_is_a_no_op() {
    let store = SessionStore::new();
    let id = SessionId::new();
    store.clear(id).await;
    assert!(!store.contains(id).await);
}

#[tokio::test]
async fn concurrent_appends_are_not_lost() {
    let store = SessionStore::new();
    let (id, _) = store.get_or_create(None).await;

    let mut handles = Vec::new();
    for i in 0..50 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.append(id, Message::user(format!("m{}", i))).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.list(id).await.len(), 50);
}

#[tokio::test]
async fn busy_session_does_not_block_others() {
    let store = SessionStore::new();
    let (busy, busy_session) = store.get_or_create(None).await;
    let (other, _) = store.get_or_create(None).await;

    let _turn = busy_session.begin_turn().await;

    tokio::time::timeout(Duration::from_secs(1), async {
        store.append(other, Message::user("hâlâ çalışıyor")).await;
        store.clear(other).await;
        store.append(busy, Message::user("okuma serbest")).await;
        store.list(busy).await
    })
    .await
    .expect("store operations must not wait on another session's turn");
}
