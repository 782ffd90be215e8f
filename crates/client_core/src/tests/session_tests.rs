use super::*;
use shared::{domain::{Role, UserId}, protocol::User};
use storage::MemoryLocalStore;

fn sample_user() -> User {
    User {
        id: UserId(7),
        name: "Sari Peserta".to_string(),
        email: "sari@lms.test".to_string(),
        role: Role::Peserta,
        avatar: None,
    }
}

async fn persisted(token: Option<&str>, user: Option<&str>) -> Arc<MemoryLocalStore> {
    let store = Arc::new(MemoryLocalStore::new());
    if let Some(token) = token {
        store.set(TOKEN_KEY, token).await.expect("token");
    }
    if let Some(user) = user {
        store.set(USER_KEY, user).await.expect("user");
    }
    store
}

#[tokio::test]
async fn hydrate_restores_persisted_session() {
    let user_json = serde_json::to_string(&sample_user()).unwrap();
    let store = persisted(Some("token-7"), Some(&user_json)).await;

    let session = SessionStore::hydrated(store).await.expect("hydrate");

    assert!(session.is_authenticated().await);
    assert_eq!(session.token().await.as_deref(), Some("token-7"));
    assert_eq!(session.current_user().await, Some(sample_user()));
}

#[tokio::test]
async fn hydrate_with_empty_store_is_anonymous() {
    let store = persisted(None, None).await;
    let session = SessionStore::hydrated(store).await.expect("hydrate");
    assert!(!session.is_authenticated().await);
    assert_eq!(session.token().await, None);
}

#[tokio::test]
async fn token_without_user_is_discarded_from_both_slots() {
    let store = persisted(Some("token-7"), None).await;

    let session = SessionStore::hydrated(store.clone()).await.expect("hydrate");

    assert!(!session.is_authenticated().await);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn undecodable_user_is_discarded() {
    let store = persisted(Some("token-7"), Some("{not json")).await;

    let session = SessionStore::hydrated(store.clone()).await.expect("hydrate");

    assert_eq!(session.current_user().await, None);
    assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
    assert_eq!(store.get(USER_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn establish_persists_both_entries_and_notifies() {
    let store = Arc::new(MemoryLocalStore::new());
    let session = SessionStore::new(store.clone());
    let mut events = session.subscribe();

    session
        .establish(Session {
            token: "token-7".to_string(),
            user: sample_user(),
        })
        .await
        .expect("establish");

    assert_eq!(store.get(TOKEN_KEY).await.unwrap().as_deref(), Some("token-7"));
    let stored: User = serde_json::from_str(&store.get(USER_KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(stored, sample_user());
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::Established(sample_user())
    );

    let restored = SessionStore::hydrated(store).await.expect("rehydrate");
    assert_eq!(restored.current_user().await, Some(sample_user()));
}

#[tokio::test]
async fn clear_removes_both_entries_and_reports_reason() {
    let store = Arc::new(MemoryLocalStore::new());
    let session = SessionStore::new(store.clone());
    session
        .establish(Session {
            token: "token-7".to_string(),
            user: sample_user(),
        })
        .await
        .expect("establish");
    let mut events = session.subscribe();

    session.clear(ClearReason::Unauthorized).await.expect("clear");

    assert!(!session.is_authenticated().await);
    assert!(store.is_empty().await);
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::Cleared {
            reason: ClearReason::Unauthorized
        }
    );
}
