use super::*;
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use crate::mock_api::{MockApi, ADMIN_EMAIL, DETAIL_MODULE};
use reqwest::StatusCode;
use shared::{domain::ContentType, error::ApiErrorBody};
use tokio::sync::Semaphore;

const TITLES: [&str; 5] = ["A", "B", "C", "D", "E"];

fn content(id: i64, title: &str, order: u32) -> Content {
    Content {
        id: ContentId(id),
        module_id: ModuleId(1),
        title: title.to_string(),
        body: String::new(),
        content_type: ContentType::Materi,
        order,
        is_published: true,
        thumbnail: None,
        author: None,
        module: None,
        created_at: None,
    }
}

fn module_with(titles: &[&str]) -> Module {
    Module {
        id: ModuleId(1),
        title: "Module".to_string(),
        description: None,
        thumbnail: None,
        is_active: true,
        pemateri: None,
        contents: titles
            .iter()
            .enumerate()
            .map(|(i, t)| content(i as i64 + 1, t, i as u32 + 1))
            .collect(),
        contents_count: titles.len() as u32,
        enrollments_count: 0,
    }
}

#[derive(Default)]
struct FakeBackend {
    server: Mutex<Vec<Content>>,
    failing: Mutex<HashSet<ContentId>>,
    unauthorized: AtomicBool,
    fail_fetch: AtomicBool,
    writes: Mutex<Vec<(ContentId, u32)>>,
    fetches: AtomicUsize,
    gate: Option<Semaphore>,
}

impl FakeBackend {
    fn with(titles: &[&str]) -> Arc<Self> {
        let backend = Self::default();
        *backend.server.lock().unwrap() = module_with(titles).contents;
        Arc::new(backend)
    }

    /// Every write waits for a permit on the returned gate.
    fn gated(titles: &[&str]) -> Arc<Self> {
        let backend = Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        };
        *backend.server.lock().unwrap() = module_with(titles).contents;
        Arc::new(backend)
    }

    fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(TITLES.len());
        }
    }

    fn fail(&self, id: i64) {
        self.failing.lock().unwrap().insert(ContentId(id));
    }

    fn writes(&self) -> Vec<(ContentId, u32)> {
        self.writes.lock().unwrap().clone()
    }

    fn server_view(&self) -> Vec<Content> {
        let mut contents = self.server.lock().unwrap().clone();
        contents.sort_by_key(|c| c.order);
        contents
    }
}

#[async_trait]
impl ContentOrderBackend for FakeBackend {
    async fn persist_order(&self, content_id: ContentId, order: u32) -> ClientResult<()> {
        self.writes.lock().unwrap().push((content_id, order));
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.expect("gate closed");
        }
        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(ClientError::Unauthorized);
        }
        if self.failing.lock().unwrap().contains(&content_id) {
            return Err(ClientError::Api {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: ApiErrorBody::new("Server Error"),
            });
        }
        if let Some(item) = self
            .server
            .lock()
            .unwrap()
            .iter_mut()
            .find(|c| c.id == content_id)
        {
            item.order = order;
        }
        Ok(())
    }

    async fn fetch_module(&self, _module_id: ModuleId) -> ClientResult<Module> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ClientError::Api {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: ApiErrorBody::new("Service Unavailable"),
            });
        }
        let mut module = module_with(&[]);
        module.contents = self.server_view();
        Ok(module)
    }
}

async fn loaded(backend: &Arc<FakeBackend>) -> ReorderCoordinator {
    let mut coordinator = ReorderCoordinator::new(ModuleId(1), backend.clone());
    coordinator.load().await.expect("load");
    coordinator
}

fn titles(coordinator: &ReorderCoordinator) -> Vec<&str> {
    coordinator.contents().iter().map(|c| c.title.as_str()).collect()
}

#[test]
fn array_move_matches_drag_semantics() {
    let mut items = TITLES.to_vec();
    assert!(array_move(&mut items, 0, 3));
    assert_eq!(items, ["B", "C", "D", "A", "E"]);

    let mut items = TITLES.to_vec();
    assert!(array_move(&mut items, 4, 0));
    assert_eq!(items, ["E", "A", "B", "C", "D"]);

    let mut items = TITLES.to_vec();
    assert!(!array_move(&mut items, 2, 2));
    assert!(!array_move(&mut items, 5, 0));
    assert_eq!(items, TITLES);
}

#[tokio::test]
async fn moving_down_confirms_new_positions() {
    let backend = FakeBackend::with(&TITLES);
    let mut coordinator = loaded(&backend).await;

    let outcome = coordinator.move_item(0, 3).await.expect("move");

    assert_eq!(outcome, ReorderOutcome::Confirmed);
    assert_eq!(titles(&coordinator), ["B", "C", "D", "A", "E"]);
    assert!(coordinator.is_consistent());
    let mut writes = backend.writes();
    writes.sort();
    assert_eq!(
        writes,
        [
            (ContentId(1), 4),
            (ContentId(2), 1),
            (ContentId(3), 2),
            (ContentId(4), 3),
            (ContentId(5), 5),
        ]
    );
}

#[tokio::test]
async fn moving_last_to_first() {
    let backend = FakeBackend::with(&TITLES);
    let mut coordinator = loaded(&backend).await;

    coordinator.move_item(4, 0).await.expect("move");

    assert_eq!(titles(&coordinator), ["E", "A", "B", "C", "D"]);
    let server: Vec<String> = backend.server_view().into_iter().map(|c| c.title).collect();
    assert_eq!(server, ["E", "A", "B", "C", "D"]);
}

#[tokio::test]
async fn every_move_preserves_the_other_items_relative_order() {
    for len in 1..=5 {
        for from in 0..len {
            for to in 0..len {
                let backend = FakeBackend::with(&TITLES[..len]);
                let mut coordinator = loaded(&backend).await;

                let outcome = coordinator.move_item(from, to).await.expect("move");

                let after = titles(&coordinator);
                assert_eq!(after[to], TITLES[from], "len {len} move {from}->{to}");
                let others: Vec<&str> = after.iter().copied().filter(|t| *t != TITLES[from]).collect();
                let expected: Vec<&str> = TITLES[..len]
                    .iter()
                    .copied()
                    .filter(|t| *t != TITLES[from])
                    .collect();
                assert_eq!(others, expected);
                assert!(coordinator.is_consistent());
                if from == to {
                    assert_eq!(outcome, ReorderOutcome::Unchanged);
                    assert!(backend.writes().is_empty());
                } else {
                    assert_eq!(outcome, ReorderOutcome::Confirmed);
                    assert_eq!(backend.writes().len(), len);
                }
            }
        }
    }
}

#[tokio::test]
async fn out_of_range_moves_send_nothing() {
    let backend = FakeBackend::with(&TITLES);
    let mut coordinator = loaded(&backend).await;

    assert_eq!(coordinator.move_item(5, 0).await.unwrap(), ReorderOutcome::Unchanged);
    assert_eq!(coordinator.move_item(0, 9).await.unwrap(), ReorderOutcome::Unchanged);

    assert!(backend.writes().is_empty());
    assert_eq!(titles(&coordinator), TITLES);
}

#[tokio::test]
async fn a_failed_write_rolls_back_to_server_state() {
    let backend = FakeBackend::with(&TITLES);
    let mut coordinator = loaded(&backend).await;
    for id in 1..=5 {
        backend.fail(id);
    }

    let outcome = coordinator.move_item(0, 3).await.expect("move");

    match outcome {
        ReorderOutcome::RolledBack { reason } => {
            assert!(reason.starts_with("5 of 5 order updates failed"), "{reason}");
        }
        other => panic!("expected rollback, got {other:?}"),
    }
    assert_eq!(titles(&coordinator), TITLES);
    assert_eq!(backend.fetches.load(Ordering::SeqCst), 2);
    assert!(!coordinator.needs_resync());
}

#[tokio::test]
async fn partial_failure_adopts_whatever_the_server_holds() {
    let backend = FakeBackend::with(&TITLES);
    let mut coordinator = loaded(&backend).await;
    backend.fail(3);

    let outcome = coordinator.move_item(4, 0).await.expect("move");

    assert!(matches!(outcome, ReorderOutcome::RolledBack { .. }));
    assert_eq!(coordinator.contents(), backend.server_view().as_slice());
}

#[tokio::test]
async fn failed_rollback_fetch_forces_resync_before_next_move() {
    let backend = FakeBackend::with(&TITLES);
    let mut coordinator = loaded(&backend).await;
    backend.fail(2);
    backend.fail_fetch.store(true, Ordering::SeqCst);

    let outcome = coordinator.move_item(0, 1).await.expect("move");
    assert!(matches!(outcome, ReorderOutcome::RolledBack { .. }));
    assert!(coordinator.needs_resync());

    let err = coordinator.move_item(0, 1).await.expect_err("resync fails");
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));

    backend.fail_fetch.store(false, Ordering::SeqCst);
    backend.failing.lock().unwrap().clear();
    let fetches_before = backend.fetches.load(Ordering::SeqCst);
    let outcome = coordinator.move_item(0, 1).await.expect("move after resync");

    assert_eq!(outcome, ReorderOutcome::Confirmed);
    assert!(!coordinator.needs_resync());
    assert_eq!(backend.fetches.load(Ordering::SeqCst), fetches_before + 1);
}

#[tokio::test]
async fn tentative_order_is_visible_while_writes_are_pending() {
    let backend = FakeBackend::gated(&TITLES);
    let mut coordinator = loaded(&backend).await;
    let mut visible = coordinator.subscribe();
    assert_eq!(
        visible.borrow().iter().map(|c| c.title.as_str()).collect::<Vec<_>>(),
        TITLES
    );

    let task = tokio::spawn(async move {
        let outcome = coordinator.move_item(0, 3).await;
        (coordinator, outcome)
    });

    visible.changed().await.expect("coordinator alive");
    let pending: Vec<String> = visible.borrow_and_update().iter().map(|c| c.title.clone()).collect();
    assert_eq!(pending, ["B", "C", "D", "A", "E"]);
    assert!(!task.is_finished());
    assert!(backend.server_view().iter().map(|c| c.title.as_str()).eq(TITLES));

    backend.release();
    let (coordinator, outcome) = task.await.expect("join");

    assert_eq!(outcome.expect("move"), ReorderOutcome::Confirmed);
    assert_eq!(titles(&coordinator), ["B", "C", "D", "A", "E"]);
    assert!(coordinator.is_consistent());
    assert_eq!(*visible.borrow(), coordinator.contents());
}

#[tokio::test]
async fn rollback_is_published_to_subscribers() {
    let backend = FakeBackend::with(&TITLES);
    let mut coordinator = loaded(&backend).await;
    let visible = coordinator.subscribe();
    backend.fail(3);

    let outcome = coordinator.move_item(4, 0).await.expect("move");

    assert!(matches!(outcome, ReorderOutcome::RolledBack { .. }));
    assert_eq!(*visible.borrow(), backend.server_view());
}

#[tokio::test]
async fn unauthorized_write_skips_rollback_fetch() {
    let backend = FakeBackend::with(&TITLES);
    let mut coordinator = loaded(&backend).await;
    backend.unauthorized.store(true, Ordering::SeqCst);

    let err = coordinator.move_item(1, 2).await.expect_err("unauthorized");

    assert!(err.is_unauthorized());
    assert!(coordinator.needs_resync());
    assert_eq!(backend.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reorder_against_api_persists_and_rolls_back() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;
    let backend = Arc::new(ApiOrderBackend::new(
        client.modules.clone(),
        client.contents.clone(),
    ));
    let mut coordinator = ReorderCoordinator::new(DETAIL_MODULE, backend);
    coordinator.load().await.expect("load");

    let outcome = coordinator.move_item(0, 3).await.expect("move");
    assert_eq!(outcome, ReorderOutcome::Confirmed);
    assert_eq!(
        mock.state.lock().await.content_order(DETAIL_MODULE),
        ["B", "C", "D", "A", "E"]
    );
    assert_eq!(mock.requests("POST", "/contents/").await.len(), 5);

    {
        let mut state = mock.state.lock().await;
        state.failing_content_ids = (101..=105).map(ContentId).collect();
    }
    let outcome = coordinator.move_item(4, 0).await.expect("move");

    assert!(matches!(outcome, ReorderOutcome::RolledBack { .. }));
    assert_eq!(titles(&coordinator), ["B", "C", "D", "A", "E"]);
    assert!(coordinator.is_consistent());
}
