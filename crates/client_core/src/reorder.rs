//! Drag-and-drop reordering of a module's contents.
//!
//! A move is applied to the local list first, then every item's new 1-based
//! position is persisted concurrently. If any write fails the local list is
//! thrown away and replaced by a fresh fetch of the module.
//!
//! The visible list is published on a watch channel so a renderer can show
//! the tentative order while the writes are still in flight.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use shared::{
    domain::{ContentId, ModuleId},
    protocol::{Content, Module},
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::{ClientError, ClientResult},
    resources::{ContentApi, ModuleApi},
};

#[async_trait]
pub trait ContentOrderBackend: Send + Sync {
    async fn persist_order(&self, content_id: ContentId, order: u32) -> ClientResult<()>;
    async fn fetch_module(&self, module_id: ModuleId) -> ClientResult<Module>;
}

/// Backend that talks to the LMS API.
pub struct ApiOrderBackend {
    modules: ModuleApi,
    contents: ContentApi,
}

impl ApiOrderBackend {
    pub fn new(modules: ModuleApi, contents: ContentApi) -> Self {
        Self { modules, contents }
    }
}

#[async_trait]
impl ContentOrderBackend for ApiOrderBackend {
    async fn persist_order(&self, content_id: ContentId, order: u32) -> ClientResult<()> {
        self.contents.update_order(content_id, order).await
    }

    async fn fetch_module(&self, module_id: ModuleId) -> ClientResult<Module> {
        self.modules.get(module_id).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// Same index or out of range; nothing was sent.
    Unchanged,
    /// Every position write succeeded.
    Confirmed,
    /// At least one write failed and local state was replaced from the server.
    RolledBack { reason: String },
}

/// Removes the element at `from` and reinserts it at `to`. Returns false
/// (leaving `items` untouched) when the move is a no-op or out of range.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

pub struct ReorderCoordinator {
    module_id: ModuleId,
    module: Option<Module>,
    contents: Vec<Content>,
    backend: Arc<dyn ContentOrderBackend>,
    visible: watch::Sender<Vec<Content>>,
    needs_resync: bool,
}

impl ReorderCoordinator {
    pub fn new(module_id: ModuleId, backend: Arc<dyn ContentOrderBackend>) -> Self {
        Self {
            module_id,
            module: None,
            contents: Vec::new(),
            backend,
            visible: watch::channel(Vec::new()).0,
            needs_resync: false,
        }
    }

    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    /// Module header as last fetched. Its `contents` field is left empty;
    /// the live list is [`Self::contents`].
    pub fn module(&self) -> Option<&Module> {
        self.module.as_ref()
    }

    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    /// Follows the visible list, including the tentative order of a move
    /// whose writes have not settled yet.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Content>> {
        self.visible.subscribe()
    }

    fn publish(&self) {
        self.visible.send_replace(self.contents.clone());
    }

    pub fn needs_resync(&self) -> bool {
        self.needs_resync
    }

    /// True when every item's `order` equals its 1-based position.
    pub fn is_consistent(&self) -> bool {
        self.contents
            .iter()
            .enumerate()
            .all(|(index, content)| content.order as usize == index + 1)
    }

    /// Fetches the authoritative module and replaces local state entirely.
    pub async fn load(&mut self) -> ClientResult<()> {
        let module = self.backend.fetch_module(self.module_id).await?;
        self.replace(module);
        Ok(())
    }

    pub fn replace(&mut self, mut module: Module) {
        self.contents = std::mem::take(&mut module.contents);
        self.module = Some(module);
        self.needs_resync = false;
        self.publish();
    }

    pub async fn move_item(&mut self, from: usize, to: usize) -> ClientResult<ReorderOutcome> {
        if from == to || from >= self.contents.len() || to >= self.contents.len() {
            return Ok(ReorderOutcome::Unchanged);
        }

        if self.needs_resync {
            // A previous rollback never reached the server; do not stack a
            // new move on top of state we know is wrong.
            self.load().await?;
            if from >= self.contents.len() || to >= self.contents.len() {
                return Ok(ReorderOutcome::Unchanged);
            }
        }

        array_move(&mut self.contents, from, to);
        self.publish();
        debug!(module_id = %self.module_id, from, to, "applied optimistic reorder");

        let targets: Vec<(ContentId, u32)> = self
            .contents
            .iter()
            .enumerate()
            .map(|(index, content)| (content.id, index as u32 + 1))
            .collect();

        let backend = Arc::clone(&self.backend);
        let results = join_all(
            targets
                .iter()
                .map(|(id, order)| backend.persist_order(*id, *order)),
        )
        .await;

        let failures: Vec<(ContentId, ClientError)> = targets
            .iter()
            .zip(results)
            .filter_map(|((id, _), result)| result.err().map(|err| (*id, err)))
            .collect();

        if failures.is_empty() {
            for (content, (_, order)) in self.contents.iter_mut().zip(&targets) {
                content.order = *order;
            }
            self.publish();
            info!(module_id = %self.module_id, items = targets.len(), "reorder confirmed");
            return Ok(ReorderOutcome::Confirmed);
        }

        if failures.iter().any(|(_, err)| err.is_unauthorized()) {
            self.needs_resync = true;
            return Err(ClientError::Unauthorized);
        }

        let (first_id, first_err) = &failures[0];
        let reason = format!(
            "{} of {} order updates failed (first: content {first_id}: {first_err})",
            failures.len(),
            targets.len()
        );
        warn!(module_id = %self.module_id, %reason, "reorder failed; rolling back to server state");

        if let Err(err) = self.load().await {
            warn!(module_id = %self.module_id, error = %err, "rollback fetch failed; will resync before next move");
            self.needs_resync = true;
        }

        Ok(ReorderOutcome::RolledBack { reason })
    }
}

#[cfg(test)]
#[path = "tests/reorder_tests.rs"]
mod tests;
