use std::sync::Arc;

use shared::{
    domain::{ContentId, ModuleId},
    protocol::{Content, Module},
};

use tokio::sync::watch;

use super::{log_failure, FormDialog, PageState};
use crate::{
    error::ClientResult,
    reorder::{ContentOrderBackend, ReorderCoordinator, ReorderOutcome},
    resources::{ContentApi, ContentForm},
};

/// One module with its ordered contents, drag-and-drop reordering and the
/// content dialog.
pub struct ModuleDetailPage {
    contents: ContentApi,
    can_edit: bool,
    coordinator: ReorderCoordinator,
    state: PageState<()>,
    pub dialog: FormDialog<ContentForm, ContentId>,
}

impl ModuleDetailPage {
    pub fn new(
        module_id: ModuleId,
        contents: ContentApi,
        backend: Arc<dyn ContentOrderBackend>,
        can_edit: bool,
    ) -> Self {
        Self {
            contents,
            can_edit,
            coordinator: ReorderCoordinator::new(module_id, backend),
            state: PageState::Idle,
            dialog: FormDialog::new(ContentForm::new_for(module_id, 0)),
        }
    }

    pub fn module_id(&self) -> ModuleId {
        self.coordinator.module_id()
    }

    pub fn module(&self) -> Option<&Module> {
        self.coordinator.module()
    }

    pub fn contents(&self) -> &[Content] {
        self.coordinator.contents()
    }

    /// Live view of the content list for rendering while a move settles.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Content>> {
        self.coordinator.subscribe()
    }

    pub fn can_edit(&self) -> bool {
        self.can_edit
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    pub async fn load(&mut self) {
        self.state.start_loading();
        let result = self.coordinator.load().await;
        self.state.finish("module detail", result);
    }

    /// Drag-and-drop result. Failures roll back silently; the outcome still
    /// says what happened.
    pub async fn move_item(&mut self, from: usize, to: usize) -> ClientResult<ReorderOutcome> {
        if !self.can_edit {
            return Ok(ReorderOutcome::Unchanged);
        }
        self.coordinator.move_item(from, to).await
    }

    pub fn open_create(&mut self) {
        let form = ContentForm::new_for(self.module_id(), self.contents().len());
        self.dialog.open_create(form);
    }

    pub fn open_edit(&mut self, content: &Content) {
        self.dialog
            .open_edit(content.id, ContentForm::from_content(content));
    }

    pub async fn save(&mut self) -> bool {
        let contents = self.contents.clone();
        let saved = self
            .dialog
            .submit(|editing, form| async move {
                match editing {
                    Some(id) => contents.update(id, form).await,
                    None => contents.create(form).await,
                }
            })
            .await;
        if saved {
            self.load().await;
        }
        saved
    }

    pub async fn delete(&mut self, id: ContentId) -> ClientResult<()> {
        let result = self.contents.delete(id).await;
        match &result {
            Ok(()) => self.load().await,
            Err(err) => log_failure("delete content", err),
        }
        result
    }
}
