use shared::{
    domain::{Role, UserId},
    protocol::User,
};

use super::{log_failure, FormDialog, PageState, SearchDebouncer};
use crate::{
    error::ClientResult,
    resources::{UserApi, UserForm},
};

/// Participant or instructor administration, filtered by `role`.
pub struct UsersPage {
    api: UserApi,
    role: Role,
    can_manage: bool,
    search: SearchDebouncer,
    pub state: PageState<Vec<User>>,
    pub dialog: FormDialog<UserForm, UserId>,
}

impl UsersPage {
    pub fn new(api: UserApi, role: Role, can_manage: bool) -> Self {
        Self {
            api,
            role,
            can_manage,
            search: SearchDebouncer::default(),
            state: PageState::Idle,
            dialog: FormDialog::new(UserForm::blank(role)),
        }
    }

    pub fn participants(api: UserApi, can_manage: bool) -> Self {
        Self::new(api, Role::Peserta, can_manage)
    }

    pub fn instructors(api: UserApi, can_manage: bool) -> Self {
        Self::new(api, Role::Pemateri, can_manage)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn can_manage(&self) -> bool {
        self.can_manage
    }

    /// Only instructors can be edited after creation.
    pub fn supports_edit(&self) -> bool {
        self.can_manage && self.role == Role::Pemateri
    }

    pub fn users(&self) -> &[User] {
        self.state.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn search_term(&self) -> &str {
        self.search.committed()
    }

    pub async fn load(&mut self) {
        self.state.start_loading();
        let result = self.api.list(self.role, self.search.committed()).await;
        self.state.finish("user list", result);
    }

    pub fn type_search(&mut self, term: &str) {
        self.search.input(term);
    }

    pub async fn search_now(&mut self, term: &str) {
        self.search.commit(term);
        self.load().await;
    }

    pub async fn apply_search(&mut self) -> bool {
        if self.search.settled().await.is_some() {
            self.load().await;
            return true;
        }
        false
    }

    pub fn open_create(&mut self) {
        self.dialog.open_create(UserForm::blank(self.role));
    }

    pub fn open_edit(&mut self, user: &User) -> bool {
        if !self.supports_edit() {
            return false;
        }
        self.dialog.open_edit(user.id, UserForm::from_user(user));
        true
    }

    pub async fn save(&mut self) -> bool {
        let api = self.api.clone();
        let saved = self
            .dialog
            .submit(|editing, form| async move {
                match editing {
                    Some(id) => api.update(id, form).await,
                    None => api.create(form).await,
                }
            })
            .await;
        if saved {
            self.load().await;
        }
        saved
    }

    pub async fn delete(&mut self, id: UserId) -> ClientResult<()> {
        let result = self.api.delete(id).await;
        match &result {
            Ok(()) => self.load().await,
            Err(err) => log_failure("delete user", err),
        }
        result
    }
}
