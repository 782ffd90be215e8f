use shared::{
    domain::ModuleId,
    protocol::{Module, UserSummary},
};

use super::{log_failure, FormDialog, PaginatedList, SearchDebouncer};
use crate::{
    error::ClientResult,
    resources::{ModuleApi, ModuleForm, UserApi},
};

/// Searchable, paginated module catalogue with the create/edit dialog.
pub struct ModulesPage {
    modules: ModuleApi,
    users: UserApi,
    can_edit: bool,
    list: PaginatedList<Module>,
    search: SearchDebouncer,
    pemateri_options: Vec<UserSummary>,
    pub dialog: FormDialog<ModuleForm, ModuleId>,
}

impl ModulesPage {
    pub fn new(modules: ModuleApi, users: UserApi, can_edit: bool) -> Self {
        Self {
            modules,
            users,
            can_edit,
            list: PaginatedList::default(),
            search: SearchDebouncer::default(),
            pemateri_options: Vec::new(),
            dialog: FormDialog::new(ModuleForm::default()),
        }
    }

    pub fn list(&self) -> &PaginatedList<Module> {
        &self.list
    }

    pub fn can_edit(&self) -> bool {
        self.can_edit
    }

    pub fn pemateri_options(&self) -> &[UserSummary] {
        &self.pemateri_options
    }

    /// First visit: instructor picker (editors only) and page 1.
    pub async fn open(&mut self) {
        if self.can_edit {
            match self.users.pemateri_list().await {
                Ok(options) => self.pemateri_options = options,
                Err(err) => log_failure("pemateri list", &err),
            }
        }
        let search = self.list.search().to_string();
        self.reload(&search).await;
    }

    /// Pull-to-refresh: restart at page 1 with the current search.
    pub async fn refresh(&mut self) {
        let search = self.list.search().to_string();
        self.reload(&search).await;
    }

    /// Feeds a keystroke-level search value into the debouncer.
    pub fn type_search(&mut self, term: &str) {
        self.search.input(term);
    }

    /// Waits for the debounced term and reloads if it changed.
    pub async fn apply_search(&mut self) -> bool {
        match self.search.settled().await {
            Some(term) => {
                self.reload(&term).await;
                true
            }
            None => false,
        }
    }

    /// Immediate search, bypassing the debouncer.
    pub async fn search_now(&mut self, term: &str) {
        self.search.commit(term);
        self.reload(term).await;
    }

    pub async fn load_more(&mut self) -> bool {
        let Some(query) = self.list.next_query() else {
            return false;
        };
        let result = self.modules.list(&query).await;
        self.list.apply(&query, result);
        true
    }

    async fn reload(&mut self, search: &str) {
        let query = self.list.reset(search);
        let result = self.modules.list(&query).await;
        self.list.apply(&query, result);
    }

    pub fn open_create(&mut self) {
        self.dialog.open_create(ModuleForm::default());
    }

    pub fn open_edit(&mut self, module: &Module) {
        self.dialog.open_edit(module.id, ModuleForm::from_module(module));
    }

    pub async fn save(&mut self) -> bool {
        let modules = self.modules.clone();
        let saved = self
            .dialog
            .submit(|editing, form| async move {
                match editing {
                    Some(id) => modules.update(id, form).await,
                    None => modules.create(form).await,
                }
            })
            .await;
        if saved {
            self.refresh().await;
        }
        saved
    }

    pub async fn delete(&mut self, id: ModuleId) -> ClientResult<()> {
        let result = self.modules.delete(id).await;
        match &result {
            Ok(()) => self.refresh().await,
            Err(err) => log_failure("delete module", err),
        }
        result
    }
}
