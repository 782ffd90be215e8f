use std::sync::Arc;

use chrono::NaiveDate;
use shared::{
    domain::{ContentId, ModuleId},
    protocol::User,
};
use storage::LocalStore;

use crate::{
    assets::AssetResolver,
    auth::AuthService,
    error::ClientResult,
    pages::{
        ContentDetailPage, DashboardPage, LoginPage, ModuleDetailPage, ModulesPage, ProfilePage,
        RegisterPage, SchedulePage, UsersPage,
    },
    reorder::ApiOrderBackend,
    resources::{ContentApi, DashboardApi, ModuleApi, ScheduleApi, UserApi},
    router::{Navigator, Route, RouteGuard},
    session::SessionStore,
    transport::ApiClient,
};

/// Everything a front end needs, wired around one session.
#[derive(Clone)]
pub struct LmsClient {
    pub session: Arc<SessionStore>,
    pub navigator: Navigator,
    pub api: ApiClient,
    pub assets: AssetResolver,
    pub auth: AuthService,
    pub modules: ModuleApi,
    pub contents: ContentApi,
    pub users: UserApi,
    pub schedules: ScheduleApi,
    pub dashboard: DashboardApi,
}

impl LmsClient {
    /// Hydrates the session from `store` and builds the service graph.
    pub async fn connect(
        api_url: &str,
        storage_url: &str,
        store: Arc<dyn LocalStore>,
    ) -> ClientResult<Self> {
        let session = SessionStore::hydrated(store).await?;
        Self::with_session(api_url, storage_url, session)
    }

    pub fn with_session(
        api_url: &str,
        storage_url: &str,
        session: Arc<SessionStore>,
    ) -> ClientResult<Self> {
        let navigator = Navigator::default();
        let api = ApiClient::new(api_url, Arc::clone(&session), navigator.clone())?;
        Ok(Self {
            assets: AssetResolver::new(storage_url)?,
            auth: AuthService::new(api.clone()),
            modules: ModuleApi::new(api.clone()),
            contents: ContentApi::new(api.clone()),
            users: UserApi::new(api.clone()),
            schedules: ScheduleApi::new(api.clone()),
            dashboard: DashboardApi::new(api.clone()),
            session,
            navigator,
            api,
        })
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.current_user().await
    }

    /// Guarded navigation; returns where the user actually landed.
    pub async fn navigate(&self, route: Route) -> Route {
        RouteGuard::navigate(route, &self.session, &self.navigator).await
    }

    async fn role_flags(&self) -> (bool, bool) {
        match self.current_user().await {
            Some(user) => (user.role.can_edit_content(), user.role.can_manage_users()),
            None => (false, false),
        }
    }

    pub fn login_page(&self) -> LoginPage {
        LoginPage::new(self.auth.clone(), self.navigator.clone())
    }

    pub fn register_page(&self) -> RegisterPage {
        RegisterPage::new(self.auth.clone(), self.navigator.clone())
    }

    pub fn profile_page(&self) -> ProfilePage {
        ProfilePage::new(self.auth.clone(), self.navigator.clone())
    }

    pub fn dashboard_page(&self) -> DashboardPage {
        DashboardPage::new(self.dashboard.clone())
    }

    pub async fn modules_page(&self) -> ModulesPage {
        let (can_edit, _) = self.role_flags().await;
        ModulesPage::new(self.modules.clone(), self.users.clone(), can_edit)
    }

    pub async fn module_detail_page(&self, id: ModuleId) -> ModuleDetailPage {
        let (can_edit, _) = self.role_flags().await;
        let backend = Arc::new(ApiOrderBackend::new(
            self.modules.clone(),
            self.contents.clone(),
        ));
        ModuleDetailPage::new(id, self.contents.clone(), backend, can_edit)
    }

    pub fn content_detail_page(&self, id: ContentId) -> ContentDetailPage {
        ContentDetailPage::new(self.contents.clone(), id)
    }

    pub async fn participants_page(&self) -> UsersPage {
        let (_, can_manage) = self.role_flags().await;
        UsersPage::participants(self.users.clone(), can_manage)
    }

    pub async fn instructors_page(&self) -> UsersPage {
        let (_, can_manage) = self.role_flags().await;
        UsersPage::instructors(self.users.clone(), can_manage)
    }

    pub fn schedule_page(&self, today: NaiveDate) -> SchedulePage {
        SchedulePage::new(self.schedules.clone(), today)
    }
}
