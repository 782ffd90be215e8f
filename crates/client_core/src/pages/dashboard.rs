use shared::protocol::{Dashboard, LeaderboardEntry, Module, Schedule};

use super::PageState;
use crate::resources::DashboardApi;

const CARD_CONTENT_PREVIEW: usize = 4;

/// A module tile with the first few content titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCard<'a> {
    pub module: &'a str,
    pub pemateri: Option<&'a str>,
    pub thumbnail: Option<&'a str>,
    pub content_titles: Vec<&'a str>,
}

pub struct DashboardPage {
    api: DashboardApi,
    pub state: PageState<Dashboard>,
}

impl DashboardPage {
    pub fn new(api: DashboardApi) -> Self {
        Self {
            api,
            state: PageState::Idle,
        }
    }

    pub async fn load(&mut self) {
        self.state.start_loading();
        let result = self.api.get().await;
        self.state.finish("dashboard", result);
    }

    pub fn featured_module(&self) -> Option<&Module> {
        self.state.data()?.modules.first()
    }

    pub fn module_cards(&self) -> Vec<ModuleCard<'_>> {
        let Some(dashboard) = self.state.data() else {
            return Vec::new();
        };
        dashboard
            .modules
            .iter()
            .map(|module| ModuleCard {
                module: &module.title,
                pemateri: module.pemateri.as_ref().map(|p| p.name.as_str()),
                thumbnail: module.thumbnail.as_deref(),
                content_titles: module
                    .contents
                    .iter()
                    .take(CARD_CONTENT_PREVIEW)
                    .map(|c| c.title.as_str())
                    .collect(),
            })
            .collect()
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        self.state
            .data()
            .map(|d| d.leaderboard.as_slice())
            .unwrap_or_default()
    }

    pub fn schedules(&self) -> &[Schedule] {
        self.state
            .data()
            .map(|d| d.schedules.as_slice())
            .unwrap_or_default()
    }
}
