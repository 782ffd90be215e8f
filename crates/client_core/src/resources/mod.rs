//! Typed clients for the LMS resources. Each is a thin mapping from an
//! operation to one HTTP call through [`ApiClient`](crate::transport::ApiClient).

mod contents;
mod dashboard;
mod modules;
mod schedules;
mod users;

use serde::Serialize;

pub use contents::{ContentApi, ContentForm, ContentQuery};
pub use dashboard::DashboardApi;
pub use modules::{ModuleApi, ModuleForm};
pub use schedules::ScheduleApi;
pub use users::{UserApi, UserForm};

pub const DEFAULT_PER_PAGE: u32 = 10;

/// Search/pagination parameters shared by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl ListQuery {
    pub fn first_page(search: &str) -> Self {
        Self::page(search, 1)
    }

    pub fn page(search: &str, page: u32) -> Self {
        let search = search.trim();
        Self {
            search: (!search.is_empty()).then(|| search.to_string()),
            page: page.max(1),
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::first_page("")
    }
}

#[cfg(test)]
#[path = "../tests/resources_tests.rs"]
mod tests;
