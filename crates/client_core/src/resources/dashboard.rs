use shared::protocol::Dashboard;

use crate::{error::ClientResult, transport::ApiClient};

#[derive(Clone)]
pub struct DashboardApi {
    api: ApiClient,
}

impl DashboardApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Modules, leaderboard and upcoming schedules in one aggregate.
    pub async fn get(&self) -> ClientResult<Dashboard> {
        self.api.get("/dashboard").await
    }
}
