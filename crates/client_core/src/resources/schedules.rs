use shared::protocol::Schedule;

use crate::{error::ClientResult, transport::ApiClient};

#[derive(Clone)]
pub struct ScheduleApi {
    api: ApiClient,
}

impl ScheduleApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> ClientResult<Vec<Schedule>> {
        self.api.get("/schedules").await
    }
}
