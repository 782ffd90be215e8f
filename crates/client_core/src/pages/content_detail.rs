use shared::{domain::ContentId, protocol::Content};

use super::PageState;
use crate::resources::ContentApi;

pub struct ContentDetailPage {
    api: ContentApi,
    id: ContentId,
    pub state: PageState<Content>,
}

impl ContentDetailPage {
    pub fn new(api: ContentApi, id: ContentId) -> Self {
        Self {
            api,
            id,
            state: PageState::Idle,
        }
    }

    pub fn content(&self) -> Option<&Content> {
        self.state.data()
    }

    pub async fn load(&mut self) {
        self.state.start_loading();
        let result = self.api.get(self.id).await;
        self.state.finish("content detail", result);
    }
}
