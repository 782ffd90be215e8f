use reqwest::multipart::Form;
use serde::Serialize;
use shared::{
    domain::{ContentId, ContentType, ModuleId},
    protocol::{Content, Page},
};
use tracing::{debug, info};

use crate::{
    error::{ClientError, ClientResult},
    transport::{form_bool, ApiClient, Upload},
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<ModuleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ContentForm {
    pub module_id: ModuleId,
    pub title: String,
    pub body: String,
    pub content_type: ContentType,
    pub order: u32,
    pub is_published: bool,
    pub thumbnail: Option<Upload>,
}

impl ContentForm {
    /// Blank form for a new item appended after `existing` items.
    pub fn new_for(module_id: ModuleId, existing: usize) -> Self {
        Self {
            module_id,
            title: String::new(),
            body: String::new(),
            content_type: ContentType::Materi,
            order: existing as u32 + 1,
            is_published: false,
            thumbnail: None,
        }
    }

    pub fn from_content(content: &Content) -> Self {
        Self {
            module_id: content.module_id,
            title: content.title.clone(),
            body: content.body.clone(),
            content_type: content.content_type,
            order: content.order,
            is_published: content.is_published,
            thumbnail: None,
        }
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.title.trim().is_empty() || self.body.trim().is_empty() {
            return Err(ClientError::validation("Title and body are required"));
        }
        Ok(())
    }

    fn into_multipart(self) -> ClientResult<Form> {
        let mut form = Form::new()
            .text("module_id", self.module_id.to_string())
            .text("title", self.title)
            .text("body", self.body)
            .text("type", self.content_type.as_str())
            .text("order", self.order.to_string())
            .text("is_published", form_bool(self.is_published));
        if let Some(thumbnail) = self.thumbnail {
            form = form.part("thumbnail", thumbnail.into_part()?);
        }
        Ok(form)
    }
}

#[derive(Clone)]
pub struct ContentApi {
    api: ApiClient,
}

impl ContentApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &ContentQuery) -> ClientResult<Page<Content>> {
        self.api.get_with_query("/contents", query).await
    }

    pub async fn get(&self, id: ContentId) -> ClientResult<Content> {
        self.api.get(&format!("/contents/{id}")).await
    }

    pub async fn create(&self, form: ContentForm) -> ClientResult<()> {
        form.validate()?;
        let module_id = form.module_id;
        self.api.post_multipart("/contents", form.into_multipart()?).await?;
        info!(module_id = %module_id, "content created");
        Ok(())
    }

    pub async fn update(&self, id: ContentId, form: ContentForm) -> ClientResult<()> {
        form.validate()?;
        self.api
            .put_multipart(&format!("/contents/{id}"), form.into_multipart()?)
            .await?;
        info!(content_id = %id, "content updated");
        Ok(())
    }

    /// Order-only patch used by drag-and-drop reordering.
    pub async fn update_order(&self, id: ContentId, order: u32) -> ClientResult<()> {
        let form = Form::new().text("order", order.to_string());
        self.api
            .put_multipart(&format!("/contents/{id}"), form)
            .await?;
        debug!(content_id = %id, order, "content order persisted");
        Ok(())
    }

    pub async fn delete(&self, id: ContentId) -> ClientResult<()> {
        self.api.delete(&format!("/contents/{id}")).await?;
        info!(content_id = %id, "content deleted");
        Ok(())
    }
}
