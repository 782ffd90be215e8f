use reqwest::multipart::Form;
use shared::{
    domain::{ModuleId, UserId},
    protocol::{Module, Page},
};
use tracing::info;

use super::ListQuery;
use crate::{
    error::{ClientError, ClientResult},
    transport::{form_bool, ApiClient, Upload},
};

#[derive(Debug, Clone)]
pub struct ModuleForm {
    pub title: String,
    pub description: String,
    pub is_active: bool,
    pub pemateri_id: Option<UserId>,
    pub thumbnail: Option<Upload>,
}

impl Default for ModuleForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            is_active: true,
            pemateri_id: None,
            thumbnail: None,
        }
    }
}

impl ModuleForm {
    /// Pre-fills the edit dialog from an existing module.
    pub fn from_module(module: &Module) -> Self {
        Self {
            title: module.title.clone(),
            description: module.description.clone().unwrap_or_default(),
            is_active: module.is_active,
            pemateri_id: module.pemateri.as_ref().map(|p| p.id),
            thumbnail: None,
        }
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.title.trim().is_empty() {
            return Err(ClientError::validation("Module title is required"));
        }
        Ok(())
    }

    fn into_multipart(self) -> ClientResult<Form> {
        let mut form = Form::new()
            .text("title", self.title)
            .text("description", self.description)
            .text("is_active", form_bool(self.is_active));
        if let Some(pemateri_id) = self.pemateri_id {
            form = form.text("pemateri_id", pemateri_id.to_string());
        }
        if let Some(thumbnail) = self.thumbnail {
            form = form.part("thumbnail", thumbnail.into_part()?);
        }
        Ok(form)
    }
}

#[derive(Clone)]
pub struct ModuleApi {
    api: ApiClient,
}

impl ModuleApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<Module>> {
        self.api.get_with_query("/modules", query).await
    }

    /// One module with its ordered contents.
    pub async fn get(&self, id: ModuleId) -> ClientResult<Module> {
        let mut module: Module = self.api.get(&format!("/modules/{id}")).await?;
        module.contents.sort_by_key(|c| c.order);
        Ok(module)
    }

    pub async fn create(&self, form: ModuleForm) -> ClientResult<()> {
        form.validate()?;
        self.api.post_multipart("/modules", form.into_multipart()?).await?;
        info!("module created");
        Ok(())
    }

    pub async fn update(&self, id: ModuleId, form: ModuleForm) -> ClientResult<()> {
        form.validate()?;
        self.api
            .put_multipart(&format!("/modules/{id}"), form.into_multipart()?)
            .await?;
        info!(module_id = %id, "module updated");
        Ok(())
    }

    pub async fn delete(&self, id: ModuleId) -> ClientResult<()> {
        self.api.delete(&format!("/modules/{id}")).await?;
        info!(module_id = %id, "module deleted");
        Ok(())
    }
}
