use serde::Serialize;
use shared::{
    domain::{Role, UserId},
    protocol::{CreateUserRequest, Page, UpdateUserRequest, User, UserSummary},
};
use tracing::info;

use crate::{
    error::{ClientError, ClientResult},
    transport::ApiClient,
};

#[derive(Serialize)]
struct UserListQuery<'a> {
    role: Role,
    #[serde(skip_serializing_if = "str::is_empty")]
    search: &'a str,
}

/// Create/edit dialog contents for a participant or instructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl UserForm {
    pub fn blank(role: Role) -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            role,
        }
    }

    /// Edit form: the password starts empty and is only sent if filled in.
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            password: String::new(),
            role: user.role,
        }
    }

    pub fn validate(&self, creating: bool) -> ClientResult<()> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(ClientError::validation("Name and email are required"));
        }
        if creating && self.password.is_empty() {
            return Err(ClientError::validation("Password is required"));
        }
        Ok(())
    }

    fn into_create(self) -> CreateUserRequest {
        CreateUserRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
            role: self.role,
        }
    }

    fn into_update(self) -> UpdateUserRequest {
        UpdateUserRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            role: self.role,
            password: (!self.password.is_empty()).then_some(self.password),
        }
    }
}

#[derive(Clone)]
pub struct UserApi {
    api: ApiClient,
}

impl UserApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, role: Role, search: &str) -> ClientResult<Vec<User>> {
        let page: Page<User> = self
            .api
            .get_with_query(
                "/users",
                &UserListQuery {
                    role,
                    search: search.trim(),
                },
            )
            .await?;
        Ok(page.data)
    }

    /// Instructors selectable as a module owner.
    pub async fn pemateri_list(&self) -> ClientResult<Vec<UserSummary>> {
        self.api.get("/users/pemateri-list").await
    }

    pub async fn create(&self, form: UserForm) -> ClientResult<()> {
        form.validate(true)?;
        let role = form.role;
        self.api.post_json("/users", &form.into_create()).await?;
        info!(%role, "user created");
        Ok(())
    }

    pub async fn update(&self, id: UserId, form: UserForm) -> ClientResult<()> {
        form.validate(false)?;
        self.api
            .put_json(&format!("/users/{id}"), &form.into_update())
            .await?;
        info!(user_id = %id, "user updated");
        Ok(())
    }

    pub async fn delete(&self, id: UserId) -> ClientResult<()> {
        self.api.delete(&format!("/users/{id}")).await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}
