//! HTTP adapter for the LMS API.
//!
//! Every request carries the bearer token when one is present. A 401 from
//! any authenticated call clears the session and redirects to the login
//! route before the error is handed back to the caller.

use std::sync::Arc;

use reqwest::{
    header::{HeaderValue, ACCEPT},
    multipart::{Form, Part},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use shared::{error::ApiErrorBody, protocol::Envelope};
use tracing::{debug, error, warn};
use url::Url;

use crate::{
    error::{ClientError, ClientResult},
    router::{Navigator, Route},
    session::{ClearReason, SessionStore},
};

/// A file attached to a multipart form, e.g. a module thumbnail.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub(crate) fn into_part(self) -> ClientResult<Part> {
        let part = Part::bytes(self.bytes).file_name(self.filename);
        match self.mime_type {
            Some(mime) => Ok(part.mime_str(&mime)?),
            None => Ok(part),
        }
    }
}

/// Multipart booleans are sent the way the API's form validation expects.
pub(crate) fn form_bool(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Arc<SessionStore>,
    navigator: Navigator,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session: Arc<SessionStore>,
        navigator: Navigator,
    ) -> ClientResult<Self> {
        Self::with_http_client(Client::new(), base_url, session, navigator)
    }

    pub fn with_http_client(
        http: Client,
        base_url: &str,
        session: Arc<SessionStore>,
        navigator: Navigator,
    ) -> ClientResult<Self> {
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            session,
            navigator,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        Ok(self
            .http
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json")))
    }

    /// Sends an authenticated request and applies the 401 policy.
    pub async fn send(&self, builder: RequestBuilder, endpoint: &str) -> ClientResult<Response> {
        let builder = match self.session.token().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await.map_err(|err| {
            error!(endpoint, error = %err, "request failed");
            ClientError::Transport(err)
        })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(endpoint, "unauthorized response; clearing session");
            if let Err(err) = self.session.clear(ClearReason::Unauthorized).await {
                error!(endpoint, error = %err, "failed to clear persisted session");
            }
            self.navigator.redirect(Route::Login);
            return Err(ClientError::Unauthorized);
        }

        Self::check_status(response, endpoint).await
    }

    /// Sends a request that is itself establishing credentials. A 401 here
    /// means wrong credentials and is reported like any other API error.
    pub async fn send_credentials(
        &self,
        builder: RequestBuilder,
        endpoint: &str,
    ) -> ClientResult<Response> {
        let response = builder.send().await.map_err(|err| {
            error!(endpoint, error = %err, "request failed");
            ClientError::Transport(err)
        })?;
        Self::check_status(response, endpoint).await
    }

    async fn check_status(response: Response, endpoint: &str) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            debug!(endpoint, status = status.as_u16(), "request ok");
            return Ok(response);
        }

        let raw = response.bytes().await.unwrap_or_default();
        let body = serde_json::from_slice::<ApiErrorBody>(&raw).unwrap_or_else(|_| {
            ApiErrorBody::new(format!(
                "unexpected {} response",
                status.canonical_reason().unwrap_or("error")
            ))
        });
        if status.is_server_error() {
            error!(endpoint, status = status.as_u16(), "server error");
        } else {
            debug!(endpoint, status = status.as_u16(), "api rejected request");
        }
        Err(ClientError::Api { status, body })
    }

    pub(crate) async fn decode<T: DeserializeOwned>(
        response: Response,
        endpoint: &str,
    ) -> ClientResult<T> {
        let raw = response.bytes().await?;
        let envelope: Envelope<T> =
            serde_json::from_slice(&raw).map_err(|source| ClientError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })?;
        Ok(envelope.data)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let builder = self.request(Method::GET, path)?;
        let response = self.send(builder, path).await?;
        Self::decode(response, path).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path)?.query(query);
        let response = self.send(builder, path).await?;
        Self::decode(response, path).await
    }

    pub async fn post_json<B>(&self, path: &str, body: &B) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path)?.json(body);
        self.execute(builder, path).await
    }

    pub async fn put_json<B>(&self, path: &str, body: &B) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, path)?.json(body);
        self.execute(builder, path).await
    }

    /// Bodiless POST, e.g. `/auth/logout`.
    pub async fn post_empty(&self, path: &str) -> ClientResult<()> {
        let builder = self.request(Method::POST, path)?;
        self.execute(builder, path).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, path)?;
        self.execute(builder, path).await
    }

    /// Sends a request whose response body is irrelevant.
    pub async fn execute(&self, builder: RequestBuilder, endpoint: &str) -> ClientResult<()> {
        self.send(builder, endpoint).await?;
        Ok(())
    }

    pub async fn post_multipart(&self, path: &str, form: Form) -> ClientResult<()> {
        let builder = self.request(Method::POST, path)?.multipart(form);
        self.execute(builder, path).await
    }

    /// Multipart update. The API only parses multipart bodies on POST, so the
    /// verb travels as `_method=PUT`.
    pub async fn put_multipart(&self, path: &str, form: Form) -> ClientResult<()> {
        let builder = self
            .request(Method::POST, path)?
            .query(&[("_method", "PUT")])
            .multipart(form);
        self.execute(builder, path).await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
