use super::*;
use crate::mock_api::{MockApi, ADMIN_EMAIL, STORAGE_URL};
use crate::LmsClient;
use reqwest::multipart::Form;
use shared::protocol::{CreateUserRequest, Dashboard, Module, Schedule};
use shared::domain::Role;
use storage::{LocalStore, MemoryLocalStore, TOKEN_KEY, USER_KEY};

#[tokio::test]
async fn bearer_token_is_attached_once_signed_in() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    let schedules: Vec<Schedule> = client.api.get("/schedules").await.expect("schedules");

    assert_eq!(schedules.len(), 3);
    let recorded = mock.requests("GET", "/schedules").await;
    assert_eq!(recorded[0].bearer.as_deref(), Some("token-1"));
}

#[tokio::test]
async fn anonymous_requests_carry_no_token() {
    let mock = MockApi::seeded().await;
    let client = mock.client().await;

    let err = client
        .api
        .get::<Dashboard>("/dashboard")
        .await
        .expect_err("anonymous dashboard");

    assert!(err.is_unauthorized());
    assert_eq!(mock.requests("GET", "/dashboard").await[0].bearer, None);
}

#[tokio::test]
async fn unauthorized_response_clears_session_and_redirects_to_login() {
    let mock = MockApi::seeded().await;
    let store = Arc::new(MemoryLocalStore::new());
    let client = LmsClient::connect(&mock.base_url, STORAGE_URL, store.clone())
        .await
        .expect("client");
    client.auth.login(ADMIN_EMAIL, "secret").await.expect("login");
    client.navigate(Route::Modules).await;
    let mut events = client.session.subscribe();
    mock.state.lock().await.reject_tokens = true;

    let err = client
        .api
        .get::<Dashboard>("/dashboard")
        .await
        .expect_err("revoked token");

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!client.session.is_authenticated().await);
    assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
    assert_eq!(store.get(USER_KEY).await.unwrap(), None);
    assert_eq!(client.navigator.current(), Route::Login);
    assert_eq!(
        events.recv().await.unwrap(),
        crate::session::SessionEvent::Cleared {
            reason: ClearReason::Unauthorized
        }
    );
}

#[tokio::test]
async fn validation_errors_are_decoded_and_session_survives() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    let err = client
        .api
        .post_json(
            "/users",
            &CreateUserRequest {
                name: "Dup".to_string(),
                email: ADMIN_EMAIL.to_string(),
                password: "secret".to_string(),
                role: Role::Peserta,
            },
        )
        .await
        .expect_err("duplicate email");

    assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
    assert!(err.is_validation());
    assert_eq!(err.dialog_message("Failed"), "The email has already been taken.");
    assert!(client.session.is_authenticated().await);
}

#[tokio::test]
async fn missing_resource_maps_to_not_found_message() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    let err = client.api.get::<Module>("/modules/999").await.expect_err("missing");

    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.page_message(), "Not found");
}

#[tokio::test]
async fn unexpected_payload_shape_is_a_decode_error() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    let err = client
        .api
        .get::<Vec<Module>>("/dashboard")
        .await
        .expect_err("shape mismatch");

    assert!(matches!(err, ClientError::Decode { ref endpoint, .. } if endpoint == "/dashboard"));
}

#[tokio::test]
async fn multipart_update_tunnels_put_through_post() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    client
        .api
        .put_multipart("/modules/11", Form::new().text("title", "Renamed"))
        .await
        .expect("update");

    let recorded = mock.requests("POST", "/modules/11").await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].query.get("_method").map(String::as_str), Some("PUT"));
    assert_eq!(recorded[0].form.get("title").map(String::as_str), Some("Renamed"));
}

#[test]
fn base_url_keeps_its_path_prefix() {
    let session = SessionStore::new(Arc::new(MemoryLocalStore::new()));
    let api = ApiClient::new("http://lms.test/api", session, Navigator::default()).unwrap();
    assert_eq!(api.base_url().as_str(), "http://lms.test/api/");
    assert_eq!(
        api.endpoint("/modules/3").unwrap().as_str(),
        "http://lms.test/api/modules/3"
    );
}

#[test]
fn upload_rejects_malformed_mime_type() {
    let upload = Upload {
        filename: "thumb.png".to_string(),
        mime_type: Some("not a mime".to_string()),
        bytes: vec![1, 2, 3],
    };
    assert!(upload.into_part().is_err());
    assert_eq!(form_bool(true), "1");
    assert_eq!(form_bool(false), "0");
}
