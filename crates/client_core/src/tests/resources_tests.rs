use super::*;
use crate::mock_api::{MockApi, ADMIN_EMAIL, DETAIL_MODULE};
use crate::transport::Upload;
use serde_json::json;
use shared::{
    domain::{ContentId, ContentType, ModuleId, Role, UserId},
    protocol::User,
};

#[test]
fn list_query_omits_blank_search_and_clamps_page() {
    assert_eq!(
        serde_json::to_value(ListQuery::first_page("   ")).unwrap(),
        json!({ "page": 1, "per_page": 10 })
    );
    let query = ListQuery::page(" safety ", 0);
    assert_eq!(query.search.as_deref(), Some("safety"));
    assert_eq!(query.page, 1);
    assert_eq!(ListQuery::default(), ListQuery::first_page(""));
}

#[test]
fn new_content_form_appends_after_existing_items() {
    let form = ContentForm::new_for(ModuleId(4), 3);
    assert_eq!(form.order, 4);
    assert_eq!(form.content_type, ContentType::Materi);
    assert!(!form.is_published);
    assert!(form.validate().is_err());
}

#[tokio::test]
async fn module_list_follows_pagination_and_search() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    let first = client.modules.list(&ListQuery::first_page("")).await.expect("page 1");
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.last_page, 3);

    let searched = client
        .modules
        .list(&ListQuery::first_page("module 3"))
        .await
        .expect("search");
    let titles: Vec<_> = searched.data.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, ["Module 30", "Module 31", "Module 32"]);

    let recorded = mock.requests("GET", "/modules").await;
    assert_eq!(recorded[1].query.get("search").map(String::as_str), Some("module 3"));
    assert_eq!(recorded[1].query.get("per_page").map(String::as_str), Some("10"));
}

#[tokio::test]
async fn module_detail_lists_contents_in_order() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    let module = client.modules.get(DETAIL_MODULE).await.expect("module");

    let orders: Vec<u32> = module.contents.iter().map(|c| c.order).collect();
    assert_eq!(orders, [1, 2, 3, 4, 5]);
    assert_eq!(module.pemateri.map(|p| p.id), Some(UserId(2)));
}

#[tokio::test]
async fn module_without_title_is_rejected_locally() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;
    let before = mock.request_count().await;

    let err = client
        .modules
        .create(ModuleForm::default())
        .await
        .expect_err("blank title");

    assert_eq!(err.to_string(), "Module title is required");
    assert_eq!(mock.request_count().await, before);
}

#[tokio::test]
async fn module_create_sends_multipart_fields_and_thumbnail() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    client
        .modules
        .create(ModuleForm {
            title: "Pertolongan Pertama".to_string(),
            description: "P3K dasar".to_string(),
            is_active: false,
            pemateri_id: Some(UserId(2)),
            thumbnail: Some(Upload {
                filename: "p3k.png".to_string(),
                mime_type: Some("image/png".to_string()),
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
            }),
        })
        .await
        .expect("create");

    let form = &mock.requests("POST", "/modules").await[0].form;
    assert_eq!(form["title"], "Pertolongan Pertama");
    assert_eq!(form["is_active"], "0");
    assert_eq!(form["pemateri_id"], "2");
    assert_eq!(form["thumbnail"], "file:p3k.png");
}

#[tokio::test]
async fn order_update_sends_only_the_order_field() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    client
        .contents
        .update_order(ContentId(103), 1)
        .await
        .expect("order");

    let recorded = &mock.requests("POST", "/contents/103").await[0];
    assert_eq!(recorded.form.len(), 1);
    assert_eq!(recorded.form["order"], "1");
    assert_eq!(recorded.query["_method"], "PUT");
}

#[tokio::test]
async fn content_create_then_fetch() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    let mut form = ContentForm::new_for(DETAIL_MODULE, 5);
    form.title = "F".to_string();
    form.body = "Sixth item".to_string();
    form.is_published = true;
    client.contents.create(form).await.expect("create");

    let recorded = &mock.requests("POST", "/contents").await[0].form;
    assert_eq!(recorded["order"], "6");
    assert_eq!(recorded["type"], "materi");
    assert_eq!(recorded["is_published"], "1");
    assert_eq!(mock.state.lock().await.content_order(DETAIL_MODULE).last().map(String::as_str), Some("F"));
}

#[tokio::test]
async fn user_list_filters_by_role_and_search() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    let participants = client.users.list(Role::Peserta, "").await.expect("list");
    assert_eq!(participants.len(), 2);
    assert!(mock.requests("GET", "/users").await[0].query.get("search").is_none());

    let filtered = client.users.list(Role::Peserta, " sari ").await.expect("search");
    let names: Vec<_> = filtered.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Sari Peserta"]);

    let recorded = &mock.requests("GET", "/users").await[1];
    assert_eq!(recorded.query["role"], "peserta");
    assert_eq!(recorded.query["search"], "sari");
}

#[tokio::test]
async fn pemateri_list_returns_instructor_summaries() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    let instructors = client.users.pemateri_list().await.expect("pemateri");

    assert_eq!(instructors.len(), 1);
    assert_eq!(instructors[0].name, "Budi Pemateri");
}

#[tokio::test]
async fn user_update_without_password_omits_it() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;
    let existing = User {
        id: UserId(3),
        name: "Sari Peserta".to_string(),
        email: "sari@lms.test".to_string(),
        role: Role::Peserta,
        avatar: None,
    };

    let mut form = UserForm::from_user(&existing);
    form.name = "Sari P.".to_string();
    client.users.update(existing.id, form).await.expect("update");

    let body = mock.requests("PUT", "/users/3").await[0]
        .json
        .clone()
        .expect("json body");
    assert_eq!(body["name"], "Sari P.");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn user_create_requires_password() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    let mut form = UserForm::blank(Role::Pemateri);
    form.name = "Dewi".to_string();
    form.email = "dewi@lms.test".to_string();
    let err = client.users.create(form.clone()).await.expect_err("no password");
    assert_eq!(err.to_string(), "Password is required");

    form.password = "secret".to_string();
    client.users.create(form).await.expect("create");
    let body = mock.requests("POST", "/users").await[0].json.clone().unwrap();
    assert_eq!(body["role"], "pemateri");
}

#[tokio::test]
async fn dashboard_and_schedules_decode() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    let dashboard = client.dashboard.get().await.expect("dashboard");
    assert_eq!(dashboard.modules.len(), 3);
    assert_eq!(dashboard.leaderboard[0].total_point, 1200);

    let schedules = client.schedules.list().await.expect("schedules");
    assert_eq!(schedules.len(), 3);
    assert!(schedules.iter().all(|s| s.starts_at().is_some()));
}

#[tokio::test]
async fn content_list_filters_by_module_and_type() {
    let mock = MockApi::seeded().await;
    let client = mock.signed_in_client(ADMIN_EMAIL).await;

    let page = client
        .contents
        .list(&ContentQuery {
            module_id: Some(DETAIL_MODULE),
            content_type: Some(ContentType::Materi),
            ..ContentQuery::default()
        })
        .await
        .expect("contents");

    assert_eq!(page.data.len(), 5);
    let recorded = &mock.requests("GET", "/contents").await[0];
    assert_eq!(recorded.query["module_id"], "10");
    assert_eq!(recorded.query["type"], "materi");
    assert!(!recorded.query.contains_key("search"));
}
