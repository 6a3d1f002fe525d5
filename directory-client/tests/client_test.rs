//! Integration tests for the directory client against a mock HTTP server

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use directory_client::{Directory, DirectoryClient, PAGE_SIZE};
use shared::UserPayload;

fn client(server: &MockServer) -> DirectoryClient {
    DirectoryClient::new(server.uri(), "secret-token", "test-password")
        .expect("client builds")
}

fn user_entry(n: usize) -> Value {
    json!({
        "documentId": format!("doc-{n}"),
        "username": format!("{}", 1000 + n),
        "email": format!("{}@hovawarte.com", 1000 + n),
        "cId": n,
        "blocked": false
    })
}

#[tokio::test]
async fn fetch_all_users_paginates_until_short_page() {
    let server = MockServer::start().await;

    let full_page: Vec<Value> = (0..PAGE_SIZE).map(user_entry).collect();
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "variables": { "page": 1 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "usersPermissionsUsers": full_page }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "variables": { "page": 2 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "usersPermissionsUsers": [user_entry(PAGE_SIZE)] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = client(&server).fetch_all_users().await.expect("fetch ok");
    assert_eq!(users.len(), PAGE_SIZE + 1);
    assert_eq!(users[0].document_id, "doc-0");
    assert_eq!(users[PAGE_SIZE].c_id, Some(PAGE_SIZE as i64));
}

#[tokio::test]
async fn fetch_all_users_stops_on_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "usersPermissionsUsers": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = client(&server).fetch_all_users().await.expect("fetch ok");
    assert!(users.is_empty());
}

#[tokio::test]
async fn fetch_all_breeders_keys_by_owning_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "hzdPluginBreeders": [
                {
                    "documentId": "breeder-1",
                    "cId": 1234,
                    "IsActive": true,
                    "kennelName": "vom Beispielhof",
                    "member": { "documentId": "doc-1" }
                },
                {
                    "documentId": "breeder-orphan",
                    "IsActive": false,
                    "member": null
                }
            ] }
        })))
        .mount(&server)
        .await;

    let breeders = client(&server).fetch_all_breeders().await.expect("fetch ok");
    assert_eq!(breeders.len(), 1);
    let breeder = breeders.get("doc-1").expect("linked breeder present");
    assert_eq!(breeder.document_id, "breeder-1");
    assert!(breeder.is_active);
    assert_eq!(breeder.kennel_name.as_deref(), Some("vom Beispielhof"));
}

#[tokio::test]
async fn requests_carry_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "usersPermissionsUsers": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).fetch_all_users().await.expect("fetch ok");
}

#[tokio::test]
async fn register_user_returns_document_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": { "input": { "username": "4200", "password": "test-password" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "register": { "user": { "documentId": "doc-new", "username": "4200" } } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let doc_id = client(&server)
        .register_user("4200", "4200@hovawarte.com")
        .await
        .expect("register ok");
    assert_eq!(doc_id.as_deref(), Some("doc-new"));
}

#[tokio::test]
async fn application_errors_are_not_retried() {
    let server = MockServer::start().await;

    // One call only: a structured error response must not trigger a retry
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "Email is already taken" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let doc_id = client(&server)
        .register_user("4200", "4200@hovawarte.com")
        .await
        .expect("api errors surface as None");
    assert_eq!(doc_id, None);
}

#[tokio::test]
async fn update_user_surfaces_api_error_as_false() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "Invalid field" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ok = client(&server)
        .update_user("doc-1", &UserPayload::default())
        .await
        .expect("api errors surface as false");
    assert!(!ok);
}

#[tokio::test]
async fn server_errors_are_retried_with_backoff() {
    let server = MockServer::start().await;

    // First attempt hits a 500, the retry succeeds
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "usersPermissionsUsers": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = client(&server).fetch_all_users().await.expect("retry succeeds");
    assert!(users.is_empty());
}

#[tokio::test]
async fn retries_exhausted_is_a_terminal_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let result = client(&server).fetch_all_users().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn find_user_by_external_id_returns_first_match() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "cId": 1234 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "usersPermissionsUsers": [{ "documentId": "doc-1" }] }
        })))
        .mount(&server)
        .await;

    let doc_id = client(&server)
        .find_user_by_external_id(1234)
        .await
        .expect("lookup ok");
    assert_eq!(doc_id.as_deref(), Some("doc-1"));
}
