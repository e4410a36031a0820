//! HttpDocumentStore against a mock REST datastore.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use slotkeeper_store::{DocumentStore, HttpDocumentStore, StoreError};

#[tokio::test]
async fn fetch_settings_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/settings.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "slots": { "A": { "enabled": true } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpDocumentStore::new(&server.uri(), None, None).unwrap();
    let doc = store.fetch_document("settings").await.unwrap();
    assert_eq!(doc["slots"]["A"]["enabled"], json!(true));
}

#[tokio::test]
async fn fetch_root_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cred1": { "locked": 0 } })))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpDocumentStore::new(&server.uri(), None, None).unwrap();
    let doc = store.fetch_document("").await.unwrap();
    assert_eq!(doc["cred1"]["locked"], json!(0));
}

#[tokio::test]
async fn missing_document_reads_as_null() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/settings.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let store = HttpDocumentStore::new(&server.uri(), None, None).unwrap();
    assert!(store.fetch_document("settings").await.unwrap().is_null());
}

#[tokio::test]
async fn non_200_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/settings.json"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Permission denied"))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/cred1.json"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let store = HttpDocumentStore::new(&server.uri(), None, None).unwrap();
    match store.fetch_document("settings").await.unwrap_err() {
        StoreError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "Permission denied");
        }
        other => panic!("expected Status error, got: {other:?}"),
    }

    // Anything but 200 counts as failure, even other 2xx codes.
    let err = store
        .patch_document("cred1", &json!({ "locked": 1 }))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 204, .. }));
}

#[tokio::test]
async fn invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let store = HttpDocumentStore::new(&server.uri(), None, None).unwrap();
    assert!(matches!(
        store.fetch_document("").await.unwrap_err(),
        StoreError::Decode(_)
    ));
}

#[tokio::test]
async fn patch_sends_json_body_and_auth() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/cred1.json"))
        .and(query_param("auth", "secret-token"))
        .and(body_json(json!({ "locked": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "locked": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let store =
        HttpDocumentStore::new(&server.uri(), Some("secret-token".to_string()), None).unwrap();
    store
        .patch_document("cred1", &json!({ "locked": 1 }))
        .await
        .unwrap();
}

#[tokio::test]
async fn unreachable_store_is_an_http_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpDocumentStore::new(&format!("http://{addr}"), None, None).unwrap();
    assert!(matches!(
        store.fetch_document("settings").await.unwrap_err(),
        StoreError::Http(_)
    ));
}
