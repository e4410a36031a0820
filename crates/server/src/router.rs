//! HTTP router construction.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api;
use crate::state::AppState;

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/update_slot", get(api::update_slot))
        .route("/lock_check", get(api::lock_check))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use slotkeeper_engine::{Rotation, RotationSettings};
    use slotkeeper_store::MemoryDocumentStore;

    fn credential(slot: &str) -> Value {
        json!({
            "email": "x@example.com",
            "password": "pw",
            "expiry_date": "2030-01-01",
            "locked": 0,
            "usage_count": 0,
            "max_usage": 1,
            "belongs_to_slot": slot,
        })
    }

    /// Slot last shifted long ago and already ended, whatever the wall clock says.
    fn store() -> Arc<MemoryDocumentStore> {
        Arc::new(MemoryDocumentStore::new(json!({
            "settings": { "slots": { "A": {
                "enabled": true,
                "slot_start": "2000-01-01 09:00:00",
                "slot_end": "2000-01-02 09:00:00",
                "frequency": "daily",
                "last_update": "2000-01-01 09:00:00",
            } } },
            "acct-1": credential("A"),
        })))
    }

    fn app(store: Arc<MemoryDocumentStore>) -> Router {
        let rotation = Rotation::new(store, RotationSettings::default());
        build_router(Arc::new(AppState::new(rotation)))
    }

    async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn update_slot_shifts_and_cascades() {
        let store = store();
        let (status, body) = get_text(app(store.clone()), "/update_slot").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, api::UPDATE_SLOT_BODY);
        assert_eq!(store.document("settings/slots/A/slot_start"), "2000-01-02 09:00:00");
        assert_eq!(store.document("acct-1/locked"), json!(1));
    }

    #[tokio::test]
    async fn lock_check_locks_without_shifting() {
        let store = store();
        let (status, body) = get_text(app(store.clone()), "/lock_check").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, api::LOCK_CHECK_BODY);
        assert_eq!(store.document("settings/slots/A/slot_start"), "2000-01-01 09:00:00");
        assert_eq!(store.document("acct-1/locked"), json!(1));
    }

    #[tokio::test]
    async fn triggers_answer_200_when_datastore_is_down() {
        let store = store();
        store.fail_reads_at("settings");
        store.fail_reads_at("");
        let app = app(store.clone());

        let (status, body) = get_text(app.clone(), "/update_slot").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, api::UPDATE_SLOT_BODY));
        let (status, body) = get_text(app, "/lock_check").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, api::LOCK_CHECK_BODY));
        assert!(store.patch_log().is_empty());
    }

    #[tokio::test]
    async fn health_reports_timezone() {
        let (status, body) = get_text(app(store()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["timezone"], "Asia/Kolkata");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (status, _) = get_text(app(store()), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
