//! Trigger route handlers.
//!
//! Both triggers always answer 200 with a fixed body; what happened is only
//! visible in the logs.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use slotkeeper_engine::{CycleReport, LockOutcome, ShiftOutcome};

use crate::state::AppState;

pub const UPDATE_SLOT_BODY: &str = "Slot times updated!\n";
pub const LOCK_CHECK_BODY: &str = "Lock check done.\n";

// ── Health ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timezone: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timezone: state.rotation.settings().tz.to_string(),
    })
}

// ── Triggers ──────────────────────────────────────────────────────

pub async fn update_slot(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    let _guard = state.trigger_lock.lock().await;
    let report = state.rotation.update_slots(state.rotation.now()).await;
    log_cycle(&report);
    (StatusCode::OK, UPDATE_SLOT_BODY)
}

pub async fn lock_check(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    let _guard = state.trigger_lock.lock().await;
    let outcome = state.rotation.lock_check(state.rotation.now()).await;
    log_lock(&outcome);
    (StatusCode::OK, LOCK_CHECK_BODY)
}

pub fn log_cycle(report: &CycleReport) {
    match &report.shift {
        ShiftOutcome::Persisted { shifted } => info!(slots = ?shifted, "update_slot: slots shifted"),
        ShiftOutcome::PersistFailed { shifted, error } => {
            info!(slots = ?shifted, error = %error, "update_slot: shift not persisted")
        }
        other => info!(outcome = ?other, "update_slot: nothing shifted"),
    }
    if let Some(lock) = &report.lock {
        log_lock(lock);
    }
}

pub fn log_lock(outcome: &LockOutcome) {
    match outcome {
        LockOutcome::Unavailable => info!("lock_check: datastore unavailable"),
        LockOutcome::Completed(report) => info!(
            locked = report.locked.len(),
            failed = report.failed.len(),
            due_slots = ?report.due_slots,
            "lock_check: done"
        ),
    }
}
