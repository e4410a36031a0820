//! LOCK phase: lock credentials of slots that are about to end.

use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use slotkeeper_core::{
    is_empty_document, lock_patch, Credential, Slot, SETTINGS_PATH, SLOTS_FIELD,
};
use slotkeeper_store::{DocumentStore, ROOT_PATH};

use crate::settings::RotationSettings;

/// Result of one LOCK run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    /// Settings or the root document could not be read, or read as empty.
    Unavailable,
    Completed(LockReport),
}

impl LockOutcome {
    /// Credentials newly locked by this run.
    pub fn locked_count(&self) -> usize {
        match self {
            LockOutcome::Unavailable => 0,
            LockOutcome::Completed(report) => report.locked.len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockReport {
    /// Slots whose end fell within the margin.
    pub due_slots: Vec<String>,
    /// Credential keys written as locked.
    pub locked: Vec<String>,
    /// Credential keys whose lock write failed.
    pub failed: Vec<String>,
}

pub struct CredentialLocker {
    store: Arc<dyn DocumentStore>,
    settings: RotationSettings,
}

impl CredentialLocker {
    pub fn new(store: Arc<dyn DocumentStore>, settings: RotationSettings) -> Self {
        Self { store, settings }
    }

    /// Lock every unlocked credential whose slot ends within `lock_margin` of `now`.
    ///
    /// A failed write skips that credential; the rest of the run continues.
    pub async fn run(&self, now: DateTime<Tz>) -> LockOutcome {
        let now = now.with_timezone(&self.settings.tz);

        let Some(settings) = self.read_nonempty(SETTINGS_PATH, "settings").await else {
            return LockOutcome::Unavailable;
        };
        let Some(root) = self.read_nonempty(ROOT_PATH, "root").await else {
            return LockOutcome::Unavailable;
        };

        let empty = Map::new();
        let slots = settings
            .get(SLOTS_FIELD)
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let records = root.as_object().unwrap_or(&empty);

        let mut report = LockReport {
            due_slots: due_slots(slots, &self.settings, &now),
            ..LockReport::default()
        };

        for credential in lock_candidates(&report.due_slots, records) {
            match self.store.patch_document(&credential.key, &lock_patch()).await {
                Ok(()) => {
                    debug!(credential = %credential.key, "Credential locked");
                    report.locked.push(credential.key);
                }
                Err(e) => {
                    warn!(credential = %credential.key, error = %e, "Failed to lock credential");
                    report.failed.push(credential.key);
                }
            }
        }

        info!(
            due_slots = report.due_slots.len(),
            failed = report.failed.len(),
            "Locked {} credentials in total",
            report.locked.len()
        );
        LockOutcome::Completed(report)
    }

    async fn read_nonempty(&self, path: &str, what: &str) -> Option<Value> {
        match self.store.fetch_document(path).await {
            Ok(doc) if !is_empty_document(&doc) => Some(doc),
            Ok(_) => {
                info!(document = what, "No data => skip LOCK");
                None
            }
            Err(e) => {
                warn!(document = what, error = %e, "Failed to read => skip LOCK");
                None
            }
        }
    }
}

/// Ids of enabled slots with `now >= slot_end - lock_margin`.
///
/// Slots whose end does not parse are never due.
pub fn due_slots(
    slots: &Map<String, Value>,
    settings: &RotationSettings,
    now: &DateTime<Tz>,
) -> Vec<String> {
    slots
        .iter()
        .filter_map(|(id, entry)| Slot::from_entry(id, entry))
        .filter(|slot| slot.enabled)
        .filter(|slot| match slot.lock_deadline(settings.tz) {
            Some(end) => *now >= end - settings.lock_margin,
            None => {
                debug!(slot_id = %slot.id, "Unreadable slot_end => skip LOCK");
                false
            }
        })
        .map(|slot| slot.id)
        .collect()
}

/// Unlocked credentials owned by one of `due_slots`, in slot order.
///
/// Records that fail credential validation are skipped even when they carry
/// a matching `belongs_to_slot`.
pub fn lock_candidates(due_slots: &[String], records: &Map<String, Value>) -> Vec<Credential> {
    let credentials: Vec<Credential> = records
        .iter()
        .filter_map(|(key, record)| Credential::validate(key, record).ok())
        .filter(Credential::is_unlocked)
        .collect();

    due_slots
        .iter()
        .flat_map(|slot_id| credentials.iter().filter(move |c| c.belongs_to(slot_id)))
        .cloned()
        .collect()
}
