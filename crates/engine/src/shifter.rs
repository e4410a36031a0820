//! SHIFT phase: advance slot windows once they are a full period old.

use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use slotkeeper_core::time::{format_local, shift_local};
use slotkeeper_core::{
    is_empty_document, Slot, LAST_UPDATE_FIELD, SETTINGS_PATH, SLOTS_FIELD, SLOT_END_FIELD,
    SLOT_START_FIELD,
};
use slotkeeper_store::DocumentStore;

use crate::settings::RotationSettings;

/// Result of one SHIFT run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftOutcome {
    /// Settings could not be read, or read as empty.
    SettingsUnavailable,
    /// Settings have no `slots` mapping.
    NoSlotMapping,
    /// No slot was due.
    NoChanges,
    /// The listed slots were shifted and written back.
    Persisted { shifted: Vec<String> },
    /// The listed slots were due but the combined write failed; nothing changed.
    PersistFailed { shifted: Vec<String>, error: String },
}

impl ShiftOutcome {
    /// Whether a lock pass should follow this run.
    pub fn cascades(&self) -> bool {
        matches!(self, ShiftOutcome::Persisted { .. })
    }

    /// Slots whose new window reached the datastore.
    pub fn persisted_slots(&self) -> &[String] {
        match self {
            ShiftOutcome::Persisted { shifted } => shifted,
            _ => &[],
        }
    }
}

pub struct SlotShifter {
    store: Arc<dyn DocumentStore>,
    settings: RotationSettings,
}

impl SlotShifter {
    pub fn new(store: Arc<dyn DocumentStore>, settings: RotationSettings) -> Self {
        Self { store, settings }
    }

    /// Shift every enabled slot whose last update is at least `shift_after` old,
    /// then persist the whole mapping in one patch.
    pub async fn run(&self, now: DateTime<Tz>) -> ShiftOutcome {
        let now = now.with_timezone(&self.settings.tz);

        let settings = match self.store.fetch_document(SETTINGS_PATH).await {
            Ok(doc) if !is_empty_document(&doc) => doc,
            Ok(_) => {
                info!("No settings found => skip SHIFT");
                return ShiftOutcome::SettingsUnavailable;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read settings => skip SHIFT");
                return ShiftOutcome::SettingsUnavailable;
            }
        };

        let Some(mut slots) = settings.get(SLOTS_FIELD).and_then(Value::as_object).cloned() else {
            info!("Settings have no slot mapping => skip SHIFT");
            return ShiftOutcome::NoSlotMapping;
        };

        let shifted = shift_slots(&mut slots, &self.settings, &now);
        if shifted.is_empty() {
            info!("No slot was shifted => no changes made");
            return ShiftOutcome::NoChanges;
        }

        let mut patch = Map::new();
        patch.insert(SLOTS_FIELD.to_string(), Value::Object(slots));
        let patch = Value::Object(patch);
        match self.store.patch_document(SETTINGS_PATH, &patch).await {
            Ok(()) => {
                info!(count = shifted.len(), "SHIFT persisted");
                ShiftOutcome::Persisted { shifted }
            }
            Err(e) => {
                warn!(error = %e, count = shifted.len(), "Failed to persist shifted slots");
                ShiftOutcome::PersistFailed {
                    shifted,
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Shift due slots in place. Returns the ids of the slots that moved.
///
/// Entries that are not objects, disabled slots and slots updated less than
/// `shift_after` ago are left untouched. An elapsed time of exactly
/// `shift_after` shifts.
pub fn shift_slots(
    slots: &mut Map<String, Value>,
    settings: &RotationSettings,
    now: &DateTime<Tz>,
) -> Vec<String> {
    let tz = settings.tz;
    let mut shifted = Vec::new();

    for (id, entry) in slots.iter_mut() {
        let Some(slot) = Slot::from_entry(id, entry) else {
            debug!(slot_id = %id, "Slot entry is not an object => ignore");
            continue;
        };
        if !slot.enabled {
            continue;
        }

        let elapsed = slot.elapsed_since_update(tz, now);
        if elapsed < settings.shift_after {
            debug!(
                slot_id = %id,
                elapsed_secs = elapsed.num_seconds(),
                "Not due since last update => skip SHIFT"
            );
            continue;
        }

        let (start, end) = slot.window(tz, now);
        let period = slot.frequency.period();
        let new_start = format_local(&shift_local(&start, period));
        let new_end = format_local(&shift_local(&end, period));

        if let Some(fields) = entry.as_object_mut() {
            fields.insert(SLOT_START_FIELD.to_string(), Value::String(new_start.clone()));
            fields.insert(SLOT_END_FIELD.to_string(), Value::String(new_end.clone()));
            fields.insert(LAST_UPDATE_FIELD.to_string(), Value::String(format_local(now)));
        }

        info!(
            slot_id = %id,
            slot_start = %new_start,
            slot_end = %new_end,
            "SHIFT slot window"
        );
        shifted.push(id.clone());
    }

    shifted
}
