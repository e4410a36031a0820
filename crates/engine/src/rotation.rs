use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::info;

use slotkeeper_store::DocumentStore;

use crate::locker::{CredentialLocker, LockOutcome};
use crate::settings::RotationSettings;
use crate::shifter::{ShiftOutcome, SlotShifter};

/// Outcome of an update cycle: the shift, and the lock pass if one followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub shift: ShiftOutcome,
    pub lock: Option<LockOutcome>,
}

/// Both phases over one store, composed the way the trigger routes use them.
pub struct Rotation {
    shifter: SlotShifter,
    locker: CredentialLocker,
    settings: RotationSettings,
}

impl Rotation {
    pub fn new(store: Arc<dyn DocumentStore>, settings: RotationSettings) -> Self {
        Self {
            shifter: SlotShifter::new(store.clone(), settings),
            locker: CredentialLocker::new(store, settings),
            settings,
        }
    }

    pub fn settings(&self) -> &RotationSettings {
        &self.settings
    }

    /// Run SHIFT, then LOCK only if the shift was persisted.
    pub async fn update_slots(&self, now: DateTime<Tz>) -> CycleReport {
        let shift = self.shifter.run(now).await;
        let lock = if shift.cascades() {
            info!("Multi-slot SHIFT success => now lock if needed");
            Some(self.locker.run(now).await)
        } else {
            None
        };
        CycleReport { shift, lock }
    }

    /// Run LOCK on its own.
    pub async fn lock_check(&self, now: DateTime<Tz>) -> LockOutcome {
        self.locker.run(now).await
    }

    /// Current time in the configured zone.
    pub fn now(&self) -> DateTime<Tz> {
        chrono::Utc::now().with_timezone(&self.settings.tz)
    }
}
