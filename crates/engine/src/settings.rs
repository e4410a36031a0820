use chrono::TimeDelta;
use chrono_tz::Tz;

use slotkeeper_core::config::ScheduleConfig;
use slotkeeper_core::CoreError;

/// Time parameters shared by both phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationSettings {
    /// Zone every stored timestamp is read and written in.
    pub tz: Tz,
    /// Minimum time since a slot's last shift before it shifts again.
    pub shift_after: TimeDelta,
    /// How long before a slot's end its credentials may be locked.
    pub lock_margin: TimeDelta,
}

impl RotationSettings {
    pub fn from_config(config: &ScheduleConfig) -> Result<Self, CoreError> {
        Ok(Self {
            tz: config.tz()?,
            shift_after: config.shift_after(),
            lock_margin: config.lock_margin(),
        })
    }
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            tz: chrono_tz::Asia::Kolkata,
            shift_after: TimeDelta::hours(24),
            lock_margin: TimeDelta::minutes(2),
        }
    }
}
