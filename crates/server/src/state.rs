use tokio::sync::Mutex;

use slotkeeper_engine::Rotation;

pub struct AppState {
    pub rotation: Rotation,
    /// Held for the duration of a trigger so phases in this process never overlap.
    pub trigger_lock: Mutex<()>,
}

impl AppState {
    pub fn new(rotation: Rotation) -> Self {
        Self {
            rotation,
            trigger_lock: Mutex::new(()),
        }
    }
}
