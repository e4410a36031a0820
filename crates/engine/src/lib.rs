//! Time-driven slot rotation.
//!
//! Two phases, each a function of datastore state plus the current time:
//! - [`SlotShifter`] moves every due slot's window forward by its period
//! - [`CredentialLocker`] locks credentials whose slot is about to end
//!
//! [`Rotation`] composes them: a persisted shift cascades into a lock pass.

pub mod locker;
pub mod rotation;
pub mod settings;
pub mod shifter;

pub use locker::{CredentialLocker, LockOutcome, LockReport};
pub use rotation::{CycleReport, Rotation};
pub use settings::RotationSettings;
pub use shifter::{ShiftOutcome, SlotShifter};
