//! Credential records stored flat at the datastore root.

use serde_json::{json, Map, Value};
use thiserror::Error;

pub const LOCKED_FIELD: &str = "locked";
pub const BELONGS_TO_SLOT_FIELD: &str = "belongs_to_slot";

/// Fields a root record must carry to count as a credential.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "email",
    "password",
    "expiry_date",
    LOCKED_FIELD,
    "usage_count",
    "max_usage",
    BELONGS_TO_SLOT_FIELD,
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialShapeError {
    #[error("record is not an object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}

/// The parts of a credential record the locker reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub key: String,
    /// `None` when the stored owner is not a string; such a record matches no slot.
    pub belongs_to_slot: Option<String>,
    /// `None` when the stored flag cannot be read as an integer.
    pub locked: Option<i64>,
}

impl Credential {
    /// Check that `record` has the credential shape and extract it.
    pub fn validate(key: &str, record: &Value) -> Result<Self, CredentialShapeError> {
        let fields = record.as_object().ok_or(CredentialShapeError::NotAnObject)?;
        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !fields.contains_key(**f)) {
            return Err(CredentialShapeError::MissingField(*missing));
        }
        Ok(Self {
            key: key.to_string(),
            belongs_to_slot: owner(fields),
            locked: fields.get(LOCKED_FIELD).and_then(coerce_flag),
        })
    }

    pub fn belongs_to(&self, slot_id: &str) -> bool {
        self.belongs_to_slot.as_deref() == Some(slot_id)
    }

    pub fn is_unlocked(&self) -> bool {
        self.locked == Some(0)
    }
}

/// Patch body that flips a credential to locked.
pub fn lock_patch() -> Value {
    json!({ "locked": 1 })
}

fn owner(fields: &Map<String, Value>) -> Option<String> {
    fields
        .get(BELONGS_TO_SLOT_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Integer view of a 0/1 flag. Accepts integers, floats (truncated),
/// booleans and integer strings.
fn coerce_flag(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
