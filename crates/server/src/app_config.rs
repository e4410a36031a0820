//! Application configuration builders.
//!
//! Constructs the datastore client and rotation engine from `Config`.

use std::sync::Arc;

use tracing::info;

use slotkeeper_engine::{Rotation, RotationSettings};
use slotkeeper_store::{DocumentStore, HttpDocumentStore};

/// Load configuration from `.env` and environment variables.
pub fn load_config(profile: Option<&str>) -> slotkeeper_core::Config {
    match profile {
        Some(p) => slotkeeper_core::Config::for_profile(p),
        None => slotkeeper_core::Config::from_env(),
    }
}

/// Build the rotation engine against the configured HTTP datastore.
pub fn build_rotation(config: &slotkeeper_core::Config) -> anyhow::Result<Rotation> {
    let settings = RotationSettings::from_config(&config.schedule)?;
    let store: Arc<dyn DocumentStore> = Arc::new(HttpDocumentStore::from_config(&config.datastore)?);
    info!(
        backend = store.backend_name(),
        timezone = %settings.tz,
        "Rotation engine ready"
    );
    Ok(Rotation::new(store, settings))
}
