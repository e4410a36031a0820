use std::env;
use std::time::Duration;

use chrono::TimeDelta;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_i64(profile: &str, key: &str, default: i64) -> i64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub datastore: DatastoreConfig,
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SLOTKEEPER_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SLOTKEEPER_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            datastore: DatastoreConfig::from_env_profiled(p),
            schedule: ScheduleConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Log the redacted summary at startup.
    pub fn log_summary(&self) {
        tracing::info!(
            profile = self.profile_label(),
            config = %self.redacted_summary(),
            "Config loaded"
        );
    }

    /// Redacted view of the config; the auth token is reduced to a flag.
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": { "host": self.server.host, "port": self.server.port },
            "datastore": {
                "url": self.datastore.url,
                "authenticated": self.datastore.auth_token.is_some(),
                "timeout_secs": self.datastore.timeout_secs,
            },
            "schedule": {
                "timezone": self.schedule.timezone,
                "shift_after_hours": self.schedule.shift_after_hours,
                "lock_margin_secs": self.schedule.lock_margin_secs,
            },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 5000),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Datastore ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatastoreConfig {
    /// Root URL of the document store, e.g. `https://example-rtdb.firebaseio.com/`.
    pub url: String,
    /// Appended as `?auth=` on every request when present.
    pub auth_token: Option<String>,
    /// 0 disables the timeout.
    pub timeout_secs: u64,
}

impl DatastoreConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "DATASTORE_URL", "http://localhost:9000/"),
            auth_token: profiled_env_opt(p, "DATASTORE_AUTH"),
            timeout_secs: profiled_env_u64(p, "DATASTORE_TIMEOUT_SECS", 0),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

// ── Schedule ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// IANA zone every stored timestamp is interpreted in.
    pub timezone: String,
    /// Negative or out-of-range values fall back to the default.
    pub shift_after_hours: i64,
    pub lock_margin_secs: i64,
}

pub const DEFAULT_SHIFT_AFTER_HOURS: i64 = 24;
pub const DEFAULT_LOCK_MARGIN_SECS: i64 = 120;

impl ScheduleConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            timezone: profiled_env_or(p, "SLOT_TIMEZONE", "Asia/Kolkata"),
            shift_after_hours: profiled_env_i64(p, "SHIFT_AFTER_HOURS", DEFAULT_SHIFT_AFTER_HOURS),
            lock_margin_secs: profiled_env_i64(p, "LOCK_MARGIN_SECS", DEFAULT_LOCK_MARGIN_SECS),
        }
    }

    pub fn tz(&self) -> Result<Tz, CoreError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| CoreError::InvalidTimezone(self.timezone.clone()))
    }

    pub fn shift_after(&self) -> TimeDelta {
        non_negative(TimeDelta::try_hours(self.shift_after_hours))
            .unwrap_or(TimeDelta::hours(DEFAULT_SHIFT_AFTER_HOURS))
    }

    pub fn lock_margin(&self) -> TimeDelta {
        non_negative(TimeDelta::try_seconds(self.lock_margin_secs))
            .unwrap_or(TimeDelta::seconds(DEFAULT_LOCK_MARGIN_SECS))
    }
}

fn non_negative(delta: Option<TimeDelta>) -> Option<TimeDelta> {
    delta.filter(|d| *d >= TimeDelta::zero())
}
