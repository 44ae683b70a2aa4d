use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::allocation::UNBOUNDED_MAX_APPS;
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

/// Parse a profiled env var, logging and falling back to `default` when the
/// value is present but invalid.
fn profiled_env_parse<T>(profile: &str, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match profiled_env_opt(profile, key) {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!(key, value = %raw, error = %e, "invalid config value, using default");
            default
        }),
        None => default,
    }
}

// ── Zero-capacity policy ──────────────────────────────────────

/// What a summary build does when total cluster memory is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroCapacityPolicy {
    /// Report every memory fraction as `0.0` and keep walking.
    #[default]
    Zero,
    /// Fail the whole build.
    Reject,
}

impl FromStr for ZeroCapacityPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(ZeroCapacityPolicy::Zero),
            "reject" | "fail" => Ok(ZeroCapacityPolicy::Reject),
            _ => Err(CoreError::InvalidConfig {
                key: "FAIRVIEW_ZERO_CAPACITY".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ZeroCapacityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZeroCapacityPolicy::Zero => write!(f, "zero"),
            ZeroCapacityPolicy::Reject => write!(f, "reject"),
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    pub zero_capacity: ZeroCapacityPolicy,
    /// Max-apps reported when the allocation file has no default of its own.
    pub default_max_apps: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            zero_capacity: ZeroCapacityPolicy::default(),
            default_max_apps: UNBOUNDED_MAX_APPS,
        }
    }
}

impl SummaryConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `FAIRVIEW_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("FAIRVIEW_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            zero_capacity: profiled_env_parse(p, "FAIRVIEW_ZERO_CAPACITY", ZeroCapacityPolicy::Zero),
            default_max_apps: profiled_env_parse(p, "FAIRVIEW_DEFAULT_MAX_APPS", UNBOUNDED_MAX_APPS),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  zero_capacity:    {}", self.zero_capacity);
        tracing::info!("  default_max_apps: {}", self.default_max_apps);
    }
}
