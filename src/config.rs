/// Service configuration.
///
/// Settings come from three layers, lowest precedence first: built-in
/// defaults, an optional `cadviz.toml` file, and environment variables
/// (with `.env` support via dotenv). Nothing is required — the service
/// runs against the public CAD endpoint with defaults matching the
/// original UI (limit 100, 30-second HTTP timeout).

use serde::Deserialize;

use crate::ingest::cad::CAD_API_URL;
use crate::model::clamp_limit;

/// Config file looked for in the working directory when no explicit path
/// is given.
pub const DEFAULT_CONFIG_PATH: &str = "./cadviz.toml";

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// CAD API endpoint.
    pub api_url: String,
    /// HTTP timeout for each upstream request, seconds.
    pub timeout_secs: u64,
    /// Optional log file path; console logging is always on.
    pub log_file: Option<String>,
    /// Result limit used when the caller does not specify one (1–1000).
    pub default_limit: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            api_url: CAD_API_URL.to_string(),
            timeout_secs: 30,
            log_file: None,
            default_limit: 100,
        }
    }
}

/// On-disk shape of `cadviz.toml`; every field is optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_url: Option<String>,
    timeout_secs: Option<u64>,
    log_file: Option<String>,
    default_limit: Option<u32>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl ServiceConfig {
    /// Loads configuration from `cadviz.toml` (if present) and the
    /// environment. A missing file is fine; an unreadable or malformed
    /// one is an error — silently ignoring a broken config hides typos.
    pub fn load() -> Result<ServiceConfig, String> {
        dotenv::dotenv().ok();
        Self::load_from(DEFAULT_CONFIG_PATH, |key| std::env::var(key).ok())
    }

    fn load_from<F>(path: &str, lookup: F) -> Result<ServiceConfig, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServiceConfig::default();

        if std::path::Path::new(path).exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {}", path, e))?;
            let file: FileConfig =
                toml::from_str(&raw).map_err(|e| format!("failed to parse {}: {}", path, e))?;

            if let Some(url) = file.api_url {
                config.api_url = url;
            }
            if let Some(t) = file.timeout_secs {
                config.timeout_secs = t;
            }
            if file.log_file.is_some() {
                config.log_file = file.log_file;
            }
            if let Some(limit) = file.default_limit {
                config.default_limit = limit;
            }
        }

        if let Some(url) = non_empty(lookup("CAD_API_URL")) {
            config.api_url = url;
        }
        if let Some(raw) = non_empty(lookup("CAD_TIMEOUT_SECS")) {
            config.timeout_secs = raw
                .parse()
                .map_err(|_| format!("CAD_TIMEOUT_SECS must be an integer, got '{}'", raw))?;
        }
        if let Some(path) = non_empty(lookup("CAD_LOG_FILE")) {
            config.log_file = Some(path);
        }
        if let Some(raw) = non_empty(lookup("CAD_DEFAULT_LIMIT")) {
            let limit: u32 = raw
                .parse()
                .map_err(|_| format!("CAD_DEFAULT_LIMIT must be an integer, got '{}'", raw))?;
            config.default_limit = limit;
        }

        config.default_limit = clamp_limit(config.default_limit);
        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
