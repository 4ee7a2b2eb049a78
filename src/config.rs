use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "MICRODASH_CONFIG";
/// Environment variable overriding [`DashboardConfig::api_base_url`].
pub const API_URL_ENV: &str = "MICRODASH_API_URL";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

/// Runtime settings. Every field has a default so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base_url: String,
    /// Skip the remote source entirely when false.
    pub use_api: bool,
    pub measurements_path: PathBuf,
    pub samples_path: PathBuf,
    pub page_size: usize,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub histogram_bins: usize,
    pub recent_count: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            use_api: true,
            measurements_path: PathBuf::from("data-integration/measurements.json"),
            samples_path: PathBuf::from("data-integration/samples.json"),
            page_size: 25,
            refresh_interval_secs: 30,
            request_timeout_secs: 10,
            histogram_bins: 5,
            recent_count: 5,
        }
    }
}

impl DashboardConfig {
    /// Resolve the config from `MICRODASH_CONFIG`, then `dashboard.json`,
    /// then defaults. A broken file is logged and ignored.
    pub fn load() -> Self {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let path = explicit.or_else(|| {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.exists().then_some(local)
        });

        let mut config = match path {
            Some(p) => match Self::from_file(&p) {
                Ok(cfg) => {
                    log::info!("Loaded config from {}", p.display());
                    cfg
                }
                Err(e) => {
                    log::warn!("Ignoring config file: {e:#}");
                    Self::default()
                }
            },
            None => Self::default(),
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.api_base_url = url;
        }
        config.normalized()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg.normalized())
    }

    /// Clamp values that would otherwise break paging or the refresh timer.
    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self.refresh_interval_secs = self.refresh_interval_secs.max(1);
        self.histogram_bins = self.histogram_bins.max(1);
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let cfg: DashboardConfig =
            serde_json::from_str(r#"{ "page_size": 50, "use_api": false }"#).unwrap();
        assert_eq!(cfg.page_size, 50);
        assert!(!cfg.use_api);
        assert_eq!(cfg.refresh_interval_secs, 30);
        assert_eq!(cfg.api_base_url, "http://localhost:8080/api");
    }

    #[test]
    fn normalized_clamps_zero_values_and_trailing_slash() {
        let cfg = DashboardConfig {
            page_size: 0,
            refresh_interval_secs: 0,
            histogram_bins: 0,
            api_base_url: "http://example.test/api/".to_string(),
            ..Default::default()
        }
        .normalized();
        assert_eq!(cfg.page_size, 1);
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(1));
        assert_eq!(cfg.histogram_bins, 1);
        assert_eq!(cfg.api_base_url, "http://example.test/api");
    }
}
