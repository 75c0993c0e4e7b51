//! Dashboard configuration loaded via OrthoConfig.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use pagination::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use url::Url;

use crate::domain::{DEFAULT_STALE_AFTER, DEFAULT_TOAST_TTL, DashboardOptions};

const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/";
const DEFAULT_VIEW_URL: &str = "http://localhost/users";
const DEFAULT_STORAGE_DIR: &str = ".dashboard";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_EXAMPLE_SEED: u64 = 42;
const DEFAULT_EXAMPLE_COUNT: usize = 24;

/// Configuration values for the dashboard binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DASHBOARD")]
pub struct DashboardSettings {
    /// Base URL of the users API.
    pub api_base_url: Option<String>,
    /// Shareable view URL whose query holds page, search, company and sort.
    pub view_url: Option<String>,
    /// Rows per page.
    pub page_size: Option<u32>,
    /// Directory holding the persisted activity log and settings.
    pub storage_dir: Option<PathBuf>,
    /// Seconds a cached page stays fresh.
    pub stale_after_secs: Option<u64>,
    /// Seconds before a directory request times out.
    pub request_timeout_secs: Option<u64>,
    /// Seconds a toast stays visible.
    pub toast_ttl_secs: Option<u64>,
    /// Serve the generated example directory instead of the API.
    #[ortho_config(default = false)]
    pub offline: bool,
    /// Seed for the generated example directory.
    pub example_seed: Option<u64>,
    /// Number of generated example users.
    pub example_count: Option<usize>,
}

impl DashboardSettings {
    /// Configured API base URL, falling back to a local json-server.
    ///
    /// # Errors
    ///
    /// Returns [`url::ParseError`] when the configured value is not a URL.
    pub fn api_base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL))
    }

    /// Configured view URL.
    ///
    /// # Errors
    ///
    /// Returns [`url::ParseError`] when the configured value is not a URL.
    pub fn view_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.view_url.as_deref().unwrap_or(DEFAULT_VIEW_URL))
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after_secs
            .map_or(DEFAULT_STALE_AFTER, Duration::from_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs)
    }

    pub fn toast_ttl(&self) -> Duration {
        self.toast_ttl_secs.map_or(DEFAULT_TOAST_TTL, Duration::from_secs)
    }

    pub fn example_seed(&self) -> u64 {
        self.example_seed.unwrap_or(DEFAULT_EXAMPLE_SEED)
    }

    pub fn example_count(&self) -> usize {
        self.example_count.unwrap_or(DEFAULT_EXAMPLE_COUNT)
    }

    /// Dashboard tunables derived from these settings.
    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            page_size: self.page_size(),
            stale_after: self.stale_after(),
            toast_ttl: self.toast_ttl(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for dashboard configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "DASHBOARD_API_BASE_URL",
        "DASHBOARD_VIEW_URL",
        "DASHBOARD_PAGE_SIZE",
        "DASHBOARD_STORAGE_DIR",
        "DASHBOARD_STALE_AFTER_SECS",
        "DASHBOARD_REQUEST_TIMEOUT_SECS",
        "DASHBOARD_TOAST_TTL_SECS",
        "DASHBOARD_OFFLINE",
        "DASHBOARD_EXAMPLE_SEED",
        "DASHBOARD_EXAMPLE_COUNT",
    ];

    fn load_from_empty_args() -> DashboardSettings {
        DashboardSettings::load_from_iter([OsString::from("dashboard")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert!(!settings.offline);
        assert_eq!(
            settings.api_base_url().expect("url").as_str(),
            DEFAULT_API_BASE_URL
        );
        assert_eq!(settings.view_url().expect("url").as_str(), DEFAULT_VIEW_URL);
        assert_eq!(settings.dashboard_options(), DashboardOptions::default());
        assert_eq!(settings.storage_dir(), PathBuf::from(DEFAULT_STORAGE_DIR));
        assert_eq!(settings.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(settings.example_seed(), DEFAULT_EXAMPLE_SEED);
        assert_eq!(settings.example_count(), DEFAULT_EXAMPLE_COUNT);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("DASHBOARD_API_BASE_URL", Some("https://api.example.com/v1/".to_owned())),
            ("DASHBOARD_VIEW_URL", None),
            ("DASHBOARD_PAGE_SIZE", Some("20".to_owned())),
            ("DASHBOARD_STORAGE_DIR", Some("/tmp/dashboard-state".to_owned())),
            ("DASHBOARD_STALE_AFTER_SECS", Some("120".to_owned())),
            ("DASHBOARD_REQUEST_TIMEOUT_SECS", Some("3".to_owned())),
            ("DASHBOARD_TOAST_TTL_SECS", Some("8".to_owned())),
            ("DASHBOARD_OFFLINE", Some("true".to_owned())),
            ("DASHBOARD_EXAMPLE_SEED", Some("7".to_owned())),
            ("DASHBOARD_EXAMPLE_COUNT", Some("50".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.offline);
        assert_eq!(
            settings.api_base_url().expect("url").as_str(),
            "https://api.example.com/v1/"
        );
        assert_eq!(
            settings.dashboard_options(),
            DashboardOptions {
                page_size: 20,
                stale_after: Duration::from_secs(120),
                toast_ttl: Duration::from_secs(8),
            }
        );
        assert_eq!(settings.storage_dir(), PathBuf::from("/tmp/dashboard-state"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
        assert_eq!(settings.example_seed(), 7);
        assert_eq!(settings.example_count(), 50);
    }

    #[rstest]
    fn malformed_urls_are_reported() {
        let _guard = lock_env(VARS.map(|name| {
            let value = (name == "DASHBOARD_API_BASE_URL").then(|| "not a url".to_owned());
            (name, value)
        }));

        let settings = load_from_empty_args();
        assert!(settings.api_base_url().is_err());
    }
}
