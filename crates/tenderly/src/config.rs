use std::time::Duration;

use oval_utils::config::Config;

#[derive(Debug, Clone, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct TenderlyConfig {
    /// Base of the REST API, without trailing slash.
    pub api_url: String,
    /// Base of the web dashboard used for shareable links.
    pub dashboard_url: String,
    /// Client side timeout for every request. None waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for TenderlyConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.tenderly.co/api/v1".to_string(),
            dashboard_url: "https://dashboard.tenderly.co".to_string(),
            timeout_secs: None,
        }
    }
}

impl Config for TenderlyConfig {
    fn section_name() -> &'static str {
        "tenderly"
    }
}

impl TenderlyConfig {
    /// Config pointing both the API and the dashboard at `base`, e.g. a mock server.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_url: base.to_string(),
            dashboard_url: base.to_string(),
            timeout_secs: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
