//! Per-executor request configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Header names and values, in a deterministic order.
pub type Headers = BTreeMap<String, String>;

/// Default transport timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn default_true() -> bool {
    true
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// Everything a [`RequestExecutor`](super::RequestExecutor) needs to know about
/// the endpoint it talks to. Built once and never mutated by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    pub base_url: String,
    pub path: String,
    /// Ask the connectivity probe before every call.
    #[serde(default)]
    pub check_network: bool,
    #[serde(default = "default_true")]
    pub log_request: bool,
    #[serde(default = "default_true")]
    pub log_response: bool,
    #[serde(default = "default_true")]
    pub log_headers: bool,
    /// Suppresses every diagnostic line regardless of the individual toggles.
    #[serde(default)]
    pub release_mode: bool,
    /// Merged over the default headers.
    #[serde(default)]
    pub additional_headers: Option<Headers>,
    /// Replaces the default header set entirely when present.
    #[serde(default)]
    pub use_only_these_headers: Option<Headers>,
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,
    #[serde(default)]
    pub service_name: Option<String>,
}

impl RequestConfig {
    pub fn builder(base_url: impl Into<String>, path: impl Into<String>) -> RequestConfigBuilder {
        RequestConfigBuilder {
            config: RequestConfig {
                base_url: base_url.into(),
                path: path.into(),
                check_network: false,
                log_request: true,
                log_response: true,
                log_headers: true,
                release_mode: false,
                additional_headers: None,
                use_only_these_headers: None,
                timeout: DEFAULT_TIMEOUT,
                service_name: None,
            },
        }
    }

    /// Name used to tag log lines; the endpoint path when none was given.
    pub fn service_name(&self) -> &str {
        self.service_name.as_deref().unwrap_or(&self.path)
    }

    /// Target URL: base URL and path joined by exactly one slash.
    pub fn target_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    pub(crate) fn logs_enabled(&self, toggle: bool) -> bool {
        toggle && !self.release_mode
    }
}

/// Chainable construction of a [`RequestConfig`].
#[derive(Debug, Clone)]
pub struct RequestConfigBuilder {
    config: RequestConfig,
}

impl RequestConfigBuilder {
    pub fn check_network(mut self, enabled: bool) -> Self {
        self.config.check_network = enabled;
        self
    }

    pub fn log_request(mut self, enabled: bool) -> Self {
        self.config.log_request = enabled;
        self
    }

    pub fn log_response(mut self, enabled: bool) -> Self {
        self.config.log_response = enabled;
        self
    }

    pub fn log_headers(mut self, enabled: bool) -> Self {
        self.config.log_headers = enabled;
        self
    }

    pub fn release_mode(mut self, enabled: bool) -> Self {
        self.config.release_mode = enabled;
        self
    }

    pub fn additional_headers(mut self, headers: Headers) -> Self {
        self.config.additional_headers = Some(headers);
        self
    }

    pub fn use_only_these_headers(mut self, headers: Headers) -> Self {
        self.config.use_only_these_headers = Some(headers);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config.service_name = Some(name.into());
        self
    }

    pub fn build(self) -> RequestConfig {
        self.config
    }
}

/// Serializes a [`Duration`] as fractional seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(de::Error::custom)
    }
}
