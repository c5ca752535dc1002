//! Diagnostic output for requests and responses.
//!
//! Logging is a pure side effect: nothing here changes what an executor
//! returns. Release mode silences everything.

use log::{error, info};

use super::config::{Headers, RequestConfig};
use super::transport::HttpResponse;
use super::verb::Verb;

pub const LOG_TARGET: &str = "httpcall";

/// Severity-tagged sinks for pre-formatted messages.
#[cfg_attr(test, mockall::automock)]
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards to the `log` facade under the `httpcall` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLogger;

impl Logger for LogLogger {
    fn info(&self, message: &str) {
        info!(target: LOG_TARGET, "{}", message);
    }

    fn success(&self, message: &str) {
        info!(target: LOG_TARGET, "✔ {}", message);
    }

    fn error(&self, message: &str) {
        error!(target: LOG_TARGET, "{}", message);
    }
}

/// Applies the config's toggles to a [`Logger`].
pub(crate) struct LogPolicy<'a> {
    config: &'a RequestConfig,
    logger: &'a dyn Logger,
}

impl<'a> LogPolicy<'a> {
    pub(crate) fn new(config: &'a RequestConfig, logger: &'a dyn Logger) -> Self {
        Self { config, logger }
    }

    pub(crate) fn request(&self, verb: Verb, url: &str, body: Option<&str>) {
        if !self.config.logs_enabled(self.config.log_request) {
            return;
        }
        self.logger.info(&format!(
            "[{}] --> {} {}\nbody: {}",
            self.config.service_name(),
            verb,
            url,
            body.unwrap_or("")
        ));
    }

    pub(crate) fn headers(&self, headers: &Headers) {
        if !self.config.logs_enabled(self.config.log_headers) {
            return;
        }
        let lines: Vec<String> = headers.iter().map(|(k, v)| format!("  {}: {}", k, v)).collect();
        self.logger.info(&format!(
            "[{}] headers:\n{}",
            self.config.service_name(),
            lines.join("\n")
        ));
    }

    pub(crate) fn response(&self, response: &HttpResponse) {
        if !self.config.logs_enabled(self.config.log_response) {
            return;
        }
        let body = match pretty_json(&response.body) {
            Some(pretty) => pretty,
            None => {
                self.logger.error(&format!(
                    "[{}] response body is not valid JSON, showing raw text",
                    self.config.service_name()
                ));
                response.body.clone()
            }
        };
        let message = format!(
            "[{}] <-- {} {}\n{}",
            self.config.service_name(),
            response.status.as_u16(),
            self.config.path,
            body
        );
        if response.is_success() {
            self.logger.success(&message);
        } else {
            self.logger.error(&message);
        }
    }

    /// Failures that never produced a response.
    pub(crate) fn failure(&self, description: &str) {
        if !self.config.logs_enabled(self.config.log_response) {
            return;
        }
        self.logger.error(&format!(
            "[{}] {} {}",
            self.config.service_name(),
            self.config.path,
            description
        ));
    }
}

fn pretty_json(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    serde_json::to_string_pretty(&value).ok()
}
