//! Request execution and result mapping.

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::config::{Headers, RequestConfig};
use super::headers::build_headers;
use super::logging::{LogLogger, LogPolicy, Logger};
use super::transport::{
    HttpResponse, MultipartRequest, ReqwestTransport, RequestBody, Transport, TransportError,
    TransportRequest,
};
use super::verb::Verb;
use crate::connectivity::{ConnectivityProbe, TcpProbe};
use crate::error::RequestError;
use crate::platform::{HostPlatform, PlatformInfo};

/// A decoded JSON object.
pub type JsonObject = Map<String, Value>;

/// What every executor operation returns.
pub type Outcome = std::result::Result<JsonObject, RequestError>;

/// Sends requests to one configured endpoint and turns every anticipated
/// failure into a [`RequestError`] instead of propagating it.
///
/// The executor holds no mutable state; any number of calls may run
/// concurrently on the same instance.
#[derive(Clone)]
pub struct RequestExecutor {
    config: RequestConfig,
    transport: Arc<dyn Transport>,
    probe: Arc<dyn ConnectivityProbe>,
    logger: Arc<dyn Logger>,
    platform: Arc<dyn PlatformInfo>,
}

impl RequestExecutor {
    /// Creates an executor with the default collaborators: a fresh `reqwest`
    /// client, a TCP connectivity probe, the `log` facade and host detection.
    pub fn new(config: RequestConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_collaborators(
            config,
            Arc::new(ReqwestTransport::new(client)),
            Arc::new(TcpProbe::default()),
            Arc::new(LogLogger),
            Arc::new(HostPlatform),
        ))
    }

    pub fn with_collaborators(
        config: RequestConfig,
        transport: Arc<dyn Transport>,
        probe: Arc<dyn ConnectivityProbe>,
        logger: Arc<dyn Logger>,
        platform: Arc<dyn PlatformInfo>,
    ) -> Self {
        Self {
            config,
            transport,
            probe,
            logger,
            platform,
        }
    }

    fn log(&self) -> LogPolicy<'_> {
        LogPolicy::new(&self.config, self.logger.as_ref())
    }

    /// Headers a request with `verb` would carry. Logged when header
    /// logging is on.
    pub fn headers_for(&self, verb: Verb) -> Headers {
        let headers = build_headers(&self.config, verb, self.platform.category());
        if self.config.use_only_these_headers.is_none() {
            self.log().headers(&headers);
        }
        headers
    }

    fn target_url(&self) -> Result<Url> {
        let raw = self.config.target_url();
        Url::parse(&raw).with_context(|| format!("Invalid request URL: {}", raw))
    }

    pub async fn get(&self) -> Outcome {
        self.send(Verb::Get, None).await
    }

    /// POSTs `body`, JSON-encoded unless `is_form_data` asks for
    /// form-urlencoding. The `Content-Type` header follows the POST default
    /// either way.
    pub async fn post(&self, body: &JsonObject, is_form_data: bool) -> Outcome {
        let body = if is_form_data {
            RequestBody::Form(form_pairs(body))
        } else {
            match serde_json::to_string(body).context("Failed to encode request body") {
                Ok(json) => RequestBody::Text(json),
                Err(e) => return Err(self.unhandled(e)),
            }
        };
        self.send(Verb::Post, Some(body)).await
    }

    /// PUTs `body` as-is; encoding is up to the caller.
    pub async fn put(&self, body: impl Into<String>) -> Outcome {
        self.send(Verb::Put, Some(RequestBody::Text(body.into())))
            .await
    }

    /// PATCHes `body` as-is; encoding is up to the caller.
    pub async fn patch(&self, body: impl Into<String>) -> Outcome {
        self.send(Verb::Patch, Some(RequestBody::Text(body.into())))
            .await
    }

    pub async fn delete(&self) -> Outcome {
        self.send(Verb::Delete, None).await
    }

    /// Generic dispatch behind the per-verb operations.
    ///
    /// # Panics
    ///
    /// Panics when called with [`Verb::MultipartPost`]; uploads go through
    /// [`post_multipart`](Self::post_multipart).
    #[tracing::instrument(level = "trace", skip(self, body), fields(service = %self.config.service_name()))]
    pub async fn send(&self, verb: Verb, body: Option<RequestBody>) -> Outcome {
        if verb == Verb::MultipartPost {
            panic!("multipart uploads must use RequestExecutor::post_multipart");
        }

        let headers = self.headers_for(verb);
        let url = self.target_url().map_err(|e| self.unhandled(e))?;
        let body_text = body.as_ref().map(|b| b.to_string());
        self.log().request(verb, url.as_str(), body_text.as_deref());

        self.ensure_reachable().await?;

        let timeout = self.config.timeout;
        let request = TransportRequest {
            verb,
            url,
            headers,
            body,
            timeout,
        };

        let response = match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(TransportError::Timeout)) | Err(_) => {
                self.log()
                    .failure(&format!("timed out after {}s", timeout.as_secs_f64()));
                return Err(RequestError::Timeout(timeout));
            }
            Ok(Err(TransportError::Other(e))) => return Err(self.unhandled(e)),
        };

        self.classify(response)
    }

    /// Uploads `fields` as text parts and each entry of `files` as a file
    /// part named by its key, streamed from the path it maps to.
    ///
    /// No timeout is applied, and every failure on the way, including
    /// unreadable files, is reported as [`RequestError::Unhandled`].
    #[tracing::instrument(
        level = "trace",
        skip(self, fields, files),
        fields(service = %self.config.service_name())
    )]
    pub async fn post_multipart(
        &self,
        fields: BTreeMap<String, String>,
        files: BTreeMap<String, PathBuf>,
    ) -> Outcome {
        let headers = self.headers_for(Verb::MultipartPost);
        let url = self.target_url().map_err(|e| self.unhandled(e))?;
        let summary = multipart_summary(&fields, &files);
        self.log()
            .request(Verb::MultipartPost, url.as_str(), Some(summary.as_str()));

        self.ensure_reachable().await?;

        let request = MultipartRequest {
            url,
            headers,
            fields,
            files,
        };
        let response = match self.transport.send_multipart(request).await {
            Ok(response) => response,
            Err(TransportError::Timeout) => {
                return Err(self.unhandled(anyhow::anyhow!("Multipart upload timed out")));
            }
            Err(TransportError::Other(e)) => return Err(self.unhandled(e)),
        };

        self.classify(response)
    }

    async fn ensure_reachable(&self) -> std::result::Result<(), RequestError> {
        if self.config.check_network && !self.probe.is_reachable().await {
            self.log().failure("no internet connection");
            return Err(RequestError::NoInternet);
        }
        Ok(())
    }

    /// 2xx decodes into a JSON object; anything else is an unexpected status.
    fn classify(&self, response: HttpResponse) -> Outcome {
        self.log().response(&response);

        if !response.is_success() {
            return Err(RequestError::UnexpectedStatus(response));
        }

        serde_json::from_str::<JsonObject>(&response.body)
            .context("Failed to decode response body as a JSON object")
            .map_err(|e| self.unhandled(e))
    }

    fn unhandled(&self, error: anyhow::Error) -> RequestError {
        self.log().failure(&format!("failed: {:#}", error));
        RequestError::Unhandled(error)
    }
}

/// Flattens a JSON object into form pairs. Strings are sent bare, other
/// values in their JSON text form.
fn form_pairs(body: &JsonObject) -> Vec<(String, String)> {
    body.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

fn multipart_summary(fields: &BTreeMap<String, String>, files: &BTreeMap<String, PathBuf>) -> String {
    let mut parts: Vec<String> = fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    parts.extend(
        files
            .iter()
            .map(|(k, path)| format!("{}=@{}", k, path.display())),
    );
    parts.join(", ")
}
