//! The network round-trip, behind a trait so the executor can be tested
//! without a server.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode, Url};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::io::ReaderStream;

use super::config::Headers;
use super::verb::Verb;

/// Request payload handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent verbatim.
    Text(String),
    /// Sent form-urlencoded.
    Form(Vec<(String, String)>),
}

impl fmt::Display for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Text(text) => f.write_str(text),
            RequestBody::Form(pairs) => {
                let joined: Vec<String> = pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                f.write_str(&joined.join("&"))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub verb: Verb,
    pub url: Url,
    pub headers: Headers,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
}

/// A multipart upload: text fields plus files streamed from disk, keyed by
/// form field name.
#[derive(Debug, Clone)]
pub struct MultipartRequest {
    pub url: Url,
    pub headers: Headers,
    pub fields: BTreeMap<String, String>,
    pub files: BTreeMap<String, PathBuf>,
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Debug)]
pub enum TransportError {
    /// The request did not complete within its timeout.
    Timeout,
    /// Anything else: connection failures, invalid headers, unreadable files.
    Other(anyhow::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "Request timed out"),
            TransportError::Other(e) => write!(f, "{:#}", e),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Other(anyhow::Error::from(error))
        }
    }
}

impl From<anyhow::Error> for TransportError {
    fn from(error: anyhow::Error) -> Self {
        TransportError::Other(error)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a single request, honouring `request.timeout`.
    async fn send(&self, request: TransportRequest) -> Result<HttpResponse, TransportError>;

    /// Performs a multipart upload. No timeout is applied.
    async fn send_multipart(
        &self,
        request: MultipartRequest,
    ) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(level = "trace", skip(self, request), fields(verb = %request.verb, url = %request.url))]
    async fn send(&self, request: TransportRequest) -> Result<HttpResponse, TransportError> {
        debug!("{} {}...", request.verb, request.url);

        let mut builder = self
            .client
            .request(request.verb.method(), request.url)
            .timeout(request.timeout);

        // Body first so the configured headers win over any content type
        // reqwest derives from it.
        builder = match request.body {
            Some(RequestBody::Text(text)) => builder.body(text),
            Some(RequestBody::Form(pairs)) => builder.form(&pairs),
            None => builder,
        };
        builder = builder.headers(to_header_map(&request.headers)?);

        let response = builder.send().await?;
        read_response(response).await
    }

    #[tracing::instrument(level = "trace", skip(self, request), fields(url = %request.url))]
    async fn send_multipart(
        &self,
        request: MultipartRequest,
    ) -> Result<HttpResponse, TransportError> {
        debug!(
            "Multipart POST {} with {} field(s) and {} file(s)...",
            request.url,
            request.fields.len(),
            request.files.len()
        );

        let mut form = Form::new();
        for (name, value) in request.fields {
            form = form.text(name, value);
        }
        for (name, path) in request.files {
            let part = file_part(&name, path).await?;
            form = form.part(name, part);
        }

        // reqwest sets the multipart content type with its boundary.
        let mut headers = to_header_map(&request.headers)?;
        headers.remove(CONTENT_TYPE);

        let response = self
            .client
            .post(request.url)
            .headers(headers)
            .multipart(form)
            .send()
            .await?;
        read_response(response).await
    }
}

/// Opens `path` and wraps it as a streamed multipart part.
async fn file_part(field: &str, path: PathBuf) -> Result<Part> {
    let file = tokio::fs::File::open(&path)
        .await
        .with_context(|| format!("Failed to open file {} for field '{}'", path.display(), field))?;
    let length = file
        .metadata()
        .await
        .with_context(|| format!("Failed to read metadata of {}", path.display()))?
        .len();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| field.to_string());

    let body = Body::wrap_stream(ReaderStream::new(file));
    Ok(Part::stream_with_length(body, length).file_name(file_name))
}

async fn read_response(response: reqwest::Response) -> Result<HttpResponse, TransportError> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await?;
    debug!("Received {} ({} bytes)", status, body.len());
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

/// Converts configured headers into a [`HeaderMap`]. Later entries replace
/// earlier ones whose names differ only by case.
pub fn to_header_map(headers: &Headers) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid header name: {}", name))?;
        let header_value = HeaderValue::from_str(value)
            .with_context(|| format!("Invalid value for header {}", name))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
