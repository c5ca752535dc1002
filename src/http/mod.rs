//! Request building, execution and result mapping.

mod config;
mod executor;
mod headers;
mod logging;
mod transport;
mod verb;

pub use config::{DEFAULT_TIMEOUT, Headers, RequestConfig, RequestConfigBuilder};
pub use executor::{JsonObject, Outcome, RequestExecutor};
pub use headers::build_headers;
pub use logging::{LOG_TARGET, LogLogger, Logger};
pub use transport::{
    HttpResponse, MultipartRequest, ReqwestTransport, RequestBody, Transport, TransportError,
    TransportRequest, to_header_map,
};
pub use verb::{CONTENT_TYPE_FORM, CONTENT_TYPE_JSON, Verb};

#[cfg(test)]
pub use logging::MockLogger;
