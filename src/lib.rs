pub mod connectivity;
pub mod error;
pub mod http;
pub mod platform;

pub use error::RequestError;
pub use http::{JsonObject, Outcome, RequestConfig, RequestExecutor, Verb};
