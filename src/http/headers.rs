//! Header policy.

use super::config::{Headers, RequestConfig};
use super::verb::Verb;
use crate::platform::PlatformCategory;

/// Computes the header set for `verb`.
///
/// `use_only_these_headers` short-circuits everything else. Otherwise the
/// verb's content type and a platform `User-Agent` are extended with
/// `additional_headers`, which override on equal names.
pub fn build_headers(config: &RequestConfig, verb: Verb, platform: PlatformCategory) -> Headers {
    if let Some(only) = &config.use_only_these_headers {
        return only.clone();
    }

    let mut headers = Headers::new();
    headers.insert(
        "Content-Type".to_string(),
        verb.default_content_type().to_string(),
    );
    headers.insert("User-Agent".to_string(), platform.user_agent());

    if let Some(additional) = &config.additional_headers {
        for (name, value) in additional {
            headers.insert(name.clone(), value.clone());
        }
    }
    headers
}
