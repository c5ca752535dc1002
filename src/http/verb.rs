//! HTTP verbs supported by the request executor.

use anyhow::bail;
use reqwest::Method;
use std::fmt;
use std::str::FromStr;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// A supported HTTP verb. Each verb carries a fixed default `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    MultipartPost,
}

impl Verb {
    /// The `Content-Type` used when building default headers for this verb.
    ///
    /// PUT has no dedicated entry and falls back to JSON.
    pub fn default_content_type(self) -> &'static str {
        match self {
            Verb::Get | Verb::Delete => CONTENT_TYPE_JSON,
            Verb::Post | Verb::Patch | Verb::MultipartPost => CONTENT_TYPE_FORM,
            _ => CONTENT_TYPE_JSON,
        }
    }

    /// The wire method for this verb.
    pub fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post | Verb::MultipartPost => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::MultipartPost => "MULTIPART_POST",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Verb::Get),
            "post" => Ok(Verb::Post),
            "put" => Ok(Verb::Put),
            "patch" => Ok(Verb::Patch),
            "delete" => Ok(Verb::Delete),
            "multipart" | "multipart_post" => Ok(Verb::MultipartPost),
            _ => bail!(
                "Unknown verb: {}. Expected get, post, put, patch, delete, or multipart.",
                s
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_content_type_table() {
        assert_eq!(Verb::Get.default_content_type(), CONTENT_TYPE_JSON);
        assert_eq!(Verb::Delete.default_content_type(), CONTENT_TYPE_JSON);
        assert_eq!(Verb::Post.default_content_type(), CONTENT_TYPE_FORM);
        assert_eq!(Verb::Patch.default_content_type(), CONTENT_TYPE_FORM);
        assert_eq!(Verb::MultipartPost.default_content_type(), CONTENT_TYPE_FORM);
    }

    #[test]
    fn test_put_falls_back_to_json() {
        assert_eq!(Verb::Put.default_content_type(), CONTENT_TYPE_JSON);
    }

    #[test]
    fn test_multipart_uses_post_method() {
        assert_eq!(Verb::MultipartPost.method(), Method::POST);
        assert_eq!(Verb::Patch.method(), Method::PATCH);
    }

    #[test]
    fn test_verb_parse() {
        assert_eq!("GET".parse::<Verb>().unwrap(), Verb::Get);
        assert_eq!("multipart".parse::<Verb>().unwrap(), Verb::MultipartPost);
        assert!("head".parse::<Verb>().is_err());
    }

    #[test]
    fn test_verb_display() {
        assert_eq!(Verb::MultipartPost.to_string(), "MULTIPART_POST");
        assert_eq!(Verb::Delete.to_string(), "DELETE");
    }
}
