//! Output format negotiation shared by handlers and the response cache.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header::ACCEPT, request::Parts, HeaderMap, Uri},
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Html,
    Json,
}

#[derive(Debug, Deserialize)]
struct FormatParam {
    format: Option<String>,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        }
    }

    /// `?format=json|html` wins; otherwise an `Accept` header mentioning
    /// `application/json` selects JSON. Everything else is HTML.
    pub fn negotiate(uri: &Uri, headers: &HeaderMap) -> Self {
        let explicit = Query::<FormatParam>::try_from_uri(uri)
            .ok()
            .and_then(|Query(param)| param.format);
        match explicit.as_deref() {
            Some("json") => return OutputFormat::Json,
            Some("html") => return OutputFormat::Html,
            _ => {}
        }

        let wants_json = headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        if wants_json {
            OutputFormat::Json
        } else {
            OutputFormat::Html
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OutputFormat
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OutputFormat::negotiate(&parts.uri, &parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn negotiate(uri: &str, accept: Option<&str>) -> OutputFormat {
        let uri: Uri = uri.parse().unwrap();
        let mut headers = HeaderMap::new();
        if let Some(accept) = accept {
            headers.insert(ACCEPT, HeaderValue::from_str(accept).unwrap());
        }
        OutputFormat::negotiate(&uri, &headers)
    }

    #[test]
    fn test_defaults_to_html() {
        assert_eq!(negotiate("/properties/", None), OutputFormat::Html);
        assert_eq!(negotiate("/properties/", Some("text/html")), OutputFormat::Html);
    }

    #[test]
    fn test_query_parameter() {
        assert_eq!(negotiate("/properties/?format=json", None), OutputFormat::Json);
        assert_eq!(
            negotiate("/properties/?format=html", Some("application/json")),
            OutputFormat::Html
        );
    }

    #[test]
    fn test_accept_header() {
        assert_eq!(
            negotiate("/properties/", Some("application/json")),
            OutputFormat::Json
        );
        assert_eq!(
            negotiate("/properties/", Some("text/html, application/json;q=0.9")),
            OutputFormat::Json
        );
    }

    #[test]
    fn test_unknown_format_is_html() {
        assert_eq!(negotiate("/properties/?format=xml", None), OutputFormat::Html);
        assert_eq!(negotiate("/properties/?format=", None), OutputFormat::Html);
    }

    #[test]
    fn test_unparsable_query_is_html() {
        assert_eq!(
            negotiate("/properties/?format=json&format=html", None),
            OutputFormat::Html
        );
    }
}
