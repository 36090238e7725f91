use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method, Uri};

use crate::{
    core::{Argument, RequestBuildError},
    orchestration::Verb,
};

pub const APPLICATION_JSON: &str = "application/json";

/// A fully composed request, ready for the transport or the debug dump.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    /// The target exactly as declared by the step
    pub target: String,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl OutboundRequest {
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Bytes::len)
    }
}

/// Builds outbound requests from step declarations.
pub struct RequestBuilder;

impl RequestBuilder {
    /// Build the request for `verb` against `target`.
    ///
    /// Only POST carries a body, and only when an argument is present. The
    /// target is not rewritten or escaped, it only has to be an absolute URI.
    pub fn build(
        verb: Verb,
        target: &str,
        argument: Option<&dyn Argument>,
    ) -> Result<OutboundRequest, RequestBuildError> {
        let uri = parse_target(target)?;
        let mut headers = HeaderMap::new();

        let body = match (verb, argument) {
            (Verb::POST, Some(arg)) => {
                let encoded = arg.to_json()?;
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(APPLICATION_JSON),
                );
                Some(Bytes::from(encoded))
            }
            _ => None,
        };

        Ok(OutboundRequest {
            method: verb.into(),
            target: target.to_string(),
            uri,
            headers,
            body,
        })
    }
}

fn parse_target(target: &str) -> Result<Uri, RequestBuildError> {
    let invalid = |reason: String| RequestBuildError::InvalidTarget {
        target: target.to_string(),
        reason,
    };

    let uri: Uri = target.parse().map_err(|e: http::uri::InvalidUri| invalid(e.to_string()))?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(invalid("target must be an absolute URI".to_string()));
    }
    Ok(uri)
}
