//! Core traits for enroute-ctl
//!
//! These are the seams between the sequencer and the outside world: the
//! payload a step carries, and the transport that delivers a request.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;

use super::error::TransportError;
use crate::utils::request::OutboundRequest;

/// Opaque structured payload attached to a step.
///
/// The sequencer never looks inside an argument; it only asks for its JSON
/// encoding when a POST request is built.
pub trait Argument: fmt::Debug + Send + Sync {
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T> Argument for T
where
    T: Serialize + fmt::Debug + Send + Sync,
{
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Response as handed back by a [`Transport`].
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Delivers one request and waits for the complete response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<TransportResponse, TransportError>;
}
