//! Reflection snapshot builder.
//!
//! A [`RequestSnapshot`] is everything observable about one exchange. It is
//! built once per request, owned by the handler that built it, and dropped
//! with the response.

use axum::body::{Body, HttpBody};
use axum::http::request::Parts;
use axum::http::Request;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde_json::{Map, Value};

use super::extract::{self, CookiePair, MultiMap};
use super::tls::{TlsSession, TlsSummary};
use crate::error::ReflectError;

/// Upper bound on the first allocation for a body preview.
const INITIAL_PREVIEW_CAPACITY: usize = 8 * 1024;

/// Metadata posted back by the browser collector.
///
/// Carried as an opaque JSON object and only ever re-serialized for
/// display.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ClientData {
    #[default]
    Absent,
    Supplied(Map<String, Value>),
}

impl ClientData {
    /// Decode a `/collect` body. Empty input and a literal `null` mean the
    /// browser sent nothing.
    pub fn parse(raw: &[u8]) -> Result<Self, ReflectError> {
        if raw.is_empty() {
            return Ok(ClientData::Absent);
        }
        match serde_json::from_slice::<Value>(raw)? {
            Value::Object(map) => Ok(ClientData::Supplied(map)),
            Value::Null => Ok(ClientData::Absent),
            _ => Err(ReflectError::PayloadNotObject),
        }
    }

    pub fn is_supplied(&self) -> bool {
        matches!(self, ClientData::Supplied(_))
    }

    /// Indented JSON for display, keys in sorted order.
    pub fn to_pretty_json(&self) -> Option<String> {
        match self {
            ClientData::Absent => None,
            ClientData::Supplied(map) => serde_json::to_string_pretty(map).ok(),
        }
    }
}

/// Everything knowable about one HTTP exchange.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub protocol_version: String,
    pub scheme: String,
    pub host: String,
    pub request_target: String,
    /// Raw transport peer address, possibly with a port.
    pub remote_addr: String,
    pub remote_ip: String,
    pub remote_port: String,
    pub headers: Option<MultiMap>,
    pub query: Option<MultiMap>,
    pub cookies: Vec<CookiePair>,
    /// Declared length, `-1` when unknown.
    pub content_length: i64,
    pub transfer_encoding: Vec<String>,
    pub tls: Option<TlsSummary>,
    /// Captured body bytes decoded as UTF-8 (lossy).
    pub body_preview: String,
    /// Number of body bytes captured. Never exceeds the capture limit.
    pub body_captured: usize,
    pub client_data: ClientData,
}

impl RequestSnapshot {
    /// Build a snapshot, capturing at most `limit` body bytes.
    ///
    /// The body is consumed and dropped on every path. A body longer than
    /// the limit is truncated silently; only a failing read is an error.
    pub async fn capture(request: Request<Body>, limit: i64) -> Result<Self, ReflectError> {
        let (parts, body) = request.into_parts();
        let content_length = extract::content_length(&parts.headers, &body);
        let captured = read_body_preview(body, limit).await?;
        Ok(Self::from_parts(&parts, content_length, &captured))
    }

    /// Assemble the snapshot from request head and already captured body.
    pub fn from_parts(parts: &Parts, content_length: i64, captured: &[u8]) -> Self {
        let tls = parts.extensions.get::<TlsSession>();
        let remote_addr = extract::remote_addr(&parts.extensions);

        Self {
            timestamp: Utc::now(),
            method: parts.method.to_string(),
            protocol_version: extract::protocol_version(parts.version),
            scheme: extract::scheme(&parts.headers, tls),
            host: extract::host(&parts.uri, &parts.headers),
            request_target: extract::request_target(&parts.uri),
            remote_ip: extract::client_ip(&parts.headers, &remote_addr),
            remote_port: extract::client_port(&remote_addr),
            remote_addr,
            headers: extract::header_snapshot(&parts.headers),
            query: extract::query_snapshot(&parts.uri),
            cookies: extract::cookie_snapshot(&parts.headers),
            content_length,
            transfer_encoding: extract::transfer_encoding(&parts.headers),
            tls: extract::tls_snapshot(tls),
            body_preview: String::from_utf8_lossy(captured).into_owned(),
            body_captured: captured.len(),
            client_data: ClientData::Absent,
        }
    }

    /// Attach browser-supplied metadata (second phase only).
    pub fn with_client_data(mut self, client_data: ClientData) -> Self {
        self.client_data = client_data;
        self
    }
}

/// Read at most `limit` bytes of `body`.
///
/// A non-positive limit or an already finished body returns empty without
/// polling the body at all.
pub async fn read_body_preview(body: Body, limit: i64) -> Result<Vec<u8>, ReflectError> {
    let limit = match usize::try_from(limit) {
        Ok(0) | Err(_) => return Ok(Vec::new()),
        Ok(limit) => limit,
    };
    if body.is_end_stream() {
        return Ok(Vec::new());
    }

    let mut stream = body.into_data_stream();
    let mut buf = Vec::with_capacity(limit.min(INITIAL_PREVIEW_CAPACITY));
    while buf.len() < limit {
        match stream.next().await {
            Some(Ok(chunk)) => {
                let take = chunk.len().min(limit - buf.len());
                buf.extend_from_slice(&chunk[..take]);
            }
            Some(Err(e)) => return Err(ReflectError::BodyRead(e)),
            None => break,
        }
    }
    Ok(buf)
}
