//! JSON snapshots of `http` requests and responses.
//!
//! Capturing a message reads its body once and puts the bytes back as a
//! buffered body, so the message can still be sent or consumed afterwards.
//! The snapshot goes through the secure pipeline, which masks the
//! `authorization` header with the default masker.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Cursor, Read};

use http::{HeaderMap, Request, Response, Uri, header::CONTENT_LENGTH};

use crate::printer::{Printer, default_printer};
use crate::reflect::{Kind, Reflect};

/// Message body. `Empty` is the nil stream: it is never read.
#[derive(Default)]
pub enum Body {
    #[default]
    Empty,
    Stream(Box<dyn Read + Send>),
    Buffered(Cursor<Vec<u8>>),
}

impl Body {
    pub fn stream(reader: impl Read + Send + 'static) -> Self {
        Body::Stream(Box::new(reader))
    }

    /// Bytes held in memory, if the body is buffered.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Buffered(cursor) => Some(cursor.get_ref()),
            _ => None,
        }
    }

    fn known_length(&self) -> i64 {
        match self {
            Body::Empty => 0,
            Body::Stream(_) => -1,
            Body::Buffered(cursor) => i64::try_from(cursor.get_ref().len()).unwrap_or(i64::MAX),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Buffered(Cursor::new(bytes))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::from(text.into_bytes())
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::from(text.as_bytes().to_vec())
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Body::Empty => Ok(0),
            Body::Stream(reader) => reader.read(buf),
            Body::Buffered(cursor) => cursor.read(buf),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Stream(_) => f.write_str("Body::Stream(..)"),
            Body::Buffered(cursor) => write!(f, "Body::Buffered({} bytes)", cursor.get_ref().len()),
        }
    }
}

impl Reflect for Body {
    fn kind(&self) -> Kind<'_> {
        match self {
            Body::Empty => Kind::Pointer(None),
            _ => Kind::Opaque("http body"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, crate::Reflect)]
pub struct UrlSnapshot {
    #[json("scheme,omitempty")]
    pub scheme: String,
    #[json("host,omitempty")]
    pub host: String,
    pub path: String,
    #[json("raw_query,omitempty")]
    pub raw_query: String,
}

impl From<&Uri> for UrlSnapshot {
    fn from(uri: &Uri) -> Self {
        let host = match (uri.host(), uri.port_u16()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };
        Self {
            scheme: uri.scheme_str().unwrap_or_default().to_string(),
            host,
            path: uri.path().to_string(),
            raw_query: uri.query().unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, crate::Reflect)]
pub struct RequestSnapshot {
    pub method: String,
    pub url: UrlSnapshot,
    pub header: BTreeMap<String, Vec<String>>,
    #[json("body,omitempty")]
    pub body: String,
    pub content_length: i64,
}

impl RequestSnapshot {
    /// Snapshots `request`, leaving its body buffered.
    pub fn capture(request: &mut Request<Body>) -> Self {
        let content_length = content_length(request.headers(), request.body());
        let body = drain_body(request.body_mut(), content_length);
        Self {
            method: request.method().to_string(),
            url: UrlSnapshot::from(request.uri()),
            header: header_multimap(request.headers()),
            body,
            content_length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, crate::Reflect)]
pub struct ResponseSnapshot {
    pub status: String,
    pub status_code: u16,
    pub header: BTreeMap<String, Vec<String>>,
    #[json("body,omitempty")]
    pub body: String,
    pub content_length: i64,
    pub request: Option<RequestSnapshot>,
}

impl ResponseSnapshot {
    /// Snapshots `response` and, when given, the request that produced it.
    pub fn capture(response: &mut Response<Body>, request: Option<&mut Request<Body>>) -> Self {
        let content_length = content_length(response.headers(), response.body());
        let body = drain_body(response.body_mut(), content_length);
        let status = response.status();
        Self {
            status: match status.canonical_reason() {
                Some(reason) => format!("{} {}", status.as_u16(), reason),
                None => status.as_u16().to_string(),
            },
            status_code: status.as_u16(),
            header: header_multimap(response.headers()),
            body,
            content_length,
            request: request.map(RequestSnapshot::capture),
        }
    }
}

/// Header names are already lowercase in `http`; values that are not
/// visible ASCII are decoded lossily.
fn header_multimap(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        out.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    out
}

fn content_length(headers: &HeaderMap, body: &Body) -> i64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or_else(|| body.known_length())
}

/// Reads the remaining body and swaps in a buffered copy. A read error is
/// reported in place of the body when content was expected.
fn drain_body(body: &mut Body, content_length: i64) -> String {
    if matches!(body, Body::Empty) {
        return String::new();
    }
    let mut bytes = Vec::new();
    match body.read_to_end(&mut bytes) {
        Ok(_) => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            *body = Body::from(bytes);
            text
        }
        Err(err) if content_length != 0 => format!("Error reading body: {err}"),
        Err(_) => String::new(),
    }
}

impl Printer {
    /// Masked JSON snapshot of `request`.
    pub fn print_http_request(&self, request: &mut Request<Body>) -> String {
        self.maybe_secure_json(&RequestSnapshot::capture(request))
    }

    /// Masked JSON snapshot of `response`, embedding `request` when given.
    pub fn print_http_response(
        &self,
        response: &mut Response<Body>,
        request: Option<&mut Request<Body>>,
    ) -> String {
        self.maybe_secure_json(&ResponseSnapshot::capture(response, request))
    }
}

pub fn print_http_request(request: &mut Request<Body>) -> String {
    default_printer().print_http_request(request)
}

pub fn print_http_response(response: &mut Response<Body>, request: Option<&mut Request<Body>>) -> String {
    default_printer().print_http_response(response, request)
}
