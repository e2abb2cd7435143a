//! Response boundary between the transport and the checks.

use hyper::header::HeaderValue;
use hyper::{HeaderMap, Response, StatusCode};

/// The parts of an HTTP response that response-level checks inspect.
///
/// The body is not part of this view; it is read by the transport and
/// handed to [`Validator::validate`](crate::Validator::validate) only when
/// the validator wants it.
pub trait ProbeResponse {
    fn status(&self) -> StatusCode;

    /// First value of the named header. Lookup is case-insensitive.
    fn header(&self, name: &str) -> Option<String>;

    /// Status line in the `"404 Not Found"` form.
    fn status_line(&self) -> String {
        status_line(self.status())
    }
}

impl<B> ProbeResponse for Response<B> {
    fn status(&self) -> StatusCode {
        Response::status(self)
    }

    fn header(&self, name: &str) -> Option<String> {
        header_value(self.headers(), name)
    }
}

/// Status and headers of a response whose body has already been consumed.
#[derive(Debug, Clone, Default)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseHead {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
        }
    }

    /// Capture the head of a response, leaving its body untouched.
    pub fn from_response<B>(response: &Response<B>) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
        }
    }
}

impl ProbeResponse for ResponseHead {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn header(&self, name: &str) -> Option<String> {
        header_value(&self.headers, name)
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).map(header_to_string)
}

// Header values are not guaranteed to be UTF-8.
fn header_to_string(value: &HeaderValue) -> String {
    match value.to_str() {
        Ok(s) => s.to_string(),
        Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
    }
}

pub(crate) fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}
