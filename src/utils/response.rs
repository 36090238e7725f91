//! Operator-facing output: step labels, response bodies, error indicators and
//! the debug request dump.

use std::{
    borrow::Cow,
    io::{self, Write},
};

use http::header::ACCEPT;
use serde::de::IgnoredAny;

use crate::{
    core::{FatalDiagnosticError, RequestBuildError, TransportError, TransportResponse},
    orchestration::Verb,
    utils::request::OutboundRequest,
};

const INDENT: &[u8] = b"    ";

/// Render a response body for display.
///
/// Attempts to re-indent the body as JSON; when the body is not valid JSON the
/// raw bytes are passed through instead.
pub fn pretty_json(body: &[u8]) -> Cow<'_, str> {
    match reindent(body) {
        Ok(pretty) => Cow::Owned(pretty),
        Err(_) => String::from_utf8_lossy(body),
    }
}

/// Re-indent a JSON document token by token.
///
/// Only whitespace between tokens changes. Numbers, escapes and key order are
/// copied from the body as they arrived.
fn reindent(body: &[u8]) -> Result<String, Box<dyn std::error::Error>> {
    serde_json::from_slice::<IgnoredAny>(body)?;

    let mut out = Vec::with_capacity(body.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    // set after an opening bracket until we know whether the container is empty
    let mut open = false;

    for &b in body {
        if in_string {
            out.push(b);
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
            continue;
        }
        if open && b != b'}' && b != b']' {
            open = false;
            depth += 1;
            newline(&mut out, depth);
        }
        match b {
            b'"' => {
                in_string = true;
                out.push(b);
            }
            b'{' | b'[' => {
                out.push(b);
                open = true;
            }
            b'}' | b']' => {
                if open {
                    open = false;
                } else {
                    depth = depth.saturating_sub(1);
                    newline(&mut out, depth);
                }
                out.push(b);
            }
            b',' => {
                out.push(b);
                newline(&mut out, depth);
            }
            b':' => out.extend_from_slice(b": "),
            _ => out.push(b),
        }
    }
    Ok(String::from_utf8(out)?)
}

fn newline(out: &mut Vec<u8>, depth: usize) {
    out.push(b'\n');
    for _ in 0..depth {
        out.extend_from_slice(INDENT);
    }
}

/// Header value the HTTP client sends when a request names no `Accept`.
pub const CLIENT_DEFAULT_ACCEPT: &str = "*/*";

/// Render a request in HTTP/1.1 wire form.
///
/// Includes the headers the HTTP client fills in on its own (`accept` and the
/// body's `content-length`). Connection management headers negotiated by the
/// client are not part of the dump.
pub fn dump_request(request: &OutboundRequest) -> Result<Vec<u8>, FatalDiagnosticError> {
    let host = request
        .uri
        .authority()
        .ok_or_else(|| FatalDiagnosticError::MissingHost(request.target.clone()))?;
    let path = request
        .uri
        .path_and_query()
        .map_or("/", |pq| pq.as_str());

    let mut out = Vec::new();
    write!(out, "{} {} HTTP/1.1\r\n", request.method, path)?;
    write!(out, "Host: {host}\r\n")?;
    for (name, value) in &request.headers {
        let value = value
            .to_str()
            .map_err(|e| FatalDiagnosticError::Header {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        write!(out, "{name}: {value}\r\n")?;
    }
    if !request.headers.contains_key(ACCEPT) {
        write!(out, "{ACCEPT}: {CLIENT_DEFAULT_ACCEPT}\r\n")?;
    }
    if let Some(body) = &request.body {
        write!(out, "content-length: {}\r\n\r\n", body.len())?;
        out.extend_from_slice(body);
    } else {
        out.extend_from_slice(b"\r\n");
    }
    Ok(out)
}

/// Writes progress and results to the operator.
pub struct Reporter {
    out: Box<dyn Write + Send>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Reporter {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn label(&mut self, label: &str) {
        self.emit(format_args!("{label}\n"));
    }

    pub fn response(&mut self, response: &TransportResponse) {
        let body = pretty_json(&response.body);
        self.emit(format_args!("{body}\n"));
    }

    pub fn transport_error(&mut self, err: &TransportError, debug: bool) {
        if debug {
            self.emit(format_args!("Error: {err}\n\n"));
        } else {
            self.emit(format_args!("Error\n\n"));
        }
    }

    pub fn build_error(&mut self, verb: Verb, target: &str, err: &RequestBuildError, debug: bool) {
        match err {
            RequestBuildError::Encode(_) => self.emit(format_args!(
                "Request creation error while running {verb} url - [{target}]\n"
            )),
            RequestBuildError::InvalidTarget { .. } => self.emit(format_args!(
                "Request run error while running [{verb}] url - [{target}]\n"
            )),
        }
        if debug {
            self.emit(format_args!("{err}\n"));
        }
    }

    /// Print the outgoing request. Any failure here is fatal to the run.
    pub fn dump(&mut self, request: &OutboundRequest) -> Result<(), FatalDiagnosticError> {
        let dump = dump_request(request)?;
        self.out.write_all(&dump)?;
        self.out.write_all(b"\n\n")?;
        self.out.flush()?;
        Ok(())
    }

    fn emit(&mut self, args: std::fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|_| self.out.flush()) {
            log::warn!("Failed to write report output: {e}");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::utils::request::RequestBuilder;

    /// Shared in-memory sink so tests can inspect what the reporter wrote.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// A sink that refuses every write.
    pub(crate) struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_pretty_json_indents_four_spaces() {
        let out = pretty_json(br#"{"Name":"gw","Services":[]}"#);
        assert_eq!(out, "{\n    \"Name\": \"gw\",\n    \"Services\": []\n}");
    }

    #[test]
    fn test_pretty_json_keeps_key_order() {
        let out = pretty_json(br#"{"z":1,"a":2}"#);
        assert!(out.find("\"z\"").unwrap() < out.find("\"a\"").unwrap());
    }

    #[test]
    fn test_pretty_json_keeps_token_text() {
        let out = pretty_json(br#"{"id":123456789012345678901234567890,"r":1e2,"s":"\u00e9\/"}"#);
        assert_eq!(
            out,
            "{\n    \"id\": 123456789012345678901234567890,\n    \"r\": 1e2,\n    \"s\": \"\\u00e9\\/\"\n}"
        );
    }

    #[test]
    fn test_pretty_json_nested_and_string_punctuation() {
        let out = pretty_json(b"[ {\"k\" : \"a, {b}: \\\"c\\\"\"}, {}, -0.5E-3 ]");
        assert_eq!(
            out,
            "[\n    {\n        \"k\": \"a, {b}: \\\"c\\\"\"\n    },\n    {},\n    -0.5E-3\n]"
        );
        assert_eq!(pretty_json(b" 42 "), "42");
    }

    #[test]
    fn test_pretty_json_falls_back_to_raw() {
        assert_eq!(pretty_json(b"404 page not found"), "404 page not found");
        assert_eq!(pretty_json(b"{\"a\":1} trailing"), "{\"a\":1} trailing");
        assert_eq!(pretty_json(b""), "");
    }

    #[test]
    fn test_dump_post_request() {
        let arg = json!({"Name": "gw"});
        let req = RequestBuilder::build(Verb::POST, "http://localhost:1323/proxy", Some(&arg))
            .unwrap();
        let dump = String::from_utf8(dump_request(&req).unwrap()).unwrap();

        assert_eq!(
            dump,
            "POST /proxy HTTP/1.1\r\n\
             Host: localhost:1323\r\n\
             content-type: application/json\r\n\
             accept: */*\r\n\
             content-length: 13\r\n\
             \r\n\
             {\"Name\":\"gw\"}"
        );
    }

    #[test]
    fn test_dump_get_request() {
        let req =
            RequestBuilder::build(Verb::GET, "http://localhost:1323/proxy/dump/gw", None).unwrap();
        let dump = String::from_utf8(dump_request(&req).unwrap()).unwrap();
        assert_eq!(
            dump,
            "GET /proxy/dump/gw HTTP/1.1\r\nHost: localhost:1323\r\naccept: */*\r\n\r\n"
        );
    }

    #[test]
    fn test_dump_to_broken_sink_is_fatal() {
        let req = RequestBuilder::build(Verb::GET, "http://localhost:1323/proxy", None).unwrap();
        let mut reporter = Reporter::new(Box::new(BrokenPipe));
        let err = reporter.dump(&req).unwrap_err();
        assert!(matches!(err, FatalDiagnosticError::Write(_)));
    }

    #[test]
    fn test_error_indicators() {
        let buf = SharedBuf::default();
        let mut reporter = Reporter::new(Box::new(buf.clone()));

        let err = TransportError::Request("connection refused".to_string());
        reporter.transport_error(&err, false);
        assert_eq!(buf.contents(), "Error\n\n");

        reporter.transport_error(&err, true);
        assert!(buf.contents().ends_with("Error: request failed: connection refused\n\n"));
    }

    #[test]
    fn test_response_printed_even_on_error_status() {
        let buf = SharedBuf::default();
        let mut reporter = Reporter::new(Box::new(buf.clone()));
        reporter.response(&TransportResponse {
            status: StatusCode::NOT_FOUND,
            body: Bytes::from_static(br#"{"msg":"not found"}"#),
        });
        assert_eq!(buf.contents(), "{\n    \"msg\": \"not found\"\n}\n");
    }
}
