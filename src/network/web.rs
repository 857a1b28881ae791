//! HTTP writer
//!
//! Every payload becomes one request to the configured URI. Responses
//! outside 2xx count as transport failures.

use super::compression::encode_payload;
use super::settings::{NetworkSettings, Protocol};
use super::transport::{HttpRequest, HttpTransport};
use super::{ErrorReporter, TransportErrorCallback, WriterStats};
use crate::core::{LoggerError, Result};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

pub struct WebWriter {
    transport: Option<Box<dyn HttpTransport>>,
    uri: String,
    method: String,
    content_type: String,
    compress: bool,
    timeout: Duration,
    reporter: ErrorReporter,
    stats: WriterStats,
}

impl WebWriter {
    /// Build a writer backed by a blocking `reqwest` client
    #[cfg(feature = "web")]
    pub fn new(settings: &NetworkSettings) -> Result<Self> {
        settings.validate()?;
        let transport = super::transport::ReqwestTransport::new(settings.timeout())?;
        Self::with_transport(settings, Box::new(transport))
    }

    #[cfg(not(feature = "web"))]
    pub fn new(_settings: &NetworkSettings) -> Result<Self> {
        Err(LoggerError::config(
            "WebWriter",
            "built without the `web` feature; supply a transport with `with_transport`",
        ))
    }

    /// Build over a caller-provided HTTP transport
    pub fn with_transport(
        settings: &NetworkSettings,
        transport: Box<dyn HttpTransport>,
    ) -> Result<Self> {
        if settings.protocol != Protocol::Web {
            return Err(LoggerError::config(
                "WebWriter",
                format!("expected web settings, got {}", settings.protocol),
            ));
        }
        settings.validate()?;

        Ok(Self {
            transport: Some(transport),
            uri: settings.effective_uri(),
            method: settings.http_method.trim().to_uppercase(),
            content_type: settings.content_type.clone(),
            compress: settings.use_compression,
            timeout: settings.timeout(),
            reporter: ErrorReporter::new("web", settings.report_errors),
            stats: WriterStats::default(),
        })
    }

    #[must_use]
    pub fn with_error_callback(mut self, callback: TransportErrorCallback) -> Self {
        self.reporter.set_callback(callback);
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn try_write(&mut self, payload: &str) -> Result<()> {
        let result = self.send(payload);
        match result {
            Ok(()) => self.stats.payloads_sent += 1,
            Err(LoggerError::WriterClosed(_)) => {}
            Err(_) => self.stats.payloads_failed += 1,
        }
        result
    }

    fn send(&mut self, payload: &str) -> Result<()> {
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| LoggerError::WriterClosed("web".to_string()))?;

        let body = encode_payload(payload, self.compress)?;
        let request = HttpRequest {
            method: &self.method,
            uri: &self.uri,
            content_type: &self.content_type,
            content_encoding: self.compress.then_some("gzip"),
            body: &body,
            timeout: self.timeout,
        };

        let status = transport.send(&request)?;
        if !(200..300).contains(&status) {
            return Err(LoggerError::transport(
                "posting payload",
                format!("{} answered with status {}", self.uri, status),
            ));
        }

        self.stats.packets_sent += 1;
        self.stats.bytes_sent += body.len() as u64;
        Ok(())
    }

    /// Send a payload; failures are reported, never returned
    pub fn write(&mut self, payload: &str) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_write(payload))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.reporter.report(&e),
            Err(panic_info) => {
                self.stats.payloads_failed += 1;
                self.reporter.report_panic(panic_info);
            }
        }
    }

    pub fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }
}

impl Drop for WebWriter {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for WebWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebWriter")
            .field("uri", &self.uri)
            .field("method", &self.method)
            .field("compress", &self.compress)
            .field("closed", &self.is_closed())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use parking_lot::Mutex;
    use std::io::Read;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    struct Captured {
        method: String,
        uri: String,
        content_type: String,
        content_encoding: Option<String>,
        body: Vec<u8>,
    }

    struct StubTransport {
        status: u16,
        requests: Arc<Mutex<Vec<Captured>>>,
        closes: Arc<Mutex<usize>>,
    }

    impl HttpTransport for StubTransport {
        fn send(&mut self, request: &HttpRequest<'_>) -> Result<u16> {
            self.requests.lock().push(Captured {
                method: request.method.to_string(),
                uri: request.uri.to_string(),
                content_type: request.content_type.to_string(),
                content_encoding: request.content_encoding.map(str::to_string),
                body: request.body.to_vec(),
            });
            Ok(self.status)
        }

        fn close(&mut self) {
            *self.closes.lock() += 1;
        }
    }

    fn stub(
        settings: &NetworkSettings,
        status: u16,
    ) -> (WebWriter, Arc<Mutex<Vec<Captured>>>, Arc<Mutex<usize>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let closes = Arc::new(Mutex::new(0));
        let transport = StubTransport {
            status,
            requests: Arc::clone(&requests),
            closes: Arc::clone(&closes),
        };
        let writer = WebWriter::with_transport(settings, Box::new(transport)).unwrap();
        (writer, requests, closes)
    }

    fn settings() -> NetworkSettings {
        NetworkSettings::web("http://127.0.0.1:9000/gelf").with_error_reporting(false)
    }

    #[test]
    fn test_posts_payload() {
        let (mut writer, requests, _) = stub(&settings().with_http_method("post"), 202);
        writer.try_write(r#"{"short_message":"hi"}"#).unwrap();

        let requests = requests.lock();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].uri, "http://127.0.0.1:9000/gelf");
        assert_eq!(requests[0].content_type, "application/json");
        assert_eq!(requests[0].content_encoding, None);
        assert_eq!(requests[0].body, br#"{"short_message":"hi"}"#.to_vec());
    }

    #[test]
    fn test_compressed_body_and_header() {
        let (mut writer, requests, _) = stub(&settings().with_compression(true), 200);
        writer.write("zip me");

        let requests = requests.lock();
        assert_eq!(requests[0].content_encoding.as_deref(), Some("gzip"));
        let mut body = String::new();
        GzDecoder::new(requests[0].body.as_slice())
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "zip me");
    }

    #[test]
    fn test_error_status_is_transport_failure() {
        let (mut writer, _, _) = stub(&settings(), 503);
        let err = writer.try_write("x").unwrap_err();
        assert!(err.is_transport());

        writer.write("y");
        assert_eq!(writer.stats().payloads_failed, 2);
        assert_eq!(writer.stats().payloads_sent, 0);
    }

    struct Unreachable;

    impl HttpTransport for Unreachable {
        fn send(&mut self, request: &HttpRequest<'_>) -> Result<u16> {
            Err(LoggerError::transport(
                "posting payload",
                format!("connection to {} refused", request.uri),
            ))
        }
    }

    struct Panicking;

    impl HttpTransport for Panicking {
        fn send(&mut self, _request: &HttpRequest<'_>) -> Result<u16> {
            panic!("http client blew up");
        }
    }

    fn counting(transport: Box<dyn HttpTransport>) -> (WebWriter, Arc<AtomicUsize>) {
        let errors = Arc::new(AtomicUsize::new(0));
        let errors_clone = Arc::clone(&errors);
        let writer = WebWriter::with_transport(&settings(), transport)
            .unwrap()
            .with_error_callback(Arc::new(move |_| {
                errors_clone.fetch_add(1, Ordering::SeqCst);
            }));
        (writer, errors)
    }

    #[test]
    fn test_write_swallows_transport_errors() {
        let (mut writer, errors) = counting(Box::new(Unreachable));
        assert!(writer.try_write("direct").unwrap_err().is_transport());

        writer.write("one");
        writer.write("two");

        assert_eq!(errors.load(Ordering::SeqCst), 2);
        assert_eq!(writer.stats().payloads_failed, 3);
        assert_eq!(writer.stats().payloads_sent, 0);
    }

    #[test]
    fn test_write_survives_panicking_transport() {
        let (mut writer, errors) = counting(Box::new(Panicking));

        writer.write("boom");
        writer.write("boom again");

        assert_eq!(errors.load(Ordering::SeqCst), 2);
        assert_eq!(writer.stats().payloads_failed, 2);
        assert!(!writer.is_closed());
    }

    #[test]
    fn test_close_is_idempotent() {
        let (mut writer, _, closes) = stub(&settings(), 200);
        writer.close();
        writer.close();
        assert!(matches!(
            writer.try_write("late"),
            Err(LoggerError::WriterClosed(_))
        ));
        drop(writer);
        assert_eq!(*closes.lock(), 1);
    }

    #[test]
    fn test_encryption_requires_https() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let transport = StubTransport {
            status: 200,
            requests,
            closes: Arc::new(Mutex::new(0)),
        };
        let insecure = settings().with_encryption(true);
        assert!(WebWriter::with_transport(&insecure, Box::new(transport))
            .unwrap_err()
            .is_configuration());
    }
}
