//! Network transport for formatted log payloads
//!
//! Three writers share one contract: `write` sends a formatted payload and
//! never fails or panics on transport problems. Failures are counted in
//! [`WriterStats`], printed to stderr unless disabled, and handed to an
//! optional [`TransportErrorCallback`]. Callers that need the error use
//! `try_write` instead.
//!
//! Each writer owns exactly one transport. `close()` releases it once; later
//! calls are no-ops, and `Drop` closes as well.

pub mod chunk;
pub mod compression;
pub mod settings;
pub mod tcp;
pub mod transport;
pub mod udp;
pub mod web;

pub use chunk::{UdpChunk, UdpChunkHelper, CHUNK_HEADER_SIZE, CHUNK_MAGIC, MAX_CHUNK_COUNT};
pub use settings::{AddressFamily, NetworkSettings, Protocol, TcpFraming};
pub use tcp::TcpWriter;
pub use transport::{
    DatagramTransport, HttpRequest, HttpTransport, StreamConnector, TcpConnector, UdpTransport,
};
#[cfg(feature = "web")]
pub use transport::ReqwestTransport;
pub use udp::UdpWriter;
pub use web::WebWriter;

use crate::core::{panic_message, LoggerError, Result};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Callback notified of every swallowed transport error
pub type TransportErrorCallback = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// Counters kept by every network writer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Payloads handed to the transport successfully
    pub payloads_sent: u64,
    /// Payloads lost to transport errors
    pub payloads_failed: u64,
    /// Datagrams, frames or requests put on the wire
    pub packets_sent: u64,
    pub bytes_sent: u64,
    /// Connections opened (TCP only)
    pub connects: u64,
}

/// Routes swallowed errors to stderr and the user callback
#[derive(Clone)]
pub(crate) struct ErrorReporter {
    writer: &'static str,
    to_stderr: bool,
    callback: Option<TransportErrorCallback>,
}

impl ErrorReporter {
    pub(crate) fn new(writer: &'static str, to_stderr: bool) -> Self {
        Self {
            writer,
            to_stderr,
            callback: None,
        }
    }

    pub(crate) fn set_callback(&mut self, callback: TransportErrorCallback) {
        self.callback = Some(callback);
    }

    pub(crate) fn report(&self, error: &LoggerError) {
        if self.to_stderr {
            eprintln!("[LOGGER ERROR] {} writer dropped payload: {}", self.writer, error);
        }
        if let Some(ref callback) = self.callback {
            callback(error);
        }
    }

    pub(crate) fn report_panic(&self, panic_info: Box<dyn Any + Send>) {
        let error = LoggerError::writer(format!(
            "{} transport panicked: {}",
            self.writer,
            panic_message(panic_info.as_ref())
        ));
        self.report(&error);
    }
}

impl fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("writer", &self.writer)
            .field("to_stderr", &self.to_stderr)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// A network writer for any configured protocol
///
/// # Example
///
/// ```no_run
/// use rust_log_transport::network::{NetworkSettings, NetworkWriter, Protocol};
///
/// let settings = NetworkSettings::new(Protocol::Udp, "graylog.local", 12201)
///     .with_compression(true);
/// let mut writer = NetworkWriter::from_settings(&settings)
///     .expect("valid network settings");
///
/// writer.write(r#"{"version":"1.1","host":"web-01","short_message":"hello"}"#);
/// writer.close();
/// ```
#[derive(Debug)]
pub enum NetworkWriter {
    Udp(UdpWriter),
    Tcp(TcpWriter),
    Web(WebWriter),
}

impl NetworkWriter {
    /// Validate `settings` and build the writer for its protocol
    pub fn from_settings(settings: &NetworkSettings) -> Result<Self> {
        match settings.protocol {
            Protocol::Udp => Ok(NetworkWriter::Udp(UdpWriter::new(settings)?)),
            Protocol::Tcp => Ok(NetworkWriter::Tcp(TcpWriter::new(settings)?)),
            Protocol::Web => Ok(NetworkWriter::Web(WebWriter::new(settings)?)),
        }
    }

    #[must_use]
    pub fn with_error_callback(self, callback: TransportErrorCallback) -> Self {
        match self {
            NetworkWriter::Udp(w) => NetworkWriter::Udp(w.with_error_callback(callback)),
            NetworkWriter::Tcp(w) => NetworkWriter::Tcp(w.with_error_callback(callback)),
            NetworkWriter::Web(w) => NetworkWriter::Web(w.with_error_callback(callback)),
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            NetworkWriter::Udp(_) => Protocol::Udp,
            NetworkWriter::Tcp(_) => Protocol::Tcp,
            NetworkWriter::Web(_) => Protocol::Web,
        }
    }

    /// Send a payload, swallowing transport failures
    pub fn write(&mut self, payload: &str) {
        match self {
            NetworkWriter::Udp(w) => w.write(payload),
            NetworkWriter::Tcp(w) => w.write(payload),
            NetworkWriter::Web(w) => w.write(payload),
        }
    }

    /// Send a payload and return the transport error, if any
    pub fn try_write(&mut self, payload: &str) -> Result<()> {
        match self {
            NetworkWriter::Udp(w) => w.try_write(payload),
            NetworkWriter::Tcp(w) => w.try_write(payload),
            NetworkWriter::Web(w) => w.try_write(payload),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        match self {
            NetworkWriter::Tcp(w) => w.flush(),
            NetworkWriter::Udp(_) | NetworkWriter::Web(_) => Ok(()),
        }
    }

    pub fn close(&mut self) {
        match self {
            NetworkWriter::Udp(w) => w.close(),
            NetworkWriter::Tcp(w) => w.close(),
            NetworkWriter::Web(w) => w.close(),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            NetworkWriter::Udp(w) => w.is_closed(),
            NetworkWriter::Tcp(w) => w.is_closed(),
            NetworkWriter::Web(w) => w.is_closed(),
        }
    }

    pub fn stats(&self) -> WriterStats {
        match self {
            NetworkWriter::Udp(w) => w.stats(),
            NetworkWriter::Tcp(w) => w.stats(),
            NetworkWriter::Web(w) => w.stats(),
        }
    }
}
