//! TCP writer
//!
//! The connection is opened lazily on the first write. A failed write drops
//! the connection and loses that payload; the next write makes one fresh
//! connection attempt before giving up on its own payload.

use super::settings::{NetworkSettings, Protocol, TcpFraming};
use super::transport::{StreamConnector, TcpConnector};
use super::{ErrorReporter, TransportErrorCallback, WriterStats};
use crate::core::{LoggerError, Result};
use std::fmt;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

pub struct TcpWriter {
    connector: Box<dyn StreamConnector>,
    stream: Option<Box<dyn Write + Send>>,
    framing: TcpFraming,
    closed: bool,
    reporter: ErrorReporter,
    stats: WriterStats,
}

impl TcpWriter {
    pub fn new(settings: &NetworkSettings) -> Result<Self> {
        Self::with_connector(settings, Box::new(TcpConnector::new(settings)))
    }

    /// Build over a caller-provided connector
    pub fn with_connector(
        settings: &NetworkSettings,
        connector: Box<dyn StreamConnector>,
    ) -> Result<Self> {
        if settings.protocol != Protocol::Tcp {
            return Err(LoggerError::config(
                "TcpWriter",
                format!("expected tcp settings, got {}", settings.protocol),
            ));
        }
        settings.validate()?;

        if settings.use_compression {
            eprintln!("[LOGGER WARNING] compression is ignored by the tcp transport");
        }

        Ok(Self {
            connector,
            stream: None,
            framing: settings.tcp_framing,
            closed: false,
            reporter: ErrorReporter::new("tcp", settings.report_errors),
            stats: WriterStats::default(),
        })
    }

    #[must_use]
    pub fn with_error_callback(mut self, callback: TransportErrorCallback) -> Self {
        self.reporter.set_callback(callback);
        self
    }

    /// Whether a connection is currently open
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn ensure_connected(&mut self) -> Result<&mut Box<dyn Write + Send>> {
        if self.stream.is_none() {
            let stream = self
                .connector
                .connect()
                .map_err(|e| LoggerError::io_operation("connecting", "tcp connect failed", e))?;
            self.stats.connects += 1;
            self.stream = Some(stream);
        }
        self.stream
            .as_mut()
            .ok_or_else(|| LoggerError::transport("connecting", "no tcp connection"))
    }

    pub fn try_write(&mut self, payload: &str) -> Result<()> {
        if self.closed {
            return Err(LoggerError::WriterClosed("tcp".to_string()));
        }

        let result = self.send(payload);
        match result {
            Ok(()) => self.stats.payloads_sent += 1,
            Err(_) => self.stats.payloads_failed += 1,
        }
        result
    }

    fn send(&mut self, payload: &str) -> Result<()> {
        let frame = self.framing.frame(payload.as_bytes())?;
        let stream = self.ensure_connected()?;

        let written = stream.write_all(&frame).and_then(|()| stream.flush());
        if let Err(e) = written {
            self.stream = None;
            return Err(LoggerError::io_operation("sending", "tcp write failed", e));
        }

        self.stats.packets_sent += 1;
        self.stats.bytes_sent += frame.len() as u64;
        Ok(())
    }

    /// Send a payload; failures are reported, never returned
    pub fn write(&mut self, payload: &str) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_write(payload))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.reporter.report(&e),
            Err(panic_info) => {
                self.stream = None;
                self.stats.payloads_failed += 1;
                self.reporter.report_panic(panic_info);
            }
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.as_mut() {
            if let Err(e) = stream.flush() {
                self.stream = None;
                return Err(LoggerError::io_operation("flushing", "tcp flush failed", e));
            }
        }
        Ok(())
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.flush();
        }
        self.connector.close();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }
}

impl Drop for TcpWriter {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for TcpWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TcpWriter")
            .field("connected", &self.is_connected())
            .field("closed", &self.closed)
            .field("framing", &self.framing)
            .field("stats", &self.stats)
            .finish()
    }
}
