//! Network appender for remote logging
//!
//! Formats each event and hands the payload to a [`NetworkWriter`]. Appending
//! never fails because of the network: transport errors are reported by the
//! writer and counted in its stats.

use crate::core::{Appender, FormatterSettings, LogEvent, Result, SystemResolver};
use crate::formatters::{create_formatter, Formatter};
use crate::network::{NetworkSettings, NetworkWriter, TransportErrorCallback, WriterStats};
use parking_lot::Mutex;
use std::sync::Arc;

/// Ships formatted events over UDP, TCP or HTTP
///
/// # Example
///
/// ```no_run
/// use rust_log_transport::appenders::NetworkAppender;
/// use rust_log_transport::network::{NetworkSettings, Protocol};
/// use rust_log_transport::prelude::*;
///
/// let appender = NetworkAppender::new(
///     FormatterSettings::default().with_log_type(LogType::Gelf),
///     &NetworkSettings::new(Protocol::Udp, "graylog.local", 12201).with_compression(true),
/// )
/// .expect("valid network settings");
///
/// let mut logger = Logger::new();
/// logger.add_appender(Box::new(appender));
/// logger.info("This log will be sent to graylog.local:12201");
/// ```
pub struct NetworkAppender {
    formatter: Arc<dyn Formatter>,
    writer: Mutex<NetworkWriter>,
}

impl NetworkAppender {
    /// Build the formatter and the writer from their settings
    pub fn new(formatter: FormatterSettings, network: &NetworkSettings) -> Result<Self> {
        let writer = NetworkWriter::from_settings(network)?;
        let formatter = create_formatter(formatter, Arc::new(SystemResolver::new()));
        Ok(Self::with_writer(formatter, writer))
    }

    pub fn with_writer(formatter: impl Into<Arc<dyn Formatter>>, writer: NetworkWriter) -> Self {
        Self {
            formatter: formatter.into(),
            writer: Mutex::new(writer),
        }
    }

    #[must_use]
    pub fn with_error_callback(self, callback: TransportErrorCallback) -> Self {
        let writer = self.writer.into_inner().with_error_callback(callback);
        Self {
            formatter: self.formatter,
            writer: Mutex::new(writer),
        }
    }

    pub fn stats(&self) -> WriterStats {
        self.writer.lock().stats()
    }

    pub fn close(&self) {
        self.writer.lock().close();
    }
}

impl Appender for NetworkAppender {
    fn append(&mut self, event: &LogEvent) -> Result<()> {
        let payload = self.formatter.format(event);
        self.writer.get_mut().write(&payload);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.get_mut().flush()
    }

    fn name(&self) -> &str {
        "network"
    }
}
