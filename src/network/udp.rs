//! UDP writer with GELF chunking

use super::chunk::UdpChunkHelper;
use super::compression::encode_payload;
use super::settings::{NetworkSettings, Protocol};
use super::transport::{DatagramTransport, UdpTransport};
use super::{ErrorReporter, TransportErrorCallback, WriterStats};
use crate::core::{LoggerError, Result};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Sends each payload as one datagram, or as a burst of chunks when it does
/// not fit `maximum_chunk_size`
pub struct UdpWriter {
    transport: Option<Box<dyn DatagramTransport>>,
    chunker: UdpChunkHelper,
    compress: bool,
    reporter: ErrorReporter,
    stats: WriterStats,
}

impl UdpWriter {
    pub fn new(settings: &NetworkSettings) -> Result<Self> {
        Self::with_transport(settings, Box::new(UdpTransport::new(settings)))
    }

    /// Build over a caller-provided transport
    pub fn with_transport(
        settings: &NetworkSettings,
        transport: Box<dyn DatagramTransport>,
    ) -> Result<Self> {
        if settings.protocol != Protocol::Udp {
            return Err(LoggerError::config(
                "UdpWriter",
                format!("expected udp settings, got {}", settings.protocol),
            ));
        }
        settings.validate()?;

        Ok(Self {
            transport: Some(transport),
            chunker: UdpChunkHelper::new(settings.maximum_chunk_size)?,
            compress: settings.use_compression,
            reporter: ErrorReporter::new("udp", settings.report_errors),
            stats: WriterStats::default(),
        })
    }

    #[must_use]
    pub fn with_error_callback(mut self, callback: TransportErrorCallback) -> Self {
        self.reporter.set_callback(callback);
        self
    }

    pub fn try_write(&mut self, payload: &str) -> Result<()> {
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| LoggerError::WriterClosed("udp".to_string()))?;

        let result = send_chunks(
            transport.as_mut(),
            &self.chunker,
            self.compress,
            payload,
            &mut self.stats,
        );
        match result {
            Ok(()) => self.stats.payloads_sent += 1,
            Err(_) => self.stats.payloads_failed += 1,
        }
        result
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

fn send_chunks(
    transport: &mut dyn DatagramTransport,
    chunker: &UdpChunkHelper,
    compress: bool,
    payload: &str,
    stats: &mut WriterStats,
) -> Result<()> {
    let bytes = encode_payload(payload, compress)?;

    // Oversized messages fail here before any chunk goes out
    let chunks = chunker.chunk(&bytes)?;
    for chunk in &chunks {
        let datagram = chunk.to_datagram();
        transport.send(&datagram).map_err(|e| {
            LoggerError::io_operation(
                "sending datagram",
                format!("chunk {} of {}", chunk.chunk_index + 1, chunk.chunk_count),
                e,
            )
        })?;
        stats.packets_sent += 1;
        stats.bytes_sent += datagram.len() as u64;
    }
    Ok(())
}

impl Drop for UdpWriter {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for UdpWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UdpWriter")
            .field("closed", &self.is_closed())
            .field("max_datagram_size", &self.chunker.max_datagram_size())
            .field("compress", &self.compress)
            .field("stats", &self.stats)
            .finish()
    }
}
