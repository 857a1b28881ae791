//! Network sink configuration

use crate::core::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use super::chunk::CHUNK_HEADER_SIZE;

/// Transport used by a network sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[default]
    Udp,
    Tcp,
    Web,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::Udp => "udp",
            Protocol::Tcp => "tcp",
            Protocol::Web => "web",
        };
        write!(f, "{}", name)
    }
}

/// Restricts host name resolution to one address family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressFamily {
    #[default]
    Any,
    IPv4,
    IPv6,
}

impl AddressFamily {
    fn accepts(&self, addr: &SocketAddr) -> bool {
        match self {
            AddressFamily::Any => true,
            AddressFamily::IPv4 => addr.is_ipv4(),
            AddressFamily::IPv6 => addr.is_ipv6(),
        }
    }
}

/// How TCP payloads are delimited on the stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TcpFraming {
    /// GELF TCP convention: payload followed by `\0`
    #[default]
    NullByte,
    /// Payload followed by `\n`
    Newline,
    /// 4-byte big-endian length, then the payload
    LengthPrefixed,
}

impl TcpFraming {
    /// Delimiter byte terminating each frame, if this framing uses one
    pub fn delimiter(&self) -> Option<u8> {
        match self {
            TcpFraming::NullByte => Some(0),
            TcpFraming::Newline => Some(b'\n'),
            TcpFraming::LengthPrefixed => None,
        }
    }

    /// Frame one payload
    ///
    /// A payload containing the delimiter would reach the receiver as several
    /// frames, so it is rejected with a transport error instead.
    pub fn frame(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if let Some(delimiter) = self.delimiter() {
            if let Some(position) = payload.iter().position(|&b| b == delimiter) {
                return Err(LoggerError::transport(
                    "framing payload",
                    format!("payload contains the {:?} delimiter at byte {}", self, position),
                ));
            }
            let mut frame = Vec::with_capacity(payload.len() + 1);
            frame.extend_from_slice(payload);
            frame.push(delimiter);
            return Ok(frame);
        }

        let len = u32::try_from(payload.len()).map_err(|_| {
            LoggerError::transport(
                "framing payload",
                format!("{} bytes do not fit a 32-bit length prefix", payload.len()),
            )
        })?;
        let mut frame = Vec::with_capacity(payload.len() + 4);
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(payload);
        Ok(frame)
    }
}

/// Settings for UDP, TCP and HTTP sinks
///
/// # Examples
///
/// ```
/// use rust_log_transport::network::{NetworkSettings, Protocol};
///
/// let settings = NetworkSettings::new(Protocol::Udp, "graylog.local", 12201)
///     .with_compression(true)
///     .with_maximum_chunk_size(1420);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub protocol: Protocol,
    pub address_family: AddressFamily,
    pub host: String,
    pub port: u16,
    pub use_compression: bool,
    /// Only honoured by `Web` through an `https` URI
    pub encryption_enabled: bool,
    /// Largest UDP datagram, chunk header included
    pub maximum_chunk_size: usize,
    /// Target of `Web`; built from host and port when absent
    pub uri: Option<String>,
    pub http_method: String,
    pub content_type: String,
    pub timeout_ms: u64,
    pub tcp_framing: TcpFraming,
    /// Print transport failures to stderr
    pub report_errors: bool,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            address_family: AddressFamily::default(),
            host: String::new(),
            port: 0,
            use_compression: false,
            encryption_enabled: false,
            maximum_chunk_size: 8192,
            uri: None,
            http_method: "POST".to_string(),
            content_type: "application/json".to_string(),
            timeout_ms: 5000,
            tcp_framing: TcpFraming::default(),
            report_errors: true,
        }
    }
}

impl NetworkSettings {
    pub fn new(protocol: Protocol, host: impl Into<String>, port: u16) -> Self {
        Self {
            protocol,
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// HTTP sink posting to `uri`
    pub fn web(uri: impl Into<String>) -> Self {
        Self {
            protocol: Protocol::Web,
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_address_family(mut self, family: AddressFamily) -> Self {
        self.address_family = family;
        self
    }

    #[must_use]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    #[must_use]
    pub fn with_encryption(mut self, enabled: bool) -> Self {
        self.encryption_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_maximum_chunk_size(mut self, size: usize) -> Self {
        self.maximum_chunk_size = size;
        self
    }

    #[must_use]
    pub fn with_http_method(mut self, method: impl Into<String>) -> Self {
        self.http_method = method.into();
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    #[must_use]
    pub fn with_tcp_framing(mut self, framing: TcpFraming) -> Self {
        self.tcp_framing = framing;
        self
    }

    #[must_use]
    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Target URI of a `Web` sink
    pub fn effective_uri(&self) -> String {
        match &self.uri {
            Some(uri) => uri.trim().to_string(),
            None => {
                let scheme = if self.encryption_enabled { "https" } else { "http" };
                format!("{}://{}:{}/", scheme, self.host.trim(), self.port)
            }
        }
    }

    /// Resolve host and port, keeping the first address of the configured family
    pub fn resolve(&self) -> io::Result<SocketAddr> {
        (self.host.trim(), self.port)
            .to_socket_addrs()?
            .find(|addr| self.address_family.accepts(addr))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!(
                        "no {:?} address found for {}:{}",
                        self.address_family, self.host, self.port
                    ),
                )
            })
    }

    /// Check the settings before a writer is built
    pub fn validate(&self) -> Result<()> {
        let component = "NetworkSettings";
        if self.timeout_ms == 0 {
            return Err(LoggerError::config(component, "timeout must be greater than zero"));
        }

        match self.protocol {
            Protocol::Udp | Protocol::Tcp => {
                if self.host.trim().is_empty() {
                    return Err(LoggerError::config(component, "host is empty"));
                }
                if self.port == 0 {
                    return Err(LoggerError::config(component, "port must not be zero"));
                }
                if self.encryption_enabled {
                    return Err(LoggerError::config(
                        component,
                        format!("encryption is not supported by the {} transport", self.protocol),
                    ));
                }
                if self.protocol == Protocol::Udp && self.maximum_chunk_size <= CHUNK_HEADER_SIZE {
                    return Err(LoggerError::config(
                        component,
                        format!(
                            "maximum chunk size {} leaves no room after the {}-byte chunk header",
                            self.maximum_chunk_size, CHUNK_HEADER_SIZE
                        ),
                    ));
                }
            }
            Protocol::Web => {
                if self.uri.is_none() && self.host.trim().is_empty() {
                    return Err(LoggerError::config(component, "neither uri nor host is set"));
                }
                let uri = self.effective_uri();
                let secure = uri.starts_with("https://");
                if !secure && !uri.starts_with("http://") {
                    return Err(LoggerError::config(
                        component,
                        format!("'{}' is not an http(s) URI", uri),
                    ));
                }
                if self.encryption_enabled && !secure {
                    return Err(LoggerError::config(
                        component,
                        "encryption requires an https URI",
                    ));
                }
                if self.http_method.trim().is_empty() {
                    return Err(LoggerError::config(component, "http method is empty"));
                }
            }
        }
        Ok(())
    }
}
