//! Socket and client abstractions used by the network writers
//!
//! Writers only talk to these traits, so tests can substitute doubles that
//! record traffic or fail on demand.

use super::settings::NetworkSettings;
use crate::core::Result;
#[cfg(feature = "web")]
use crate::core::LoggerError;
use std::io::{self, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, UdpSocket};
use std::time::Duration;

/// Sends whole datagrams
pub trait DatagramTransport: Send {
    fn send(&mut self, datagram: &[u8]) -> io::Result<()>;

    /// Release the socket; called once by the owning writer
    fn close(&mut self) {}
}

/// Opens byte streams
pub trait StreamConnector: Send {
    fn connect(&mut self) -> io::Result<Box<dyn Write + Send>>;

    fn close(&mut self) {}
}

/// One HTTP request issued by the web writer
#[derive(Debug, Clone, Copy)]
pub struct HttpRequest<'a> {
    pub method: &'a str,
    pub uri: &'a str,
    pub content_type: &'a str,
    pub content_encoding: Option<&'a str>,
    pub body: &'a [u8],
    pub timeout: Duration,
}

/// Issues HTTP requests and returns the response status
pub trait HttpTransport: Send {
    fn send(&mut self, request: &HttpRequest<'_>) -> Result<u16>;

    fn close(&mut self) {}
}

/// UDP socket bound to an ephemeral port and connected to the target
///
/// The socket is opened on first use and reopened after a send failure, so
/// name resolution problems at startup do not disable the sink.
pub struct UdpTransport {
    settings: NetworkSettings,
    socket: Option<UdpSocket>,
}

impl UdpTransport {
    pub fn new(settings: &NetworkSettings) -> Self {
        Self {
            settings: settings.clone(),
            socket: None,
        }
    }

    fn open(&self) -> io::Result<UdpSocket> {
        let target = self.settings.resolve()?;
        let unspecified = match target {
            SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        let socket = UdpSocket::bind(SocketAddr::new(unspecified, 0))?;
        socket.set_write_timeout(Some(self.settings.timeout()))?;
        socket.connect(target)?;
        Ok(socket)
    }
}

impl DatagramTransport for UdpTransport {
    fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
        if self.socket.is_none() {
            self.socket = Some(self.open()?);
        }
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "udp socket not open"))?;

        match socket.send(datagram) {
            Ok(sent) if sent == datagram.len() => Ok(()),
            Ok(sent) => Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("datagram truncated: {} of {} bytes sent", sent, datagram.len()),
            )),
            Err(e) => {
                self.socket = None;
                Err(e)
            }
        }
    }

    fn close(&mut self) {
        self.socket = None;
    }
}

/// TCP connector for the first resolved address of the configured family
pub struct TcpConnector {
    settings: NetworkSettings,
}

impl TcpConnector {
    pub fn new(settings: &NetworkSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }
}

impl StreamConnector for TcpConnector {
    fn connect(&mut self) -> io::Result<Box<dyn Write + Send>> {
        let target = self.settings.resolve()?;
        let timeout = self.settings.timeout();
        let stream = TcpStream::connect_timeout(&target, timeout)?;

        // Set timeouts to prevent hanging
        stream.set_write_timeout(Some(timeout))?;
        stream.set_read_timeout(Some(timeout))?;

        // Enable TCP_NODELAY for low-latency logging
        stream.set_nodelay(true)?;

        Ok(Box::new(stream))
    }
}

/// Blocking HTTP client
#[cfg(feature = "web")]
pub struct ReqwestTransport {
    client: Option<reqwest::blocking::Client>,
}

#[cfg(feature = "web")]
impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoggerError::config("ReqwestTransport", e.to_string()))?;
        Ok(Self {
            client: Some(client),
        })
    }
}

#[cfg(feature = "web")]
impl HttpTransport for ReqwestTransport {
    fn send(&mut self, request: &HttpRequest<'_>) -> Result<u16> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| LoggerError::WriterClosed("web".to_string()))?;

        let method = reqwest::Method::from_bytes(request.method.trim().to_uppercase().as_bytes())
            .map_err(|e| LoggerError::config("ReqwestTransport", e.to_string()))?;

        let mut builder = client
            .request(method, request.uri)
            .timeout(request.timeout)
            .header(reqwest::header::CONTENT_TYPE, request.content_type)
            .body(request.body.to_vec());
        if let Some(encoding) = request.content_encoding {
            builder = builder.header(reqwest::header::CONTENT_ENCODING, encoding);
        }

        let response = builder
            .send()
            .map_err(|e| LoggerError::transport("sending http request", e.to_string()))?;
        Ok(response.status().as_u16())
    }

    fn close(&mut self) {
        self.client = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Protocol;

    #[test]
    fn test_udp_transport_sends_to_listener() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let port = receiver.local_addr().unwrap().port();

        let settings = NetworkSettings::new(Protocol::Udp, "127.0.0.1", port);
        let mut transport = UdpTransport::new(&settings);
        transport.send(b"hello").unwrap();

        let mut buf = [0u8; 64];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");

        transport.close();
        transport.close();
    }

    #[test]
    fn test_tcp_connector_refused() {
        // Bind then drop to get a port nobody listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let settings = NetworkSettings::new(Protocol::Tcp, "127.0.0.1", port)
            .with_timeout(Duration::from_millis(500));
        assert!(TcpConnector::new(&settings).connect().is_err());
    }
}
