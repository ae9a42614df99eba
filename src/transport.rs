use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::{Nsec3Error, Protocol, Result};

/// One request/response round trip of raw DNS messages.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    fn protocol(&self) -> Protocol;

    /// Send `query` to `server` and return the raw reply.
    async fn send(&self, query: &[u8], server: SocketAddr) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct UdpTransport {
    timeout: Duration,
    recv_buffer_size: usize,
}

impl UdpTransport {
    pub fn new(timeout: Duration, udp_payload_size: u16) -> Self {
        Self {
            timeout,
            recv_buffer_size: udp_payload_size.max(512) as usize,
        }
    }

    async fn exchange(&self, query: &[u8], server: SocketAddr) -> Result<Vec<u8>> {
        let io_err = |e: std::io::Error| Nsec3Error::transport(Protocol::Udp, e);

        let bind_addr: SocketAddr = if server.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind_addr).await.map_err(io_err)?;
        socket.connect(server).await.map_err(io_err)?;

        socket.send(query).await.map_err(io_err)?;

        let mut response_buf = vec![0u8; self.recv_buffer_size];
        let response_len = socket.recv(&mut response_buf).await.map_err(io_err)?;
        response_buf.truncate(response_len);

        trace!(
            "Raw UDP response data ({} bytes): {:02x?}",
            response_len,
            &response_buf[..response_len.min(64)]
        );
        Ok(response_buf)
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }

    async fn send(&self, query: &[u8], server: SocketAddr) -> Result<Vec<u8>> {
        debug!("Sending {} byte query to {} over UDP", query.len(), server);
        timeout(self.timeout, self.exchange(query, server))
            .await
            .map_err(|_| {
                Nsec3Error::transport(Protocol::Udp, format!("timed out after {:?}", self.timeout))
            })?
    }
}

#[derive(Debug, Clone)]
pub struct TcpTransport {
    timeout: Duration,
}

impl TcpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn exchange(&self, query: &[u8], server: SocketAddr) -> Result<Vec<u8>> {
        let io_err = |e: std::io::Error| Nsec3Error::transport(Protocol::Tcp, e);

        let query_length = u16::try_from(query.len()).map_err(|_| {
            Nsec3Error::transport(Protocol::Tcp, format!("query of {} bytes is too large", query.len()))
        })?;

        let mut stream = TcpStream::connect(server).await.map_err(io_err)?;

        // Length-prefixed message (RFC 1035 section 4.2.2)
        let mut framed = Vec::with_capacity(query.len() + 2);
        framed.extend_from_slice(&query_length.to_be_bytes());
        framed.extend_from_slice(query);
        stream.write_all(&framed).await.map_err(io_err)?;
        stream.flush().await.map_err(io_err)?;

        let mut length_buf = [0u8; 2];
        stream.read_exact(&mut length_buf).await.map_err(io_err)?;
        let response_length = u16::from_be_bytes(length_buf) as usize;

        let mut response_buf = vec![0; response_length];
        stream.read_exact(&mut response_buf).await.map_err(io_err)?;

        trace!(
            "Raw TCP response data ({} bytes): {:02x?}",
            response_length,
            &response_buf[..response_length.min(64)]
        );
        Ok(response_buf)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    async fn send(&self, query: &[u8], server: SocketAddr) -> Result<Vec<u8>> {
        debug!("Sending {} byte query to {} over TCP", query.len(), server);
        timeout(self.timeout, self.exchange(query, server))
            .await
            .map_err(|_| {
                Nsec3Error::transport(Protocol::Tcp, format!("timed out after {:?}", self.timeout))
            })?
    }
}
