//! TCP Transport for DNS queries (RFC 1035 §4.2.2)
//!
//! Each message is prefixed with its length as a big-endian u16. One
//! connection per exchange.

use super::{io_error, timeout_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use banwatch_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const MAX_TCP_MESSAGE_SIZE: usize = 65535;

pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn connect(&self, timeout: Duration) -> Result<TcpStream, DomainError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(self.server_addr))
            .await
            .map_err(|_| timeout_error(self.server_addr))?
            .map_err(|e| io_error(self.server_addr, "connect", e))?;

        stream
            .set_nodelay(true)
            .map_err(|e| io_error(self.server_addr, "set TCP_NODELAY", e))?;

        Ok(stream)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        if message_bytes.len() > MAX_TCP_MESSAGE_SIZE {
            return Err(DomainError::InvalidDnsResponse(format!(
                "DNS message too large for TCP: {} bytes",
                message_bytes.len()
            )));
        }

        let mut stream = self.connect(timeout).await?;

        tokio::time::timeout(timeout, send_with_length_prefix(&mut stream, message_bytes))
            .await
            .map_err(|_| timeout_error(self.server_addr))?
            .map_err(|e| io_error(self.server_addr, "send TCP query", e))?;

        debug!(server = %self.server_addr, message_len = message_bytes.len(), "TCP query sent");

        let bytes = tokio::time::timeout(timeout, read_with_length_prefix(&mut stream))
            .await
            .map_err(|_| timeout_error(self.server_addr))?
            .map_err(|e| io_error(self.server_addr, "read TCP response", e))?;

        debug!(server = %self.server_addr, response_len = bytes.len(), "TCP response received");

        Ok(TransportResponse {
            bytes,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

async fn send_with_length_prefix(
    stream: &mut TcpStream,
    message_bytes: &[u8],
) -> std::io::Result<()> {
    let len = (message_bytes.len() as u16).to_be_bytes();
    let mut framed = Vec::with_capacity(2 + message_bytes.len());
    framed.extend_from_slice(&len);
    framed.extend_from_slice(message_bytes);
    stream.write_all(&framed).await?;
    stream.flush().await
}

async fn read_with_length_prefix(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;
    let len = u16::from_be_bytes(len_buf) as usize;

    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await?;
    Ok(buf)
}
