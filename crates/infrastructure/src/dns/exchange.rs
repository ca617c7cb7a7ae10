//! One request/response round trip with a DNS server: UDP first, TCP when
//! the UDP answer comes back truncated.

use super::transport::Transport;
use banwatch_domain::DomainError;
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

pub async fn exchange_message(
    query: &Message,
    server: SocketAddr,
    timeout: Duration,
) -> Result<Message, DomainError> {
    let bytes = query
        .to_vec()
        .map_err(|e| DomainError::InvalidDnsResponse(format!("Failed to encode query: {}", e)))?;

    let response = round_trip(&Transport::udp(server), &bytes, query.id(), server, timeout).await?;
    if !response.header().truncated() {
        return Ok(response);
    }

    debug!(server = %server, "Truncated UDP response, retrying over TCP");
    round_trip(&Transport::tcp(server), &bytes, query.id(), server, timeout).await
}

async fn round_trip(
    transport: &Transport,
    bytes: &[u8],
    expected_id: u16,
    server: SocketAddr,
    timeout: Duration,
) -> Result<Message, DomainError> {
    let response = transport.send(bytes, timeout).await?;
    debug!(
        server = %server,
        protocol = transport.protocol_name(),
        bytes = response.bytes.len(),
        "Exchange completed"
    );
    let message = Message::from_vec(&response.bytes).map_err(|e| {
        DomainError::InvalidDnsResponse(format!(
            "Malformed {} response from {}: {}",
            response.protocol_used, server, e
        ))
    })?;

    if message.id() != expected_id {
        return Err(DomainError::InvalidDnsResponse(format!(
            "Response ID mismatch from {}: expected {}, got {}",
            server,
            expected_id,
            message.id()
        )));
    }

    Ok(message)
}
