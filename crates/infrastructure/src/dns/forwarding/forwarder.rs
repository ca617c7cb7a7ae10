use crate::dns::exchange::exchange_message;
use banwatch_domain::DomainError;
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, warn};

/// Sends client queries to the upstream resolvers, first success wins.
pub struct UpstreamForwarder {
    servers: Vec<SocketAddr>,
    timeout: Duration,
}

impl UpstreamForwarder {
    pub fn new(servers: Vec<SocketAddr>, timeout_ms: u64) -> Self {
        Self {
            servers,
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    pub async fn forward(&self, query: &Message) -> Result<Message, DomainError> {
        for server in &self.servers {
            match exchange_message(query, *server, self.timeout).await {
                Ok(response) => {
                    debug!(server = %server, answers = response.answers().len(), "Upstream answered");
                    return Ok(response);
                }
                Err(e) => {
                    warn!(server = %server, error = %e, "Upstream query failed, trying next");
                }
            }
        }
        Err(DomainError::TransportAllServersUnreachable)
    }
}
