use async_trait::async_trait;
use banwatch_domain::DomainError;
use hickory_proto::op::Message;
use std::net::SocketAddr;

#[async_trait]
pub trait CheckerExchange: Send + Sync {
    /// Sends `query` to one checker resolver and returns its response.
    ///
    /// Implementations bound the exchange with their own timeout.
    async fn exchange(&self, query: &Message, checker: SocketAddr) -> Result<Message, DomainError>;
}
