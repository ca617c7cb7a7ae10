use super::exchange::exchange_message;
use async_trait::async_trait;
use banwatch_application::ports::CheckerExchange;
use banwatch_domain::DomainError;
use hickory_proto::op::{Edns, Message};
use std::net::SocketAddr;
use std::time::Duration;

/// Advertised UDP payload size; checkers attach extended DNS errors only
/// when the query carries an OPT record.
const CHECKER_EDNS_PAYLOAD: u16 = 1232;

/// Re-resolves queries against checker resolvers over the network.
pub struct HickoryCheckerExchange {
    timeout: Duration,
}

impl HickoryCheckerExchange {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

#[async_trait]
impl CheckerExchange for HickoryCheckerExchange {
    async fn exchange(&self, query: &Message, checker: SocketAddr) -> Result<Message, DomainError> {
        let mut request = query.clone();
        request.set_id(fastrand::u16(..)).set_recursion_desired(true);
        if request.extensions().is_none() {
            let mut edns = Edns::new();
            edns.set_max_payload(CHECKER_EDNS_PAYLOAD);
            request.set_edns(edns);
        }
        exchange_message(&request, checker, self.timeout).await
    }
}
