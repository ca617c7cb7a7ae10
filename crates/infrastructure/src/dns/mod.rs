pub mod checker;
pub mod exchange;
pub mod forwarding;
pub mod server;
pub mod transport;

pub use checker::HickoryCheckerExchange;
pub use exchange::exchange_message;
pub use forwarding::UpstreamForwarder;
pub use server::{ClassifyingHandler, ForwardingHandler};
