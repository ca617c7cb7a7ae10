use hickory_proto::op::Message;

/// Hands a query off to background classification.
pub trait ClassificationQueue: Send + Sync {
    /// Never blocks; returns `false` when the query was dropped.
    fn submit(&self, query: Message) -> bool;
}
