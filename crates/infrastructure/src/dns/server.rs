use crate::dns::forwarding::UpstreamForwarder;
use banwatch_application::ports::ClassificationQueue;
use hickory_proto::op::{Header, Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::Record;
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Copies the question of an inbound request into a standalone query.
pub fn query_snapshot(request: &Request) -> Option<Message> {
    let info = match request.request_info() {
        Ok(info) => info,
        Err(e) => {
            debug!(error = %e, "Request carries no usable question");
            return None;
        }
    };

    let mut query = Message::new();
    query
        .set_id(fastrand::u16(..))
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(request.header().recursion_desired());
    query.add_query(info.query.original().clone());
    Some(query)
}

/// Hands every query to background classification, then lets `next`
/// answer it. Classification never delays or alters the answer.
pub struct ClassifyingHandler<N> {
    queue: Arc<dyn ClassificationQueue>,
    next: N,
}

impl<N> ClassifyingHandler<N> {
    pub fn new(queue: Arc<dyn ClassificationQueue>, next: N) -> Self {
        Self { queue, next }
    }
}

#[async_trait::async_trait]
impl<N: RequestHandler> RequestHandler for ClassifyingHandler<N> {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> ResponseInfo {
        if let Some(query) = query_snapshot(request) {
            if !self.queue.submit(query) {
                debug!(client = %request.src(), "Classification queue full, query not checked");
            }
        }

        self.next.handle_request(request, response_handle).await
    }
}

/// Answers clients by relaying the upstream response.
pub struct ForwardingHandler {
    forwarder: Arc<UpstreamForwarder>,
}

impl ForwardingHandler {
    pub fn new(forwarder: Arc<UpstreamForwarder>) -> Self {
        Self { forwarder }
    }
}

#[async_trait::async_trait]
impl RequestHandler for ForwardingHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let Some(query) = query_snapshot(request) else {
            return send_error_response(request, &mut response_handle, ResponseCode::FormErr).await;
        };

        let upstream = match self.forwarder.forward(&query).await {
            Ok(upstream) => upstream,
            Err(e) => {
                warn!(error = %e, "Query resolution failed");
                return send_error_response(request, &mut response_handle, ResponseCode::ServFail)
                    .await;
            }
        };

        let builder = MessageResponseBuilder::from_message_request(request);
        let mut header = Header::response_from_request(request.header());
        header.set_response_code(upstream.header().response_code());
        header.set_recursion_available(true);
        let response = builder.build(
            header,
            upstream.answers().iter(),
            upstream.name_servers().iter(),
            &[] as &[Record],
            upstream.additionals().iter(),
        );

        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(e) => {
                error!(error = %e, "Failed to send response");
                ResponseInfo::from(*request.header())
            }
        }
    }
}

async fn send_error_response<R: ResponseHandler>(
    request: &Request,
    response_handle: &mut R,
    code: ResponseCode,
) -> ResponseInfo {
    debug!(code = ?code, "Sending error response");
    let builder = MessageResponseBuilder::from_message_request(request);
    let mut header = Header::response_from_request(request.header());
    header.set_response_code(code);
    header.set_recursion_available(true);
    let response = builder.build_no_records(header);

    match response_handle.send_response(response).await {
        Ok(info) => info,
        Err(e) => {
            error!(error = %e, "Failed to send error response");
            ResponseInfo::from(*request.header())
        }
    }
}
