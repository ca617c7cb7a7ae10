use hickory_proto::op::{Edns, Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::opt::EdnsOption;
use hickory_proto::rr::{rdata, RData, Record};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// How the mock answers each query it receives.
#[derive(Debug, Clone, Copy)]
pub enum MockReply {
    /// One A record per question pointing at the address.
    Answer(Ipv4Addr),
    /// Empty NXDOMAIN response.
    NxDomain,
    /// NXDOMAIN carrying an extended DNS error when the query had EDNS.
    Filtered(u16, &'static str),
    /// Never replies; exercises client timeouts.
    Silent,
}

pub struct MockDnsServer {
    addr: SocketAddr,
    received: Arc<AtomicUsize>,
    with_edns: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(reply: MockReply) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let received = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&received);
        let with_edns = Arc::new(AtomicUsize::new(0));
        let edns_counter = Arc::clone(&with_edns);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            counter.fetch_add(1, Ordering::SeqCst);
                            if Self::has_edns(&buf[..len]) {
                                edns_counter.fetch_add(1, Ordering::SeqCst);
                            }
                            if let Some(response) = Self::build_response(&buf[..len], reply) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            received,
            with_edns,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }

    /// Queries that arrived with an OPT record.
    pub fn received_with_edns(&self) -> usize {
        self.with_edns.load(Ordering::SeqCst)
    }

    fn has_edns(query: &[u8]) -> bool {
        Message::from_vec(query)
            .map(|m| m.extensions().is_some())
            .unwrap_or(false)
    }

    fn build_response(query: &[u8], reply: MockReply) -> Option<Vec<u8>> {
        let query = Message::from_vec(query).ok()?;

        let mut response = Message::new();
        response
            .set_id(query.id())
            .set_message_type(MessageType::Response)
            .set_op_code(query.op_code())
            .set_recursion_desired(query.recursion_desired())
            .set_recursion_available(true);
        response.add_queries(query.queries().iter().cloned());

        match reply {
            MockReply::Silent => return None,
            MockReply::NxDomain => {
                response.set_response_code(ResponseCode::NXDomain);
            }
            MockReply::Filtered(info_code, text) => {
                response.set_response_code(ResponseCode::NXDomain);
                if query.extensions().is_some() {
                    let mut data = info_code.to_be_bytes().to_vec();
                    data.extend_from_slice(text.as_bytes());
                    let mut edns = Edns::new();
                    edns.set_max_payload(1232);
                    edns.options_mut().insert(EdnsOption::Unknown(15, data));
                    response.set_edns(edns);
                }
            }
            MockReply::Answer(ip) => {
                for q in query.queries() {
                    response.add_answer(Record::from_rdata(
                        q.name().clone(),
                        60,
                        RData::A(rdata::A(ip)),
                    ));
                }
            }
        }

        response.to_vec().ok()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
