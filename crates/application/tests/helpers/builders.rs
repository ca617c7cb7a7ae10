use banwatch_application::ports::HostsFileStore;
use banwatch_application::services::{CategoryBuffer, CategoryBuffers, MergePlan, PatternMatcher};
use banwatch_domain::Category;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{rdata::A, Name, RData, Record, RecordType};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

pub const BAN_FRAGMENT: &str = "/hosts/ban";
pub const SANCTION_FRAGMENT: &str = "/hosts/sanction";
pub const RESULT_FILE: &str = "/hosts/result";

pub fn checker(last_octet: u8) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 202, 10, last_octet)), 53)
}

pub fn ip(value: &str) -> IpAddr {
    value.parse().unwrap()
}

pub fn query_message(domain: &str) -> Message {
    let mut message = Message::new();
    message
        .set_id(4242)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    message.add_query(Query::query(fqdn(domain), RecordType::A));
    message
}

/// A checker response answering `domain` with `answer`.
pub fn a_response(domain: &str, answer: Ipv4Addr) -> Message {
    let mut message = query_message(domain);
    message
        .set_message_type(MessageType::Response)
        .set_recursion_available(true);
    message.add_answer(Record::from_rdata(fqdn(domain), 60, RData::A(A(answer))));
    message
}

pub fn fqdn(domain: &str) -> Name {
    Name::from_ascii(format!("{}.", domain.trim_end_matches('.'))).unwrap()
}

pub fn matcher(markers: &[&str]) -> PatternMatcher {
    let owned: Vec<String> = markers.iter().map(|m| m.to_string()).collect();
    PatternMatcher::new(&owned).unwrap()
}

pub fn merge_plan() -> Arc<MergePlan> {
    Arc::new(MergePlan::new(SANCTION_FRAGMENT, BAN_FRAGMENT, RESULT_FILE))
}

pub struct BuffersBuilder {
    ban_ips: Vec<IpAddr>,
    sanction_ips: Vec<IpAddr>,
    ban_threshold: usize,
    sanction_threshold: usize,
}

impl BuffersBuilder {
    pub fn new() -> Self {
        Self {
            ban_ips: vec![ip("10.0.0.1")],
            sanction_ips: vec![ip("10.0.0.2")],
            ban_threshold: 10,
            sanction_threshold: 10,
        }
    }

    pub fn ban_ips(mut self, ips: &[&str]) -> Self {
        self.ban_ips = ips.iter().map(|v| ip(v)).collect();
        self
    }

    pub fn sanction_ips(mut self, ips: &[&str]) -> Self {
        self.sanction_ips = ips.iter().map(|v| ip(v)).collect();
        self
    }

    pub fn ban_threshold(mut self, threshold: usize) -> Self {
        self.ban_threshold = threshold;
        self
    }

    pub fn sanction_threshold(mut self, threshold: usize) -> Self {
        self.sanction_threshold = threshold;
        self
    }

    pub fn build(self, store: Arc<dyn HostsFileStore>) -> CategoryBuffers {
        let plan = merge_plan();
        let ban = CategoryBuffer::new(
            Category::Ban,
            BAN_FRAGMENT,
            self.ban_ips,
            self.ban_threshold,
            store.clone(),
            plan.clone(),
        );
        let sanction = CategoryBuffer::new(
            Category::Sanction,
            SANCTION_FRAGMENT,
            self.sanction_ips,
            self.sanction_threshold,
            store,
            plan,
        );
        CategoryBuffers::new(Arc::new(ban), Arc::new(sanction))
    }
}

impl Default for BuffersBuilder {
    fn default() -> Self {
        Self::new()
    }
}
