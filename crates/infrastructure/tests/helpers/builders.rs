use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RData, RecordType};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub fn query_message(domain: &str) -> Message {
    let name = Name::from_str(domain).unwrap();
    let mut message = Message::new();
    message
        .set_id(fastrand::u16(..))
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    message.add_query(Query::query(name, RecordType::A));
    message
}

pub fn first_a(message: &Message) -> Option<Ipv4Addr> {
    message.answers().iter().find_map(|r| match r.data() {
        RData::A(a) => Some(a.0),
        _ => None,
    })
}

/// Fragment and result paths laid out inside a scratch directory.
pub struct HostsLayout {
    pub ban: PathBuf,
    pub sanction: PathBuf,
    pub result: PathBuf,
}

impl HostsLayout {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            ban: dir.join("hosts-ban"),
            sanction: dir.join("hosts-sanction"),
            result: dir.join("hosts-result"),
        }
    }
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

pub fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
