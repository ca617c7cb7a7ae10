//! Text rendering of DNS messages in the style of `dig`.
//!
//! Classification markers are matched against this text, so it includes
//! every section of the response: header and flags, the EDNS pseudo-section
//! (including extended DNS error text), question, answer, authority and
//! additional records.

use hickory_proto::op::{Edns, Message, MessageType};
use hickory_proto::rr::rdata::opt::{EdnsCode, EdnsOption};
use hickory_proto::rr::Record;
use std::fmt::Write;

/// EDNS option code of Extended DNS Errors (RFC 8914).
const EDE_OPTION_CODE: u16 = 15;

pub fn render_response(message: &Message) -> String {
    let mut out = String::with_capacity(512);
    let header = message.header();

    let _ = writeln!(
        out,
        ";; opcode: {}, status: {}, id: {}",
        format!("{:?}", header.op_code()).to_uppercase(),
        format!("{:?}", header.response_code()).to_uppercase(),
        header.id()
    );

    let mut flags = Vec::with_capacity(7);
    if header.message_type() == MessageType::Response {
        flags.push("qr");
    }
    if header.authoritative() {
        flags.push("aa");
    }
    if header.truncated() {
        flags.push("tc");
    }
    if header.recursion_desired() {
        flags.push("rd");
    }
    if header.recursion_available() {
        flags.push("ra");
    }
    if header.authentic_data() {
        flags.push("ad");
    }
    if header.checking_disabled() {
        flags.push("cd");
    }
    let _ = writeln!(
        out,
        ";; flags: {}; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
        flags.join(" "),
        message.queries().len(),
        message.answers().len(),
        message.name_servers().len(),
        message.additionals().len()
    );

    if let Some(edns) = message.extensions() {
        write_edns(&mut out, edns);
    }

    if !message.queries().is_empty() {
        out.push_str("\n;; QUESTION SECTION:\n");
        for query in message.queries() {
            let _ = writeln!(
                out,
                ";{}\t{}\t{}",
                query.name(),
                query.query_class(),
                query.query_type()
            );
        }
    }

    write_section(&mut out, "ANSWER", message.answers());
    write_section(&mut out, "AUTHORITY", message.name_servers());
    write_section(&mut out, "ADDITIONAL", message.additionals());

    out
}

fn write_section(out: &mut String, title: &str, records: &[Record]) {
    if records.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n;; {} SECTION:", title);
    for record in records {
        let _ = writeln!(out, "{}", record);
    }
}

fn write_edns(out: &mut String, edns: &Edns) {
    out.push_str("\n;; OPT PSEUDOSECTION:\n");
    let _ = writeln!(
        out,
        "; EDNS: version: {}; udp: {}",
        edns.version(),
        edns.max_payload()
    );

    // info-code (u16) followed by optional UTF-8 extra text
    if let Some(EdnsOption::Unknown(_, data)) = edns.option(EdnsCode::from(EDE_OPTION_CODE)) {
        if data.len() >= 2 {
            let info_code = u16::from_be_bytes([data[0], data[1]]);
            let extra_text = String::from_utf8_lossy(&data[2..]);
            let _ = writeln!(out, "; EDE: {}: ({})", info_code, extra_text);
        }
    }
}
