use async_trait::async_trait;
use banwatch_application::ports::{CheckerExchange, HostsFileStore};
use banwatch_application::services::{CategoryBuffer, CategoryBuffers, MergePlan, PatternMatcher};
use banwatch_application::use_cases::{ClassifyQueryUseCase, FlushBuffersUseCase};
use banwatch_domain::{Category, DomainError};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{rdata::A, Name, RData, Record, RecordType};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub const BLOCK_PAGE: Ipv4Addr = Ipv4Addr::new(10, 10, 34, 34);
pub const BAN_FRAGMENT: &str = "/hosts/ban";
pub const SANCTION_FRAGMENT: &str = "/hosts/sanction";
pub const RESULT_FILE: &str = "/hosts/result";

pub fn query_message(domain: &str) -> Message {
    let mut message = Message::new();
    message
        .set_id(7)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    message.add_query(Query::query(
        Name::from_ascii(format!("{}.", domain)).unwrap(),
        RecordType::A,
    ));
    message
}

/// Answers every query with the block page address once the gate lets it.
pub struct GatedExchange {
    gate: Semaphore,
    calls: AtomicUsize,
}

impl GatedExchange {
    pub fn open() -> Self {
        Self {
            gate: Semaphore::new(Semaphore::MAX_PERMITS),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn closed() -> Self {
        Self {
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn release(&self, exchanges: usize) {
        self.gate.add_permits(exchanges);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CheckerExchange for GatedExchange {
    async fn exchange(&self, query: &Message, _checker: SocketAddr) -> Result<Message, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| DomainError::TransportAllServersUnreachable)?;
        permit.forget();

        let mut response = query.clone();
        response
            .set_message_type(MessageType::Response)
            .set_recursion_available(true);
        let name = query.queries()[0].name().clone();
        response.add_answer(Record::from_rdata(name, 60, RData::A(A(BLOCK_PAGE))));
        Ok(response)
    }
}

/// Hosts store that only records appended lines.
#[derive(Default)]
pub struct RecordingStore {
    appended: Mutex<HashMap<PathBuf, Vec<String>>>,
    merges: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn appended(&self, path: &str) -> Vec<String> {
        self.appended
            .lock()
            .unwrap()
            .get(Path::new(path))
            .cloned()
            .unwrap_or_default()
    }

    pub fn merges(&self) -> usize {
        self.merges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostsFileStore for RecordingStore {
    async fn ensure_exists(&self, _path: &Path, _header: &str) -> Result<bool, DomainError> {
        Ok(false)
    }

    async fn append_lines(&self, path: &Path, lines: &[String]) -> Result<(), DomainError> {
        self.appended
            .lock()
            .unwrap()
            .entry(path.to_path_buf())
            .or_default()
            .extend_from_slice(lines);
        Ok(())
    }

    async fn read_hosts(&self, _path: &Path) -> Result<Vec<String>, DomainError> {
        Ok(Vec::new())
    }

    async fn rewrite_data_lines(&self, _path: &Path, _lines: &[String]) -> Result<(), DomainError> {
        Ok(())
    }

    async fn merge(
        &self,
        _first: &Path,
        _second: &Path,
        _destination: &Path,
    ) -> Result<(), DomainError> {
        self.merges.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct Pipeline {
    pub classify: Arc<ClassifyQueryUseCase>,
    pub flush: Arc<FlushBuffersUseCase>,
    pub buffers: CategoryBuffers,
}

/// Ban-only pipeline: the block page address is the ban marker.
pub fn pipeline(
    exchange: Arc<dyn CheckerExchange>,
    store: Arc<dyn HostsFileStore>,
    threshold: usize,
) -> Pipeline {
    let plan = Arc::new(MergePlan::new(SANCTION_FRAGMENT, BAN_FRAGMENT, RESULT_FILE));
    let ban = Arc::new(CategoryBuffer::new(
        Category::Ban,
        BAN_FRAGMENT,
        vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))],
        threshold,
        Arc::clone(&store),
        Arc::clone(&plan),
    ));
    let sanction = Arc::new(CategoryBuffer::new(
        Category::Sanction,
        SANCTION_FRAGMENT,
        vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))],
        threshold,
        store,
        plan,
    ));
    let buffers = CategoryBuffers::new(ban, sanction);

    let classify = Arc::new(ClassifyQueryUseCase::new(
        vec![SocketAddr::from(([10, 202, 10, 10], 53))],
        exchange,
        PatternMatcher::new(&[BLOCK_PAGE.to_string()]).unwrap(),
        PatternMatcher::new(&["SANCTIONED".to_string()]).unwrap(),
        buffers.clone(),
    ));
    let flush = Arc::new(FlushBuffersUseCase::new(buffers.clone()));

    Pipeline {
        classify,
        flush,
        buffers,
    }
}
