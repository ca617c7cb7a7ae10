use async_trait::async_trait;
use banwatch_application::ports::{CheckerExchange, HostsFileStore};
use banwatch_domain::{DomainError, HostsLine};
use hickory_proto::op::Message;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Checker exchange answering from a fixed table; unknown checkers time out.
#[derive(Default)]
pub struct MockCheckerExchange {
    responses: Mutex<HashMap<SocketAddr, Result<Message, DomainError>>>,
    calls: Mutex<Vec<SocketAddr>>,
}

impl MockCheckerExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_response(&self, checker: SocketAddr, response: Message) {
        self.responses.lock().unwrap().insert(checker, Ok(response));
    }

    pub fn set_error(&self, checker: SocketAddr, error: DomainError) {
        self.responses.lock().unwrap().insert(checker, Err(error));
    }

    pub fn calls(&self) -> Vec<SocketAddr> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckerExchange for MockCheckerExchange {
    async fn exchange(&self, _query: &Message, checker: SocketAddr) -> Result<Message, DomainError> {
        self.calls.lock().unwrap().push(checker);
        self.responses
            .lock()
            .unwrap()
            .get(&checker)
            .cloned()
            .unwrap_or_else(|| {
                Err(DomainError::TransportTimeout {
                    server: checker.to_string(),
                })
            })
    }
}

/// In-memory hosts files with switchable failures.
#[derive(Default)]
pub struct MockHostsStore {
    files: Mutex<HashMap<PathBuf, String>>,
    fail_append: AtomicBool,
    fail_merge: AtomicBool,
    append_calls: AtomicUsize,
    merge_calls: AtomicUsize,
}

impl MockHostsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }

    pub fn set_file(&self, path: &str, contents: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), contents.to_string());
    }

    pub fn set_fail_append(&self, fail: bool) {
        self.fail_append.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_merge(&self, fail: bool) {
        self.fail_merge.store(fail, Ordering::SeqCst);
    }

    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    pub fn merge_calls(&self) -> usize {
        self.merge_calls.load(Ordering::SeqCst)
    }

    fn missing(path: &Path) -> DomainError {
        DomainError::hosts_io(path, "No such file or directory")
    }
}

#[async_trait]
impl HostsFileStore for MockHostsStore {
    async fn ensure_exists(&self, path: &Path, header: &str) -> Result<bool, DomainError> {
        let mut files = self.files.lock().unwrap();
        if files.contains_key(path) {
            return Ok(false);
        }
        files.insert(path.to_path_buf(), header.to_string());
        Ok(true)
    }

    async fn append_lines(&self, path: &Path, lines: &[String]) -> Result<(), DomainError> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(DomainError::hosts_io(path, "disk full"));
        }
        let mut files = self.files.lock().unwrap();
        let contents = files.entry(path.to_path_buf()).or_default();
        for line in lines {
            contents.push_str(line);
            contents.push('\n');
        }
        Ok(())
    }

    async fn read_hosts(&self, path: &Path) -> Result<Vec<String>, DomainError> {
        let files = self.files.lock().unwrap();
        let contents = files.get(path).ok_or_else(|| Self::missing(path))?;
        Ok(contents
            .lines()
            .filter_map(|line| match HostsLine::parse(line) {
                HostsLine::Host(host) => Some(host.to_string()),
                _ => None,
            })
            .collect())
    }

    async fn rewrite_data_lines(&self, path: &Path, lines: &[String]) -> Result<(), DomainError> {
        let mut files = self.files.lock().unwrap();
        let contents = files.get(path).ok_or_else(|| Self::missing(path))?;
        let mut rewritten = String::new();
        for line in contents.lines() {
            if let HostsLine::Comment(comment) = HostsLine::parse(line) {
                rewritten.push_str(comment);
                rewritten.push('\n');
            }
        }
        for line in lines {
            rewritten.push_str(line);
            rewritten.push('\n');
        }
        files.insert(path.to_path_buf(), rewritten);
        Ok(())
    }

    async fn merge(
        &self,
        first: &Path,
        second: &Path,
        destination: &Path,
    ) -> Result<(), DomainError> {
        self.merge_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_merge.load(Ordering::SeqCst) {
            return Err(DomainError::MergeFailed {
                destination: destination.display().to_string(),
                reason: "read-only file system".to_string(),
            });
        }
        let mut files = self.files.lock().unwrap();
        let a = files.get(first).ok_or_else(|| Self::missing(first))?.clone();
        let b = files.get(second).ok_or_else(|| Self::missing(second))?.clone();
        files.insert(destination.to_path_buf(), format!("{}{}", a, b));
        Ok(())
    }
}
