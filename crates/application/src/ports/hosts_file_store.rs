use async_trait::async_trait;
use banwatch_domain::DomainError;
use std::path::Path;

#[async_trait]
pub trait HostsFileStore: Send + Sync {
    /// Creates `path` containing `header` if it does not exist yet.
    /// Returns `true` when the file was created.
    async fn ensure_exists(&self, path: &Path, header: &str) -> Result<bool, DomainError>;

    /// Appends each line (newline-terminated) to `path`, creating it if absent.
    async fn append_lines(&self, path: &Path, lines: &[String]) -> Result<(), DomainError>;

    /// Host names of every data line, in file order, duplicates included.
    async fn read_hosts(&self, path: &Path) -> Result<Vec<String>, DomainError>;

    /// Keeps blank and comment lines, replaces all data lines with `lines`.
    async fn rewrite_data_lines(&self, path: &Path, lines: &[String]) -> Result<(), DomainError>;

    /// Replaces `destination` with the bytes of `first` followed by `second`.
    /// A failed merge must leave `destination` untouched.
    async fn merge(&self, first: &Path, second: &Path, destination: &Path)
        -> Result<(), DomainError>;
}
