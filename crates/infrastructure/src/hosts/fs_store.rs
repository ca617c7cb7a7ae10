//! Hosts-file fragments on the local filesystem.
//!
//! Whole-file rewrites (data-line replacement and merges) go through a
//! temporary file in the destination directory followed by a rename, so a
//! failure never leaves the destination truncated.

use async_trait::async_trait;
use banwatch_application::ports::HostsFileStore;
use banwatch_domain::{DomainError, HostsLine};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[cfg(unix)]
const DEFAULT_MODE: u32 = 0o644;

#[derive(Debug, Default, Clone)]
pub struct FsHostsStore;

impl FsHostsStore {
    pub fn new() -> Self {
        Self
    }
}

async fn blocking<T, F>(path: &Path, f: F) -> Result<T, DomainError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DomainError::hosts_io(path, e))?
}

fn ensure_exists_sync(path: &Path, header: &str) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(header.as_bytes())?;
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}

fn append_lines_sync(path: &Path, lines: &[String]) -> io::Result<()> {
    let mut buf = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        buf.push_str(line);
        buf.push('\n');
    }

    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    file.write_all(buf.as_bytes())?;
    file.sync_data()
}

fn read_hosts_sync(path: &Path) -> io::Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    let mut hosts = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        match HostsLine::parse(line) {
            HostsLine::Host(host) => hosts.push(host.to_string()),
            HostsLine::Comment(_) => {}
            HostsLine::Malformed(text) => {
                warn!(path = %path.display(), line = index + 1, text, "Skipping malformed hosts line");
            }
        }
    }
    Ok(hosts)
}

fn rewrite_data_lines_sync(path: &Path, lines: &[String]) -> io::Result<()> {
    let contents = fs::read_to_string(path)?;
    let mut rewritten = String::with_capacity(contents.len());
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
    replace_file(path, rewritten.as_bytes())
}

/// Writes `contents` next to `destination` and renames it into place,
/// keeping the destination's permissions when it already exists.
fn replace_file(destination: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_data()?;

    match fs::metadata(destination) {
        Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
        Err(_) => set_default_mode(tmp.as_file())?,
    }

    tmp.persist(destination).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn set_default_mode(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(DEFAULT_MODE))
}

#[cfg(not(unix))]
fn set_default_mode(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

fn merge_sync(first: &Path, second: &Path, destination: &Path) -> Result<(), DomainError> {
    let merge_error = |path: &Path, e: io::Error| DomainError::MergeFailed {
        destination: destination.display().to_string(),
        reason: format!("{}: {}", path.display(), e),
    };

    let mut merged = fs::read(first).map_err(|e| merge_error(first, e))?;
    let second_bytes = fs::read(second).map_err(|e| merge_error(second, e))?;
    merged.extend_from_slice(&second_bytes);

    replace_file(destination, &merged).map_err(|e| merge_error(destination, e))?;

    debug!(
        destination = %destination.display(),
        bytes = merged.len(),
        "Hosts files merged"
    );
    Ok(())
}

#[async_trait]
impl HostsFileStore for FsHostsStore {
    async fn ensure_exists(&self, path: &Path, header: &str) -> Result<bool, DomainError> {
        let owned = path.to_path_buf();
        let header = header.to_string();
        blocking(path, move || {
            ensure_exists_sync(&owned, &header).map_err(|e| DomainError::hosts_io(&owned, e))
        })
        .await
    }

    async fn append_lines(&self, path: &Path, lines: &[String]) -> Result<(), DomainError> {
        let owned = path.to_path_buf();
        let lines = lines.to_vec();
        blocking(path, move || {
            append_lines_sync(&owned, &lines).map_err(|e| DomainError::hosts_io(&owned, e))
        })
        .await
    }

    async fn read_hosts(&self, path: &Path) -> Result<Vec<String>, DomainError> {
        let owned = path.to_path_buf();
        blocking(path, move || {
            read_hosts_sync(&owned).map_err(|e| DomainError::hosts_io(&owned, e))
        })
        .await
    }

    async fn rewrite_data_lines(&self, path: &Path, lines: &[String]) -> Result<(), DomainError> {
        let owned = path.to_path_buf();
        let lines = lines.to_vec();
        blocking(path, move || {
            rewrite_data_lines_sync(&owned, &lines).map_err(|e| DomainError::hosts_io(&owned, e))
        })
        .await
    }

    async fn merge(
        &self,
        first: &Path,
        second: &Path,
        destination: &Path,
    ) -> Result<(), DomainError> {
        let first = first.to_path_buf();
        let second = second.to_path_buf();
        let owned = destination.to_path_buf();
        blocking(destination, move || merge_sync(&first, &second, &owned)).await
    }
}
