use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

/// Separator between address and host name in fragment lines.
pub const HOSTS_FIELD_SEPARATOR: &str = "    ";

/// One row of a hosts-file fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationEntry {
    pub domain: Arc<str>,
    pub destination: IpAddr,
}

impl ClassificationEntry {
    pub fn new(domain: impl Into<Arc<str>>, destination: IpAddr) -> Self {
        Self {
            domain: domain.into(),
            destination,
        }
    }

    /// Expands a domain into one entry per destination address.
    pub fn expand(domain: &Arc<str>, destinations: &[IpAddr]) -> Vec<Self> {
        destinations
            .iter()
            .map(|ip| Self::new(Arc::clone(domain), *ip))
            .collect()
    }

    pub fn to_hosts_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ClassificationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.destination, HOSTS_FIELD_SEPARATOR, self.domain)
    }
}

/// Kind of a line found in a hosts fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostsLine<'a> {
    /// Blank or `#` comment line, kept verbatim (trimmed) across rewrites.
    Comment(&'a str),
    /// Data line; only the host name is retained.
    Host(&'a str),
    /// Data line with fewer than two fields.
    Malformed(&'a str),
}

impl<'a> HostsLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Self::Comment(trimmed);
        }

        let mut fields = trimmed.split_whitespace();
        let _address = fields.next();
        match fields.next() {
            Some(host) => Self::Host(host),
            None => Self::Malformed(trimmed),
        }
    }
}

/// Strips the root label dot and lowercases a question name.
pub fn normalize_domain(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}
