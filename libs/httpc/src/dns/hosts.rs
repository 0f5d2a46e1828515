//! Static host table (`/etc/hosts` and friends).

use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::path::Path;
use std::sync::OnceLock;

/// Location of the platform hosts file
#[cfg(windows)]
pub const HOSTS_PATH: &str = r"C:\Windows\System32\drivers\etc\hosts";
/// Location of the platform hosts file
#[cfg(not(windows))]
pub const HOSTS_PATH: &str = "/etc/hosts";

/// Process-wide hosts table, read on first use and kept for the process lifetime.
static SYSTEM_HOSTS: OnceLock<HostsTable> = OnceLock::new();

/// Name → address table parsed from a hosts file.
///
/// Each non-empty line holds an address followed by one or more names;
/// anything after `#` is a comment. The first line naming a host wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostsTable {
    entries: HashMap<String, IpAddr>,
}

impl HostsTable {
    /// Parse hosts-file content. Lines whose address does not parse are skipped.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();
        for line in content.lines() {
            let line = line.split_once('#').map_or(line, |(data, _)| data);
            let mut fields = line.split_whitespace();
            let Some(Ok(addr)) = fields.next().map(str::parse::<IpAddr>) else {
                continue;
            };
            for name in fields {
                entries.entry(name.to_ascii_lowercase()).or_insert(addr);
            }
        }
        Self { entries }
    }

    /// Read and parse the file at `path`.
    ///
    /// # Errors
    /// Returns the I/O error if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Address recorded for `name`
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<IpAddr> {
        self.entries.get(&name.to_ascii_lowercase()).copied()
    }

    /// Number of names in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the table holds no names
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The platform hosts table, loaded once.
///
/// An unreadable hosts file yields an empty table for the rest of the process.
/// The first call reads the file on the calling thread; async code should use
/// [`load_system_hosts`].
#[must_use]
pub fn system_hosts() -> &'static HostsTable {
    SYSTEM_HOSTS.get_or_init(read_system_hosts)
}

/// [`system_hosts`] with the first read moved to tokio's blocking pool.
pub async fn load_system_hosts() -> &'static HostsTable {
    if let Some(table) = SYSTEM_HOSTS.get() {
        return table;
    }
    match tokio::task::spawn_blocking(read_system_hosts).await {
        Ok(table) => SYSTEM_HOSTS.get_or_init(|| table),
        Err(e) => {
            tracing::warn!(error = %e, "hosts file loader did not finish");
            system_hosts()
        }
    }
}

fn read_system_hosts() -> HostsTable {
    match HostsTable::load(HOSTS_PATH) {
        Ok(table) => {
            tracing::trace!(path = HOSTS_PATH, names = table.len(), "loaded hosts file");
            table
        }
        Err(e) => {
            tracing::warn!(path = HOSTS_PATH, error = %e, "failed to read hosts file");
            HostsTable::default()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    const SAMPLE: &str = "\
# comment line
127.0.0.1   localhost loopback
::1         localhost ip6-localhost

10.0.0.5    intranet.example.com   # trailing comment
10.0.0.6    intranet.example.com
not-an-ip   broken.example.com
192.168.1.1
";

    #[test]
    fn test_parse_aliases() {
        let table = HostsTable::parse(SAMPLE);
        assert_eq!(
            table.lookup("loopback"),
            Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
        );
        assert_eq!(
            table.lookup("ip6-localhost"),
            Some(IpAddr::V6(Ipv6Addr::LOCALHOST))
        );
    }

    #[test]
    fn test_first_entry_wins() {
        let table = HostsTable::parse(SAMPLE);
        assert_eq!(
            table.lookup("localhost"),
            Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
        );
        assert_eq!(
            table.lookup("intranet.example.com"),
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)))
        );
    }

    #[test]
    fn test_comments_and_invalid_lines_skipped() {
        let table = HostsTable::parse(SAMPLE);
        assert_eq!(table.lookup("broken.example.com"), None);
        assert_eq!(table.lookup("#"), None);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = HostsTable::parse("10.1.1.1 Service.Local\n");
        assert!(table.lookup("service.local").is_some());
        assert!(table.lookup("SERVICE.LOCAL").is_some());
    }

    #[test]
    fn test_system_hosts_is_cached() {
        let first: *const HostsTable = system_hosts();
        let second: *const HostsTable = system_hosts();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_async_load_shares_the_cached_table() {
        let loaded: *const HostsTable = load_system_hosts().await;
        let again: *const HostsTable = load_system_hosts().await;
        let sync: *const HostsTable = system_hosts();
        assert_eq!(loaded, again);
        assert_eq!(loaded, sync);
    }
}
