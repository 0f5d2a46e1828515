//! Pluggable name resolution.
//!
//! The built-in transport asks a [`NameResolver`] for every hostname it
//! dials. [`SystemResolver`] defers to the operating system; [`HostsResolver`]
//! consults, in order: literal addresses, the hosts table, then each
//! configured nameserver.

mod hosts;
mod nameserver;

pub use hosts::{HOSTS_PATH, HostsTable, load_system_hosts, system_hosts};
pub use nameserver::{DEFAULT_DNS_PORT, Nameserver, NameserverError, NameserverPool};

use crate::error::BoxError;
use futures_util::future::BoxFuture;
use hyper_util::client::legacy::connect::dns::Name;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Hostname → addresses strategy used when dialing.
pub trait NameResolver: Send + Sync {
    /// Resolve `host` to one or more addresses.
    ///
    /// # Errors
    /// Returns an error if the host cannot be resolved.
    fn resolve<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>, BoxError>>;
}

/// Resolution through the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl NameResolver for SystemResolver {
    fn resolve<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>, BoxError>> {
        Box::pin(nameserver::system_lookup(host))
    }
}

#[derive(Debug, Clone, Default)]
enum HostsSource {
    #[default]
    System,
    Table(Arc<HostsTable>),
}

impl HostsSource {
    async fn lookup(&self, host: &str) -> Option<IpAddr> {
        match self {
            HostsSource::System => load_system_hosts().await.lookup(host),
            HostsSource::Table(table) => table.lookup(host),
        }
    }
}

/// Hosts-file first, then explicit nameservers.
///
/// Entries are `host`, `host:port`, `ip` or `[ipv6]:port`; the port defaults
/// to 53 and empty entries are ignored. Without a usable nameserver, names
/// missing from the hosts table go to the system resolver.
#[derive(Debug, Clone, Default)]
pub struct HostsResolver {
    nameservers: Vec<String>,
    pool: Arc<NameserverPool>,
    hosts: HostsSource,
}

impl HostsResolver {
    /// Resolver backed by the platform hosts file and `nameservers`.
    #[must_use]
    pub fn new<I, S>(nameservers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nameservers: Vec<String> = nameservers.into_iter().map(Into::into).collect();
        Self {
            pool: Arc::new(NameserverPool::new(&nameservers)),
            nameservers,
            hosts: HostsSource::System,
        }
    }

    /// Use `table` instead of the platform hosts file.
    #[must_use]
    pub fn with_hosts(mut self, table: HostsTable) -> Self {
        self.hosts = HostsSource::Table(Arc::new(table));
        self
    }

    /// Configured nameserver entries, as given
    #[must_use]
    pub fn nameservers(&self) -> &[String] {
        &self.nameservers
    }
}

impl NameResolver for HostsResolver {
    fn resolve<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>, BoxError>> {
        Box::pin(async move {
            let literal = host.trim_start_matches('[').trim_end_matches(']');
            if let Ok(ip) = literal.parse::<IpAddr>() {
                return Ok(vec![ip]);
            }
            if let Some(ip) = self.hosts.lookup(host).await {
                tracing::trace!(host, %ip, "resolved from hosts table");
                return Ok(vec![ip]);
            }
            self.pool.lookup(host).await
        })
    }
}

/// Adapter plugging a [`NameResolver`] into hyper-util's `HttpConnector`.
#[derive(Clone)]
pub(crate) struct DialResolver {
    inner: Arc<dyn NameResolver>,
}

impl DialResolver {
    pub(crate) fn new(inner: Arc<dyn NameResolver>) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for DialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DialResolver")
    }
}

impl tower::Service<Name> for DialResolver {
    type Response = std::vec::IntoIter<SocketAddr>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, name: Name) -> Self::Future {
        let resolver = Arc::clone(&self.inner);
        Box::pin(async move {
            let ips = resolver.resolve(name.as_str()).await?;
            if ips.is_empty() {
                return Err(format!("no addresses for '{}'", name.as_str()).into());
            }
            // The connector fills in the port from the request URI.
            let mut addrs = Vec::with_capacity(ips.len());
            addrs.extend(ips.into_iter().map(|ip| SocketAddr::new(ip, 0)));
            Ok(addrs.into_iter())
        })
    }
}
