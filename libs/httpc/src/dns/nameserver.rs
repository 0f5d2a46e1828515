//! Lookups against explicitly configured nameservers.

use crate::chain::ErrorChain;
use crate::error::BoxError;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::{Resolver, TokioResolver};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use tokio::sync::OnceCell;

/// Port used when a nameserver entry does not name one
pub const DEFAULT_DNS_PORT: u16 = 53;

/// A nameserver address after normalisation: `host` plus explicit port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nameserver {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Nameserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Error produced while normalising a nameserver entry
#[derive(Debug, thiserror::Error)]
pub enum NameserverError {
    #[error("dns host is empty")]
    EmptyHost,

    #[error("invalid port in dns address '{0}'")]
    InvalidPort(String),

    #[error("too many colons in dns address '{0}'")]
    TooManyColons(String),
}

impl Nameserver {
    /// Normalise `host`, `host:port`, `ip`, `[ipv6]` or `[ipv6]:port`.
    ///
    /// A missing port defaults to [`DEFAULT_DNS_PORT`].
    ///
    /// # Errors
    /// Returns `NameserverError` for an empty host, an unparsable port, or an
    /// unbracketed host with colons that is not an IPv6 address.
    pub fn parse(entry: &str) -> Result<Self, NameserverError> {
        if let Ok(addr) = entry.parse::<SocketAddr>() {
            return Ok(Self {
                host: addr.ip().to_string(),
                port: addr.port(),
            });
        }
        if let Ok(ip) = entry.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
            return Ok(Self {
                host: ip.to_string(),
                port: DEFAULT_DNS_PORT,
            });
        }

        let (host, port) = match entry.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| NameserverError::InvalidPort(entry.to_owned()))?;
                (host, port)
            }
            None => (entry, DEFAULT_DNS_PORT),
        };
        if host.contains(':') {
            return Err(NameserverError::TooManyColons(entry.to_owned()));
        }
        if host.is_empty() {
            return Err(NameserverError::EmptyHost);
        }
        Ok(Self {
            host: host.to_owned(),
            port,
        })
    }

    /// Socket address of this nameserver; a hostname is resolved by the system.
    async fn socket_addr(&self) -> Result<SocketAddr, BoxError> {
        if let Ok(ip) = self.host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| format!("no address for dns host '{}'", self.host).into())
    }

    /// Resolver that sends every query to this nameserver only.
    async fn resolver(&self) -> Result<TokioResolver, BoxError> {
        let addr = self.socket_addr().await?;
        let group = NameServerConfigGroup::from_ips_clear(&[addr.ip()], addr.port(), true);
        let config = ResolverConfig::from_parts(None, vec![], group);
        Ok(Resolver::builder_with_config(config, TokioConnectionProvider::default()).build())
    }
}

/// Normalise `entries`, skipping empty ones.
///
/// Bad entries are returned separately, labelled by their index.
pub fn normalize(entries: &[String]) -> (Vec<Nameserver>, Option<ErrorChain>) {
    let mut servers = Vec::with_capacity(entries.len());
    let mut errors: Option<ErrorChain> = None;
    for (index, entry) in entries.iter().enumerate() {
        if entry.is_empty() {
            continue;
        }
        match Nameserver::parse(entry) {
            Ok(server) => servers.push(server),
            Err(e) => push_error(&mut errors, format!("nameserver {index}: {e}")),
        }
    }
    (servers, errors)
}

/// A nameserver with its resolver, built on first query and reused after.
#[derive(Debug)]
struct PooledNameserver {
    server: Nameserver,
    resolver: OnceCell<TokioResolver>,
}

impl PooledNameserver {
    async fn query(&self, host: &str) -> Result<Vec<IpAddr>, BoxError> {
        let resolver = self
            .resolver
            .get_or_try_init(|| self.server.resolver())
            .await?;
        let lookup = resolver.lookup_ip(host).await?;
        Ok(lookup.iter().collect())
    }
}

/// Normalised nameservers queried in order.
#[derive(Debug, Default)]
pub struct NameserverPool {
    servers: Vec<PooledNameserver>,
    rejected: Option<ErrorChain>,
}

impl NameserverPool {
    #[must_use]
    pub fn new(entries: &[String]) -> Self {
        let (servers, rejected) = normalize(entries);
        Self {
            servers: servers
                .into_iter()
                .map(|server| PooledNameserver {
                    server,
                    resolver: OnceCell::new(),
                })
                .collect(),
            rejected,
        }
    }

    /// Resolve `host` through each nameserver in order; the first answer wins.
    ///
    /// With no usable entry the system resolver is used. When every nameserver
    /// fails, all failures (including rejected entries) come back as one chain.
    ///
    /// # Errors
    /// Returns the system resolver's error, or the chain of nameserver failures.
    pub async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, BoxError> {
        if self.servers.is_empty() {
            return system_lookup(host).await;
        }

        let mut errors = self.rejected.clone();
        for pooled in &self.servers {
            let server = &pooled.server;
            match pooled.query(host).await {
                Ok(ips) if !ips.is_empty() => {
                    tracing::trace!(host, nameserver = %server, count = ips.len(), "resolved");
                    return Ok(ips);
                }
                Ok(_) => push_error(&mut errors, format!("{server}: no addresses for '{host}'")),
                Err(e) => {
                    tracing::trace!(host, nameserver = %server, error = %e, "lookup failed");
                    push_error(&mut errors, format!("{server}: {e}"));
                }
            }
        }

        let err: BoxError = match errors {
            Some(chain) => Box::new(chain),
            None => format!("no addresses for '{host}'").into(),
        };
        Err(err)
    }
}

/// Resolve `host` with the operating system resolver.
///
/// # Errors
/// Returns the I/O error of the system lookup.
pub async fn system_lookup(host: &str) -> Result<Vec<IpAddr>, BoxError> {
    let mut ips: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
        .await?
        .map(|addr| addr.ip())
        .collect();
    ips.dedup();
    tracing::trace!(host, count = ips.len(), "resolved by system");
    Ok(ips)
}

fn push_error(errors: &mut Option<ErrorChain>, message: String) {
    *errors = Some(match errors.take() {
        Some(chain) => chain.append(message),
        None => ErrorChain::new(message),
    });
}
