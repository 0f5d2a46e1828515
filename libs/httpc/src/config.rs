use std::time::Duration;

/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("httpc/", env!("CARGO_PKG_VERSION"));

/// Environment variable whose value, when set and non-empty, replaces
/// [`DEFAULT_USER_AGENT`] on every request that does not set its own.
pub const USER_AGENT_ENV: &str = "UserAgent";

/// Default cap for buffered response body reads (64 KB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// Initial settings for a [`Client`](crate::Client).
///
/// Every field can be changed later through the client's chained setters.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for one request, from dispatch until the body has been read
    /// (default: none)
    pub timeout: Option<Duration>,

    /// Maximum response body size in bytes used by `read_body`, `text` and
    /// `json` (default: 64 KB)
    pub max_body_size: usize,

    /// User-Agent sent when neither the environment nor the request sets one
    /// (default: `httpc/<version>`)
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Configuration for short-lived calls: 10 second timeout, 1 MB body cap
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            timeout: Some(Duration::from_secs(10)),
            max_body_size: 1024 * 1024, // 1 MB
            ..Self::default()
        }
    }

    /// Configuration for bulk downloads: 60 second timeout, 20 MB body cap
    #[must_use]
    pub fn large_bodies() -> Self {
        Self {
            timeout: Some(Duration::from_secs(60)),
            max_body_size: 20 * 1024 * 1024, // 20 MB
            ..Self::default()
        }
    }
}

/// User-Agent taken from [`USER_AGENT_ENV`], if set and non-empty.
pub fn env_user_agent() -> Option<String> {
    std::env::var(USER_AGENT_ENV)
        .ok()
        .filter(|value| !value.is_empty())
}
