//! URL query parameters as an ordered multi-map.
//!
//! Keys are unique and kept sorted (the encoded form lists them in that
//! order); the values of one key keep their insertion order.

use crate::error::ConfigError;
use std::collections::BTreeMap;
use url::Url;
use url::form_urlencoded;

/// Query parameters: key → ordered values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    /// Create an empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a URL-encoded query string (`a=1&b=2&a=3`).
    ///
    /// `+` decodes to a space. Empty segments are skipped; a segment without
    /// `=` is a key with an empty value.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidQuery` for a `;` separator, a malformed
    /// percent escape, or an escape that decodes to invalid UTF-8.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut query = Self::new();
        for segment in raw.split('&') {
            if segment.contains(';') {
                return Err(ConfigError::InvalidQuery(
                    "invalid semicolon separator in query".to_owned(),
                ));
            }
            if segment.is_empty() {
                continue;
            }
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            query.push(unescape(key)?, unescape(value)?);
        }
        Ok(query)
    }

    /// Values stored for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.params.get(key).map(Vec::as_slice)
    }

    /// Replace every value of `key`.
    pub fn set<I, V>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.params
            .insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    /// Append values to `key`, creating it when absent.
    pub fn add<I, V>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.params
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    fn push(&mut self, key: String, value: String) {
        self.params.entry(key).or_default().push(value);
    }

    /// Number of distinct keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// `true` when no key is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate over keys and their values in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Encode as `application/x-www-form-urlencoded`, keys sorted.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.params {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }

    /// Merge these parameters into `url`: parameters already present in the
    /// URL come first for each key, followed by these.
    pub(crate) fn merge_into(&self, url: &mut Url) {
        let mut merged = Self::new();
        for (key, value) in url.query_pairs() {
            merged.push(key.into_owned(), value.into_owned());
        }
        for (key, values) in &self.params {
            merged.add(key.clone(), values.iter().cloned());
        }

        let encoded = merged.encode();
        if encoded.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&encoded));
        }
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut query = Self::new();
        for (key, value) in iter {
            query.push(key.into(), value.into());
        }
        query
    }
}

/// Decode one query component: `+` is a space, `%XX` must be two hex digits.
fn unescape(component: &str) -> Result<String, ConfigError> {
    let bytes = component.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escape = bytes.get(i + 1..i + 3).and_then(|hex| {
                    let hi = char::from(hex[0]).to_digit(16)?;
                    let lo = char::from(hex[1]).to_digit(16)?;
                    u8::try_from(hi * 16 + lo).ok()
                });
                let Some(byte) = escape else {
                    let end = (i + 3).min(bytes.len());
                    return Err(ConfigError::InvalidQuery(format!(
                        "invalid URL escape \"{}\"",
                        String::from_utf8_lossy(&bytes[i..end])
                    )));
                };
                out.push(byte);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out)
        .map_err(|e| ConfigError::InvalidQuery(format!("invalid UTF-8 in query: {e}")))
}
