//! # Connection Descriptor
//!
//! The opaque, already-resolved handle identifying the target database.
//!
//! A descriptor is built once (see [`crate::config`]) and handed to the
//! store constructor. It is never mutated afterwards and never read from
//! ambient state.
//!
//! ## Redaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  as_str()    postgres://cart:s3cret@db:5432/carts   ← used to connect │
//! │  Display     postgres://cart:****@db:5432/carts     ← logs + errors   │
//! │                                                                         │
//! │  as_str()    postgres://db/carts?user=cart&password=s3cret             │
//! │  Display     postgres://db/carts?user=cart&password=****               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Both `Display` and `Debug` go through [`ConnectionDescriptor::redacted`],
//! so a descriptor can be logged or embedded in an error without leaking a
//! password or token.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use url::Url;

const MASK: &str = "****";

/// Immutable connection descriptor.
///
/// Cloning is cheap (shared string).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConnectionDescriptor {
    url: Arc<str>,
}

impl ConnectionDescriptor {
    /// Wraps a full connection string as-is.
    pub fn new(url: impl Into<String>) -> Self {
        ConnectionDescriptor {
            url: Arc::from(url.into()),
        }
    }

    /// Descriptor for an SQLite file, created on first connect if missing.
    pub fn sqlite_file(path: impl AsRef<Path>) -> Self {
        Self::new(format!("sqlite://{}?mode=rwc", path.as_ref().display()))
    }

    /// The raw connection string, credentials included.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Returns the scheme (`sqlite`, `postgres`, ...) if the string has one.
    pub fn scheme(&self) -> Option<&str> {
        self.url.split_once(':').map(|(scheme, _)| scheme)
    }

    /// Returns the connection string with credentials masked.
    ///
    /// Masks the userinfo password and the value of any query parameter
    /// whose name looks like a credential (`password`, `pwd`, `secret`,
    /// `token`, case-insensitive).
    pub fn redacted(&self) -> String {
        let Ok(mut parsed) = Url::parse(&self.url) else {
            return mask_query(&mask_userinfo(&self.url));
        };

        let mut masked = false;

        if parsed.password().is_some() {
            // Only fails for cannot-be-a-base URLs, which have no password.
            let _ = parsed.set_password(Some(MASK));
            masked = true;
        }

        if parsed.query_pairs().any(|(key, _)| is_credential_key(&key)) {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(key, value)| {
                    let value = if is_credential_key(&key) {
                        MASK.to_string()
                    } else {
                        value.into_owned()
                    };
                    (key.into_owned(), value)
                })
                .collect();
            parsed.query_pairs_mut().clear().extend_pairs(pairs);
            masked = true;
        }

        if masked {
            parsed.to_string()
        } else {
            self.url.to_string()
        }
    }
}

fn is_credential_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    ["password", "pwd", "secret", "token"]
        .iter()
        .any(|marker| key.contains(marker))
}

/// Masks credential-looking query values in a string the URL parser rejects.
fn mask_query(raw: &str) -> String {
    let Some((base, query)) = raw.split_once('?') else {
        return raw.to_string();
    };

    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_credential_key(key) => format!("{key}={MASK}"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{base}?{query}")
}

/// Masks everything between `://` and the last `@` of the authority for
/// strings the URL parser rejects.
fn mask_userinfo(raw: &str) -> String {
    let Some((scheme, rest)) = raw.split_once("://") else {
        return raw.to_string();
    };

    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{scheme}://{MASK}{}", &rest[at..]),
        None => raw.to_string(),
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionDescriptor")
            .field(&self.redacted())
            .finish()
    }
}
