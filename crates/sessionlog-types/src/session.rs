use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an interactive session.
///
/// Sessions are addressed by URI-like strings (`local://abc`, `file:///tmp/x`).
/// The log never interprets the value beyond equality and the scheme check
/// used to decide whether a session is in scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionResource(String);

impl SessionResource {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Session hosted by this process (`local://<key>`).
    pub fn local(key: &str) -> Self {
        Self(format!("local://{}", key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URI scheme, if the resource has one (`local` for `local://abc`).
    pub fn scheme(&self) -> Option<&str> {
        let (scheme, _) = self.0.split_once("://")?;
        if scheme.is_empty() {
            None
        } else {
            Some(scheme)
        }
    }

    /// Path part of the resource with leading slashes removed.
    ///
    /// Resources without a scheme are returned unchanged.
    pub fn path(&self) -> &str {
        match self.0.split_once("://") {
            Some((_, rest)) => rest.trim_start_matches('/'),
            None => &self.0,
        }
    }
}

impl fmt::Display for SessionResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionResource {
    fn from(value: &str) -> Self {
        SessionResource::new(value)
    }
}

impl From<String> for SessionResource {
    fn from(value: String) -> Self {
        SessionResource::new(value)
    }
}
