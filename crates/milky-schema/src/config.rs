//! Connection configuration seen by the grammars.
//!
//! Grammars never look configuration up on their own. The caller passes a
//! read-only [`ConfigAccessor`] into every compile call, and the grammar only
//! consults it when the blueprint leaves a table-level attribute unset.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use serde::{Deserialize, Serialize};

/// Key of the default storage engine.
pub const ENGINE: &str = "engine";
/// Key of the default character set.
pub const CHARSET: &str = "charset";
/// Key of the default collation.
pub const COLLATION: &str = "collation";
/// Key of the table name prefix.
pub const PREFIX: &str = "prefix";

/// Read-only access to connection configuration values.
pub trait ConfigAccessor {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<&str>;
}

/// Configuration accessor that never has a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoConfig;

impl ConfigAccessor for NoConfig {
    fn get(&self, _key: &str) -> Option<&str> {
        None
    }
}

impl<S: BuildHasher> ConfigAccessor for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<&str> {
        Self::get(self, key).map(String::as_str)
    }
}

impl ConfigAccessor for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        Self::get(self, key).map(String::as_str)
    }
}

/// Connection settings relevant to schema compilation.
///
/// Usually deserialized from the `connections` section of an application's
/// database configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Default storage engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Default character set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Default collation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    /// Table name prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl ConnectionConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default storage engine.
    #[must_use]
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Sets the default character set.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the default collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the table name prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

impl ConfigAccessor for ConnectionConfig {
    fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            ENGINE => &self.engine,
            CHARSET => &self.charset,
            COLLATION => &self.collation,
            PREFIX => &self.prefix,
            _ => return None,
        };
        value.as_deref()
    }
}
