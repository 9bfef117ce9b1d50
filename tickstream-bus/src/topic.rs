use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Name of a message bus topic (eg/ `"trades"`, `"bars"`).
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Deserialize, Serialize)]
pub struct Topic(String);

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> From<S> for Topic
where
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Self::new(value)
    }
}

/// A produced or consumed record: a `key`-`value` pair plus the partition and offset it was
/// assigned within a topic.
///
/// `key` determines partition assignment - every record sharing a `key` lands on the same
/// partition, preserving per-key ordering end to end.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Record<V> {
    pub key: String,
    pub value: V,
    pub partition: u32,
    pub offset: u64,
}
