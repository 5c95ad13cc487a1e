use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a node inside one document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Generate document ID from a document name using CRC32
pub fn get_document_id(name: &str) -> String {
    let mut buff = String::from(name);
    if !name.starts_with("mindmap://") {
        buff = format!("mindmap://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for nodes within a document
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Document ID (CRC32)
    count: u32,
}

impl IdGenerator {
    pub fn new(name: &str) -> Self {
        Self {
            seed: get_document_id(name),
            count: 0,
        }
    }

    /// Generate next sequential ID
    pub fn next_id(&mut self) -> NodeId {
        self.count += 1;
        NodeId(format!("{}-{}", self.seed, self.count))
    }

    /// Get document ID seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}
