//! Client configuration for the NEWT gateway

use serde::{Deserialize, Serialize};

use crate::client::machines::{MachineRegistry, NEWT_BASE_URL, NEWT_MACHINES, NEWT_SYSTEMS};

/// Configuration for [`NewtClient`](crate::client::NewtClient)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the NEWT gateway
    pub base_url: String,

    /// Machines that accept file, command and queue operations
    pub machines: Vec<String>,

    /// Systems whose status can be queried (superset of `machines`)
    pub systems: Vec<String>,

    /// Chunk size in bytes used when streaming downloads to disk
    pub download_chunk_size: usize,

    /// Request timeout in seconds (unset keeps the HTTP client's default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: NEWT_BASE_URL.to_string(),
            machines: NEWT_MACHINES.iter().map(|m| m.to_string()).collect(),
            systems: NEWT_SYSTEMS.iter().map(|s| s.to_string()).collect(),
            download_chunk_size: 1024,
            timeout_secs: None,
            user_agent: format!("newt-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn registry(&self) -> MachineRegistry {
        MachineRegistry::new(self.machines.clone(), self.systems.clone())
    }
}
