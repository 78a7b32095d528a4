//! Machines and systems known to the NEWT gateway
//!
//! A *system* is any NERSC resource whose status can be queried, including
//! archival and storage-only ones. A *machine* is the subset of systems that
//! also accept file, command and queue operations.

use super::errors::{NewtError, Result};

/// Default NEWT gateway endpoint
pub const NEWT_BASE_URL: &str = "https://newt.nersc.gov/newt";

/// Systems that accept file, command and queue operations
pub const NEWT_MACHINES: &[&str] = &["hopper", "carver", "edison"];

/// Every system that reports status
pub const NEWT_SYSTEMS: &[&str] = &["hopper", "carver", "edison", "pdsf", "genepool", "archive"];

/// Validates machine and system names before any request is issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineRegistry {
    machines: Vec<String>,
    systems: Vec<String>,
}

impl Default for MachineRegistry {
    fn default() -> Self {
        Self::new(
            NEWT_MACHINES.iter().map(|m| m.to_string()).collect(),
            NEWT_SYSTEMS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl MachineRegistry {
    pub fn new(machines: Vec<String>, systems: Vec<String>) -> Self {
        Self { machines, systems }
    }

    pub fn machines(&self) -> &[String] {
        &self.machines
    }

    pub fn systems(&self) -> &[String] {
        &self.systems
    }

    pub fn is_machine(&self, name: &str) -> bool {
        self.machines.iter().any(|m| m == name)
    }

    pub fn is_system(&self, name: &str) -> bool {
        self.systems.iter().any(|s| s == name)
    }

    /// Fail unless `name` supports file, command and queue operations
    pub fn check_machine(&self, name: &str) -> Result<()> {
        if self.is_machine(name) {
            Ok(())
        } else {
            Err(NewtError::InvalidMachine {
                machine: name.to_string(),
                supported: self.machines.clone(),
            })
        }
    }

    /// Fail unless `name` is a system that reports status
    pub fn check_system(&self, name: &str) -> Result<()> {
        if self.is_system(name) {
            Ok(())
        } else {
            Err(NewtError::InvalidSystem {
                system: name.to_string(),
                supported: self.systems.clone(),
            })
        }
    }
}
