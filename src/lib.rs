//! Blocking client for the NERSC NEWT REST gateway
//!
//! NEWT exposes authentication, system status, file transfer, remote command
//! execution and batch queue management over HTTP. [`NewtClient`] maps each of
//! these to a single method call on one authenticated session.
//!
//! ```no_run
//! use newt::{NewtClient, QueueQuery};
//!
//! let client = NewtClient::new("alice", "secret")?;
//! for mut job in client.queue_stat("hopper", &QueueQuery::new().with_filter("queue", "debug"))? {
//!     job.refresh()?;
//!     println!("{} {:?}", job.jobid(), job.info().state());
//! }
//! # Ok::<(), newt::NewtError>(())
//! ```

pub mod client;
pub mod config;
pub mod logging;
pub mod models;

pub use client::{Job, NewtClient, NewtError, QueueQuery, Result};
pub use config::{ClientConfig, NewtConfig};
