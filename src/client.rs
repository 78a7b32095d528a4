//! Client for the NERSC NEWT REST gateway
//!
//! This module contains the session client, the job handle returned by queue
//! listings, and the HTTP transport they share.

pub mod errors;
pub mod files;
pub mod job;
pub mod machines;
pub mod newt_client;
pub mod session;
pub mod transport;

pub use errors::{NewtError, Result};
pub use job::Job;
pub use machines::{MachineRegistry, NEWT_BASE_URL, NEWT_MACHINES, NEWT_SYSTEMS};
pub use newt_client::{NewtClient, QueueQuery};
pub use session::{AuthSession, AuthState};
pub use transport::{ApiRequest, ApiResponse, HttpMethod, HttpTransport, RequestBody, Transport};
