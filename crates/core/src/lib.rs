//! Host-independent building blocks for the artwatch job-status client.
//!
//! - [`protocol`]: the JSON envelope spoken over the job-status socket.
//! - [`endpoint`]: socket and image URL derivation from the page origin.
//! - [`host`]: values the hosting page supplies about the watched job.

pub mod endpoint;
pub mod error;
pub mod host;
pub mod protocol;

pub use error::CoreError;
pub use host::HostContext;
pub use protocol::{JobCommand, ServerMessage};
