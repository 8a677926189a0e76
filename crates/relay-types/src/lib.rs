//! Shared types for the meta-transaction relay.
//!
//! Everything that crosses a crate boundary lives here: the request and
//! outcome shapes exposed to clients, the decoded envelope, network
//! configuration entries and the error taxonomy used to classify failures.

pub mod api;
pub mod delivery;
pub mod envelope;
pub mod errors;
pub mod network;

pub use api::*;
pub use delivery::*;
pub use envelope::*;
pub use errors::*;
pub use network::*;
