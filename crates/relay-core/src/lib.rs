//! Relay request processing.
//!
//! [`RelayRequestHandler`] takes a client request through validation,
//! envelope decoding, signature verification and submission, and turns the
//! result into a [`RelayOutcome`](relay_types::RelayOutcome). Each stage's
//! failure maps to one HTTP status class through [`RelayError`].

mod error;
mod handler;

pub use error::RelayError;
pub use handler::{HandlerSettings, RelayRequestHandler};
