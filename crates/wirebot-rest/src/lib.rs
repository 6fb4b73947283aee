//! # wirebot-rest
//!
//! The outbound-call collaborator: a capability trait the core dispatch
//! pipeline depends on, its error taxonomy, and the HTTP implementation.

mod client;
mod error;
mod outbound;

pub use client::RestClient;
pub use error::{RestError, RestResult};
pub use outbound::Outbound;
