//! Integration test utilities for the gateway client
//!
//! Provides a scriptable in-process mock gateway (the server half of the
//! wire protocol) and doubles for the outbound collaborator and event sink.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
