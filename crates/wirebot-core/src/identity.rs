//! Shared record of the session's own user id

use std::sync::Arc;

use parking_lot::RwLock;

use crate::value_objects::Snowflake;

/// The session's own identity, learned from the READY dispatch
///
/// Written by the gateway session, read by the command pipeline's
/// self-authorship filter. Clones observe the same value.
#[derive(Debug, Clone, Default)]
pub struct SelfIdentity {
    inner: Arc<RwLock<Option<Snowflake>>>,
}

impl SelfIdentity {
    /// Create an identity with no recorded user yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded user id, if READY has been observed
    pub fn get(&self) -> Option<Snowflake> {
        *self.inner.read()
    }

    /// Record the session's user id
    pub fn set(&self, id: Snowflake) {
        *self.inner.write() = Some(id);
    }

    /// Check whether an author id matches the recorded identity
    ///
    /// Always false while no identity is recorded.
    pub fn is_self(&self, id: Snowflake) -> bool {
        self.get() == Some(id)
    }
}
