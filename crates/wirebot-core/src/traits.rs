//! Seams between the gateway session and the event-consuming side

use async_trait::async_trait;

use crate::events::Event;

/// Consumer of dispatched gateway events
///
/// The session delivers events one at a time in arrival order and awaits
/// each delivery, so a slow consumer delays later events but never reorders
/// them. Implementations must not panic across this boundary.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn dispatch(&self, event: Event);
}
