//! Heartbeat activity
//!
//! Runs concurrently with the receive loop while the session is connected:
//! sleeps for the server-given interval, sends one beat, repeats. Each beat
//! leaves an unacknowledged mark that the receive loop clears on ack; when
//! too many marks pile up the activity stops itself, which the session
//! observes as a dead connection. The session aborts the task on every exit
//! from the connected state.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::protocol::GatewayFrame;

/// Spawn the heartbeat task
///
/// The first beat fires one full interval after spawn (the handshake frame
/// already proved liveness).
pub(crate) fn spawn_heartbeat(
    interval: Duration,
    writer: mpsc::Sender<GatewayFrame>,
    last_sequence: Arc<Mutex<Option<u64>>>,
    missed_acks: Arc<AtomicU32>,
    tolerance: u32,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            let missed = missed_acks.load(Ordering::SeqCst);
            if missed >= tolerance {
                tracing::warn!(missed, tolerance, "Heartbeat acks overdue, stopping");
                return;
            }

            let seq = *last_sequence.lock();
            if writer.send(GatewayFrame::heartbeat(seq)).await.is_err() {
                // Writer gone: the connection is already tearing down
                return;
            }
            missed_acks.fetch_add(1, Ordering::SeqCst);
            tracing::trace!(seq = ?seq, "Heartbeat sent");
        }
    })
}
