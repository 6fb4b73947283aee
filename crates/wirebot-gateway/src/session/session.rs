//! Gateway session state machine
//!
//! One session per running instance. The outer loop owns reconnection:
//! every connection failure tears the socket down, cancels the heartbeat,
//! waits (exponential backoff, shutdown-cancellable), and connects again.
//! Within a connection, the receive loop and the heartbeat activity run
//! concurrently and both end the moment the session leaves `Connected`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use wirebot_common::{GatewayConfig, IdentifyConfig};
use wirebot_core::{Event, EventSink, EventType, SelfIdentity};

use super::heartbeat::spawn_heartbeat;
use super::state::SessionState;
use crate::protocol::{
    ClientProperties, CloseCode, GatewayFrame, IdentifyPayload, OpCode, ReadyPayload,
    ResumePayload,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long to wait for the server's Hello before giving up the attempt
const HELLO_TIMEOUT: Duration = Duration::from_secs(10);

/// Buffer for frames queued to the writer task
const WRITE_BUFFER: usize = 64;

/// Gateway session errors
///
/// All of these are protocol-level: recovered locally by reconnecting,
/// never surfaced to command authors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Socket error: {0}")]
    Socket(String),

    #[error("Heartbeat acknowledgements missed")]
    MissedHeartbeat,

    #[error("Server requested reconnect")]
    ReconnectRequested,

    #[error("Session invalidated by server (resumable: {resumable})")]
    InvalidSession { resumable: bool },

    #[error("Connection closed by server (code {0:?})")]
    Closed(Option<u16>),

    #[error("Event stream ended unexpectedly")]
    StreamEnded,
}

/// Handle that requests a session shutdown
///
/// Shutdown is the only path to `Disconnected`; it also cancels an
/// in-progress reconnect wait.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Ask the session to stop
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// The gateway session
pub struct GatewaySession {
    gateway: GatewayConfig,
    identify: IdentifyConfig,
    token: String,
    sink: Arc<dyn EventSink>,
    identity: SelfIdentity,
    state: RwLock<SessionState>,
    last_sequence: Arc<Mutex<Option<u64>>>,
    session_id: Mutex<Option<String>>,
    missed_acks: Arc<AtomicU32>,
    reconnect_attempts: AtomicU32,
    shutdown: Arc<watch::Sender<bool>>,
}

impl GatewaySession {
    /// Create a session
    ///
    /// Nothing connects until [`run`](Self::run) is called.
    pub fn new(
        gateway: GatewayConfig,
        identify: IdentifyConfig,
        token: impl Into<String>,
        sink: Arc<dyn EventSink>,
        identity: SelfIdentity,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            gateway,
            identify,
            token: token.into(),
            sink,
            identity,
            state: RwLock::new(SessionState::Disconnected),
            last_sequence: Arc::new(Mutex::new(None)),
            session_id: Mutex::new(None),
            missed_acks: Arc::new(AtomicU32::new(0)),
            reconnect_attempts: AtomicU32::new(0),
            shutdown: Arc::new(shutdown),
        }
    }

    /// A handle for stopping this session from elsewhere
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Session id recorded from READY, if any
    pub fn session_id(&self) -> Option<String> {
        self.session_id.lock().clone()
    }

    /// Last dispatch sequence number processed
    pub fn last_sequence(&self) -> Option<u64> {
        *self.last_sequence.lock()
    }

    /// Total reconnect attempts so far
    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts.load(Ordering::SeqCst)
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.write();
        tracing::debug!(from = %*state, to = %next, "Session state transition");
        *state = next;
    }

    /// Run until an explicit shutdown request
    ///
    /// Every failure path reconnects; attempts are unbounded.
    pub async fn run(&self) {
        let mut shutdown = self.shutdown.subscribe();

        loop {
            if *shutdown.borrow() {
                break;
            }
            self.set_state(SessionState::Connecting);

            match self.run_connection(&mut shutdown).await {
                Ok(()) => break,
                Err(error) => tracing::warn!(error = %error, "Gateway connection ended"),
            }
            if *shutdown.borrow() {
                break;
            }

            let attempt = self.reconnect_attempts.fetch_add(1, Ordering::SeqCst) + 1;
            self.set_state(SessionState::Reconnecting(attempt));
            let delay = self.reconnect_delay(attempt);
            tracing::info!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Reconnecting after delay"
            );
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {}
            }
        }

        self.set_state(SessionState::Disconnected);
        tracing::info!("Gateway session stopped");
    }

    /// Backoff for the k-th consecutive attempt, doubling up to the cap
    fn reconnect_delay(&self, attempt: u32) -> Duration {
        let base = self.gateway.reconnect_delay_ms.max(1);
        let cap = self.gateway.reconnect_max_delay_ms.max(base);
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1).min(16));
        Duration::from_millis(base.saturating_mul(factor).min(cap))
    }

    /// One full connection lifetime
    ///
    /// Ok means shutdown was requested; every Err reconnects.
    async fn run_connection(
        &self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), SessionError> {
        let (ws, _response) = connect_async(self.gateway.url.as_str())
            .await
            .map_err(|e| SessionError::Connect(e.to_string()))?;
        self.set_state(SessionState::AwaitingHello);
        let (ws_sink, mut ws_stream) = ws.split();

        let hello = Self::await_hello(&mut ws_stream).await?;
        let interval = Duration::from_millis(hello.heartbeat_interval);

        // Writer task owns the sink half; everything else queues through it
        let (writer_tx, writer_rx) = mpsc::channel(WRITE_BUFFER);
        let writer = tokio::spawn(write_frames(ws_sink, writer_rx));

        self.set_state(SessionState::Identifying);
        writer_tx
            .send(self.handshake_frame())
            .await
            .map_err(|_| SessionError::Protocol("writer closed during handshake".to_string()))?;

        self.missed_acks.store(0, Ordering::SeqCst);
        let mut heartbeat = spawn_heartbeat(
            interval,
            writer_tx.clone(),
            Arc::clone(&self.last_sequence),
            Arc::clone(&self.missed_acks),
            self.gateway.missed_ack_tolerance,
        );

        self.set_state(SessionState::Connected);
        tracing::info!(
            heartbeat_ms = hello.heartbeat_interval,
            "Gateway connection established"
        );

        let result = tokio::select! {
            result = self.receive_loop(&mut ws_stream, &writer_tx) => result,
            _ = &mut heartbeat => Err(SessionError::MissedHeartbeat),
            _ = shutdown.changed() => Ok(()),
        };

        // The heartbeat dies with Connected, before any reconnect wait
        heartbeat.abort();
        drop(writer_tx);
        drop(writer);
        result
    }

    /// The server's first frame must be Hello; anything else is a violation
    async fn await_hello(
        stream: &mut SplitStream<WsStream>,
    ) -> Result<crate::protocol::HelloPayload, SessionError> {
        let text = loop {
            let frame = tokio::time::timeout(HELLO_TIMEOUT, stream.next())
                .await
                .map_err(|_| SessionError::Protocol("no hello within timeout".to_string()))?
                .ok_or(SessionError::StreamEnded)?
                .map_err(|e| SessionError::Socket(e.to_string()))?;
            match frame {
                WsMessage::Text(text) => break text,
                WsMessage::Ping(_) | WsMessage::Pong(_) => {}
                other => {
                    return Err(SessionError::Protocol(format!(
                        "expected hello frame, got {other:?}"
                    )))
                }
            }
        };

        let frame = GatewayFrame::from_json(&text)
            .map_err(|e| SessionError::Protocol(format!("undecodable hello: {e}")))?;
        frame
            .as_hello()
            .ok_or_else(|| SessionError::Protocol(format!("expected hello, got {}", frame.op)))
    }

    /// Resume when a prior session is on record, identify otherwise
    fn handshake_frame(&self) -> GatewayFrame {
        let resume = {
            let session_id = self.session_id.lock();
            let seq = self.last_sequence.lock();
            session_id.clone().zip(*seq)
        };

        match resume {
            Some((session_id, seq)) => {
                tracing::info!(session_id = %session_id, seq, "Resuming session");
                GatewayFrame::resume(&ResumePayload {
                    token: self.token.clone(),
                    session_id,
                    seq,
                })
            }
            None => GatewayFrame::identify(&IdentifyPayload {
                token: self.token.clone(),
                capabilities: self.identify.capabilities,
                properties: ClientProperties {
                    os: self.identify.os.clone(),
                    client: self.identify.client.clone(),
                    device: self.identify.device.clone(),
                },
            }),
        }
    }

    async fn receive_loop(
        &self,
        stream: &mut SplitStream<WsStream>,
        writer: &mpsc::Sender<GatewayFrame>,
    ) -> Result<(), SessionError> {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(WsMessage::Text(text)) => self.handle_frame(&text, writer).await?,
                Ok(WsMessage::Binary(_)) => {
                    tracing::debug!("Ignoring binary frame");
                }
                Ok(WsMessage::Ping(_) | WsMessage::Pong(_)) => {}
                Ok(WsMessage::Close(close)) => {
                    let raw = close.as_ref().map(|f| u16::from(f.code));
                    if let Some(code) = raw.and_then(CloseCode::from_u16) {
                        tracing::warn!(code = %code, "Gateway closed the connection");
                        if !code.should_resume() {
                            self.clear_resume_state();
                        }
                    } else {
                        tracing::warn!(code = ?raw, "Gateway closed the connection");
                    }
                    return Err(SessionError::Closed(raw));
                }
                Ok(_) => {}
                Err(e) => return Err(SessionError::Socket(e.to_string())),
            }
        }
        Err(SessionError::StreamEnded)
    }

    /// Decode and act on one text frame
    ///
    /// Undecodable frames (including unrecognized op codes) are logged and
    /// skipped; only frames that invalidate the connection return Err.
    async fn handle_frame(
        &self,
        text: &str,
        writer: &mpsc::Sender<GatewayFrame>,
    ) -> Result<(), SessionError> {
        let frame = match GatewayFrame::from_json(text) {
            Ok(frame) => frame,
            Err(error) => {
                tracing::debug!(error = %error, "Ignoring undecodable frame");
                return Ok(());
            }
        };

        match frame.op {
            OpCode::Dispatch => {
                self.handle_dispatch(frame).await;
                Ok(())
            }
            OpCode::HeartbeatAck => {
                self.missed_acks.store(0, Ordering::SeqCst);
                tracing::trace!("Heartbeat acknowledged");
                Ok(())
            }
            OpCode::Heartbeat => {
                // Server asked for an immediate beat
                let seq = *self.last_sequence.lock();
                let _ = writer.send(GatewayFrame::heartbeat(seq)).await;
                Ok(())
            }
            OpCode::Reconnect => {
                tracing::info!("Server requested reconnect");
                Err(SessionError::ReconnectRequested)
            }
            OpCode::InvalidSession => {
                let resumable = frame.invalid_session_resumable();
                if !resumable {
                    self.clear_resume_state();
                }
                Err(SessionError::InvalidSession { resumable })
            }
            other => {
                tracing::debug!(op = %other, "Ignoring unexpected opcode");
                Ok(())
            }
        }
    }

    async fn handle_dispatch(&self, frame: GatewayFrame) {
        let Some((kind, seq, payload)) = frame.into_dispatch() else {
            tracing::debug!("Dispatch frame without an event type");
            return;
        };

        // Record the sequence before delivery so a resume never replays
        // an event the sink already saw
        if let Some(seq) = seq {
            *self.last_sequence.lock() = Some(seq);
        }

        if kind == EventType::Ready.as_str() {
            self.record_ready(&payload);
        }

        tracing::trace!(event = %kind, seq = ?seq, "Dispatching event");
        self.sink.dispatch(Event::new(kind, payload)).await;
    }

    /// READY carries our own identity and the resumable session id
    fn record_ready(&self, payload: &serde_json::Value) {
        match serde_json::from_value::<ReadyPayload>(payload.clone()) {
            Ok(ready) => {
                self.identity.set(ready.user.id);
                *self.session_id.lock() = ready.session_id.clone();
                tracing::info!(
                    user_id = %ready.user.id,
                    session_id = ?ready.session_id,
                    "Session ready"
                );
            }
            Err(error) => tracing::warn!(error = %error, "Malformed READY payload"),
        }
    }

    fn clear_resume_state(&self) {
        *self.session_id.lock() = None;
        *self.last_sequence.lock() = None;
    }
}

/// Writer task: serialize queued frames onto the socket, close it when the
/// channel drains
async fn write_frames(
    mut sink: SplitSink<WsStream, WsMessage>,
    mut rx: mpsc::Receiver<GatewayFrame>,
) {
    while let Some(frame) = rx.recv().await {
        match frame.to_json() {
            Ok(json) => {
                if sink.send(WsMessage::Text(json)).await.is_err() {
                    tracing::debug!("WebSocket sink closed, stopping writer");
                    break;
                }
            }
            Err(error) => tracing::warn!(error = %error, "Failed to encode frame"),
        }
    }
    let _ = sink.close().await;
}
