//! Test helpers: mock gateway server and collaborator doubles

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{accept_async, WebSocketStream};

use wirebot_core::{Event, EventSink, Message, Snowflake, User};
use wirebot_rest::{Outbound, RestResult};

use crate::fixtures::{dispatch_frame, hello_frame, message_create_payload, ready_payload};

/// Upper bound on any single wait in the suite
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// In-process server half of the gateway protocol
///
/// Each test scripts its side of the conversation explicitly: accept a
/// connection, send hello, assert on the client's frames, push dispatches.
pub struct MockGateway {
    listener: TcpListener,
    url: String,
}

impl MockGateway {
    /// Bind to an ephemeral local port
    pub async fn bind() -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let url = format!("ws://{}", listener.local_addr()?);
        Ok(Self { listener, url })
    }

    /// The ws:// URL clients should connect to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Accept the next connection without sending anything
    pub async fn accept_raw(&self) -> Result<MockConnection> {
        let (stream, _addr) = tokio::time::timeout(FRAME_TIMEOUT, self.listener.accept())
            .await
            .map_err(|_| anyhow!("no client connected within timeout"))??;
        let ws = accept_async(stream).await?;
        Ok(MockConnection { ws })
    }

    /// Accept the next connection and open with a hello frame
    pub async fn accept_with_hello(&self, heartbeat_interval_ms: u64) -> Result<MockConnection> {
        let mut conn = self.accept_raw().await?;
        conn.send_json(&hello_frame(heartbeat_interval_ms)).await?;
        Ok(conn)
    }
}

/// One accepted client connection
pub struct MockConnection {
    ws: WebSocketStream<TcpStream>,
}

impl MockConnection {
    /// Send one JSON frame
    pub async fn send_json(&mut self, value: &Value) -> Result<()> {
        self.ws.send(WsMessage::Text(value.to_string())).await?;
        Ok(())
    }

    /// Next decoded text frame from the client
    pub async fn next_frame(&mut self) -> Result<Value> {
        loop {
            let msg = tokio::time::timeout(FRAME_TIMEOUT, self.ws.next())
                .await
                .map_err(|_| anyhow!("timed out waiting for a client frame"))?
                .ok_or_else(|| anyhow!("client connection ended"))??;
            match msg {
                WsMessage::Text(text) => return Ok(serde_json::from_str(&text)?),
                WsMessage::Close(_) => bail!("client closed the connection"),
                _ => {}
            }
        }
    }

    /// Read until a frame with the given op arrives
    ///
    /// Heartbeats encountered on the way are acknowledged; any other op is
    /// a test failure.
    pub async fn expect_op(&mut self, op: u8) -> Result<Value> {
        loop {
            let frame = self.next_frame().await?;
            let got = frame["op"].as_u64().unwrap_or(u64::MAX);
            if got == u64::from(op) {
                return Ok(frame);
            }
            if got == 1 {
                self.ack_heartbeat().await?;
            } else {
                bail!("expected op {op}, got frame {frame}");
            }
        }
    }

    /// Acknowledge a heartbeat
    pub async fn ack_heartbeat(&mut self) -> Result<()> {
        self.send_json(&json!({ "op": 11 })).await
    }

    /// Push a dispatch event
    pub async fn send_dispatch(&mut self, event_type: &str, seq: u64, payload: Value) -> Result<()> {
        self.send_json(&dispatch_frame(event_type, seq, payload)).await
    }

    /// Push a READY dispatch establishing the client's identity
    pub async fn send_ready(&mut self, user_id: i64, session_id: &str, seq: u64) -> Result<()> {
        self.send_dispatch("READY", seq, ready_payload(user_id, session_id))
            .await
    }

    /// Push a MESSAGE_CREATE dispatch
    pub async fn send_message_create(
        &mut self,
        seq: u64,
        author_id: i64,
        channel_id: i64,
        content: &str,
    ) -> Result<()> {
        self.send_dispatch(
            "MESSAGE_CREATE",
            seq,
            message_create_payload(author_id, channel_id, content),
        )
        .await
    }

    /// Close the connection from the server side
    pub async fn close(mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}

/// Outbound double that records every send
pub struct RecordingOutbound {
    sent: Mutex<Vec<(Snowflake, String)>>,
}

impl RecordingOutbound {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Contents of every send so far, in order
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, c)| c.clone()).collect()
    }

    /// Wait until at least `count` sends have arrived
    pub async fn wait_for_sends(&self, count: usize, timeout: Duration) -> Result<Vec<String>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let sent = self.sent();
            if sent.len() >= count {
                return Ok(sent);
            }
            if tokio::time::Instant::now() >= deadline {
                bail!("only {} of {count} sends arrived: {sent:?}", sent.len());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl Outbound for RecordingOutbound {
    async fn send(&self, channel_id: Snowflake, content: &str) -> RestResult<Message> {
        self.sent.lock().push((channel_id, content.to_string()));
        Ok(Message {
            id: Snowflake::new(0),
            channel_id,
            guild_id: None,
            author: User::with_id(Snowflake::new(0)),
            content: content.to_string(),
            timestamp: None,
            edited_timestamp: None,
        })
    }

    async fn edit(
        &self,
        channel_id: Snowflake,
        _message_id: Snowflake,
        content: &str,
    ) -> RestResult<Message> {
        Ok(Message {
            id: Snowflake::new(0),
            channel_id,
            guild_id: None,
            author: User::with_id(Snowflake::new(0)),
            content: content.to_string(),
            timestamp: None,
            edited_timestamp: None,
        })
    }

    async fn delete(&self, _channel_id: Snowflake, _message_id: Snowflake) -> RestResult<()> {
        Ok(())
    }

    async fn bulk_delete(
        &self,
        _channel_id: Snowflake,
        _message_ids: &[Snowflake],
    ) -> RestResult<()> {
        Ok(())
    }

    async fn add_reaction(
        &self,
        _channel_id: Snowflake,
        _message_id: Snowflake,
        _emoji: &str,
    ) -> RestResult<()> {
        Ok(())
    }

    async fn remove_reaction(
        &self,
        _channel_id: Snowflake,
        _message_id: Snowflake,
        _emoji: &str,
    ) -> RestResult<()> {
        Ok(())
    }

    async fn fetch_reactions(
        &self,
        _channel_id: Snowflake,
        _message_id: Snowflake,
        _emoji: &str,
    ) -> RestResult<Vec<User>> {
        Ok(Vec::new())
    }

    async fn fetch_history(
        &self,
        _channel_id: Snowflake,
        _limit: u8,
        _before: Option<Snowflake>,
    ) -> RestResult<Vec<Message>> {
        Ok(Vec::new())
    }

    async fn fetch_channel(&self, channel_id: Snowflake) -> RestResult<Value> {
        Ok(json!({ "id": channel_id.to_string() }))
    }

    async fn fetch_guild(&self, guild_id: Snowflake) -> RestResult<Value> {
        Ok(json!({ "id": guild_id.to_string() }))
    }

    async fn fetch_user(&self, user_id: Snowflake) -> RestResult<Value> {
        Ok(json!({ "id": user_id.to_string() }))
    }

    async fn trigger_typing(&self, _channel_id: Snowflake) -> RestResult<()> {
        Ok(())
    }
}

/// Event sink that collects every dispatched event
pub struct CollectingSink {
    events: Mutex<Vec<Event>>,
}

impl CollectingSink {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    /// Event-type tags seen so far, in arrival order
    pub fn kinds(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|e| e.kind().to_string())
            .collect()
    }

    /// Wait until at least `count` events have been delivered
    pub async fn wait_for_events(&self, count: usize, timeout: Duration) -> Result<Vec<String>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let kinds = self.kinds();
            if kinds.len() >= count {
                return Ok(kinds);
            }
            if tokio::time::Instant::now() >= deadline {
                bail!("only {} of {count} events arrived: {kinds:?}", kinds.len());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl EventSink for CollectingSink {
    async fn dispatch(&self, event: Event) {
        self.events.lock().push(event);
    }
}

/// Poll a condition until it holds or the timeout passes
pub async fn wait_until<F: Fn() -> bool>(timeout: Duration, condition: F) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
