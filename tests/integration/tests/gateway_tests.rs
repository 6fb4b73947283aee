//! Gateway session behavior against a scripted mock server

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::task::JoinHandle;

use integration_tests::{wait_until, CollectingSink, MockGateway};
use wirebot_common::{GatewayConfig, IdentifyConfig};
use wirebot_core::{EventSink, SelfIdentity, Snowflake};
use wirebot_gateway::{GatewaySession, SessionState, ShutdownHandle};

fn gateway_config(url: &str, reconnect_delay_ms: u64) -> GatewayConfig {
    GatewayConfig {
        url: url.to_string(),
        reconnect_delay_ms,
        reconnect_max_delay_ms: reconnect_delay_ms * 4,
        missed_ack_tolerance: 2,
    }
}

fn spawn_session(
    config: GatewayConfig,
    sink: Arc<dyn EventSink>,
) -> (Arc<GatewaySession>, ShutdownHandle, JoinHandle<()>) {
    let session = Arc::new(GatewaySession::new(
        config,
        IdentifyConfig::default(),
        "secret-token",
        sink,
        SelfIdentity::new(),
    ));
    let handle = session.shutdown_handle();
    let runner = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.run().await }
    });
    (session, handle, runner)
}

async fn stop(handle: ShutdownHandle, runner: JoinHandle<()>) -> Result<()> {
    handle.shutdown();
    tokio::time::timeout(Duration::from_secs(2), runner).await??;
    Ok(())
}

#[tokio::test]
async fn identify_carries_token_capabilities_and_properties() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let (session, handle, runner) =
        spawn_session(gateway_config(gateway.url(), 100), CollectingSink::shared());

    let mut conn = gateway.accept_with_hello(60_000).await?;
    let identify = conn.expect_op(2).await?;
    assert_eq!(identify["d"]["token"], "secret-token");
    assert_eq!(identify["d"]["capabilities"], 32_767);
    assert_eq!(identify["d"]["properties"]["client"], "wirebot");
    assert_eq!(identify["d"]["properties"]["os"], "linux");

    assert!(wait_until(Duration::from_secs(1), || session.state().is_connected()).await);
    stop(handle, runner).await
}

#[tokio::test]
async fn heartbeats_follow_the_hello_interval() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let (_session, handle, runner) =
        spawn_session(gateway_config(gateway.url(), 100), CollectingSink::shared());

    let mut conn = gateway.accept_with_hello(150).await?;
    conn.expect_op(2).await?;

    let start = Instant::now();
    let first = conn.expect_op(1).await?;
    assert!(first["d"].is_null(), "no sequence seen yet: {first}");
    conn.ack_heartbeat().await?;
    let first_at = start.elapsed();

    conn.expect_op(1).await?;
    conn.ack_heartbeat().await?;
    let second_at = start.elapsed();

    // One beat per interval: not early, and paced apart
    assert!(first_at >= Duration::from_millis(100), "first beat at {first_at:?}");
    assert!(second_at >= first_at + Duration::from_millis(100), "second beat at {second_at:?}");

    stop(handle, runner).await
}

#[tokio::test]
async fn ready_records_identity_and_session_id() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let sink = CollectingSink::shared();
    let identity = SelfIdentity::new();
    let session = Arc::new(GatewaySession::new(
        gateway_config(gateway.url(), 100),
        IdentifyConfig::default(),
        "secret-token",
        sink.clone() as Arc<dyn EventSink>,
        identity.clone(),
    ));
    let handle = session.shutdown_handle();
    let runner = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.run().await }
    });

    let mut conn = gateway.accept_with_hello(60_000).await?;
    conn.expect_op(2).await?;
    conn.send_ready(42, "sess-abc", 1).await?;

    sink.wait_for_events(1, Duration::from_secs(2)).await?;
    assert_eq!(sink.kinds(), ["READY"]);
    assert!(identity.is_self(Snowflake::new(42)));
    assert_eq!(session.session_id().as_deref(), Some("sess-abc"));
    assert_eq!(session.last_sequence(), Some(1));

    stop(handle, runner).await
}

#[tokio::test]
async fn dropped_connection_reconnects_once_and_resumes() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let sink = CollectingSink::shared();
    let (session, handle, runner) =
        spawn_session(gateway_config(gateway.url(), 100), sink.clone());

    let mut conn = gateway.accept_with_hello(60_000).await?;
    conn.expect_op(2).await?;
    conn.send_ready(42, "sess-abc", 1).await?;
    conn.send_dispatch("TYPING_START", 5, serde_json::json!({})).await?;
    sink.wait_for_events(2, Duration::from_secs(2)).await?;

    // Server drops the socket: exactly one reconnect sequence follows
    conn.close().await?;
    let mut conn2 = gateway.accept_with_hello(60_000).await?;
    let resume = conn2.expect_op(4).await?;
    assert_eq!(resume["d"]["token"], "secret-token");
    assert_eq!(resume["d"]["session_id"], "sess-abc");
    assert_eq!(resume["d"]["seq"], 5);
    assert_eq!(session.reconnect_attempts(), 1);

    stop(handle, runner).await
}

#[tokio::test]
async fn non_resumable_invalid_session_forces_fresh_identify() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let sink = CollectingSink::shared();
    let (_session, handle, runner) =
        spawn_session(gateway_config(gateway.url(), 100), sink.clone());

    let mut conn = gateway.accept_with_hello(60_000).await?;
    conn.expect_op(2).await?;
    conn.send_ready(42, "sess-abc", 3).await?;
    sink.wait_for_events(1, Duration::from_secs(2)).await?;

    conn.send_json(&serde_json::json!({ "op": 7, "d": false })).await?;

    // Resume state was discarded, so the next handshake identifies anew
    let mut conn2 = gateway.accept_with_hello(60_000).await?;
    let handshake = conn2.expect_op(2).await?;
    assert_eq!(handshake["d"]["token"], "secret-token");

    stop(handle, runner).await
}

#[tokio::test]
async fn non_hello_first_frame_is_a_protocol_violation() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let (session, handle, runner) =
        spawn_session(gateway_config(gateway.url(), 100), CollectingSink::shared());

    // First frame is a dispatch instead of hello: the client must give up
    // this attempt and reconnect
    let mut bad = gateway.accept_raw().await?;
    bad.send_dispatch("READY", 1, serde_json::json!({})).await?;

    let mut conn = gateway.accept_with_hello(60_000).await?;
    conn.expect_op(2).await?;
    assert_eq!(session.reconnect_attempts(), 1);

    stop(handle, runner).await
}

#[tokio::test]
async fn missed_heartbeat_acks_tear_the_connection_down() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let (session, handle, runner) =
        spawn_session(gateway_config(gateway.url(), 100), CollectingSink::shared());

    // Short interval, never ack: tolerance trips after two unacked beats
    let mut conn = gateway.accept_with_hello(50).await?;
    conn.expect_op(2).await?;

    let _conn2 = gateway.accept_with_hello(60_000).await?;
    assert_eq!(session.reconnect_attempts(), 1);

    stop(handle, runner).await
}

#[tokio::test]
async fn shutdown_during_reconnect_wait_ends_promptly() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let (session, handle, runner) =
        spawn_session(gateway_config(gateway.url(), 5_000), CollectingSink::shared());

    let mut conn = gateway.accept_with_hello(60_000).await?;
    conn.expect_op(2).await?;
    conn.close().await?;

    assert!(
        wait_until(Duration::from_secs(1), || session.state().is_reconnecting()).await,
        "session should be waiting to reconnect"
    );

    // The 5s wait must be cancellable
    let requested_at = Instant::now();
    handle.shutdown();
    tokio::time::timeout(Duration::from_secs(1), runner).await??;
    assert!(requested_at.elapsed() < Duration::from_secs(1));
    assert_eq!(session.state(), SessionState::Disconnected);
    Ok(())
}
