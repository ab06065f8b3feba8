//! The Client Session: per-connection state machine with three cooperative
//! tasks (read, write, heartbeat) sharing one outbound queue.
//!
//! The heartbeat task never touches the socket directly; it sends liveness
//! probes through the same channel the write task already owns, since the
//! write task is the sole owner of the socket's write half. Every task's
//! select loop checks cancellation first, biased.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use classroom_core::{InboundEnvelope, OutboundEnvelope};
use classroom_hub::{HubHandle, MessageEvent};
use classroom_registry::ConnectionHandle;
use classroom_router::SenderContext;
use classroom_storage::StorageReader;

use crate::replay::replay_history;

/// The outbound queue's capacity: bounded at 100 per the Client Session
/// data model.
const OUTBOUND_QUEUE_CAPACITY: usize = 100;
/// Per-frame write deadline.
const WRITE_DEADLINE: Duration = Duration::from_secs(5);
/// Liveness probe interval.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
/// A connection with no observed heartbeat response for this long is closed.
const STALE_AFTER: Duration = Duration::from_secs(120);

/// Runs one Client Session end to end: registers with the Hub, replays
/// history, then drives the read/write/heartbeat tasks until the connection
/// closes, unregistering exactly once on the way out.
pub async fn run_client_session(
    socket: WebSocket,
    sender: SenderContext,
    hub: HubHandle,
    reader: Arc<StorageReader>,
) {
    let (ws_sink, ws_stream) = socket.split();
    let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
    let (ping_tx, ping_rx) = mpsc::channel(1);
    let cancel = CancellationToken::new();
    let last_heartbeat = Arc::new(Mutex::new(Instant::now()));

    let handle = ConnectionHandle::new(
        sender.user_id.clone(),
        sender.role,
        sender.session_id,
        outbound_tx.clone(),
    );
    if let Err(err) = hub.register(handle.clone()).await {
        warn!(user_id = %sender.user_id, error = %err, "failed to register client session, closing");
        return;
    }

    replay_history(&reader, sender.session_id, &sender.user_id, sender.role, &outbound_tx).await;

    let write_task = tokio::spawn(run_write_task(ws_sink, outbound_rx, ping_rx, cancel.clone()));
    let heartbeat_task = tokio::spawn(run_heartbeat_task(
        ping_tx,
        Arc::clone(&last_heartbeat),
        cancel.clone(),
    ));

    run_read_task(ws_stream, &hub, &sender, &last_heartbeat, &cancel).await;

    cancel.cancel();
    let _ = write_task.await;
    let _ = heartbeat_task.await;
    hub.unregister(handle).ok();
    info!(user_id = %sender.user_id, session_id = %sender.session_id, "client session closed");
}

async fn run_read_task(
    mut stream: SplitStream<WebSocket>,
    hub: &HubHandle,
    sender: &SenderContext,
    last_heartbeat: &Arc<Mutex<Instant>>,
    cancel: &CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => handle_inbound_text(&text, hub, sender),
                    Some(Ok(Message::Pong(_))) => {
                        *last_heartbeat.lock().await = Instant::now();
                    },
                    Some(Ok(Message::Close(_))) | None => return,
                    Some(Ok(_)) => {},
                    Some(Err(err)) => {
                        warn!(user_id = %sender.user_id, error = %err, "read error, closing");
                        return;
                    },
                }
            }
        }
    }
}

fn handle_inbound_text(text: &str, hub: &HubHandle, sender: &SenderContext) {
    match serde_json::from_str::<InboundEnvelope>(text) {
        Ok(envelope) => {
            if let Err(err) = hub.submit_message(MessageEvent {
                envelope,
                sender: sender.clone(),
            }) {
                warn!(user_id = %sender.user_id, error = %err, "failed to submit message to hub");
            }
        },
        Err(err) => {
            warn!(user_id = %sender.user_id, error = %err, "malformed inbound frame, dropping");
        },
    }
}

async fn run_write_task(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<OutboundEnvelope>,
    mut ping_rx: mpsc::Receiver<()>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = outbound_rx.recv() => {
                match envelope {
                    Some(envelope) => {
                        if !write_envelope(&mut sink, &envelope).await {
                            break;
                        }
                    },
                    None => break,
                }
            }
            ping = ping_rx.recv() => {
                match ping {
                    Some(()) => {
                        if tokio::time::timeout(WRITE_DEADLINE, sink.send(Message::Ping(Vec::new().into())))
                            .await
                            .is_err()
                        {
                            warn!("heartbeat ping write timed out, closing");
                            break;
                        }
                    },
                    None => break,
                }
            }
        }
    }
    let _ = sink.close().await;
}

async fn write_envelope(sink: &mut SplitSink<WebSocket, Message>, envelope: &OutboundEnvelope) -> bool {
    let Ok(text) = serde_json::to_string(envelope) else {
        warn!(message_id = %envelope.id, "failed to encode outbound envelope");
        return false;
    };
    match tokio::time::timeout(WRITE_DEADLINE, sink.send(Message::Text(text.into()))).await {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            warn!(message_id = %envelope.id, error = %err, "write failed, closing");
            false
        },
        Err(_) => {
            warn!(message_id = %envelope.id, "write deadline exceeded, closing");
            false
        },
    }
}

async fn run_heartbeat_task(
    ping_tx: mpsc::Sender<()>,
    last_heartbeat: Arc<Mutex<Instant>>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
    ticker.tick().await; // first tick fires immediately; consume it before the real cadence starts
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let elapsed = last_heartbeat.lock().await.elapsed();
                if elapsed > STALE_AFTER {
                    warn!(seconds = elapsed.as_secs(), "heartbeat stale, closing client session");
                    cancel.cancel();
                    break;
                }
                if ping_tx.send(()).await.is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn heartbeat_task_pings_on_schedule_until_cancelled() {
        let (ping_tx, mut ping_rx) = mpsc::channel(4);
        let last_heartbeat = Arc::new(Mutex::new(Instant::now()));
        let cancel = CancellationToken::new();

        let cancel_clone = cancel.clone();
        let task = tokio::spawn(run_heartbeat_task(ping_tx, last_heartbeat, cancel_clone));

        cancel.cancel();
        task.await.unwrap();
        assert!(ping_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_heartbeat_triggers_self_cancellation() {
        let (ping_tx, _ping_rx) = mpsc::channel(4);
        let stale_since = Instant::now() - Duration::from_secs(121);
        let last_heartbeat = Arc::new(Mutex::new(stale_since));
        let cancel = CancellationToken::new();

        let cancel_clone = cancel.clone();
        tokio::time::pause();
        let task = tokio::spawn(run_heartbeat_task(ping_tx, last_heartbeat, cancel_clone));
        tokio::time::advance(HEARTBEAT_INTERVAL * 2).await;
        task.await.unwrap();
        assert!(cancel.is_cancelled());
    }
}
