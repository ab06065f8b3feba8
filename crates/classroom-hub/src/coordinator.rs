//! The Hub Coordinator: one event loop owning all Registry mutation and all
//! Router invocations, so the Registry is effectively single-threaded for
//! writes while remaining concurrently readable.
//!
//! A context struct bundles everything the loop needs; a `biased` select
//! checks shutdown before data-plane events; the loop logs and continues on
//! a single bad message rather than exiting.

use std::sync::Arc;

use classroom_core::ClassroomError;
use classroom_registry::{ConnectionRegistry, RateLimiter};
use classroom_router::{deliver, get_recipients, validate_message};
use classroom_storage::PersistenceWriter;
use classroom_telemetry::RequestContext;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::events::{MessageEvent, RegisterEvent, UnregisterEvent};

const MESSAGE_QUEUE_CAPACITY: usize = 1000;
const REGISTER_QUEUE_CAPACITY: usize = 100;
const UNREGISTER_QUEUE_CAPACITY: usize = 100;

/// A cheaply cloneable handle for submitting events to a running Hub
/// Coordinator.
///
/// Every submission is non-blocking: a full buffer returns
/// [`ClassroomError::QueueFull`] immediately rather than awaiting space, so a
/// slow Hub loop never stalls a Client Session's read task.
#[derive(Clone)]
pub struct HubHandle {
    message_tx: mpsc::Sender<MessageEvent>,
    register_tx: mpsc::Sender<RegisterEvent>,
    unregister_tx: mpsc::Sender<UnregisterEvent>,
    shutdown_tx: broadcast::Sender<()>,
}

impl HubHandle {
    /// Submits an inbound message for validation, persistence, and routing.
    ///
    /// # Errors
    ///
    /// Returns [`ClassroomError::QueueFull`] if the message buffer (capacity
    /// 1000) is full.
    pub fn submit_message(&self, event: MessageEvent) -> Result<(), ClassroomError> {
        self.message_tx
            .try_send(event)
            .map_err(|_| ClassroomError::QueueFull {
                queue: "messages".to_string(),
            })
    }

    /// Registers a new connection, evicting any prior connection for the
    /// same user first. Awaits the Hub loop's acknowledgement so the caller
    /// never starts history replay before registration is visible to
    /// concurrent readers.
    ///
    /// # Errors
    ///
    /// Returns [`ClassroomError::QueueFull`] if the register buffer
    /// (capacity 100) is full, or [`ClassroomError::Internal`] if the Hub
    /// loop exited before acknowledging.
    pub async fn register(&self, handle: classroom_registry::ConnectionHandle) -> Result<(), ClassroomError> {
        let (ack, ack_rx) = oneshot::channel();
        self.register_tx
            .try_send(RegisterEvent { handle, ack })
            .map_err(|_| ClassroomError::QueueFull {
                queue: "register".to_string(),
            })?;
        ack_rx
            .await
            .map_err(|_| ClassroomError::Internal("hub coordinator stopped before ack".to_string()))
    }

    /// Removes a connection from the Registry.
    ///
    /// # Errors
    ///
    /// Returns [`ClassroomError::QueueFull`] if the unregister buffer
    /// (capacity 100) is full.
    pub fn unregister(&self, handle: classroom_registry::ConnectionHandle) -> Result<(), ClassroomError> {
        self.unregister_tx
            .try_send(UnregisterEvent { handle })
            .map_err(|_| ClassroomError::QueueFull {
                queue: "unregister".to_string(),
            })
    }

    /// Signals the Hub loop to stop. Idempotent: calling this more than once
    /// (or after the loop has already exited) is a no-op.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

struct HubCtx {
    message_rx: mpsc::Receiver<MessageEvent>,
    register_rx: mpsc::Receiver<RegisterEvent>,
    unregister_rx: mpsc::Receiver<UnregisterEvent>,
    shutdown_rx: broadcast::Receiver<()>,
    registry: Arc<ConnectionRegistry>,
    rate_limiter: Arc<RateLimiter>,
    writer: PersistenceWriter,
}

/// Spawns the Hub Coordinator's event loop and returns a handle to submit
/// events plus the task's `JoinHandle`.
#[must_use]
pub fn spawn(
    registry: Arc<ConnectionRegistry>,
    rate_limiter: Arc<RateLimiter>,
    writer: PersistenceWriter,
) -> (HubHandle, JoinHandle<()>) {
    let (message_tx, message_rx) = mpsc::channel(MESSAGE_QUEUE_CAPACITY);
    let (register_tx, register_rx) = mpsc::channel(REGISTER_QUEUE_CAPACITY);
    let (unregister_tx, unregister_rx) = mpsc::channel(UNREGISTER_QUEUE_CAPACITY);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let ctx = HubCtx {
        message_rx,
        register_rx,
        unregister_rx,
        shutdown_rx,
        registry,
        rate_limiter,
        writer,
    };
    let join_handle = tokio::spawn(run(ctx));

    let handle = HubHandle {
        message_tx,
        register_tx,
        unregister_tx,
        shutdown_tx,
    };
    (handle, join_handle)
}

async fn run(mut ctx: HubCtx) {
    loop {
        tokio::select! {
            biased;
            result = ctx.shutdown_rx.recv() => {
                let _ = result;
                info!("hub coordinator received shutdown signal");
                break;
            }
            event = ctx.register_rx.recv() => {
                match event {
                    Some(event) => handle_register(&ctx.registry, event).await,
                    None => { info!("hub register channel closed, exiting"); break; }
                }
            }
            event = ctx.unregister_rx.recv() => {
                match event {
                    Some(event) => handle_unregister(&ctx.registry, event).await,
                    None => { info!("hub unregister channel closed, exiting"); break; }
                }
            }
            event = ctx.message_rx.recv() => {
                match event {
                    Some(event) => handle_message(&ctx, event).await,
                    None => { info!("hub message channel closed, exiting"); break; }
                }
            }
        }
    }
}

async fn handle_register(registry: &ConnectionRegistry, event: RegisterEvent) {
    if let Some(previous) = registry.get(event.handle.user_id()).await {
        registry.unregister(&previous).await;
    }
    if let Err(err) = registry.register(event.handle).await {
        // Structurally unreachable: the eviction above guarantees the slot
        // is free before this call.
        warn!(error = %err, "register failed immediately after eviction");
    }
    let _ = event.ack.send(());
}

async fn handle_unregister(registry: &ConnectionRegistry, event: UnregisterEvent) {
    registry.unregister(&event.handle).await;
}

async fn handle_message(ctx: &HubCtx, event: MessageEvent) {
    let MessageEvent { envelope, sender } = event;

    let request = RequestContext::new("hub").with_operation("route_message");
    let _guard = request.enter();

    // Spec step 1: a sender evicted (reconnect collision) or closed between
    // submitting this event and the Hub draining it is no longer live; the
    // message must not be routed on its behalf.
    if ctx.registry.get(&sender.user_id).await.is_none() {
        warn!(user_id = %sender.user_id, "sender has no live connection, dropping message");
        return;
    }

    let message = match validate_message(envelope, &sender) {
        Ok(message) => message,
        Err(err) => {
            warn!(user_id = %sender.user_id, error = %err, "message failed validation, dropping");
            return;
        },
    };

    if !ctx.rate_limiter.check(&sender.user_id) {
        warn!(user_id = %sender.user_id, "rate limit exceeded, dropping message");
        return;
    }

    if let Err(err) = ctx.writer.insert_message(message.clone()).await {
        warn!(message_id = %message.id, error = %err, "persistence failed, not routing message");
        return;
    }

    match get_recipients(&message, &ctx.registry).await {
        Ok(recipients) => {
            let report = deliver(message, &recipients);
            if report.dropped > 0 {
                warn!(delivered = report.delivered, dropped = report.dropped, "delivery had drops");
            }
        },
        Err(err) => {
            warn!(error = %err, "failed to resolve recipients, message not delivered");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::{MessageType, Role, SessionId};
    use classroom_registry::ConnectionHandle;
    use classroom_router::SenderContext;
    use classroom_storage::{Database, PersistenceWriter as Writer};
    use classroom_test::fixtures::{test_inbound_envelope, test_instructor_id, test_student_id};

    async fn spawn_test_hub() -> (HubHandle, Arc<ConnectionRegistry>, JoinHandle<()>, JoinHandle<()>) {
        let db = Arc::new(Database::connect_memory().await.unwrap());
        let (writer, writer_handle) = Writer::spawn(db);
        let registry = Arc::new(ConnectionRegistry::new());
        let rate_limiter = Arc::new(RateLimiter::new());
        let (handle, hub_handle) = spawn(Arc::clone(&registry), rate_limiter, writer);
        (handle, registry, hub_handle, writer_handle)
    }

    #[tokio::test]
    async fn register_evicts_prior_connection_for_same_user() {
        let (hub, registry, _hub_handle, _writer_handle) = spawn_test_hub().await;
        let session_id = SessionId::new();
        let user_id = test_student_id();

        let (tx1, _rx1) = mpsc::channel(8);
        let first = ConnectionHandle::new(user_id.clone(), Role::Student, session_id, tx1);
        hub.register(first.clone()).await.unwrap();

        let (tx2, _rx2) = mpsc::channel(8);
        let second = ConnectionHandle::new(user_id.clone(), Role::Student, session_id, tx2);
        hub.register(second.clone()).await.unwrap();

        let current = registry.get(&user_id).await.unwrap();
        assert_eq!(current, second);
    }

    #[tokio::test]
    async fn message_event_is_persisted_and_delivered_to_instructor() {
        let (hub, registry, _hub_handle, _writer_handle) = spawn_test_hub().await;
        let session_id = SessionId::new();

        let (instr_tx, mut instr_rx) = mpsc::channel(8);
        let instructor = ConnectionHandle::new(test_instructor_id(), Role::Instructor, session_id, instr_tx);
        hub.register(instructor).await.unwrap();

        let (student_tx, _student_rx) = mpsc::channel(8);
        let student_handle = ConnectionHandle::new(test_student_id(), Role::Student, session_id, student_tx);
        hub.register(student_handle).await.unwrap();

        let sender = SenderContext {
            user_id: test_student_id(),
            role: Role::Student,
            session_id,
        };
        let envelope = test_inbound_envelope(MessageType::InstructorInbox.as_str(), None);
        hub.submit_message(MessageEvent { envelope, sender }).unwrap();

        let delivered = tokio::time::timeout(std::time::Duration::from_secs(1), instr_rx.recv())
            .await
            .expect("delivery should not time out")
            .expect("channel should not close");
        assert_eq!(delivered.message_type, "instructor_inbox");

        let _ = registry;
    }

    #[tokio::test]
    async fn message_from_unregistered_sender_is_dropped() {
        let (hub, registry, _hub_handle, _writer_handle) = spawn_test_hub().await;
        let session_id = SessionId::new();

        let (instr_tx, mut instr_rx) = mpsc::channel(8);
        let instructor = ConnectionHandle::new(test_instructor_id(), Role::Instructor, session_id, instr_tx);
        hub.register(instructor).await.unwrap();

        // The student sender is never registered (e.g. evicted by a
        // reconnect between submit and the Hub draining the event).
        let sender = SenderContext {
            user_id: test_student_id(),
            role: Role::Student,
            session_id,
        };
        let envelope = test_inbound_envelope(MessageType::InstructorInbox.as_str(), None);
        hub.submit_message(MessageEvent { envelope, sender }).unwrap();

        let result = tokio::time::timeout(std::time::Duration::from_millis(200), instr_rx.recv()).await;
        assert!(result.is_err(), "instructor should not receive a message from an unregistered sender");

        let _ = registry;
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let (hub, _registry, hub_handle, _writer_handle) = spawn_test_hub().await;
        hub.stop();
        hub.stop();
        hub_handle.await.unwrap();
    }
}
