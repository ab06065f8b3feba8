//! The four event kinds the Hub Coordinator's single loop consumes.

use classroom_core::InboundEnvelope;
use classroom_registry::ConnectionHandle;
use classroom_router::SenderContext;
use tokio::sync::oneshot;

/// A request to register a new live connection.
///
/// `ack` fires once the Hub loop has evicted any prior connection for the
/// same user and inserted this one — the Network Boundary awaits it before
/// starting history replay, so replay never races a not-yet-registered
/// connection.
pub struct RegisterEvent {
    /// The connection to register.
    pub handle: ConnectionHandle,
    /// Fired once registration has completed.
    pub ack: oneshot::Sender<()>,
}

/// A request to remove a connection from the Registry.
///
/// Carries the exact [`ConnectionHandle`] instance so the Hub's
/// race-safe unregister never removes a newer connection that has already
/// replaced this one for the same user.
pub struct UnregisterEvent {
    /// The connection to remove.
    pub handle: ConnectionHandle,
}

/// An inbound message read off one Client Session's socket, paired with the
/// credentials bound to that connection at Authenticated entry.
pub struct MessageEvent {
    /// The raw envelope as read from the wire.
    pub envelope: InboundEnvelope,
    /// The sender's immutable, connection-bound identity.
    pub sender: SenderContext,
}
