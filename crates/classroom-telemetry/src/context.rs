//! Per-request correlation context.
//!
//! A [`RequestContext`] attaches a correlation id span to one unit of work —
//! an inbound HTTP request, a WebSocket upgrade, or a single routed message
//! — so its validate/rate-limit/persist/deliver path is traceable end to end
//! in logs under one `request_id`.

use tracing::Span;
use uuid::Uuid;

/// A correlation context for one unit of work.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    component: String,
    operation: Option<String>,
}

impl RequestContext {
    /// Starts a new context for `component` (e.g. `"router"`, `"hub"`, `"ws"`).
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            component: component.into(),
            operation: None,
        }
    }

    /// Attaches an operation label (e.g. `"route_message"`).
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// The correlation id for this unit of work.
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Builds (but does not enter) the `tracing` span for this context.
    #[must_use]
    pub fn span(&self) -> Span {
        match &self.operation {
            Some(op) => tracing::info_span!(
                "request",
                request_id = %self.request_id,
                component = %self.component,
                operation = %op,
            ),
            None => tracing::info_span!(
                "request",
                request_id = %self.request_id,
                component = %self.component,
            ),
        }
    }

    /// Enters the span for the remainder of the caller's scope, returning a
    /// guard that exits it on drop.
    #[must_use]
    pub fn enter(&self) -> RequestGuard {
        RequestGuard {
            _span_guard: self.span().entered(),
        }
    }
}

/// Holds an entered [`RequestContext`] span open for as long as it lives.
pub struct RequestGuard {
    _span_guard: tracing::span::EnteredSpan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contexts_get_distinct_request_ids() {
        let a = RequestContext::new("router");
        let b = RequestContext::new("router");
        assert_ne!(a.request_id(), b.request_id());
    }

    #[test]
    fn with_operation_is_chainable() {
        let ctx = RequestContext::new("hub").with_operation("dispatch");
        let _guard = ctx.enter();
        tracing::info!("inside span");
    }
}
