//! One in-flight login attempt.
//!
//! A [`LoginSession`] owns the platform callback registration. Its outcome
//! travels through a oneshot channel whose sender sits in an [`OutcomeSlot`]
//! shared with the registered [`SessionCallback`]. Whoever takes the sender
//! first decides how the login stream ends; later attempts are no-ops.

use crate::types::SessionId;
use bridge_traits::{
    BridgeError, CallbackRegistration, LoginCallback, LoginResult, PermissionKind, ResultPayload,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;

/// How a login session ended.
#[derive(Debug)]
pub(crate) enum SessionEnd {
    Success(LoginResult),
    Cancelled,
    Failed(BridgeError),
    /// Superseded, logged out, cleared, or handed a result it did not recognise.
    Shutdown,
}

#[derive(Clone)]
pub(crate) struct OutcomeSlot(Arc<Mutex<Option<oneshot::Sender<SessionEnd>>>>);

impl OutcomeSlot {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<SessionEnd>) {
        let (tx, rx) = oneshot::channel();
        (Self(Arc::new(Mutex::new(Some(tx)))), rx)
    }

    /// Deliver `end` unless an outcome was already delivered.
    ///
    /// Returns `true` if this call ended the session.
    pub(crate) fn finish(&self, end: SessionEnd) -> bool {
        match self.take_sender() {
            Some(tx) => {
                // A dropped receiver means nobody polls the stream any more.
                let _ = tx.send(end);
                true
            }
            None => false,
        }
    }

    fn take_sender(&self) -> Option<oneshot::Sender<SessionEnd>> {
        self.0.lock().take()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.0.lock().is_none()
    }
}

/// An active login attempt held in the login slot.
pub struct LoginSession {
    id: SessionId,
    kind: PermissionKind,
    registration: Option<Box<dyn CallbackRegistration>>,
    outcome: OutcomeSlot,
}

impl LoginSession {
    pub(crate) fn new(
        id: SessionId,
        kind: PermissionKind,
        registration: Box<dyn CallbackRegistration>,
        outcome: OutcomeSlot,
    ) -> Self {
        Self {
            id,
            kind,
            registration: Some(registration),
            outcome,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn kind(&self) -> PermissionKind {
        self.kind
    }

    /// Offer an activity result to the registration. The registration is
    /// consumed; a second call always returns `false`.
    pub(crate) fn forward(
        &mut self,
        request_code: i32,
        result_code: i32,
        payload: &ResultPayload,
    ) -> bool {
        match self.registration.take() {
            Some(mut registration) => registration.forward(request_code, result_code, payload),
            None => false,
        }
    }

    /// Discard the registration and end the stream without a value.
    ///
    /// Returns `true` if the session had not already ended.
    pub(crate) fn shutdown(mut self) -> bool {
        self.registration = None;
        self.outcome.finish(SessionEnd::Shutdown)
    }
}

impl std::fmt::Debug for LoginSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginSession")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("registered", &self.registration.is_some())
            .field("finished", &self.outcome.is_finished())
            .finish()
    }
}

/// Hook invoked when a session's outcome has been delivered.
pub(crate) trait OutcomeListener: Send + Sync {
    fn on_outcome(&self, id: SessionId, end: &SessionEnd);
}

/// The [`LoginCallback`] registered with the platform for one session.
pub(crate) struct SessionCallback {
    id: SessionId,
    outcome: OutcomeSlot,
    listener: std::sync::Weak<dyn OutcomeListener>,
}

impl SessionCallback {
    pub(crate) fn new(
        id: SessionId,
        outcome: OutcomeSlot,
        listener: std::sync::Weak<dyn OutcomeListener>,
    ) -> Self {
        Self {
            id,
            outcome,
            listener,
        }
    }

    fn deliver(&self, end: SessionEnd) {
        let Some(tx) = self.outcome.take_sender() else {
            tracing::debug!(session_id = %self.id, "Ignoring outcome for finished login session");
            return;
        };
        // The slot is released before the stream observes the outcome.
        if let Some(listener) = self.listener.upgrade() {
            listener.on_outcome(self.id, &end);
        }
        let _ = tx.send(end);
    }
}

impl LoginCallback for SessionCallback {
    fn on_success(&self, result: LoginResult) {
        self.deliver(SessionEnd::Success(result));
    }

    fn on_cancel(&self) {
        self.deliver(SessionEnd::Cancelled);
    }

    fn on_error(&self, error: BridgeError) {
        self.deliver(SessionEnd::Failed(error));
    }
}
