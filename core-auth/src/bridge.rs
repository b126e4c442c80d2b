//! # Login Session Bridge
//!
//! Process-wide slot holding at most one in-flight interactive login.
//!
//! ## Overview
//!
//! The platform login UI reports back through an activity result the host
//! receives, not through the code that started the login. The bridge keeps
//! the pending attempt in a single slot so [`LoginBridge::forward_result`]
//! can reach it from anywhere.
//!
//! - [`login`](LoginBridge::login) shuts down any active session, installs a
//!   new one and returns its stream. The platform UI opens on first poll.
//! - [`forward_result`](LoginBridge::forward_result) hands an activity result
//!   to the active session and always empties the slot.
//! - [`logout`](LoginBridge::logout) and [`clear`](LoginBridge::clear) shut the
//!   active session down.
//! - [`state`](LoginBridge::state) and [`is_active`](LoginBridge::is_active)
//!   query the slot without side effects.
//!
//! ## Stream outcomes
//!
//! | Outcome | Login stream |
//! |---------|--------------|
//! | success | one `Ok(LoginResult)`, then ends |
//! | cancel | ends without items |
//! | platform error | one `Err(AuthError::LoginFailed)`, then ends |
//! | superseded / logout / unrecognised result | ends without items |
//!
//! ## Usage
//!
//! ```ignore
//! use core_auth::LoginBridge;
//! use bridge_traits::PermissionKind;
//! use futures::StreamExt;
//!
//! let mut login = LoginBridge::global().login(
//!     manager.clone(),
//!     host,
//!     PermissionKind::Read,
//!     vec!["email".to_string()],
//! );
//!
//! // Later, from the host's activity-result hook:
//! LoginBridge::global().forward_result(request_code, result_code, &payload);
//!
//! if let Some(result) = login.next().await {
//!     let token = result?.access_token;
//! }
//! ```

use crate::error::{AuthError, Result};
use crate::session::{LoginSession, OutcomeListener, OutcomeSlot, SessionCallback, SessionEnd};
use crate::types::{SessionId, SessionState};
use bridge_traits::{HostContext, LoginManager, LoginResult, PermissionKind, ResultPayload};
use core_runtime::events::{emit_to, BridgeEvent, EventBus, LoginEvent};
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, OnceLock, Weak};
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, info, instrument, warn};

/// Stream of a login outcome: at most one item.
pub type LoginStream = BoxStream<'static, Result<LoginResult>>;

/// Stream that performs the platform logout on first poll and yields `()` once.
pub type LogoutStream = BoxStream<'static, ()>;

static GLOBAL: OnceLock<LoginBridge> = OnceLock::new();

/// Handle to a login slot. Clones share the same slot.
#[derive(Clone)]
pub struct LoginBridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    slot: Mutex<Option<LoginSession>>,
    event_bus: RwLock<Option<EventBus>>,
}

impl BridgeInner {
    fn emit(&self, event: LoginEvent) {
        let bus = self.event_bus.read();
        emit_to(bus.as_ref(), BridgeEvent::Login(event));
    }

    /// Empty the slot if it still holds session `id`.
    fn release(&self, id: SessionId) -> Option<LoginSession> {
        let mut slot = self.slot.lock();
        if slot.as_ref().map(LoginSession::id) == Some(id) {
            slot.take()
        } else {
            None
        }
    }
}

impl OutcomeListener for BridgeInner {
    fn on_outcome(&self, id: SessionId, end: &SessionEnd) {
        // Dropped outside the slot lock; this discards the registration.
        let released = self.release(id);
        debug!(session_id = %id, released = released.is_some(), "Login outcome received");
        drop(released);

        let session_id = id.to_string();
        match end {
            SessionEnd::Success(result) => {
                info!(session_id = %id, "Login succeeded");
                self.emit(LoginEvent::SignedIn {
                    session_id,
                    user_id: result.access_token.user_id.clone(),
                });
            }
            SessionEnd::Cancelled => {
                info!(session_id = %id, "Login cancelled by user");
                self.emit(LoginEvent::Cancelled { session_id });
            }
            SessionEnd::Failed(error) => {
                warn!(session_id = %id, error = %error, "Login failed");
                self.emit(LoginEvent::Failed {
                    session_id,
                    message: error.to_string(),
                });
            }
            SessionEnd::Shutdown => {}
        }
    }
}

impl LoginBridge {
    /// Create a standalone bridge with its own slot.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                slot: Mutex::new(None),
                event_bus: RwLock::new(None),
            }),
        }
    }

    /// The process-wide bridge.
    pub fn global() -> &'static LoginBridge {
        GLOBAL.get_or_init(LoginBridge::new)
    }

    /// Publish login events on `bus`, or stop publishing with `None`.
    pub fn set_event_bus(&self, bus: Option<EventBus>) {
        *self.inner.event_bus.write() = bus;
    }

    pub fn state(&self) -> SessionState {
        match self.inner.slot.lock().as_ref() {
            Some(session) => SessionState::Active(session.id()),
            None => SessionState::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Start a login attempt, shutting down any active one.
    ///
    /// The callback is registered immediately. `manager.log_in` runs on the
    /// first poll of the returned stream, and only if the session has not been
    /// shut down by then.
    #[instrument(skip_all, fields(kind = %kind))]
    pub fn login(
        &self,
        manager: Arc<dyn LoginManager>,
        host: HostContext,
        kind: PermissionKind,
        permissions: Vec<String>,
    ) -> LoginStream {
        let id = SessionId::new();
        let (outcome, mut rx) = OutcomeSlot::channel();

        let weak_inner: Weak<BridgeInner> = Arc::downgrade(&self.inner);
        let listener: Weak<dyn OutcomeListener> = weak_inner;
        let callback = Arc::new(SessionCallback::new(id, outcome.clone(), listener));
        let registration = manager.register_callback(callback);
        let session = LoginSession::new(id, kind, registration, outcome);

        let previous = self.inner.slot.lock().take();
        if let Some(previous) = previous {
            self.supersede(previous);
        }
        // A login racing on another thread may have filled the slot meanwhile.
        let displaced = self.inner.slot.lock().replace(session);
        if let Some(displaced) = displaced {
            self.supersede(displaced);
        }

        info!(session_id = %id, "Login session started");
        self.inner.emit(LoginEvent::Started {
            session_id: id.to_string(),
            kind: kind.to_string(),
        });

        stream::once(async move {
            match rx.try_recv() {
                Ok(end) => return end,
                Err(TryRecvError::Closed) => return SessionEnd::Shutdown,
                Err(TryRecvError::Empty) => {}
            }

            debug!(session_id = %id, "Opening platform login");
            manager.log_in(&host, kind, &permissions);
            rx.await.unwrap_or(SessionEnd::Shutdown)
        })
        .filter_map(|end| async move {
            match end {
                SessionEnd::Success(result) => Some(Ok(result)),
                SessionEnd::Failed(error) => Some(Err(AuthError::LoginFailed(error))),
                SessionEnd::Cancelled | SessionEnd::Shutdown => None,
            }
        })
        .boxed()
    }

    /// Hand an activity result to the active session.
    ///
    /// The slot is emptied whatever the outcome. Returns whether the payload
    /// belonged to the login flow; with no active session this is always
    /// `false` and nothing else happens.
    #[instrument(skip(self, payload))]
    pub fn forward_result(
        &self,
        request_code: i32,
        result_code: i32,
        payload: &ResultPayload,
    ) -> bool {
        let taken = self.inner.slot.lock().take();
        let Some(mut session) = taken else {
            debug!("No active login session; result not handled");
            return false;
        };

        let id = session.id();
        let handled = session.forward(request_code, result_code, payload);
        if !handled {
            debug!(session_id = %id, "Result not recognised; ending login session");
            session.shutdown();
        }

        self.inner.emit(LoginEvent::ResultForwarded {
            session_id: id.to_string(),
            handled,
        });
        handled
    }

    /// Shut down the active session, if any.
    ///
    /// Returns `true` if a session was active.
    pub fn clear(&self) -> bool {
        let taken = self.inner.slot.lock().take();
        match taken {
            Some(session) => {
                let id = session.id();
                if session.shutdown() {
                    info!(session_id = %id, "Login session cleared");
                    self.inner.emit(LoginEvent::ShutDown {
                        session_id: id.to_string(),
                    });
                }
                true
            }
            None => false,
        }
    }

    /// Shut down the active session now and log out of the platform on
    /// first poll of the returned stream.
    pub fn logout(&self, manager: Arc<dyn LoginManager>) -> LogoutStream {
        self.clear();

        let inner = Arc::clone(&self.inner);
        stream::once(async move {
            manager.log_out();
            info!("Logged out");
            inner.emit(LoginEvent::LoggedOut);
        })
        .boxed()
    }

    fn supersede(&self, session: LoginSession) {
        let id = session.id();
        if session.shutdown() {
            info!(session_id = %id, "Login session superseded");
            self.inner.emit(LoginEvent::Superseded {
                session_id: id.to_string(),
            });
        }
    }
}

impl Default for LoginBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoginBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginBridge")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{BridgeError, CallbackRegistration, LoginCallback};

    /// Registration that never recognises a payload.
    struct Inert;

    impl CallbackRegistration for Inert {
        fn forward(&mut self, _: i32, _: i32, _: &ResultPayload) -> bool {
            false
        }
    }

    /// Keeps the last registered callback so tests can fire outcomes directly.
    #[derive(Default)]
    struct CapturingManager {
        callback: Mutex<Option<Arc<dyn LoginCallback>>>,
        opened: Mutex<u32>,
    }

    impl LoginManager for CapturingManager {
        fn register_callback(
            &self,
            callback: Arc<dyn LoginCallback>,
        ) -> Box<dyn CallbackRegistration> {
            *self.callback.lock() = Some(callback);
            Box::new(Inert)
        }

        fn log_in(&self, _host: &HostContext, _kind: PermissionKind, _permissions: &[String]) {
            *self.opened.lock() += 1;
        }

        fn log_out(&self) {}
    }

    impl CapturingManager {
        fn last_callback(&self) -> Arc<dyn LoginCallback> {
            self.callback.lock().clone().unwrap()
        }
    }

    fn start(bridge: &LoginBridge, manager: &Arc<CapturingManager>) -> LoginStream {
        bridge.login(
            manager.clone(),
            HostContext::new(()),
            PermissionKind::Read,
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn test_state_is_a_pure_query() {
        let bridge = LoginBridge::new();
        assert_eq!(bridge.state(), SessionState::Idle);

        let manager = Arc::new(CapturingManager::default());
        let _stream = start(&bridge, &manager);

        let state = bridge.state();
        assert!(state.is_active());
        assert_eq!(bridge.state(), state);
        assert_eq!(*manager.opened.lock(), 0);
    }

    #[tokio::test]
    async fn test_direct_error_outcome_fails_stream_and_clears_slot() {
        let bridge = LoginBridge::new();
        let manager = Arc::new(CapturingManager::default());
        let mut stream = start(&bridge, &manager);

        manager
            .last_callback()
            .on_error(BridgeError::LoginFailed("app not approved".to_string()));
        assert!(!bridge.is_active());

        assert!(matches!(
            stream.next().await,
            Some(Err(AuthError::LoginFailed(_)))
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stale_outcome_does_not_clear_newer_session() {
        let bridge = LoginBridge::new();
        let manager = Arc::new(CapturingManager::default());

        let first = start(&bridge, &manager);
        let stale = manager.last_callback();
        let _second = start(&bridge, &manager);
        let active = bridge.state();

        stale.on_cancel();

        assert_eq!(bridge.state(), active);
        assert!(first.collect::<Vec<_>>().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_reports_whether_active() {
        let bridge = LoginBridge::new();
        assert!(!bridge.clear());

        let manager = Arc::new(CapturingManager::default());
        let stream = start(&bridge, &manager);
        assert!(bridge.clear());
        assert!(!bridge.is_active());

        assert!(stream.collect::<Vec<_>>().await.is_empty());
        assert_eq!(*manager.opened.lock(), 0);
    }

    fn drain(events: &mut tokio::sync::broadcast::Receiver<BridgeEvent>) -> Vec<LoginEvent> {
        let mut received = Vec::new();
        while let Ok(BridgeEvent::Login(event)) = events.try_recv() {
            received.push(event);
        }
        received
    }

    #[tokio::test]
    async fn test_previous_session_ends_before_next_starts() {
        let bridge = LoginBridge::new();
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        bridge.set_event_bus(Some(bus));
        let manager = Arc::new(CapturingManager::default());

        let first = start(&bridge, &manager);
        let first_id = bridge.state().session_id().unwrap();
        let _second = start(&bridge, &manager);
        let second_id = bridge.state().session_id().unwrap();

        assert_eq!(
            drain(&mut events),
            vec![
                LoginEvent::Started {
                    session_id: first_id.to_string(),
                    kind: PermissionKind::Read.to_string(),
                },
                LoginEvent::Superseded {
                    session_id: first_id.to_string(),
                },
                LoginEvent::Started {
                    session_id: second_id.to_string(),
                    kind: PermissionKind::Read.to_string(),
                },
            ]
        );
        assert!(first.collect::<Vec<_>>().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_and_logout_report_shut_down_only_when_active() {
        let bridge = LoginBridge::new();
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        bridge.set_event_bus(Some(bus));
        let manager = Arc::new(CapturingManager::default());

        let _stream = start(&bridge, &manager);
        let id = bridge.state().session_id().unwrap();
        drain(&mut events);

        assert!(bridge.clear());
        assert_eq!(
            drain(&mut events),
            vec![LoginEvent::ShutDown {
                session_id: id.to_string(),
            }]
        );

        let logout: Vec<_> = bridge.logout(manager.clone()).collect().await;
        assert_eq!(logout, vec![()]);
        assert_eq!(drain(&mut events), vec![LoginEvent::LoggedOut]);
    }

    #[tokio::test]
    async fn test_finished_session_is_not_reported_superseded() {
        let bridge = LoginBridge::new();
        let manager = Arc::new(CapturingManager::default());
        let first = start(&bridge, &manager);
        let stale = manager.last_callback();

        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        bridge.set_event_bus(Some(bus));

        stale.on_cancel();
        let _second = start(&bridge, &manager);

        let superseded = drain(&mut events)
            .into_iter()
            .any(|event| matches!(event, LoginEvent::Superseded { .. }));
        assert!(!superseded);
        assert!(first.collect::<Vec<_>>().await.is_empty());
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(LoginBridge::global(), LoginBridge::global()));
        let clone = LoginBridge::global().clone();
        assert!(Arc::ptr_eq(&clone.inner, &LoginBridge::global().inner));
    }
}
