//! # Event Bus System
//!
//! Broadcasts request and login lifecycle events over `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: [`BridgeEvent`] wraps [`RequestEvent`] and [`LoginEvent`]
//! - **EventBus**: cloneable broadcast sender; each subscriber gets every
//!   event emitted after it subscribed
//!
//! Emission is best effort. Streams never wait on subscribers, and emitting
//! with nobody listening is not an error for the bridge.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{BridgeEvent, EventBus, LoginEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut events = bus.subscribe();
//!
//! bus.emit(BridgeEvent::Login(LoginEvent::LoggedOut)).ok();
//!
//! let event = events.recv().await.unwrap();
//! assert_eq!(event, BridgeEvent::Login(LoginEvent::LoggedOut));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events; it can keep reading.
//! - **`RecvError::Closed`**: every sender was dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum BridgeEvent {
    /// Graph request lifecycle
    Request(RequestEvent),
    /// Interactive login lifecycle
    Login(LoginEvent),
}

impl BridgeEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            BridgeEvent::Request(e) => e.description(),
            BridgeEvent::Login(e) => e.description(),
        }
    }

    /// Returns `true` for events that report a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            BridgeEvent::Request(RequestEvent::Failed { .. })
                | BridgeEvent::Login(LoginEvent::Failed { .. })
        )
    }
}

/// Events emitted by request streams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum RequestEvent {
    /// The request was handed to the transport.
    Submitted {
        graph_path: Option<String>,
        method: Option<String>,
    },
    /// A response was delivered. `has_error` is set for request-level errors.
    Completed {
        graph_path: Option<String>,
        has_error: bool,
    },
    /// No response could be formed.
    Failed {
        graph_path: Option<String>,
        message: String,
    },
}

impl RequestEvent {
    fn description(&self) -> &str {
        match self {
            RequestEvent::Submitted { .. } => "Graph request submitted",
            RequestEvent::Completed { .. } => "Graph response delivered",
            RequestEvent::Failed { .. } => "Graph request failed",
        }
    }
}

/// Events emitted by the login session bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LoginEvent {
    /// A new session took the slot.
    Started { session_id: String, kind: String },
    /// An active session was shut down by a newer login.
    Superseded { session_id: String },
    /// An active session was shut down by logout or an explicit clear.
    ShutDown { session_id: String },
    /// The platform reported a successful login.
    SignedIn { session_id: String, user_id: String },
    /// The user cancelled the login.
    Cancelled { session_id: String },
    /// The platform reported a login error.
    Failed { session_id: String, message: String },
    /// An external result was offered to the active session.
    ResultForwarded { session_id: String, handled: bool },
    /// Logout was requested.
    LoggedOut,
}

impl LoginEvent {
    fn description(&self) -> &str {
        match self {
            LoginEvent::Started { .. } => "Login session started",
            LoginEvent::Superseded { .. } => "Login session superseded",
            LoginEvent::ShutDown { .. } => "Login session shut down",
            LoginEvent::SignedIn { .. } => "User signed in",
            LoginEvent::Cancelled { .. } => "Login cancelled",
            LoginEvent::Failed { .. } => "Login failed",
            LoginEvent::ResultForwarded { .. } => "Login result forwarded",
            LoginEvent::LoggedOut => "User logged out",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel for bridge events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BridgeEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering at most `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns an error if there are no active subscribers.
    pub fn emit(&self, event: BridgeEvent) -> Result<usize, SendError<BridgeEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<BridgeEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Emit `event` on `bus` if one is configured, ignoring the no-subscriber case.
pub fn emit_to(bus: Option<&EventBus>, event: BridgeEvent) {
    if let Some(bus) = bus {
        let _ = bus.emit(event);
    }
}
