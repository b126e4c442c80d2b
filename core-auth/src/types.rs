use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one interactive login attempt.
///
/// Outcomes are matched against the active session by id, so a late outcome
/// from a superseded attempt never touches a newer one.
///
/// # Examples
///
/// ```
/// use core_auth::SessionId;
///
/// let id = SessionId::new();
/// let parsed = SessionId::from_string(&id.to_string()).unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a session ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// State of the login slot.
///
/// # Examples
///
/// ```
/// use core_auth::{SessionId, SessionState};
///
/// assert!(!SessionState::Idle.is_active());
/// assert!(SessionState::Active(SessionId::new()).is_active());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "session_id")]
pub enum SessionState {
    /// No login is pending
    Idle,
    /// A login attempt holds the slot
    Active(SessionId),
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }

    /// The active session, if any.
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            SessionState::Idle => None,
            SessionState::Active(id) => Some(*id),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Active(id) => write!(f, "Active({})", id),
        }
    }
}
