//! Interactive Login Abstraction
//!
//! The platform login UI is owned by the host lifecycle: the core can open it,
//! but its outcome comes back only when the host forwards an activity result
//! through a [`CallbackRegistration`]. These traits describe that surface.

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::error::BridgeError;
use crate::graph::AccessToken;

/// Opaque host object (activity, fragment, window) the login UI is started from.
///
/// Platform adapters downcast it back to their concrete type.
#[derive(Clone)]
pub struct HostContext(Arc<dyn Any + Send + Sync>);

impl HostContext {
    pub fn new<T: Any + Send + Sync>(host: T) -> Self {
        Self(Arc::new(host))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HostContext { .. }")
    }
}

/// Opaque payload of an externally delivered activity result.
#[derive(Clone)]
pub struct ResultPayload(Arc<dyn Any + Send + Sync>);

impl ResultPayload {
    pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
        Self(Arc::new(payload))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for ResultPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResultPayload { .. }")
    }
}

/// Which permission audience a login asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionKind {
    Read,
    Publish,
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionKind::Read => f.write_str("read"),
            PermissionKind::Publish => f.write_str("publish"),
        }
    }
}

/// Successful outcome of an interactive login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    pub access_token: AccessToken,
    pub recently_granted_permissions: BTreeSet<String>,
    pub recently_denied_permissions: BTreeSet<String>,
}

impl LoginResult {
    pub fn new(access_token: AccessToken) -> Self {
        let recently_granted_permissions = access_token.permissions.iter().cloned().collect();
        let recently_denied_permissions =
            access_token.declined_permissions.iter().cloned().collect();
        Self {
            access_token,
            recently_granted_permissions,
            recently_denied_permissions,
        }
    }
}

/// Receiver for the terminal outcome of one login attempt.
pub trait LoginCallback: Send + Sync {
    fn on_success(&self, result: LoginResult);

    fn on_cancel(&self);

    fn on_error(&self, error: BridgeError);
}

/// Handle returned when a [`LoginCallback`] is registered.
///
/// Dropping the handle discards the registration.
pub trait CallbackRegistration: Send {
    /// Offer an activity result to the registered callback.
    ///
    /// Returns `true` if the payload belonged to the login flow; in that case
    /// exactly one of the callback methods has been (or will be) invoked.
    fn forward(&mut self, request_code: i32, result_code: i32, payload: &ResultPayload) -> bool;
}

/// Platform login manager
///
/// Wraps the SDK's login singleton. All methods are synchronous and are
/// expected to be called from the host's UI context.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::login::{HostContext, LoginManager, PermissionKind};
///
/// fn start(manager: &dyn LoginManager, host: &HostContext) {
///     manager.log_in(host, PermissionKind::Read, &["email".to_string()]);
/// }
/// ```
pub trait LoginManager: Send + Sync {
    /// Register `callback` for the next login outcome.
    fn register_callback(&self, callback: Arc<dyn LoginCallback>) -> Box<dyn CallbackRegistration>;

    /// Open the interactive login UI. Fire-and-forget: the outcome arrives
    /// through [`CallbackRegistration::forward`].
    fn log_in(&self, host: &HostContext, kind: PermissionKind, permissions: &[String]);

    /// Clear the platform session.
    fn log_out(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Activity(&'static str);

    #[test]
    fn test_host_context_downcast() {
        let host = HostContext::new(Activity("main"));
        assert_eq!(host.downcast_ref::<Activity>(), Some(&Activity("main")));
        assert!(host.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_result_payload_clone_shares_value() {
        let payload = ResultPayload::new(7_i32);
        let clone = payload.clone();
        assert_eq!(clone.downcast_ref::<i32>(), Some(&7));
    }

    #[test]
    fn test_login_result_collects_permissions() {
        let mut token =
            AccessToken::new("t", "app", "user").with_permissions(["email", "public_profile"]);
        token.declined_permissions = vec!["user_friends".to_string()];

        let result = LoginResult::new(token);
        assert!(result.recently_granted_permissions.contains("email"));
        assert_eq!(result.recently_granted_permissions.len(), 2);
        assert!(result.recently_denied_permissions.contains("user_friends"));
    }
}
