//! Reactive façade over the platform graph SDK.
//!
//! [`RxGraph`] wires a [`BridgeConfig`] into the request builder and the login
//! bridge. Every operation returns a lazy stream: nothing reaches the platform
//! until the stream is first polled, so the caller chooses which task absorbs
//! the work.
//!
//! ```ignore
//! use futures::StreamExt;
//! use rxgraph::{BridgeConfig, RxGraph};
//!
//! let graph = RxGraph::new(
//!     BridgeConfig::builder()
//!         .graph_transport(transport)
//!         .login_manager(login_manager)
//!         .build()?,
//! );
//!
//! let me = graph.create().request_me().next().await;
//!
//! let mut login = graph.login_with_read_permissions(host, vec!["email".into()]);
//! // from the host's activity-result hook:
//! RxGraph::forward_login_result(request_code, result_code, &payload);
//! ```

pub use bridge_traits::{
    AccessToken, GraphParams, GraphRequest, GraphResponse, HostContext, HttpMethod, LoginResult,
    ParamValue, PermissionKind, ResultPayload,
};
pub use core_auth::{AuthError, LoginBridge, LoginStream, LogoutStream, SessionState};
pub use core_graph::{
    GraphError, Location, PhotoSource, RequestBuilder, RequestExecutor, ResponseStream,
};
pub use core_runtime::{
    BridgeConfig, BridgeConfigBuilder, BridgeEvent, EventBus, LoginEvent, RequestEvent,
};

use tracing::debug;

/// Primary façade exposed to host applications.
#[derive(Clone, Debug)]
pub struct RxGraph {
    config: BridgeConfig,
    executor: RequestExecutor,
    login_bridge: LoginBridge,
}

impl RxGraph {
    /// Create a façade bound to the process-wide login slot.
    ///
    /// A configured event bus also receives the global slot's login events.
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_login_bridge(config, LoginBridge::global().clone())
    }

    /// Create a façade bound to `login_bridge` instead of the global slot.
    pub fn with_login_bridge(config: BridgeConfig, login_bridge: LoginBridge) -> Self {
        let mut executor = RequestExecutor::new(config.graph_transport.clone());
        if let Some(bus) = &config.event_bus {
            executor = executor.with_event_bus(bus.clone());
            login_bridge.set_event_bus(Some(bus.clone()));
        }

        Self {
            config,
            executor,
            login_bridge,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Start an empty request builder, pre-set with the default graph version.
    pub fn create(&self) -> RequestBuilder {
        let builder = RequestBuilder::new(self.executor.clone());
        match &self.config.default_graph_version {
            Some(version) => builder.version(version.clone()),
            None => builder,
        }
    }

    /// Log in asking for read permissions.
    pub fn login_with_read_permissions(
        &self,
        host: HostContext,
        permissions: Vec<String>,
    ) -> LoginStream {
        self.login(host, PermissionKind::Read, permissions)
    }

    /// Log in asking for publish permissions.
    pub fn login_with_publish_permissions(
        &self,
        host: HostContext,
        permissions: Vec<String>,
    ) -> LoginStream {
        self.login(host, PermissionKind::Publish, permissions)
    }

    fn login(
        &self,
        host: HostContext,
        kind: PermissionKind,
        permissions: Vec<String>,
    ) -> LoginStream {
        debug!(kind = %kind, count = permissions.len(), "Login requested");
        self.login_bridge
            .login(self.config.login_manager.clone(), host, kind, permissions)
    }

    /// Shut down any pending login now; log out of the platform on first poll.
    pub fn logout(&self) -> LogoutStream {
        self.login_bridge.logout(self.config.login_manager.clone())
    }

    /// Whether a login is pending on this façade's slot. No side effects.
    pub fn is_login_active(&self) -> bool {
        self.login_bridge.is_active()
    }

    pub fn login_state(&self) -> SessionState {
        self.login_bridge.state()
    }

    /// Route an activity result to the pending login in the process-wide slot.
    ///
    /// Callable without any façade instance. Returns whether the result
    /// belonged to the login flow.
    pub fn forward_login_result(
        request_code: i32,
        result_code: i32,
        payload: &ResultPayload,
    ) -> bool {
        LoginBridge::global().forward_result(request_code, result_code, payload)
    }
}
