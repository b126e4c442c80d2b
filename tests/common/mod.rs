//! Simulated platform SDK shared by the façade tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    BridgeError, CallbackRegistration, GraphCallback, GraphRequest, GraphResponse, GraphTransport,
    HostContext, LoginCallback, LoginManager, LoginResult, PermissionKind, ResultPayload,
};
use parking_lot::Mutex;
use rxgraph::{BridgeConfig, EventBus};
use std::sync::Arc;

pub const LOGIN_REQUEST_CODE: i32 = 64206;
pub const RESULT_OK: i32 = -1;
pub const RESULT_CANCELED: i32 = 0;

/// Transport that records submissions and answers each with `{"ok":true}`.
#[derive(Default)]
pub struct SimulatedTransport {
    pub submitted: Mutex<Vec<GraphRequest>>,
}

#[async_trait]
impl GraphTransport for SimulatedTransport {
    async fn execute_and_wait(
        &self,
        request: GraphRequest,
        callback: GraphCallback,
    ) -> BridgeResult<()> {
        self.submitted.lock().push(request.clone());
        callback(GraphResponse::success(request, r#"{"ok":true}"#));
        Ok(())
    }
}

/// Payload of a simulated login activity result.
pub enum LoginActivityResult {
    Success(LoginResult),
    Cancel,
    Error(String),
}

struct SimulatedRegistration {
    callback: Arc<dyn LoginCallback>,
}

impl CallbackRegistration for SimulatedRegistration {
    fn forward(&mut self, request_code: i32, _result_code: i32, payload: &ResultPayload) -> bool {
        if request_code != LOGIN_REQUEST_CODE {
            return false;
        }
        match payload.downcast_ref::<LoginActivityResult>() {
            Some(LoginActivityResult::Success(result)) => self.callback.on_success(result.clone()),
            Some(LoginActivityResult::Cancel) => self.callback.on_cancel(),
            Some(LoginActivityResult::Error(message)) => self
                .callback
                .on_error(BridgeError::LoginFailed(message.clone())),
            None => return false,
        }
        true
    }
}

#[derive(Default)]
pub struct SimulatedLoginManager {
    pub log_ins: Mutex<Vec<PermissionKind>>,
    pub log_outs: Mutex<u32>,
}

impl LoginManager for SimulatedLoginManager {
    fn register_callback(&self, callback: Arc<dyn LoginCallback>) -> Box<dyn CallbackRegistration> {
        Box::new(SimulatedRegistration { callback })
    }

    fn log_in(&self, _host: &HostContext, kind: PermissionKind, _permissions: &[String]) {
        self.log_ins.lock().push(kind);
    }

    fn log_out(&self) {
        *self.log_outs.lock() += 1;
    }
}

pub struct Platform {
    pub transport: Arc<SimulatedTransport>,
    pub login_manager: Arc<SimulatedLoginManager>,
}

impl Platform {
    pub fn new() -> Self {
        Self {
            transport: Arc::new(SimulatedTransport::default()),
            login_manager: Arc::new(SimulatedLoginManager::default()),
        }
    }

    pub fn config(&self, default_version: Option<&str>, bus: Option<EventBus>) -> BridgeConfig {
        let mut builder = BridgeConfig::builder()
            .graph_transport(self.transport.clone())
            .login_manager(self.login_manager.clone());
        if let Some(version) = default_version {
            builder = builder.default_graph_version(version);
        }
        if let Some(bus) = bus {
            builder = builder.event_bus(bus);
        }
        builder.build().unwrap()
    }
}
