//! # Host Bridge Traits
//!
//! Contracts the platform SDK adapter must implement for the core.
//!
//! ## Overview
//!
//! The core never talks to the network or to the login UI itself. It builds
//! request descriptions, hands them to a [`GraphTransport`](graph::GraphTransport),
//! and drives the interactive login through a [`LoginManager`](login::LoginManager).
//! Everything behind these traits (wire format, token refresh, UI) belongs to
//! the host.
//!
//! ## Traits
//!
//! ### Requests
//! - [`GraphTransport`](graph::GraphTransport) - Execute one request, deliver one response
//!
//! ### Login
//! - [`LoginManager`](login::LoginManager) - Open the login UI, register callbacks, log out
//! - [`LoginCallback`](login::LoginCallback) - Receives success / cancel / error
//! - [`CallbackRegistration`](login::CallbackRegistration) - Forwards activity results
//!
//! ### Utilities
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform exceptions into it with an actionable message.
//!
//! ## Thread Safety
//!
//! Bridge traits require `Send + Sync` so adapters can be shared behind `Arc`
//! across tasks. [`CallbackRegistration`](login::CallbackRegistration) is only
//! `Send`: it is owned by exactly one login session.

pub mod error;
pub mod graph;
pub mod log;
pub mod login;

pub use error::BridgeError;

// Re-export commonly used types
pub use graph::{
    AccessToken, GraphCallback, GraphParams, GraphRequest, GraphRequestError, GraphResponse,
    GraphTransport, HttpMethod, ParamValue,
};
pub use log::{LogEntry, LogLevel, LoggerSink};
pub use login::{
    CallbackRegistration, HostContext, LoginCallback, LoginManager, LoginResult, PermissionKind,
    ResultPayload,
};
