//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the request and login bridges:
//! - Configuration with fail-fast capability checks
//! - Event bus for request and login lifecycle events
//! - Logging and tracing setup
//!
//! ## Overview
//!
//! Nothing in here performs I/O on its own. `core-graph` and `core-auth`
//! take a [`BridgeConfig`](config::BridgeConfig) (or pieces of it) and emit
//! onto the optional [`EventBus`](events::EventBus).

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{BridgeConfig, BridgeConfigBuilder};
pub use error::{Error, Result};
pub use events::{BridgeEvent, EventBus, LoginEvent, RequestEvent};
