//! # Bridge Configuration Module
//!
//! ## Overview
//!
//! A builder assembles a [`BridgeConfig`] holding the platform collaborators
//! and the few settings the bridge has. `build()` fails fast with an actionable
//! error when a required collaborator is missing, so a misconfigured host
//! finds out at startup instead of on the first request.
//!
//! ## Required Dependencies
//!
//! - `GraphTransport` - executes graph requests
//! - `LoginManager` - drives the interactive login UI
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::BridgeConfig;
//! use std::sync::Arc;
//!
//! let config = BridgeConfig::builder()
//!     .graph_transport(Arc::new(SdkTransport::new()))
//!     .login_manager(Arc::new(SdkLoginManager::new()))
//!     .default_graph_version("v2.9")
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::BridgeConfig;
//!
//! // Panics: no transport or login manager was provided
//! let config = BridgeConfig::builder()
//!     .build()
//!     .expect("Should fail - missing required bridges");
//! ```

use crate::error::{Error, Result};
use crate::events::EventBus;
use bridge_traits::{GraphTransport, LoginManager};
use std::sync::Arc;

/// Configuration for the graph bridge.
///
/// Use [`BridgeConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct BridgeConfig {
    /// Transport used by every request stream
    pub graph_transport: Arc<dyn GraphTransport>,

    /// Platform login manager
    pub login_manager: Arc<dyn LoginManager>,

    /// Graph API version pre-set on every new request builder
    pub default_graph_version: Option<String>,

    /// Event bus for request and login events (optional)
    pub event_bus: Option<EventBus>,
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("graph_transport", &"GraphTransport { ... }")
            .field("login_manager", &"LoginManager { ... }")
            .field("default_graph_version", &self.default_graph_version)
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

impl BridgeConfig {
    /// Creates a new builder for constructing a `BridgeConfig`.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if let Some(version) = &self.default_graph_version {
            validate_graph_version(version)?;
        }
        Ok(())
    }
}

/// Checks that `version` looks like `2.9` or `v2.9`.
pub fn validate_graph_version(version: &str) -> Result<()> {
    let digits = version.strip_prefix('v').unwrap_or(version);
    let valid = match digits.split_once('.') {
        Some((major, minor)) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid graph version '{}': expected '<major>.<minor>' with an optional 'v' prefix",
            version
        )))
    }
}

fn graph_transport_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "GraphTransport".to_string(),
        message: "GraphTransport implementation is required to execute requests. \
                 Inject the platform SDK adapter with .graph_transport()."
            .to_string(),
    }
}

fn login_manager_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "LoginManager".to_string(),
        message: "LoginManager implementation is required for interactive login. \
                 Inject the platform SDK adapter with .login_manager()."
            .to_string(),
    }
}

/// Builder for constructing [`BridgeConfig`] instances.
#[derive(Default)]
pub struct BridgeConfigBuilder {
    graph_transport: Option<Arc<dyn GraphTransport>>,
    login_manager: Option<Arc<dyn LoginManager>>,
    default_graph_version: Option<String>,
    event_bus: Option<EventBus>,
}

impl BridgeConfigBuilder {
    /// Sets the graph transport (required).
    pub fn graph_transport(mut self, transport: Arc<dyn GraphTransport>) -> Self {
        self.graph_transport = Some(transport);
        self
    }

    /// Sets the platform login manager (required).
    pub fn login_manager(mut self, manager: Arc<dyn LoginManager>) -> Self {
        self.login_manager = Some(manager);
        self
    }

    /// Sets the graph API version new request builders start with.
    pub fn default_graph_version(mut self, version: impl Into<String>) -> Self {
        self.default_graph_version = Some(version.into());
        self
    }

    /// Sets the event bus for lifecycle events.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// - `Error::CapabilityMissing` if the transport or login manager is missing
    /// - `Error::Config` if the default graph version is malformed
    pub fn build(self) -> Result<BridgeConfig> {
        let graph_transport = self
            .graph_transport
            .ok_or_else(graph_transport_missing_error)?;
        let login_manager = self.login_manager.ok_or_else(login_manager_missing_error)?;

        let config = BridgeConfig {
            graph_transport,
            login_manager,
            default_graph_version: self.default_graph_version,
            event_bus: self.event_bus,
        };

        config.validate()?;

        Ok(config)
    }
}
