//! # Authentication Module
//!
//! Bridges the platform's callback-driven interactive login into streams.
//!
//! ## Overview
//!
//! The login UI belongs to the host lifecycle: the outcome comes back through
//! an activity result the host must forward. [`LoginBridge`] keeps the single
//! pending attempt in a process-wide slot so the forwarded result can find it.
//!
//! ## Features
//!
//! - Read and publish logins exposed as [`LoginStream`]s
//! - Last-writer-wins slot: a new login shuts the previous one down
//! - Side-effect-free state queries
//! - Login events on the runtime event bus

pub mod bridge;
pub mod error;
pub mod session;
pub mod types;

pub use bridge::{LoginBridge, LoginStream, LogoutStream};
pub use error::{AuthError, Result};
pub use session::LoginSession;
pub use types::{SessionId, SessionState};
