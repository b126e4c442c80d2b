//! # Core Graph Module
//!
//! Fluent graph request builder and the executor that turns one transport
//! callback into a single-item stream.
//!
//! ## Overview
//!
//! - [`RequestBuilder`] accumulates optional settings ([`RequestConfig`]) and
//!   exposes the terminal operations (`get`, `post`, `delete`, `request`, and
//!   the named shortcuts).
//! - [`shortcuts`] builds pre-filled [`GraphRequest`](bridge_traits::GraphRequest)
//!   values for common operations.
//! - [`RequestExecutor`] merges settings into a request and submits it when
//!   the returned [`ResponseStream`] is first polled.
//!
//! A request-level error reported by the remote API is delivered as an `Ok`
//! response carrying the error. Only failures that leave no response at all
//! surface as [`GraphError`].

pub mod builder;
pub mod error;
pub mod executor;
pub mod shortcuts;

pub use builder::{RequestBuilder, RequestConfig};
pub use error::{GraphError, Result};
pub use executor::{RequestExecutor, ResponseStream};
pub use shortcuts::{Location, PhotoSource};
