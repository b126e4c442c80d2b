//! Graph Transport Abstraction
//!
//! Describes graph API requests as plain data and defines the transport
//! contract the platform SDK must fulfil. The transport owns the wire format,
//! token refresh and timeouts; the core only builds [`GraphRequest`] values
//! and consumes the single [`GraphResponse`] delivered through the callback.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use url::Url;

use crate::error::{BridgeError, Result};

/// HTTP verbs understood by the graph API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential attached to a graph request.
///
/// The `Debug` output never contains the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Opaque bearer token
    pub token: String,
    /// Application the token was issued for
    pub application_id: String,
    /// User the token belongs to
    pub user_id: String,
    /// Granted permissions
    pub permissions: Vec<String>,
    /// Permissions the user declined
    pub declined_permissions: Vec<String>,
    /// Expiry, if the platform reported one
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(
        token: impl Into<String>,
        application_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            application_id: application_id.into(),
            user_id: user_id.into(),
            permissions: Vec::new(),
            declined_permissions: Vec::new(),
            expires_at: None,
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the token has an expiry that lies in the past.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("application_id", &self.application_id)
            .field("user_id", &self.user_id)
            .field("permissions", &self.permissions)
            .field("declined_permissions", &self.declined_permissions)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// A single request parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    /// Raw bytes, e.g. an encoded image attachment
    Bytes(Bytes),
    /// A local file the transport streams as an attachment
    File(PathBuf),
    /// A platform content URI the transport resolves itself
    Uri(Url),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// Extra request parameters, ordered by key.
pub type GraphParams = BTreeMap<String, ParamValue>;

/// A graph API request described as plain data.
///
/// Every field is optional; the transport applies its own defaults for
/// whatever is left unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphRequest {
    pub access_token: Option<AccessToken>,
    pub graph_path: Option<String>,
    pub http_method: Option<HttpMethod>,
    pub version: Option<String>,
    pub tag: Option<String>,
    pub graph_object: Option<Value>,
    pub parameters: Option<GraphParams>,
    pub skip_client_token: bool,
}

impl GraphRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn access_token(mut self, token: AccessToken) -> Self {
        self.access_token = Some(token);
        self
    }

    pub fn graph_path(mut self, path: impl Into<String>) -> Self {
        self.graph_path = Some(path.into());
        self
    }

    pub fn http_method(mut self, method: HttpMethod) -> Self {
        self.http_method = Some(method);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn graph_object(mut self, object: Value) -> Self {
        self.graph_object = Some(object);
        self
    }

    pub fn parameters(mut self, params: GraphParams) -> Self {
        self.parameters = Some(params);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters
            .get_or_insert_with(GraphParams::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Domain error reported by the remote API inside an otherwise delivered
/// response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRequestError {
    pub status: u16,
    pub code: i32,
    pub error_type: Option<String>,
    pub message: String,
}

/// Response delivered by the transport for exactly one request.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphResponse {
    /// The request this response answers
    pub request: GraphRequest,
    /// Raw response text as received
    pub raw_response: Option<String>,
    /// Parsed JSON body
    pub body: Option<Value>,
    /// Request-level error, if the remote call failed
    pub error: Option<GraphRequestError>,
}

impl GraphResponse {
    pub fn success(request: GraphRequest, raw_response: impl Into<String>) -> Self {
        let raw_response = raw_response.into();
        let body = serde_json::from_str(&raw_response).ok();
        Self {
            request,
            raw_response: Some(raw_response),
            body,
            error: None,
        }
    }

    pub fn failure(request: GraphRequest, error: GraphRequestError) -> Self {
        Self {
            request,
            raw_response: None,
            body: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Deserialize the JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let body = self.body.clone().ok_or_else(|| {
            BridgeError::OperationFailed("Response has no JSON body".to_string())
        })?;
        serde_json::from_value(body).map_err(|e| {
            BridgeError::OperationFailed(format!("JSON deserialization failed: {}", e))
        })
    }
}

/// Completion callback handed to the transport.
///
/// Being `FnOnce`, it can be invoked at most once.
pub type GraphCallback = Box<dyn FnOnce(GraphResponse) + Send + 'static>;

/// Graph transport trait
///
/// Implemented by the platform SDK adapter. Implementations should:
/// - inject client tokens unless `skip_client_token` is set
/// - refresh expired credentials
/// - enforce their own timeouts
///
/// # Contract
///
/// `execute_and_wait` performs at most one network attempt and invokes
/// `callback` exactly once, before returning, with the response (including
/// responses that carry a [`GraphRequestError`]). `Err` is reserved for
/// failures that prevent a response from being formed at all.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::graph::{GraphCallback, GraphRequest, GraphResponse, GraphTransport};
/// use bridge_traits::error::Result;
/// use async_trait::async_trait;
///
/// struct SdkTransport;
///
/// #[async_trait]
/// impl GraphTransport for SdkTransport {
///     async fn execute_and_wait(
///         &self,
///         request: GraphRequest,
///         callback: GraphCallback,
///     ) -> Result<()> {
///         let raw = sdk_execute(&request).await?;
///         callback(GraphResponse::success(request, raw));
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait GraphTransport: Send + Sync {
    /// Execute `request` and deliver its response through `callback`.
    ///
    /// # Errors
    ///
    /// Returns error if the request could not be submitted at all.
    async fn execute_and_wait(&self, request: GraphRequest, callback: GraphCallback)
        -> Result<()>;
}
