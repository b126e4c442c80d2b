//! # Request Builder
//!
//! Fluent accumulator of optional request settings plus the terminal
//! operations that turn them into a [`ResponseStream`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_graph::RequestBuilder;
//! use futures::StreamExt;
//!
//! let mut responses = RequestBuilder::new(executor)
//!     .graph_path("/2900")
//!     .version("2.9")
//!     .get();
//!
//! // The request is submitted on the first poll
//! let response = responses.next().await;
//! ```
//!
//! Setters take and return the builder by value, so a configured builder can
//! be cloned and diverged without the copies affecting each other. Terminal
//! operations borrow the builder; each call produces an independent stream
//! and, once polled, an independent submission.

use crate::error::Result;
use crate::executor::{RequestExecutor, ResponseStream};
use crate::shortcuts::{self, Location, PhotoSource};
use bridge_traits::{AccessToken, GraphParams, GraphRequest, HttpMethod};
use serde_json::Value;

/// Optional settings merged into every request a builder submits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    pub access_token: Option<AccessToken>,
    pub tag: Option<String>,
    pub version: Option<String>,
    pub http_method: Option<HttpMethod>,
    pub skip_client_token: bool,
    pub graph_path: Option<String>,
    pub graph_object: Option<Value>,
    pub params: Option<GraphParams>,
}

impl RequestConfig {
    /// Fill the gaps of `request` from this config.
    ///
    /// Fields already set on the request are kept. `skip_client_token` is
    /// always taken from the config.
    pub fn apply_to(&self, mut request: GraphRequest) -> GraphRequest {
        fill(&mut request.http_method, &self.http_method);
        fill(&mut request.access_token, &self.access_token);
        fill(&mut request.parameters, &self.params);
        fill(&mut request.tag, &self.tag);
        fill(&mut request.version, &self.version);
        fill(&mut request.graph_path, &self.graph_path);
        fill(&mut request.graph_object, &self.graph_object);
        request.skip_client_token = self.skip_client_token;
        request
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, default: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(default);
    }
}

/// Fluent request builder bound to an executor.
#[derive(Clone)]
pub struct RequestBuilder {
    config: RequestConfig,
    executor: RequestExecutor,
}

impl RequestBuilder {
    /// Create an empty builder.
    pub fn new(executor: RequestExecutor) -> Self {
        Self {
            config: RequestConfig::default(),
            executor,
        }
    }

    /// The settings accumulated so far.
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.config.tag = Some(tag.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = Some(version.into());
        self
    }

    /// Verb for [`request`](Self::request) and [`request_with`](Self::request_with).
    /// The named operations define their own.
    pub fn http_method(mut self, method: HttpMethod) -> Self {
        self.config.http_method = Some(method);
        self
    }

    /// Defaults to `false`.
    pub fn skip_client_token(mut self, skip: bool) -> Self {
        self.config.skip_client_token = skip;
        self
    }

    /// Endpoint route. Ignored by operations with a fixed route such as
    /// [`request_me`](Self::request_me).
    pub fn graph_path(mut self, path: impl Into<String>) -> Self {
        self.config.graph_path = Some(path.into());
        self
    }

    /// JSON body for [`post`](Self::post).
    pub fn graph_object(mut self, object: Value) -> Self {
        self.config.graph_object = Some(object);
        self
    }

    pub fn params(mut self, params: GraphParams) -> Self {
        self.config.params = Some(params);
        self
    }

    pub fn access_token(mut self, token: AccessToken) -> Self {
        self.config.access_token = Some(token);
        self
    }

    /// Fetch the current user.
    pub fn request_me(&self) -> ResponseStream {
        self.request_with(shortcuts::me_request(self.config.access_token.clone()))
    }

    /// Fetch the current user's friends.
    pub fn request_my_friends(&self) -> ResponseStream {
        self.request_with(shortcuts::my_friends_request(
            self.config.access_token.clone(),
        ))
    }

    /// Upload a photo to the configured graph path, or to the user's photos.
    ///
    /// # Errors
    ///
    /// Fails immediately, before any stream exists, when the photo source
    /// cannot be used (missing file, unsupported URI).
    pub fn request_upload_photo(
        &self,
        photo: PhotoSource,
        caption: Option<&str>,
    ) -> Result<ResponseStream> {
        let request = shortcuts::upload_photo_request(
            self.config.access_token.clone(),
            self.config.graph_path.as_deref(),
            photo,
            caption,
            self.config.params.clone(),
        )?;
        Ok(self.request_with(request))
    }

    /// Search places around `location`.
    ///
    /// `radius_limit` caps the number of results; `radius_meters` is the
    /// search radius.
    pub fn request_places_search(
        &self,
        location: Location,
        radius_limit: u32,
        radius_meters: u32,
        text: Option<&str>,
    ) -> ResponseStream {
        self.request_with(shortcuts::places_search_request(
            self.config.access_token.clone(),
            location,
            radius_meters,
            radius_limit,
            text,
        ))
    }

    /// POST the configured graph object to the configured path.
    pub fn post(&self) -> ResponseStream {
        self.request_with(shortcuts::post_request(
            self.config.access_token.clone(),
            self.config.graph_path.clone(),
            self.config.graph_object.clone(),
        ))
    }

    /// DELETE the object at the configured path.
    pub fn delete(&self) -> ResponseStream {
        self.request_with(shortcuts::delete_request(
            self.config.access_token.clone(),
            self.config.graph_path.clone(),
        ))
    }

    /// GET the configured path with the configured params.
    pub fn get(&self) -> ResponseStream {
        self.request_with(shortcuts::get_request(
            self.config.access_token.clone(),
            self.config.graph_path.clone(),
            self.config.params.clone(),
        ))
    }

    /// Submit a request built entirely from the configured settings.
    pub fn request(&self) -> ResponseStream {
        self.request_with(GraphRequest::default())
    }

    /// Submit `request`, filling its unset fields from the configured settings.
    pub fn request_with(&self, request: GraphRequest) -> ResponseStream {
        self.executor.submit(request, self.config.clone())
    }
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
