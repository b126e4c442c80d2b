//! Pre-filled request descriptions for common graph operations.
//!
//! Each constructor sets only the fields the operation defines. Anything left
//! unset can still be filled in from a [`RequestConfig`](crate::RequestConfig)
//! when the request is submitted.

use crate::error::{GraphError, Result};
use bridge_traits::{AccessToken, GraphParams, GraphRequest, HttpMethod, ParamValue};
use bytes::Bytes;
use serde_json::Value;
use std::path::PathBuf;
use url::Url;

pub const ME_PATH: &str = "me";
pub const MY_FRIENDS_PATH: &str = "me/friends";
pub const MY_PHOTOS_PATH: &str = "me/photos";
pub const SEARCH_PATH: &str = "search";

const PICTURE_PARAM: &str = "picture";
const CAPTION_PARAM: &str = "caption";

/// A geographic point for places search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn center(&self) -> String {
        format!("{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// The three accepted representations of a photo to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSource {
    /// Encoded image bytes
    Image(Bytes),
    /// A local image file
    File(PathBuf),
    /// A `file://` or `content://` URI
    Uri(Url),
}

impl PhotoSource {
    /// Resolve the source into the `picture` parameter value.
    ///
    /// Files must exist; URIs must use the `file` or `content` scheme.
    fn into_param(self) -> Result<ParamValue> {
        match self {
            PhotoSource::Image(bytes) => Ok(ParamValue::Bytes(bytes)),
            PhotoSource::File(path) => existing_file(path).map(ParamValue::File),
            PhotoSource::Uri(uri) => match uri.scheme() {
                "file" => {
                    let path = uri
                        .to_file_path()
                        .map_err(|_| GraphError::InvalidPhotoUri(uri.to_string()))?;
                    existing_file(path).map(ParamValue::File)
                }
                "content" => Ok(ParamValue::Uri(uri)),
                _ => Err(GraphError::InvalidPhotoUri(uri.to_string())),
            },
        }
    }
}

fn existing_file(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(GraphError::PhotoNotFound(path))
    }
}

fn base_request(token: Option<AccessToken>, path: &str, method: HttpMethod) -> GraphRequest {
    GraphRequest {
        access_token: token,
        graph_path: Some(path.to_string()),
        http_method: Some(method),
        ..GraphRequest::default()
    }
}

/// GET the current user.
pub fn me_request(token: Option<AccessToken>) -> GraphRequest {
    base_request(token, ME_PATH, HttpMethod::Get)
}

/// GET the current user's friends.
pub fn my_friends_request(token: Option<AccessToken>) -> GraphRequest {
    base_request(token, MY_FRIENDS_PATH, HttpMethod::Get)
}

/// POST a photo to `graph_path`, or to the user's photos when unset.
///
/// # Errors
///
/// - `GraphError::PhotoNotFound` if a file source does not exist
/// - `GraphError::InvalidPhotoUri` for URIs that are neither `file` nor `content`
pub fn upload_photo_request(
    token: Option<AccessToken>,
    graph_path: Option<&str>,
    photo: PhotoSource,
    caption: Option<&str>,
    params: Option<GraphParams>,
) -> Result<GraphRequest> {
    let mut parameters = params.unwrap_or_default();
    parameters.insert(PICTURE_PARAM.to_string(), photo.into_param()?);
    if let Some(caption) = caption {
        parameters.insert(CAPTION_PARAM.to_string(), ParamValue::from(caption));
    }

    let mut request = base_request(
        token,
        graph_path.unwrap_or(MY_PHOTOS_PATH),
        HttpMethod::Post,
    );
    request.parameters = Some(parameters);
    Ok(request)
}

/// GET places near `location`.
pub fn places_search_request(
    token: Option<AccessToken>,
    location: Location,
    radius_meters: u32,
    results_limit: u32,
    text: Option<&str>,
) -> GraphRequest {
    let mut parameters = GraphParams::new();
    parameters.insert("type".to_string(), ParamValue::from("place"));
    parameters.insert("limit".to_string(), ParamValue::from(results_limit.to_string()));
    parameters.insert("center".to_string(), ParamValue::from(location.center()));
    parameters.insert(
        "distance".to_string(),
        ParamValue::from(radius_meters.to_string()),
    );
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        parameters.insert("q".to_string(), ParamValue::from(text));
    }

    let mut request = base_request(token, SEARCH_PATH, HttpMethod::Get);
    request.parameters = Some(parameters);
    request
}

/// POST `object` to `path`.
pub fn post_request(
    token: Option<AccessToken>,
    path: Option<String>,
    object: Option<Value>,
) -> GraphRequest {
    GraphRequest {
        access_token: token,
        graph_path: path,
        http_method: Some(HttpMethod::Post),
        graph_object: object,
        ..GraphRequest::default()
    }
}

/// DELETE the object at `path`.
pub fn delete_request(token: Option<AccessToken>, path: Option<String>) -> GraphRequest {
    GraphRequest {
        access_token: token,
        graph_path: path,
        http_method: Some(HttpMethod::Delete),
        ..GraphRequest::default()
    }
}

/// GET `path` with `params`.
pub fn get_request(
    token: Option<AccessToken>,
    path: Option<String>,
    params: Option<GraphParams>,
) -> GraphRequest {
    GraphRequest {
        access_token: token,
        graph_path: path,
        http_method: Some(HttpMethod::Get),
        parameters: params,
        ..GraphRequest::default()
    }
}
