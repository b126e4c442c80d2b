use bridge_traits::BridgeError;
use std::path::PathBuf;
use thiserror::Error;

/// Stream-level failures of a graph request.
///
/// A request-level error reported by the remote API is not a `GraphError`;
/// it arrives inside the delivered `GraphResponse`.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Transport error: {0}")]
    Transport(#[from] BridgeError),

    #[error("Transport finished without delivering a response")]
    NoResponse,

    #[error("Photo file not found: {}", .0.display())]
    PhotoNotFound(PathBuf),

    #[error("Unsupported photo URI '{0}': only file and content URIs can be uploaded")]
    InvalidPhotoUri(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
