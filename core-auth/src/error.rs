use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The platform reported an error for the login attempt.
    #[error("Login failed: {0}")]
    LoginFailed(#[source] BridgeError),
}

pub type Result<T> = std::result::Result<T, AuthError>;
