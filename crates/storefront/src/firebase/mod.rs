//! Firebase REST API clients.
//!
//! The storefront talks to two Google endpoints over plain JSON:
//! the Identity Toolkit (email/password and federated sign-in, token
//! refresh) and Firestore (user profiles, blog documents). Every call
//! carries the project API key as a query parameter; per-user document
//! access additionally carries the caller's ID token as a bearer token.

pub mod firestore;
pub mod identity;
pub mod value;

pub use firestore::FirestoreClient;
pub use identity::IdentityClient;

use serde::Deserialize;
use thiserror::Error;

/// Errors from the Firebase REST endpoints.
#[derive(Debug, Error)]
pub enum FirebaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {code}")]
    Api { status: u16, code: String },

    /// Failed to decode a response body.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FirebaseError {
    fn from(err: reqwest::Error) -> Self {
        // The API key travels in the query string, so transport errors
        // must not carry their URL.
        Self::Http(err.without_url())
    }
}

impl FirebaseError {
    /// The machine-readable error code, if the API produced one.
    ///
    /// Identity Toolkit codes look like `EMAIL_EXISTS` or
    /// `INVALID_LOGIN_CREDENTIALS`.
    #[must_use]
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            Self::Http(_) | Self::Decode(_) => None,
        }
    }
}

/// Wire shape of a Firebase error response.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Decode a non-success response into [`FirebaseError::Api`].
pub(crate) async fn error_from_response(response: reqwest::Response) -> FirebaseError {
    let status = response.status().as_u16();
    let code = match response.json::<ApiErrorBody>().await {
        Ok(body) => code_from_message(&body.error.message).to_string(),
        Err(_) => "UNKNOWN".to_string(),
    };
    FirebaseError::Api { status, code }
}

/// Extract the machine code from an Identity Toolkit error message.
///
/// The code is packed into `error.message`, sometimes followed by a
/// human-readable detail (`WEAK_PASSWORD : Password should be ...`).
/// Only the leading token is the code.
fn code_from_message(message: &str) -> &str {
    message.split_whitespace().next().unwrap_or("UNKNOWN")
}
