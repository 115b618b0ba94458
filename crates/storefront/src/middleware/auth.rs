//! Authentication middleware and extractors.
//!
//! Provides extractors for reading the signed-in user from the session,
//! refreshing platform tokens that are about to lapse along the way.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::error::set_sentry_user;
use crate::models::session::{CurrentUser, keys};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// If nobody is signed in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Olá, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Error returned when authentication is required but nobody is signed in.
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// Unauthorized response (session layer missing).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user = resolve_user(session, state)
            .await
            .ok_or(AuthRejection::RedirectToLogin)?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireUser`, this does not reject the request if nobody is
/// signed in.
pub struct OptionalUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => resolve_user(session, state).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Load the stored identity and refresh its tokens when they are about
/// to lapse.
///
/// A rejected refresh means the platform invalidated the session (password
/// change, account disabled); the stored identity is cleared and the
/// request proceeds anonymously.
async fn resolve_user(session: &Session, state: &AppState) -> Option<CurrentUser> {
    let mut user: CurrentUser = session.get(keys::CURRENT_USER).await.ok().flatten()?;

    if !user.token_expired() {
        set_sentry_user(&user.uid, Some(user.email.as_str()));
        return Some(user);
    }

    match state.auth().refresh(&user.refresh_token).await {
        Ok(tokens) => {
            user.apply_refresh(tokens.id_token, tokens.refresh_token, tokens.expires_at);
            if let Err(err) = session.insert(keys::CURRENT_USER, &user).await {
                warn!(error = %err, "Failed to store refreshed tokens in session");
            }
            set_sentry_user(&user.uid, Some(user.email.as_str()));
            Some(user)
        }
        Err(err) => {
            debug!(uid = %user.uid, error = %err, "Refresh rejected; clearing stored identity");
            if let Err(err) = session.remove::<CurrentUser>(keys::CURRENT_USER).await {
                warn!(error = %err, "Failed to clear invalidated identity from session");
            }
            state.auth().sign_out();
            None
        }
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// Leaves the cart in place; signing out does not empty it.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(keys::CURRENT_USER).await?;
    Ok(())
}
