//! Session-related types.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use m2verse_core::{Email, UserId};

use crate::services::auth::SignedIn;

/// How long before expiry an ID token is refreshed ahead of time.
const REFRESH_LEEWAY_SECONDS: i64 = 60;

/// Session-stored user identity.
///
/// Everything a page needs to greet the user plus the platform tokens
/// required to act on their behalf. The session store is server-side,
/// so tokens never reach the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Platform uid.
    pub uid: UserId,
    /// Display name shown in the header.
    pub name: String,
    /// Account email.
    pub email: Email,
    /// Avatar URL, when the identity provider supplied one.
    pub photo_url: Option<String>,
    /// Short-lived ID token sent as a bearer credential.
    pub id_token: String,
    /// Long-lived token used to mint fresh ID tokens.
    pub refresh_token: String,
    /// Instant the ID token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl CurrentUser {
    /// Whether the ID token is within the refresh leeway of expiring.
    #[must_use]
    pub fn token_expired(&self) -> bool {
        Utc::now() + Duration::seconds(REFRESH_LEEWAY_SECONDS) >= self.expires_at
    }

    /// Fold a token refresh into the stored identity.
    pub fn apply_refresh(
        &mut self,
        id_token: String,
        refresh_token: String,
        expires_at: DateTime<Utc>,
    ) {
        self.id_token = id_token;
        self.refresh_token = refresh_token;
        self.expires_at = expires_at;
    }
}

impl From<SignedIn> for CurrentUser {
    fn from(signed_in: SignedIn) -> Self {
        Self {
            uid: signed_in.uid,
            name: signed_in.profile.name,
            email: signed_in.profile.email,
            photo_url: signed_in.profile.photo_url,
            id_token: signed_in.id_token,
            refresh_token: signed_in.refresh_token,
            expires_at: signed_in.expires_at,
        }
    }
}

/// Session keys for authentication and cart data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for storing the session's cart ID.
    pub const CART_ID: &str = "cart_id";
}
