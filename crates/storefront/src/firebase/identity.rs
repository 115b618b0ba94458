//! Identity Toolkit REST client.
//!
//! Covers the four account operations the storefront needs: sign-up and
//! sign-in with email/password, federated sign-in with a Google ID
//! token, and refresh-token exchange against the Secure Token endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use m2verse_core::{Email, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::FirebaseConfig;
use crate::services::auth::{FederatedIdentity, IdentityProvider, IdentityTokens};

use super::{FirebaseError, error_from_response};

/// Client for the Identity Toolkit REST API.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    base_url: String,
    token_url: String,
    api_key: SecretString,
    request_uri: String,
}

impl IdentityClient {
    /// Create a new Identity Toolkit client.
    ///
    /// `request_uri` is the public URL federated sign-in reports as the
    /// OAuth redirect target (the storefront's own base URL).
    #[must_use]
    pub fn new(config: &FirebaseConfig, request_uri: &str) -> Self {
        Self {
            inner: Arc::new(IdentityClientInner {
                client: reqwest::Client::new(),
                base_url: config.identity_url.trim_end_matches('/').to_string(),
                token_url: config.token_url.trim_end_matches('/').to_string(),
                api_key: config.api_key.clone(),
                request_uri: request_uri.to_string(),
            }),
        }
    }

    fn account_endpoint(&self, method: &str) -> String {
        format!(
            "{}/v1/accounts:{method}?key={}",
            self.inner.base_url,
            self.inner.api_key.expose_secret()
        )
    }

    async fn post_for_tokens<B: Serialize + Sync>(
        &self,
        url: String,
        body: &B,
    ) -> Result<TokenResponse, FirebaseError> {
        let response = self.inner.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| FirebaseError::Decode(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    #[instrument(skip(self, email, password))]
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<IdentityTokens, FirebaseError> {
        let body = PasswordCredentials {
            email: email.as_str(),
            password,
            return_secure_token: true,
        };
        let response = self
            .post_for_tokens(self.account_endpoint("signUp"), &body)
            .await?;
        tokens_from(response)
    }

    #[instrument(skip(self, email, password))]
    async fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<IdentityTokens, FirebaseError> {
        let body = PasswordCredentials {
            email: email.as_str(),
            password,
            return_secure_token: true,
        };
        let response = self
            .post_for_tokens(self.account_endpoint("signInWithPassword"), &body)
            .await?;
        tokens_from(response)
    }

    #[instrument(skip(self, credential))]
    async fn sign_in_federated(
        &self,
        credential: &str,
    ) -> Result<FederatedIdentity, FirebaseError> {
        let body = IdpCredentials {
            post_body: format!("id_token={credential}&providerId=google.com"),
            request_uri: &self.inner.request_uri,
            return_secure_token: true,
            return_idp_credential: true,
        };
        let mut response = self
            .post_for_tokens(self.account_endpoint("signInWithIdp"), &body)
            .await?;

        let display_name = response.display_name.take();
        let photo_url = response.photo_url.take();

        Ok(FederatedIdentity {
            tokens: tokens_from(response)?,
            display_name,
            photo_url,
        })
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<IdentityTokens, FirebaseError> {
        let url = format!(
            "{}/v1/token?key={}",
            self.inner.token_url,
            self.inner.api_key.expose_secret()
        );
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self.inner.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| FirebaseError::Decode(e.to_string()))?;

        Ok(IdentityTokens {
            uid: UserId::from(refreshed.user_id),
            email: None,
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: expiry_from_now(&refreshed.expires_in)?,
        })
    }
}

/// Request body for `signUp` and `signInWithPassword`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

/// Request body for `signInWithIdp`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpCredentials<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

/// Account response shared by the three account endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    id_token: String,
    refresh_token: String,
    /// Lifetime in seconds, as a decimal string.
    expires_in: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

/// Response from the Secure Token endpoint (snake_case keys).
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    user_id: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

fn tokens_from(response: TokenResponse) -> Result<IdentityTokens, FirebaseError> {
    Ok(IdentityTokens {
        uid: UserId::from(response.local_id),
        email: response.email.and_then(|e| Email::parse(&e).ok()),
        id_token: response.id_token,
        refresh_token: response.refresh_token,
        expires_at: expiry_from_now(&response.expires_in)?,
    })
}

fn expiry_from_now(expires_in: &str) -> Result<DateTime<Utc>, FirebaseError> {
    let seconds: i64 = expires_in
        .parse()
        .map_err(|_| FirebaseError::Decode(format!("invalid expiresIn: {expires_in}")))?;
    Ok(Utc::now() + Duration::seconds(seconds))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_request_wire_shape() {
        let body = PasswordCredentials {
            email: "alex@m2verse.com.br",
            password: "figuras123",
            return_secure_token: true,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "email": "alex@m2verse.com.br",
                "password": "figuras123",
                "returnSecureToken": true
            })
        );
    }

    #[test]
    fn test_idp_request_wire_shape() {
        let body = IdpCredentials {
            post_body: "id_token=abc123&providerId=google.com".to_string(),
            request_uri: "https://m2verse.com.br",
            return_secure_token: true,
            return_idp_credential: true,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "postBody": "id_token=abc123&providerId=google.com",
                "requestUri": "https://m2verse.com.br",
                "returnSecureToken": true,
                "returnIdpCredential": true
            })
        );
    }

    #[test]
    fn test_token_response_decodes() {
        let response: TokenResponse = serde_json::from_str(
            r#"{
                "kind": "identitytoolkit#SignupNewUserResponse",
                "localId": "x7GqPz2mK3hF6gB0",
                "idToken": "eyJhbGciOi.header.sig",
                "refreshToken": "AMf-vBxT",
                "expiresIn": "3600",
                "email": "alex@m2verse.com.br"
            }"#,
        )
        .unwrap();

        let tokens = tokens_from(response).unwrap();
        assert_eq!(tokens.uid.as_str(), "x7GqPz2mK3hF6gB0");
        assert_eq!(
            tokens.email.map(|e| e.as_str().to_string()),
            Some("alex@m2verse.com.br".to_string())
        );
        assert!(tokens.expires_at > Utc::now());
    }

    #[test]
    fn test_federated_response_keeps_display_fields() {
        let response: TokenResponse = serde_json::from_str(
            r#"{
                "localId": "fed123",
                "idToken": "tok",
                "refreshToken": "ref",
                "expiresIn": "3600",
                "email": "sarah@gmail.com",
                "displayName": "Sarah Mitchell",
                "photoUrl": "https://lh3.googleusercontent.com/a/photo"
            }"#,
        )
        .unwrap();

        assert_eq!(response.display_name.as_deref(), Some("Sarah Mitchell"));
        assert!(response.photo_url.is_some());
    }

    #[test]
    fn test_refresh_response_uses_snake_case() {
        let refreshed: RefreshResponse = serde_json::from_str(
            r#"{
                "access_token": "tok",
                "expires_in": "3600",
                "token_type": "Bearer",
                "refresh_token": "new-ref",
                "id_token": "new-id",
                "user_id": "x7GqPz2mK3hF6gB0",
                "project_id": "123456"
            }"#,
        )
        .unwrap();

        assert_eq!(refreshed.user_id, "x7GqPz2mK3hF6gB0");
        assert_eq!(refreshed.refresh_token, "new-ref");
    }

    #[test]
    fn test_bad_expiry_is_a_decode_error() {
        let result = expiry_from_now("soon");
        assert!(matches!(result, Err(FirebaseError::Decode(_))));
    }
}
