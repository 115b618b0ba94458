//! Authentication gate.
//!
//! Mediates between HTTP handlers and the external identity platform:
//! password sign-in, registration, federated (Google) sign-in, token
//! refresh, and sign-out. Successful transitions are published as
//! [`IdentityEvent`]s consumed by the process-wide [`IdentityObserver`].

mod error;
mod observer;

pub use error::AuthError;
pub use observer::{IdentityEvent, IdentityObserver, IdentityState};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use m2verse_core::{Email, UserId};

use crate::firebase::FirebaseError;

/// Minimum password length, checked locally before any platform call.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Display name used when a federated identity carries none.
const DEFAULT_DISPLAY_NAME: &str = "Usuário";

/// Capacity of the identity-change event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

// =========================================================================
// Platform seams
// =========================================================================

/// Identity platform operations the gate depends on.
///
/// Implemented by the Identity Toolkit REST client; tests substitute
/// in-memory fakes.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a new email/password account and mint tokens for it.
    ///
    /// # Errors
    ///
    /// Returns the raw platform error; the gate maps its code.
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<IdentityTokens, FirebaseError>;

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the raw platform error; the gate maps its code.
    async fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<IdentityTokens, FirebaseError>;

    /// Exchange a federated provider credential for platform tokens.
    ///
    /// # Errors
    ///
    /// Returns the raw platform error; the gate maps its code.
    async fn sign_in_federated(&self, credential: &str)
        -> Result<FederatedIdentity, FirebaseError>;

    /// Exchange a refresh token for fresh tokens.
    ///
    /// # Errors
    ///
    /// Returns the raw platform error; a rejection means the session was
    /// invalidated externally.
    async fn refresh(&self, refresh_token: &str) -> Result<IdentityTokens, FirebaseError>;
}

/// Profile document operations the gate depends on.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile document for a user, if one exists.
    ///
    /// # Errors
    ///
    /// Returns the platform error on transport or decode failure.
    async fn get_profile(
        &self,
        uid: &UserId,
        id_token: &str,
    ) -> Result<Option<UserProfile>, FirebaseError>;

    /// Create or replace the profile document for a user.
    ///
    /// # Errors
    ///
    /// Returns the platform error on transport failure or rejection.
    async fn put_profile(
        &self,
        uid: &UserId,
        id_token: &str,
        profile: &UserProfile,
    ) -> Result<(), FirebaseError>;
}

// =========================================================================
// Identity data
// =========================================================================

/// Tokens minted by the platform for one signed-in user.
#[derive(Debug, Clone)]
pub struct IdentityTokens {
    /// Platform uid.
    pub uid: UserId,
    /// Account email, when the platform reports one.
    pub email: Option<Email>,
    /// Short-lived ID token sent as a bearer credential.
    pub id_token: String,
    /// Long-lived token used to mint fresh ID tokens.
    pub refresh_token: String,
    /// Instant the ID token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Result of a federated sign-in: tokens plus provider display data.
#[derive(Debug, Clone)]
pub struct FederatedIdentity {
    /// Platform tokens for the signed-in user.
    pub tokens: IdentityTokens,
    /// Display name reported by the provider.
    pub display_name: Option<String>,
    /// Avatar URL reported by the provider.
    pub photo_url: Option<String>,
}

/// Profile document stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: Email,
    /// Avatar URL.
    pub photo_url: Option<String>,
    /// Document creation time.
    pub created_at: Option<DateTime<Utc>>,
}

/// A completed sign-in: identity tokens plus the resolved profile.
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// Platform uid.
    pub uid: UserId,
    /// Resolved profile (stored document or a derived fallback).
    pub profile: UserProfile,
    /// Short-lived ID token.
    pub id_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// ID token expiry.
    pub expires_at: DateTime<Utc>,
}

// =========================================================================
// Gate
// =========================================================================

/// Authentication gate over the identity platform.
///
/// Cheap to clone; all clones share the platform clients and the event
/// channel.
#[derive(Clone)]
pub struct AuthGate {
    inner: Arc<AuthGateInner>,
}

struct AuthGateInner {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    events: broadcast::Sender<IdentityEvent>,
}

impl AuthGate {
    /// Create a gate over the given platform clients.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(AuthGateInner {
                identity,
                profiles,
                events,
            }),
        }
    }

    // =========================================================================
    // Password authentication
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// A missing or unreadable profile document does not fail the sign-in;
    /// display data falls back to the email's local part.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed email,
    /// `AuthError::InvalidCredentials` or `AuthError::UserNotFound` when the
    /// platform rejects the credentials, and `AuthError::Platform` otherwise.
    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let email = Email::parse(email)?;
        let tokens = self.inner.identity.sign_in(&email, password).await?;
        let profile = self.load_profile(&tokens, &email).await;
        Ok(self.admit(tokens, profile))
    }

    /// Register a new account and seed its profile document.
    ///
    /// Password confirmation and minimum length are checked locally before
    /// any platform call. If the account is created but the profile write
    /// fails, the user stays signed in without a stored profile; the
    /// document is seeded again on a later federated login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch`, `AuthError::PasswordTooShort`,
    /// or `AuthError::InvalidEmail` from the local checks;
    /// `AuthError::EmailInUse` when the platform rejects a duplicate; and
    /// `AuthError::Platform` otherwise.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<SignedIn, AuthError> {
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::PasswordTooShort);
        }
        let email = Email::parse(email)?;

        let tokens = self.inner.identity.sign_up(&email, password).await?;
        let profile = UserProfile {
            name: name.to_owned(),
            email,
            photo_url: None,
            created_at: Some(Utc::now()),
        };
        if let Err(err) = self
            .inner
            .profiles
            .put_profile(&tokens.uid, &tokens.id_token, &profile)
            .await
        {
            warn!(uid = %tokens.uid, error = %err, "Profile write failed after sign-up");
        }
        Ok(self.admit(tokens, profile))
    }

    // =========================================================================
    // Federated authentication
    // =========================================================================

    /// Sign in with a Google ID token.
    ///
    /// The first sign-in through the provider seeds the profile document
    /// from the provider's display data; an existing document is never
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Platform` when the platform rejects the
    /// credential or the federated identity carries no email.
    pub async fn login_with_google(&self, credential: &str) -> Result<SignedIn, AuthError> {
        let FederatedIdentity {
            tokens,
            display_name,
            photo_url,
        } = self.inner.identity.sign_in_federated(credential).await?;
        let provider_profile = federated_profile(&tokens, display_name, photo_url)?;

        let profile = match self
            .inner
            .profiles
            .get_profile(&tokens.uid, &tokens.id_token)
            .await
        {
            Ok(Some(existing)) => existing,
            Ok(None) => {
                debug!(uid = %tokens.uid, "First federated sign-in; seeding profile document");
                if let Err(err) = self
                    .inner
                    .profiles
                    .put_profile(&tokens.uid, &tokens.id_token, &provider_profile)
                    .await
                {
                    warn!(uid = %tokens.uid, error = %err, "Profile write failed during federated login");
                }
                provider_profile
            }
            Err(err) => {
                warn!(uid = %tokens.uid, error = %err, "Profile fetch failed during federated login");
                provider_profile
            }
        };

        Ok(self.admit(tokens, profile))
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Exchange a refresh token for fresh platform tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Platform` when the platform rejects the token;
    /// callers treat that as external session invalidation and clear the
    /// stored identity.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IdentityTokens, AuthError> {
        Ok(self.inner.identity.refresh(refresh_token).await?)
    }

    /// Mark the identity as signed out.
    ///
    /// The platform keeps no server-side session; callers clear their own
    /// session state and this publishes the change to the observer.
    pub fn sign_out(&self) {
        self.publish(IdentityEvent::SignedOut);
    }

    /// Subscribe to identity-change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<IdentityEvent> {
        self.inner.events.subscribe()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Resolve the profile for a password sign-in.
    async fn load_profile(&self, tokens: &IdentityTokens, email: &Email) -> UserProfile {
        match self
            .inner
            .profiles
            .get_profile(&tokens.uid, &tokens.id_token)
            .await
        {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                debug!(uid = %tokens.uid, "No profile document; deriving display data from the email");
                fallback_profile(email)
            }
            Err(err) => {
                warn!(uid = %tokens.uid, error = %err, "Profile fetch failed; deriving display data from the email");
                fallback_profile(email)
            }
        }
    }

    /// Build the signed-in identity and publish the transition.
    fn admit(&self, tokens: IdentityTokens, profile: UserProfile) -> SignedIn {
        let signed_in = SignedIn {
            uid: tokens.uid,
            profile,
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
            expires_at: tokens.expires_at,
        };
        self.publish(IdentityEvent::SignedIn {
            uid: signed_in.uid.clone(),
        });
        signed_in
    }

    fn publish(&self, event: IdentityEvent) {
        // A send error only means no observer is registered.
        let _ = self.inner.events.send(event);
    }
}

/// Minimal profile for a signed-in user with no readable profile document.
fn fallback_profile(email: &Email) -> UserProfile {
    UserProfile {
        name: email.local_part().to_owned(),
        email: email.clone(),
        photo_url: None,
        created_at: None,
    }
}

/// Profile document seeded on the first federated sign-in.
fn federated_profile(
    tokens: &IdentityTokens,
    display_name: Option<String>,
    photo_url: Option<String>,
) -> Result<UserProfile, AuthError> {
    let email = tokens.email.clone().ok_or_else(|| {
        AuthError::Platform(FirebaseError::Decode(
            "federated identity carried no email".to_string(),
        ))
    })?;
    Ok(UserProfile {
        name: display_name.unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_owned()),
        email,
        photo_url,
        created_at: Some(Utc::now()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    fn tokens(uid: &str, email: Option<Email>) -> IdentityTokens {
        IdentityTokens {
            uid: UserId::from(uid),
            email,
            id_token: "id-token".to_owned(),
            refresh_token: "refresh-token".to_owned(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        }
    }

    fn api_failure(code: &str) -> FirebaseError {
        FirebaseError::Api {
            status: 400,
            code: code.to_owned(),
        }
    }

    struct FakeIdentity {
        fail_code: Option<&'static str>,
        federated_email: Option<&'static str>,
        federated_name: Option<&'static str>,
        federated_photo: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FakeIdentity {
        fn ok() -> Self {
            Self {
                fail_code: None,
                federated_email: Some("maria@example.com"),
                federated_name: None,
                federated_photo: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(code: &'static str) -> Self {
            Self {
                fail_code: Some(code),
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        async fn sign_up(
            &self,
            email: &Email,
            _password: &str,
        ) -> Result<IdentityTokens, FirebaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_code {
                Some(code) => Err(api_failure(code)),
                None => Ok(tokens("uid-1", Some(email.clone()))),
            }
        }

        async fn sign_in(
            &self,
            email: &Email,
            _password: &str,
        ) -> Result<IdentityTokens, FirebaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_code {
                Some(code) => Err(api_failure(code)),
                None => Ok(tokens("uid-1", Some(email.clone()))),
            }
        }

        async fn sign_in_federated(
            &self,
            _credential: &str,
        ) -> Result<FederatedIdentity, FirebaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(code) = self.fail_code {
                return Err(api_failure(code));
            }
            Ok(FederatedIdentity {
                tokens: tokens("uid-g", self.federated_email.map(email)),
                display_name: self.federated_name.map(str::to_owned),
                photo_url: self.federated_photo.map(str::to_owned),
            })
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<IdentityTokens, FirebaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_code {
                Some(code) => Err(api_failure(code)),
                None => Ok(tokens("uid-1", None)),
            }
        }
    }

    #[derive(Default)]
    struct FakeProfiles {
        docs: Mutex<HashMap<String, UserProfile>>,
        fail_reads: bool,
        fail_writes: bool,
        writes: AtomicUsize,
    }

    impl FakeProfiles {
        fn with_profile(uid: &str, profile: UserProfile) -> Self {
            let store = Self::default();
            store.docs.lock().unwrap().insert(uid.to_owned(), profile);
            store
        }
    }

    #[async_trait]
    impl ProfileStore for FakeProfiles {
        async fn get_profile(
            &self,
            uid: &UserId,
            _id_token: &str,
        ) -> Result<Option<UserProfile>, FirebaseError> {
            if self.fail_reads {
                return Err(FirebaseError::Decode("simulated read failure".to_owned()));
            }
            Ok(self.docs.lock().unwrap().get(uid.as_str()).cloned())
        }

        async fn put_profile(
            &self,
            uid: &UserId,
            _id_token: &str,
            profile: &UserProfile,
        ) -> Result<(), FirebaseError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes {
                return Err(FirebaseError::Decode("simulated write failure".to_owned()));
            }
            self.docs
                .lock()
                .unwrap()
                .insert(uid.as_str().to_owned(), profile.clone());
            Ok(())
        }
    }

    fn gate(
        identity: FakeIdentity,
        profiles: FakeProfiles,
    ) -> (AuthGate, Arc<FakeIdentity>, Arc<FakeProfiles>) {
        let identity = Arc::new(identity);
        let profiles = Arc::new(profiles);
        let gate = AuthGate::new(identity.clone(), profiles.clone());
        (gate, identity, profiles)
    }

    fn profile(name: &str, raw_email: &str) -> UserProfile {
        UserProfile {
            name: name.to_owned(),
            email: email(raw_email),
            photo_url: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_login_returns_stored_profile() {
        let stored = profile("Maria Silva", "maria@example.com");
        let (gate, _, _) = gate(
            FakeIdentity::ok(),
            FakeProfiles::with_profile("uid-1", stored.clone()),
        );

        let signed_in = gate.login("maria@example.com", "senha123").await.unwrap();

        assert_eq!(signed_in.uid.as_str(), "uid-1");
        assert_eq!(signed_in.profile, stored);
        assert_eq!(signed_in.id_token, "id-token");
    }

    #[tokio::test]
    async fn test_login_wrong_credentials() {
        let (gate, _, _) = gate(
            FakeIdentity::failing("INVALID_LOGIN_CREDENTIALS"),
            FakeProfiles::default(),
        );

        let err = gate
            .login("maria@example.com", "errada")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.login_message(), "Email ou senha incorretos");
    }

    #[tokio::test]
    async fn test_login_without_profile_falls_back_to_email_local_part() {
        let (gate, _, _) = gate(FakeIdentity::ok(), FakeProfiles::default());

        let signed_in = gate.login("maria@example.com", "senha123").await.unwrap();

        assert_eq!(signed_in.profile.name, "maria");
        assert_eq!(signed_in.profile.email.as_str(), "maria@example.com");
    }

    #[tokio::test]
    async fn test_login_survives_profile_read_failure() {
        let profiles = FakeProfiles {
            fail_reads: true,
            ..FakeProfiles::default()
        };
        let (gate, _, _) = gate(FakeIdentity::ok(), profiles);

        let signed_in = gate.login("maria@example.com", "senha123").await.unwrap();

        assert_eq!(signed_in.profile.name, "maria");
    }

    #[tokio::test]
    async fn test_register_rejects_mismatched_passwords_before_any_platform_call() {
        let (gate, identity, _) = gate(FakeIdentity::ok(), FakeProfiles::default());

        let err = gate
            .register("Maria", "maria@example.com", "senha123", "senha124")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::PasswordMismatch));
        assert_eq!(err.register_message(), "As senhas não coincidem");
        assert_eq!(identity.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_register_rejects_short_passwords_before_any_platform_call() {
        let (gate, identity, _) = gate(FakeIdentity::ok(), FakeProfiles::default());

        let err = gate
            .register("Maria", "maria@example.com", "cinco", "cinco")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::PasswordTooShort));
        assert_eq!(
            err.register_message(),
            "A senha deve ter pelo menos 6 caracteres"
        );
        assert_eq!(identity.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_register_counts_password_characters_not_bytes() {
        let (gate, _, _) = gate(FakeIdentity::ok(), FakeProfiles::default());

        // Six characters, eight bytes.
        let result = gate
            .register("Maria", "maria@example.com", "açúcar", "açúcar")
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_register_round_trips_profile() {
        let (gate, _, profiles) = gate(FakeIdentity::ok(), FakeProfiles::default());

        let signed_in = gate
            .register("Maria Silva", "maria@example.com", "senha123", "senha123")
            .await
            .unwrap();

        let stored = profiles
            .docs
            .lock()
            .unwrap()
            .get("uid-1")
            .cloned()
            .unwrap();
        assert_eq!(stored.name, "Maria Silva");
        assert_eq!(stored.email.as_str(), "maria@example.com");
        assert_eq!(signed_in.profile, stored);
    }

    #[tokio::test]
    async fn test_register_tolerates_profile_write_failure() {
        let profiles = FakeProfiles {
            fail_writes: true,
            ..FakeProfiles::default()
        };
        let (gate, _, profiles) = gate(FakeIdentity::ok(), profiles);

        let signed_in = gate
            .register("Maria", "maria@example.com", "senha123", "senha123")
            .await
            .unwrap();

        assert_eq!(signed_in.profile.name, "Maria");
        assert!(profiles.docs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (gate, _, _) = gate(FakeIdentity::failing("EMAIL_EXISTS"), FakeProfiles::default());

        let err = gate
            .register("Maria", "maria@example.com", "senha123", "senha123")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::EmailInUse));
        assert_eq!(err.register_message(), "Este email já está em uso");
    }

    #[tokio::test]
    async fn test_google_login_seeds_missing_profile() {
        let identity = FakeIdentity {
            federated_name: Some("Maria Google"),
            federated_photo: Some("https://example.com/avatar.jpg"),
            ..FakeIdentity::ok()
        };
        let (gate, _, profiles) = gate(identity, FakeProfiles::default());

        let signed_in = gate.login_with_google("google-credential").await.unwrap();

        assert_eq!(signed_in.profile.name, "Maria Google");
        let stored = profiles
            .docs
            .lock()
            .unwrap()
            .get("uid-g")
            .cloned()
            .unwrap();
        assert_eq!(stored.name, "Maria Google");
        assert_eq!(
            stored.photo_url.as_deref(),
            Some("https://example.com/avatar.jpg")
        );
    }

    #[tokio::test]
    async fn test_google_login_defaults_display_name() {
        let (gate, _, _) = gate(FakeIdentity::ok(), FakeProfiles::default());

        let signed_in = gate.login_with_google("google-credential").await.unwrap();

        assert_eq!(signed_in.profile.name, "Usuário");
    }

    #[tokio::test]
    async fn test_google_login_keeps_existing_profile() {
        let existing = profile("Nome Antigo", "maria@example.com");
        let identity = FakeIdentity {
            federated_name: Some("Nome Novo"),
            ..FakeIdentity::ok()
        };
        let (gate, _, profiles) = gate(identity, FakeProfiles::with_profile("uid-g", existing.clone()));

        let signed_in = gate.login_with_google("google-credential").await.unwrap();

        assert_eq!(signed_in.profile, existing);
        assert_eq!(profiles.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_google_login_requires_an_email() {
        let identity = FakeIdentity {
            federated_email: None,
            ..FakeIdentity::ok()
        };
        let (gate, _, _) = gate(identity, FakeProfiles::default());

        let err = gate.login_with_google("google-credential").await.unwrap_err();

        assert!(matches!(err, AuthError::Platform(_)));
    }

    #[tokio::test]
    async fn test_sign_in_and_out_publish_events() {
        let (gate, _, _) = gate(FakeIdentity::ok(), FakeProfiles::default());
        let mut events = gate.subscribe();

        gate.login("maria@example.com", "senha123").await.unwrap();
        gate.sign_out();

        assert_eq!(
            events.recv().await.unwrap(),
            IdentityEvent::SignedIn {
                uid: UserId::from("uid-1")
            }
        );
        assert_eq!(events.recv().await.unwrap(), IdentityEvent::SignedOut);
    }

    #[tokio::test]
    async fn test_observer_resolves_anonymous_on_start() {
        let (gate, _, _) = gate(FakeIdentity::ok(), FakeProfiles::default());

        let observer = IdentityObserver::start(&gate);

        assert_eq!(observer.state(), IdentityState::Anonymous);
        observer.stop();
    }

    #[tokio::test]
    async fn test_observer_tracks_sign_in_then_sign_out() {
        let (gate, _, _) = gate(FakeIdentity::ok(), FakeProfiles::default());
        let observer = IdentityObserver::start(&gate);
        let mut watched = observer.watch();

        gate.login("maria@example.com", "senha123").await.unwrap();
        timeout(Duration::from_secs(1), watched.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            *watched.borrow(),
            IdentityState::Authenticated {
                uid: UserId::from("uid-1")
            }
        );

        gate.sign_out();
        timeout(Duration::from_secs(1), watched.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*watched.borrow(), IdentityState::Anonymous);

        observer.stop();
    }
}
