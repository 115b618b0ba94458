//! Authentication route handlers.
//!
//! Handles login, registration, Google sign-in, and logout against the
//! identity platform. Failures re-render the form inline with the
//! localized message for the rejection; nothing about the failure is
//! carried in the URL.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::clear_sentry_user;
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthError;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Google Identity Services callback payload.
///
/// GIS posts extra fields (`g_csrf_token`, `select_by`); only the
/// credential matters here.
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackForm {
    pub credential: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
    /// Entered email, echoed back so a failed attempt keeps it.
    pub email: String,
    /// OAuth client ID for the Google button; the button is omitted when unset.
    pub google_client_id: Option<String>,
    /// Absolute URL GIS posts the credential back to.
    pub google_login_uri: String,
}

impl LoginTemplate {
    fn new(state: &AppState, error: Option<&'static str>, email: String) -> Self {
        Self {
            error,
            email,
            google_client_id: state.config().google_client_id.clone(),
            google_login_uri: format!("{}/login/google", state.config().base_url),
        }
    }
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<&'static str>,
    pub name: String,
    pub email: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(State(state): State<AppState>) -> impl IntoResponse {
    LoginTemplate::new(&state, None, String::new())
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth().login(&form.email, &form.password).await {
        Ok(signed_in) => {
            let user = CurrentUser::from(signed_in);
            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to store session after login: {e}");
                return LoginTemplate::new(
                    &state,
                    Some("Erro ao fazer login. Tente novamente."),
                    form.email,
                )
                .into_response();
            }
            Redirect::to("/").into_response()
        }
        Err(err) => {
            tracing::warn!("Login failed: {err}");
            LoginTemplate::new(&state, Some(err.login_message()), form.email).into_response()
        }
    }
}

/// Handle the Google Identity Services credential callback.
///
/// Whatever went wrong, the visitor sees the same generic federated
/// sign-in message.
pub async fn google(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<GoogleCallbackForm>,
) -> Response {
    match state.auth().login_with_google(&form.credential).await {
        Ok(signed_in) => {
            let user = CurrentUser::from(signed_in);
            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to store session after Google login: {e}");
                return LoginTemplate::new(&state, Some(AuthError::FEDERATED_MESSAGE), String::new())
                    .into_response();
            }
            Redirect::to("/").into_response()
        }
        Err(err) => {
            tracing::warn!("Google login failed: {err}");
            LoginTemplate::new(&state, Some(AuthError::FEDERATED_MESSAGE), String::new())
                .into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page() -> impl IntoResponse {
    RegisterTemplate {
        error: None,
        name: String::new(),
        email: String::new(),
    }
}

/// Handle registration form submission.
///
/// Password checks run locally inside the gate before any platform
/// call; a successful registration signs the visitor in directly.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    match state
        .auth()
        .register(&form.name, &form.email, &form.password, &form.confirm_password)
        .await
    {
        Ok(signed_in) => {
            let user = CurrentUser::from(signed_in);
            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to store session after registration: {e}");
                return RegisterTemplate {
                    error: Some("Erro ao criar conta. Tente novamente."),
                    name: form.name,
                    email: form.email,
                }
                .into_response();
            }
            Redirect::to("/").into_response()
        }
        Err(err) => {
            tracing::warn!("Registration failed: {err}");
            RegisterTemplate {
                error: Some(err.register_message()),
                name: form.name,
                email: form.email,
            }
            .into_response()
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Clears the stored identity and notifies the gate's observers. The
/// cart is left alone; signing out does not empty it.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session on logout: {e}");
    }

    state.auth().sign_out();
    clear_sentry_user();

    Redirect::to("/").into_response()
}
