//! Authentication error types.

use thiserror::Error;

use crate::firebase::FirebaseError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email rejected by format validation, locally or by the platform.
    #[error("invalid email")]
    InvalidEmail,

    /// Wrong password for an existing account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account registered under the given email.
    #[error("user not found")]
    UserNotFound,

    /// An account already exists for the given email.
    #[error("email already in use")]
    EmailInUse,

    /// Password and confirmation do not match.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Password shorter than the minimum length.
    #[error("password too short")]
    PasswordTooShort,

    /// Identity platform failure with no specific user remedy.
    #[error("identity platform error: {0}")]
    Platform(FirebaseError),
}

impl From<m2verse_core::EmailError> for AuthError {
    fn from(_: m2verse_core::EmailError) -> Self {
        Self::InvalidEmail
    }
}

impl From<FirebaseError> for AuthError {
    fn from(err: FirebaseError) -> Self {
        match err.api_code() {
            Some("INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD") => Self::InvalidCredentials,
            Some("EMAIL_NOT_FOUND") => Self::UserNotFound,
            Some("EMAIL_EXISTS") => Self::EmailInUse,
            Some("INVALID_EMAIL") => Self::InvalidEmail,
            _ => Self::Platform(err),
        }
    }
}

impl AuthError {
    /// Message shown when federated sign-in fails, regardless of cause.
    pub const FEDERATED_MESSAGE: &'static str = "Erro ao fazer login com Google. Tente novamente.";

    /// User-facing message shown on the login form.
    #[must_use]
    pub const fn login_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Email ou senha incorretos",
            Self::UserNotFound => "Usuário não encontrado",
            _ => "Erro ao fazer login. Tente novamente.",
        }
    }

    /// User-facing message shown on the registration form.
    #[must_use]
    pub const fn register_message(&self) -> &'static str {
        match self {
            Self::EmailInUse => "Este email já está em uso",
            Self::InvalidEmail => "Email inválido",
            Self::PasswordMismatch => "As senhas não coincidem",
            Self::PasswordTooShort => "A senha deve ter pelo menos 6 caracteres",
            _ => "Erro ao criar conta. Tente novamente.",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn api_error(code: &str) -> FirebaseError {
        FirebaseError::Api {
            status: 400,
            code: code.to_string(),
        }
    }

    #[test]
    fn test_login_codes_map_to_credential_errors() {
        assert!(matches!(
            AuthError::from(api_error("INVALID_LOGIN_CREDENTIALS")),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from(api_error("INVALID_PASSWORD")),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from(api_error("EMAIL_NOT_FOUND")),
            AuthError::UserNotFound
        ));
    }

    #[test]
    fn test_register_codes_map_to_account_errors() {
        assert!(matches!(
            AuthError::from(api_error("EMAIL_EXISTS")),
            AuthError::EmailInUse
        ));
        assert!(matches!(
            AuthError::from(api_error("INVALID_EMAIL")),
            AuthError::InvalidEmail
        ));
    }

    #[test]
    fn test_unknown_code_becomes_platform_error() {
        let err = AuthError::from(api_error("OPERATION_NOT_ALLOWED"));
        assert!(matches!(err, AuthError::Platform(_)));
    }

    #[test]
    fn test_login_messages() {
        assert_eq!(
            AuthError::InvalidCredentials.login_message(),
            "Email ou senha incorretos"
        );
        assert_eq!(
            AuthError::UserNotFound.login_message(),
            "Usuário não encontrado"
        );
        assert_eq!(
            AuthError::Platform(api_error("UNKNOWN")).login_message(),
            "Erro ao fazer login. Tente novamente."
        );
    }

    #[test]
    fn test_register_messages() {
        assert_eq!(
            AuthError::EmailInUse.register_message(),
            "Este email já está em uso"
        );
        assert_eq!(AuthError::InvalidEmail.register_message(), "Email inválido");
        assert_eq!(
            AuthError::PasswordMismatch.register_message(),
            "As senhas não coincidem"
        );
        assert_eq!(
            AuthError::PasswordTooShort.register_message(),
            "A senha deve ter pelo menos 6 caracteres"
        );
        assert_eq!(
            AuthError::Platform(api_error("UNKNOWN")).register_message(),
            "Erro ao criar conta. Tente novamente."
        );
    }
}
