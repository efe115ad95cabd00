//! Error types for the finance API and the identity provider.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced a response (offline, CORS, aborted).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response; `detail` is the server's error detail when it sent one.
    #[error("HTTP error with status {status}")]
    Http { status: u16, detail: Option<String> },

    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Response is missing `{0}`")]
    MissingField(&'static str),
}

impl ApiError {
    /// Text shown to the user: the server detail if any, else `fallback` for
    /// HTTP failures, else this error's own description.
    pub fn detail_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Http {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Http { detail: None, .. } => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<gloo_net::Error> for ApiError {
    fn from(err: gloo_net::Error) -> Self {
        match err {
            gloo_net::Error::SerdeError(err) => ApiError::Decode(err.to_string()),
            other => ApiError::Network(other.to_string()),
        }
    }
}

/// Error codes reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidEmail,
    UserDisabled,
    UserNotFound,
    WrongPassword,
    InvalidCredentials,
    TooManyRequests,
    EmailAlreadyInUse,
    WeakPassword,
    OperationNotAllowed,
    Other(String),
}

impl AuthErrorCode {
    /// Parses a provider message such as `WEAK_PASSWORD : Password should be ...`.
    pub fn from_provider_message(message: &str) -> Self {
        let code = message
            .split(|c: char| c == ':' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        match code {
            "INVALID_EMAIL" => AuthErrorCode::InvalidEmail,
            "USER_DISABLED" => AuthErrorCode::UserDisabled,
            "EMAIL_NOT_FOUND" => AuthErrorCode::UserNotFound,
            "INVALID_PASSWORD" => AuthErrorCode::WrongPassword,
            "INVALID_LOGIN_CREDENTIALS" => AuthErrorCode::InvalidCredentials,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthErrorCode::TooManyRequests,
            "EMAIL_EXISTS" => AuthErrorCode::EmailAlreadyInUse,
            "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
            "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => {
                AuthErrorCode::OperationNotAllowed
            }
            other => AuthErrorCode::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("Identity provider rejected the request: {0:?}")]
    Provider(AuthErrorCode),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected identity provider response: {0}")]
    Decode(String),
}

impl AuthError {
    pub fn code(&self) -> Option<&AuthErrorCode> {
        match self {
            AuthError::Provider(code) => Some(code),
            _ => None,
        }
    }
}

impl From<gloo_net::Error> for AuthError {
    fn from(err: gloo_net::Error) -> Self {
        match err {
            gloo_net::Error::SerdeError(err) => AuthError::Decode(err.to_string()),
            other => AuthError::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_or_prefers_server_detail() {
        let with_detail = ApiError::Http {
            status: 400,
            detail: Some("Amount is required".to_string()),
        };
        let without_detail = ApiError::Http {
            status: 500,
            detail: None,
        };

        assert_eq!(with_detail.detail_or("Failed"), "Amount is required");
        assert_eq!(without_detail.detail_or("Failed"), "Failed");
        assert_eq!(
            ApiError::Network("offline".to_string()).detail_or("Failed"),
            "Network error: offline"
        );
    }

    #[test]
    fn provider_messages_map_to_codes() {
        assert_eq!(
            AuthErrorCode::from_provider_message("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthErrorCode::WeakPassword
        );
        assert_eq!(
            AuthErrorCode::from_provider_message("EMAIL_EXISTS"),
            AuthErrorCode::EmailAlreadyInUse
        );
        assert_eq!(
            AuthErrorCode::from_provider_message("TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled"),
            AuthErrorCode::TooManyRequests
        );
        assert_eq!(
            AuthErrorCode::from_provider_message("MISSING_PASSWORD"),
            AuthErrorCode::Other("MISSING_PASSWORD".to_string())
        );
    }
}
