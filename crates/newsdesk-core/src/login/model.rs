//! Login flow domain models.

use serde::{Deserialize, Serialize};

/// The step the two-factor login flow is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoginStep {
    /// Waiting for email and password.
    #[default]
    Email,
    /// Credentials accepted; waiting for the emailed verification code.
    Token,
    /// Verification accepted; the session has been established.
    Success,
}

/// The finite-state record of the login handshake.
///
/// Exactly one instance exists per [`LoginStore`](crate::login::LoginStore);
/// it resets to [`LoginStep::Email`] on explicit reset.
#[derive(Debug, Clone, Default)]
pub struct LoginFlow {
    pub step: LoginStep,
    pub email: String,
    pub pending_user_id: Option<i64>,
    pub is_loading: bool,
    /// Generic, user-safe failure message. Never carries upstream detail.
    pub error: Option<String>,
    /// Informational message (e.g. "a new code was sent").
    pub notice: Option<String>,
}

/// Structured result of a login-flow operation.
///
/// Expected failures (bad credentials, bad code) come back as an outcome,
/// not an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutcome {
    pub success: bool,
    pub message: Option<String>,
}

impl LoginOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}
