//! Two-factor login state machine.
//!
//! Drives the email/password → emailed code → session handshake. The three
//! network steps are deliberately independent calls so the UI can re-prompt
//! for a code (or resend one) without restarting credential entry.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::api::CmsApi;
use crate::login::model::{LoginFlow, LoginOutcome, LoginStep};
use crate::session::SessionStore;

// Fixed user-facing messages. Upstream failure detail is logged, never
// surfaced, so backend internals cannot leak through the login screen.
const MSG_LOGIN_FAILED: &str = "Login failed. Please try again.";
const MSG_VERIFY_FAILED: &str = "Verification failed. Please try again.";
const MSG_RESEND_FAILED: &str = "Could not resend the code. Please try again.";
const MSG_CODE_SENT: &str = "A new verification code was sent to your email.";

/// State container for the multi-step login handshake.
pub struct LoginStore {
    api: Arc<dyn CmsApi>,
    session: Arc<SessionStore>,
    state: Mutex<LoginFlow>,
}

impl LoginStore {
    pub fn new(api: Arc<dyn CmsApi>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            state: Mutex::new(LoginFlow::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoginFlow> {
        self.state.lock().expect("login flow lock poisoned")
    }

    fn begin_call(&self) {
        let mut state = self.lock();
        state.is_loading = true;
        state.error = None;
        state.notice = None;
    }

    fn end_call(&self) {
        self.lock().is_loading = false;
    }

    fn fail(&self, message: &str) -> LoginOutcome {
        self.lock().error = Some(message.to_string());
        LoginOutcome::failure(message)
    }

    /// Submits email and password. On acceptance the flow advances to the
    /// code-entry step; on any failure it stays on the email step with a
    /// generic error.
    pub async fn initiate(&self, email: &str, password: &str) -> LoginOutcome {
        self.begin_call();
        debug!(email, "initiating login");

        let outcome = match self.api.initiate_login(email, password).await {
            Ok(response) if response.success => {
                let mut state = self.lock();
                state.email = email.to_string();
                state.pending_user_id = response.user_id;
                state.step = LoginStep::Token;
                info!(email, "login initiated; verification code pending");
                LoginOutcome::ok()
            }
            Ok(response) => {
                warn!(
                    email,
                    upstream = response.message.as_deref().unwrap_or("(none)"),
                    "login initiation rejected"
                );
                self.fail(MSG_LOGIN_FAILED)
            }
            Err(err) => {
                warn!(email, error = %err, "login initiation failed");
                self.fail(MSG_LOGIN_FAILED)
            }
        };

        self.end_call();
        outcome
    }

    /// Submits the emailed verification code. On acceptance the flow reaches
    /// its terminal step and the session store finalizes the login with the
    /// returned user payload.
    pub async fn verify(&self, code: &str) -> LoginOutcome {
        self.begin_call();
        let email = self.lock().email.clone();
        debug!(email, "verifying token");

        let outcome = match self.api.verify_token(&email, code).await {
            Ok(response) if response.success => match response.user {
                Some(raw_user) => match self.session.complete_login(&raw_user).await {
                    Ok(_) => {
                        self.lock().step = LoginStep::Success;
                        LoginOutcome::ok()
                    }
                    Err(err) => {
                        warn!(email, error = %err, "session completion failed");
                        self.fail(MSG_VERIFY_FAILED)
                    }
                },
                None => {
                    warn!(email, "verify response had no user payload");
                    self.fail(MSG_VERIFY_FAILED)
                }
            },
            Ok(response) => {
                warn!(
                    email,
                    upstream = response.message.as_deref().unwrap_or("(none)"),
                    "token rejected"
                );
                self.fail(MSG_VERIFY_FAILED)
            }
            Err(err) => {
                warn!(email, error = %err, "token verification failed");
                self.fail(MSG_VERIFY_FAILED)
            }
        };

        self.end_call();
        outcome
    }

    /// Requests a fresh verification code for the stored email.
    pub async fn resend(&self) -> LoginOutcome {
        self.begin_call();
        let email = self.lock().email.clone();
        debug!(email, "resending verification code");

        let outcome = match self.api.resend_token(&email).await {
            Ok(true) => {
                self.lock().notice = Some(MSG_CODE_SENT.to_string());
                LoginOutcome::ok()
            }
            Ok(false) => self.fail(MSG_RESEND_FAILED),
            Err(err) => {
                warn!(email, error = %err, "resend failed");
                self.fail(MSG_RESEND_FAILED)
            }
        };

        self.end_call();
        outcome
    }

    /// Returns the flow to the email step, clearing all transient state.
    pub fn reset(&self) {
        *self.lock() = LoginFlow::default();
        debug!("login flow reset");
    }

    pub fn step(&self) -> LoginStep {
        self.lock().step
    }

    pub fn email(&self) -> String {
        self.lock().email.clone()
    }

    pub fn pending_user_id(&self) -> Option<i64> {
        self.lock().pending_user_id
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn notice(&self) -> Option<String> {
        self.lock().notice.clone()
    }
}
