//! Session lifecycle manager.
//!
//! Owns every mutation of the three session kinds: creation, attempt
//! increments, soft-expiry and the one-shot consume transitions. The state
//! classification itself lives on the models and is pure.

use chrono::Utc;
use uuid::Uuid;

use crate::db::Database;
use crate::models::{
    AccountVerificationSession, AuthSession, LoginSession, OtpPresentation, User,
};
use crate::services::error::ServiceError;

/// Session tuning knobs, sourced from configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub login_ttl_days: i64,
    pub auth_ttl_minutes: i64,
    pub verification_ttl_hours: i64,
    pub otp_digits: usize,
    pub max_attempts: i32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            login_ttl_days: 60,
            auth_ttl_minutes: 60,
            verification_ttl_hours: 24,
            otp_digits: 8,
            max_attempts: 3,
        }
    }
}

#[derive(Clone)]
pub struct SessionService {
    db: Database,
    settings: SessionSettings,
}

impl SessionService {
    pub fn new(db: Database, settings: SessionSettings) -> Self {
        Self { db, settings }
    }

    /// Start the pre-login OTP exchange for a user.
    pub async fn start_auth_session(&self, user_id: Uuid) -> Result<AuthSession, ServiceError> {
        let session = AuthSession::new(
            user_id,
            self.settings.otp_digits,
            self.settings.auth_ttl_minutes,
            self.settings.max_attempts,
        );
        self.db.insert_auth_session(&session).await?;
        tracing::info!(user_id = %user_id, session_id = %session.session_id, "auth session created");
        Ok(session)
    }

    /// Start the email-ownership OTP exchange for a user.
    pub async fn start_verification_session(
        &self,
        user_id: Uuid,
    ) -> Result<AccountVerificationSession, ServiceError> {
        let session = AccountVerificationSession::new(
            user_id,
            self.settings.otp_digits,
            self.settings.verification_ttl_hours,
            self.settings.max_attempts,
        );
        self.db.insert_verification_session(&session).await?;
        tracing::info!(user_id = %user_id, session_id = %session.session_id, "verification session created");
        Ok(session)
    }

    /// Present an OTP against an auth session. On success the auth session
    /// is soft-expired and a fresh login session is minted for its user.
    pub async fn consume_auth_session(
        &self,
        session_id: &str,
        supplied_otp: &str,
    ) -> Result<LoginSession, ServiceError> {
        let Some(session) = self.db.find_auth_session(session_id).await? else {
            tracing::warn!(session_id = %session_id, "auth session not found");
            return Err(ServiceError::SessionUnavailable);
        };

        match session.present(supplied_otp, Utc::now()) {
            OtpPresentation::Accepted => {
                let login_session =
                    LoginSession::new(session.user_id, self.settings.login_ttl_days);
                self.db
                    .promote_auth_session(session_id, &login_session)
                    .await?;
                tracing::info!(user_id = %session.user_id, "login OTP accepted");
                Ok(login_session)
            }
            OtpPresentation::Rejected => {
                // The counter must land before the caller sees the failure.
                self.db.increment_auth_session_attempts(session_id).await?;
                tracing::warn!(
                    user_id = %session.user_id,
                    attempts = session.attempt_count + 1,
                    "wrong login OTP"
                );
                Err(ServiceError::InvalidOtp)
            }
            OtpPresentation::Unavailable(state) => {
                tracing::warn!(user_id = %session.user_id, state = ?state, "auth session unavailable");
                Err(ServiceError::SessionUnavailable)
            }
        }
    }

    /// Present an OTP against an account-verification session. On success
    /// the session row is deleted and the user is marked verified.
    pub async fn consume_verification_session(
        &self,
        session_id: &str,
        supplied_otp: &str,
    ) -> Result<Uuid, ServiceError> {
        let Some(session) = self.db.find_verification_session(session_id).await? else {
            tracing::warn!(session_id = %session_id, "verification session not found");
            return Err(ServiceError::SessionUnavailable);
        };

        match session.present(supplied_otp, Utc::now()) {
            OtpPresentation::Accepted => {
                self.db
                    .finalize_verification_session(session_id, session.user_id)
                    .await?;
                tracing::info!(user_id = %session.user_id, "account verified");
                Ok(session.user_id)
            }
            OtpPresentation::Rejected => {
                self.db
                    .increment_verification_session_attempts(session_id)
                    .await?;
                tracing::warn!(
                    user_id = %session.user_id,
                    attempts = session.attempt_count + 1,
                    "wrong verification OTP"
                );
                Err(ServiceError::InvalidOtp)
            }
            OtpPresentation::Unavailable(state) => {
                tracing::warn!(user_id = %session.user_id, state = ?state, "verification session unavailable");
                Err(ServiceError::SessionUnavailable)
            }
        }
    }

    /// Resolve a login session cookie to its user.
    ///
    /// The session must be Active and the user verified; every failure mode
    /// reads the same to the caller.
    pub async fn resolve_login_session(&self, session_id: &str) -> Result<User, ServiceError> {
        let Some(session) = self.db.find_login_session(session_id).await? else {
            return Err(ServiceError::NotAuthenticated);
        };

        let state = session.state(Utc::now());
        if !state.is_active() {
            tracing::debug!(user_id = %session.user_id, state = ?state, "login session inactive");
            return Err(ServiceError::NotAuthenticated);
        }

        let user = self
            .db
            .find_user_by_id(session.user_id)
            .await?
            .ok_or(ServiceError::NotAuthenticated)?;

        if !user.verified {
            return Err(ServiceError::NotAuthenticated);
        }

        Ok(user)
    }
}
