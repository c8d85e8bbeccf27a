//! Session models - the three time-boxed credential exchanges.
//!
//! All three kinds share one state machine:
//! `Active -> {Consumed | Expired | Exhausted}`. Validity is never stored;
//! it is recomputed from the row's flags, timestamps and counters by
//! [`SessionState`] classification, so a session can never be resurrected.

use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::{gen_id, gen_otp, tokens_match};

/// Derived session state. Only `Active` sessions accept transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    /// Terminal success: the session was used up (soft-expired or deleted).
    Consumed,
    /// The expiry timestamp has passed.
    Expired,
    /// All token attempts were spent. Derived, never stored.
    Exhausted,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }
}

/// Outcome of presenting an OTP against a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPresentation {
    /// Correct code while active: the caller must apply the terminal
    /// success transition (one-shot consume).
    Accepted,
    /// Wrong code while active: the caller must persist the attempt
    /// increment before failing.
    Rejected,
    /// The session is not active; which terminal state applies is for
    /// internal logging only.
    Unavailable(SessionState),
}

fn classify(
    expired_flag: bool,
    expiry_utc: DateTime<Utc>,
    attempts: Option<(i32, i32)>,
    now: DateTime<Utc>,
) -> SessionState {
    if expired_flag {
        return SessionState::Consumed;
    }
    if now >= expiry_utc {
        return SessionState::Expired;
    }
    if let Some((count, max)) = attempts {
        if count >= max {
            return SessionState::Exhausted;
        }
    }
    SessionState::Active
}

fn present(
    state: SessionState,
    otp_code: &str,
    supplied: &str,
) -> OtpPresentation {
    if !state.is_active() {
        return OtpPresentation::Unavailable(state);
    }
    if tokens_match(supplied, otp_code) {
        OtpPresentation::Accepted
    } else {
        OtpPresentation::Rejected
    }
}

/// Final authenticated session, minted only by successful OTP
/// authentication. Its id is the `user_session_id` bearer cookie.
#[derive(Debug, Clone, FromRow)]
pub struct LoginSession {
    pub session_id: String,
    pub user_id: Uuid,
    pub expiry_utc: DateTime<Utc>,
    pub expired_flag: bool,
    pub created_utc: DateTime<Utc>,
}

impl LoginSession {
    pub fn new(user_id: Uuid, ttl_days: i64) -> Self {
        Self {
            session_id: gen_id(30),
            user_id,
            expiry_utc: Utc::now() + Duration::days(ttl_days),
            expired_flag: false,
            created_utc: Utc::now(),
        }
    }

    /// No attempt counter applies; a login session carries no token.
    pub fn state(&self, now: DateTime<Utc>) -> SessionState {
        classify(self.expired_flag, self.expiry_utc, None, now)
    }
}

/// Pre-login OTP exchange ("password verified, OTP pending"). Its id is the
/// `_auths` pre-auth cookie.
#[derive(Debug, Clone, FromRow)]
pub struct AuthSession {
    pub session_id: String,
    pub user_id: Uuid,
    pub otp_code: String,
    pub attempt_count: i32,
    pub attempt_max: i32,
    pub expiry_utc: DateTime<Utc>,
    pub expired_flag: bool,
    pub created_utc: DateTime<Utc>,
}

impl AuthSession {
    pub fn new(user_id: Uuid, otp_digits: usize, ttl_minutes: i64, attempt_max: i32) -> Self {
        Self {
            session_id: gen_id(50),
            user_id,
            otp_code: gen_otp(otp_digits),
            attempt_count: 0,
            attempt_max,
            expiry_utc: Utc::now() + Duration::minutes(ttl_minutes),
            expired_flag: false,
            created_utc: Utc::now(),
        }
    }

    pub fn state(&self, now: DateTime<Utc>) -> SessionState {
        classify(
            self.expired_flag,
            self.expiry_utc,
            Some((self.attempt_count, self.attempt_max)),
            now,
        )
    }

    pub fn present(&self, supplied: &str, now: DateTime<Utc>) -> OtpPresentation {
        present(self.state(now), &self.otp_code, supplied)
    }
}

/// Email-ownership OTP exchange ("registered, email pending").
#[derive(Debug, Clone, FromRow)]
pub struct AccountVerificationSession {
    pub session_id: String,
    pub user_id: Uuid,
    pub otp_code: String,
    pub attempt_count: i32,
    pub attempt_max: i32,
    pub expiry_utc: DateTime<Utc>,
    pub expired_flag: bool,
    pub created_utc: DateTime<Utc>,
}

impl AccountVerificationSession {
    pub fn new(user_id: Uuid, otp_digits: usize, ttl_hours: i64, attempt_max: i32) -> Self {
        Self {
            session_id: gen_id(32),
            user_id,
            otp_code: gen_otp(otp_digits),
            attempt_count: 0,
            attempt_max,
            expiry_utc: Utc::now() + Duration::hours(ttl_hours),
            expired_flag: false,
            created_utc: Utc::now(),
        }
    }

    pub fn state(&self, now: DateTime<Utc>) -> SessionState {
        classify(
            self.expired_flag,
            self.expiry_utc,
            Some((self.attempt_count, self.attempt_max)),
            now,
        )
    }

    pub fn present(&self, supplied: &str, now: DateTime<Utc>) -> OtpPresentation {
        present(self.state(now), &self.otp_code, supplied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_session() -> AuthSession {
        AuthSession::new(Uuid::new_v4(), 8, 60, 3)
    }

    #[test]
    fn fresh_session_is_active() {
        let session = auth_session();
        assert_eq!(session.state(Utc::now()), SessionState::Active);
    }

    #[test]
    fn past_expiry_wins_over_flag() {
        let mut session = auth_session();
        session.expiry_utc = Utc::now() - Duration::minutes(1);
        assert_eq!(session.state(Utc::now()), SessionState::Expired);
    }

    #[test]
    fn expired_flag_means_consumed() {
        let mut session = auth_session();
        session.expired_flag = true;
        assert_eq!(session.state(Utc::now()), SessionState::Consumed);
    }

    #[test]
    fn spent_attempts_mean_exhausted() {
        let mut session = auth_session();
        session.attempt_count = session.attempt_max;
        assert_eq!(session.state(Utc::now()), SessionState::Exhausted);
    }

    #[test]
    fn correct_code_is_accepted_while_active() {
        let session = auth_session();
        let code = session.otp_code.clone();
        assert_eq!(session.present(&code, Utc::now()), OtpPresentation::Accepted);
    }

    #[test]
    fn wrong_code_is_rejected_while_active() {
        let session = auth_session();
        assert_eq!(
            session.present("not-the-code", Utc::now()),
            OtpPresentation::Rejected
        );
    }

    #[test]
    fn correct_code_is_unavailable_once_exhausted() {
        let mut session = auth_session();
        session.attempt_count = session.attempt_max;
        let code = session.otp_code.clone();
        assert_eq!(
            session.present(&code, Utc::now()),
            OtpPresentation::Unavailable(SessionState::Exhausted)
        );
    }

    #[test]
    fn correct_code_is_unavailable_once_consumed() {
        let mut session = auth_session();
        session.expired_flag = true;
        let code = session.otp_code.clone();
        assert_eq!(
            session.present(&code, Utc::now()),
            OtpPresentation::Unavailable(SessionState::Consumed)
        );
    }

    #[test]
    fn login_session_expiry_ignores_flag_value() {
        let mut session = LoginSession::new(Uuid::new_v4(), 60);
        session.expiry_utc = Utc::now() - Duration::days(1);
        assert_eq!(session.state(Utc::now()), SessionState::Expired);
        session.expired_flag = false;
        assert!(!session.state(Utc::now()).is_active());
    }

    #[test]
    fn verification_session_follows_same_machine() {
        let session = AccountVerificationSession::new(Uuid::new_v4(), 8, 24, 3);
        assert_eq!(session.state(Utc::now()), SessionState::Active);
        let code = session.otp_code.clone();
        assert_eq!(session.present(&code, Utc::now()), OtpPresentation::Accepted);
    }
}
