//! Integration tests for the session state machine.
//!
//! Exercises the pure transitions of the three session kinds: one-shot
//! consume, attempt exhaustion and expiry precedence.

use chrono::{Duration, Utc};
use forms_service::models::{
    AccountVerificationSession, AuthSession, LoginSession, OtpPresentation, SessionState,
};
use uuid::Uuid;

const OTP_DIGITS: usize = 8;
const MAX_ATTEMPTS: i32 = 3;

#[test]
fn auth_session_one_shot_consume() {
    let mut session = AuthSession::new(Uuid::new_v4(), OTP_DIGITS, 60, MAX_ATTEMPTS);
    let code = session.otp_code.clone();
    let now = Utc::now();

    assert_eq!(session.present(&code, now), OtpPresentation::Accepted);

    // The success transition soft-expires the session; the same correct
    // code must then read as unavailable, not as "wrong token".
    session.expired_flag = true;
    assert_eq!(
        session.present(&code, now),
        OtpPresentation::Unavailable(SessionState::Consumed)
    );
}

#[test]
fn wrong_code_rejections_lead_to_exhaustion() {
    let mut session = AuthSession::new(Uuid::new_v4(), OTP_DIGITS, 60, MAX_ATTEMPTS);
    let code = session.otp_code.clone();
    let now = Utc::now();

    // Three wrong presentations, each incrementing the persisted counter.
    for _ in 0..MAX_ATTEMPTS {
        assert_eq!(session.present("00000000", now), OtpPresentation::Rejected);
        session.attempt_count += 1;
    }

    // The fourth presentation fails identically to an expired session,
    // even with the correct code.
    assert_eq!(
        session.present(&code, now),
        OtpPresentation::Unavailable(SessionState::Exhausted)
    );
}

#[test]
fn expiry_beats_remaining_attempts() {
    let mut session = AuthSession::new(Uuid::new_v4(), OTP_DIGITS, 60, MAX_ATTEMPTS);
    session.expiry_utc = Utc::now() - Duration::seconds(1);
    let code = session.otp_code.clone();

    assert_eq!(
        session.present(&code, Utc::now()),
        OtpPresentation::Unavailable(SessionState::Expired)
    );
}

#[test]
fn verification_session_shares_the_machine() {
    let mut session = AccountVerificationSession::new(Uuid::new_v4(), OTP_DIGITS, 24, MAX_ATTEMPTS);
    let code = session.otp_code.clone();
    let now = Utc::now();

    assert_eq!(session.present("99999999", now), OtpPresentation::Rejected);
    session.attempt_count += 1;
    assert_eq!(session.present(&code, now), OtpPresentation::Accepted);

    session.attempt_count = session.attempt_max;
    assert_eq!(
        session.present(&code, now),
        OtpPresentation::Unavailable(SessionState::Exhausted)
    );
}

#[test]
fn login_session_validity_is_recomputed_not_cached() {
    let mut session = LoginSession::new(Uuid::new_v4(), 60);
    assert!(session.state(Utc::now()).is_active());

    // Past expiry always loses, whatever the stored flag says.
    session.expiry_utc = Utc::now() - Duration::days(1);
    assert_eq!(session.state(Utc::now()), SessionState::Expired);

    // Soft-expiry (logout-style revocation) wins while time remains.
    let mut revoked = LoginSession::new(Uuid::new_v4(), 60);
    revoked.expired_flag = true;
    assert_eq!(revoked.state(Utc::now()), SessionState::Consumed);
}

#[test]
fn otp_codes_are_numeric_and_sized() {
    let session = AuthSession::new(Uuid::new_v4(), OTP_DIGITS, 60, MAX_ATTEMPTS);
    assert_eq!(session.otp_code.len(), OTP_DIGITS);
    assert!(session.otp_code.chars().all(|c| c.is_ascii_digit()));

    let verification = AccountVerificationSession::new(Uuid::new_v4(), 6, 24, MAX_ATTEMPTS);
    assert_eq!(verification.otp_code.len(), 6);
}
