//! Auth orchestrator.
//!
//! Composes the session lifecycle manager and the permission evaluator into
//! the register / login / verify / authenticate / current-user use cases.
//! This is the only component that touches both the identity tables and the
//! session tables inside one logical operation.

use crate::db::Database;
use crate::dtos::MessageResponse;
use crate::dtos::auth::{LoginRequest, RegisterRequest};
use crate::models::{Action, AuthSession, LoginSession, Permission, Resource, Role, User};
use crate::services::authz::{
    ADMIN_ROLE_NAME, PermissionCheck, PermissionChecker, SUPER_ADMIN_ROLE_NAME,
};
use crate::services::email::{EmailJob, Mailer};
use crate::services::error::ServiceError;
use crate::services::sessions::SessionService;
use crate::utils::{hash_password, verify_password};

/// Orchestrator knobs, sourced from configuration.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub admin_emails: Vec<String>,
    pub super_admin_emails: Vec<String>,
    pub admins_only_login: bool,
    pub frontend_base_url: String,
}

#[derive(Clone)]
pub struct AuthService {
    db: Database,
    sessions: SessionService,
    mailer: Mailer,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        db: Database,
        sessions: SessionService,
        mailer: Mailer,
        settings: AuthSettings,
    ) -> Self {
        Self {
            db,
            sessions,
            mailer,
            settings,
        }
    }

    /// Register a new account.
    ///
    /// Creates the user with its self-grant (an unnamed role holding
    /// `user:<id>:rw`), attaches a named bypass role when the email is on
    /// an allow-list, and queues the verification OTP email off the
    /// success path.
    pub async fn register(&self, req: RegisterRequest) -> Result<MessageResponse, ServiceError> {
        if self
            .db
            .find_user_by_email_or_username(&req.email, &req.username)
            .await?
            .is_some()
        {
            return Err(ServiceError::AccountExists);
        }

        if req.password != req.password_confirm {
            return Err(ServiceError::PasswordMismatch);
        }

        let password_hash = hash_password(&req.password)?;
        let user = User::new(req.email, req.username, password_hash, req.name);

        let role = Role::grant_container();
        let permission =
            Permission::scoped(role.role_id, Resource::User, user.user_id, Action::ReadWrite);
        self.db
            .create_user_with_grants(&user, &role, &permission)
            .await?;

        tracing::info!(user_id = %user.user_id, username = %user.username, "user registered");

        if self.email_on_list(&user.email, &self.settings.super_admin_emails) {
            self.attach_named_role(&user, SUPER_ADMIN_ROLE_NAME).await?;
        } else if self.email_on_list(&user.email, &self.settings.admin_emails) {
            self.attach_named_role(&user, ADMIN_ROLE_NAME).await?;
        }

        let session = self
            .sessions
            .start_verification_session(user.user_id)
            .await?;
        self.mailer.enqueue(EmailJob::AccountVerification {
            to_email: user.email.clone(),
            otp_code: session.otp_code.clone(),
            verification_link: format!(
                "{}/auth/verify?session={}",
                self.settings.frontend_base_url, session.session_id,
            ),
        });

        Ok(MessageResponse::new(
            "Registered! Please check your email to verify your account.",
        ))
    }

    /// Login step one: check the password, open the OTP exchange.
    ///
    /// The returned session id becomes the `_auths` pre-auth cookie.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthSession, ServiceError> {
        let user = self
            .db
            .find_user_by_email(&req.email)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        if !verify_password(&req.password, &user.password_hash) {
            tracing::warn!(user_id = %user.user_id, "login failed: invalid password");
            return Err(ServiceError::InvalidCredentials);
        }

        if self.settings.admins_only_login {
            let grants = self.db.find_role_grants_for_user(user.user_id).await?;
            let checks = [PermissionCheck::global(Resource::User, &[Action::Create])];
            PermissionChecker::new(&grants, &[ADMIN_ROLE_NAME, SUPER_ADMIN_ROLE_NAME], &checks)
                .check(false, Some("Only administrators can log in at the moment"))?;
        }

        let session = self.sessions.start_auth_session(user.user_id).await?;
        self.mailer.enqueue(EmailJob::LoginOtp {
            to_email: user.email.clone(),
            otp_code: session.otp_code.clone(),
        });

        Ok(session)
    }

    /// Login step two: present the OTP bound to the pre-auth cookie and
    /// mint the final login session.
    pub async fn authenticate(
        &self,
        token: &str,
        auth_session_id: &str,
    ) -> Result<LoginSession, ServiceError> {
        self.sessions
            .consume_auth_session(auth_session_id, token)
            .await
    }

    /// Present the account-verification OTP.
    pub async fn verify_account(
        &self,
        token: &str,
        verification_session_id: &str,
    ) -> Result<MessageResponse, ServiceError> {
        self.sessions
            .consume_verification_session(verification_session_id, token)
            .await?;
        Ok(MessageResponse::new("Account verified successfully."))
    }

    /// Re-issue a verification OTP for an unverified account.
    ///
    /// Always reports success so the endpoint cannot be used to probe for
    /// registered emails.
    pub async fn send_verification(&self, email: &str) -> Result<MessageResponse, ServiceError> {
        if let Some(user) = self.db.find_user_by_email(email).await? {
            if !user.verified {
                let session = self
                    .sessions
                    .start_verification_session(user.user_id)
                    .await?;
                self.mailer.enqueue(EmailJob::AccountVerification {
                    to_email: user.email.clone(),
                    otp_code: session.otp_code.clone(),
                    verification_link: format!(
                        "{}/auth/verify?session={}",
                        self.settings.frontend_base_url, session.session_id,
                    ),
                });
            }
        }
        Ok(MessageResponse::new("Verification email sent."))
    }

    /// Resolve the `user_session_id` cookie to a verified user.
    pub async fn current_user(&self, session_id: Option<&str>) -> Result<User, ServiceError> {
        let session_id = session_id.ok_or(ServiceError::NotAuthenticated)?;
        self.sessions.resolve_login_session(session_id).await
    }

    /// Like [`current_user`](Self::current_user) but anonymous on any
    /// failure, for endpoints that serve both states.
    pub async fn current_user_opt(&self, session_id: Option<&str>) -> Option<User> {
        match self.current_user(session_id).await {
            Ok(user) => Some(user),
            Err(_) => None,
        }
    }

    fn email_on_list(&self, email: &str, list: &[String]) -> bool {
        list.iter().any(|e| e.eq_ignore_ascii_case(email))
    }

    /// Attach a named bypass role, creating it on first use. A fresh named
    /// role also receives the global `user:c` permission so the admins-only
    /// login check holds without relying on the bypass.
    async fn attach_named_role(&self, user: &User, role_name: &str) -> Result<(), ServiceError> {
        match self.db.find_role_by_name(role_name).await? {
            Some(role) => {
                self.db.link_user_role(user.user_id, role.role_id).await?;
            }
            None => {
                let role = Role::named(role_name);
                let permission = Permission::global(role.role_id, Resource::User, Action::Create);
                self.db
                    .create_grant(user.user_id, &role, &permission)
                    .await?;
            }
        }
        tracing::info!(user_id = %user.user_id, role = %role_name, "named role attached");
        Ok(())
    }
}
