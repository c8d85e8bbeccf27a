//! Email collaborator: SMTP provider plus a background dispatch queue.
//!
//! Sends are best-effort: they run off the request path, are bounded by a
//! timeout, retried a fixed number of times and only ever logged on
//! failure. A failed send never fails the transaction that enqueued it.

use lettre::{
    Message, SmtpTransport, Transport, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use service_core::axum::async_trait;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::SmtpConfig;

const SEND_TIMEOUT: Duration = Duration::from_secs(15);
const SEND_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_secs(5);

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send_verification_otp(
        &self,
        to_email: &str,
        otp_code: &str,
        verification_link: &str,
    ) -> Result<(), AppError>;

    async fn send_login_otp(&self, to_email: &str, otp_code: &str) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct SmtpEmailService {
    mailer: SmtpTransport,
    from_email: String,
}

impl SmtpEmailService {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let creds = Credentials::new(config.user.clone(), config.app_password.clone());

        let mailer = SmtpTransport::relay(&config.relay)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e.to_string())))?
            .credentials(creds)
            .port(config.port)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        tracing::info!(relay = %config.relay, "Email service initialized");

        Ok(Self {
            mailer,
            from_email: config.user.clone(),
        })
    }

    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        plain_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        let email = Message::builder()
            .from(
                self.from_email
                    .parse()
                    .map_err(|e: lettre::address::AddressError| {
                        AppError::InternalError(e.into())
                    })?,
            )
            .to(to_email
                .parse()
                .map_err(|e: lettre::address::AddressError| AppError::InternalError(e.into()))?)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_body.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::InternalError(e.into()))?;

        // Send on the blocking pool; SmtpTransport is synchronous.
        let mailer = self.mailer.clone();
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::InternalError(e.into()))?;

        match result {
            Ok(_) => {
                tracing::info!(to = %to_email, subject = %subject, "Email sent successfully");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e.to_string(), to = %to_email, "Failed to send email");
                Err(AppError::EmailError(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl EmailProvider for SmtpEmailService {
    async fn send_verification_otp(
        &self,
        to_email: &str,
        otp_code: &str,
        verification_link: &str,
    ) -> Result<(), AppError> {
        let html_body = format!(
            r###"            <html>
                <body style="font-family: Arial, sans-serif;">
                    <h2>Verify your account</h2>
                    <p>Thank you for registering. Enter this code to verify your email address:</p>
                    <p style="font-size: 28px; letter-spacing: 4px; font-weight: bold;">{code}</p>
                    <p>
                        <a href="{link}" style="background-color: #4CAF50; color: white; padding: 14px 20px; text-decoration: none; border-radius: 4px;">
                            Open verification page
                        </a>
                    </p>
                    <p style="color: #666; font-size: 12px;">
                        This code expires in 24 hours. If you didn't request this, please ignore this email.
                    </p>
                </body>
            </html>
            "###,
            code = otp_code,
            link = verification_link,
        );

        let plain_body = format!(
            "Verify your account\n\nEnter this code to verify your email address: {}\n\n{}\n\nThis code expires in 24 hours. If you didn't request this, please ignore this email.",
            otp_code, verification_link,
        );

        self.send_email(to_email, "Verify Your Email Address", &plain_body, &html_body)
            .await
    }

    async fn send_login_otp(&self, to_email: &str, otp_code: &str) -> Result<(), AppError> {
        let html_body = format!(
            r###"            <html>
                <body style="font-family: Arial, sans-serif;">
                    <h2>Your login code</h2>
                    <p>Enter this code to finish signing in:</p>
                    <p style="font-size: 28px; letter-spacing: 4px; font-weight: bold;">{code}</p>
                    <p style="color: #666; font-size: 12px;">
                        This code expires in 60 minutes. If you didn't try to sign in, please change your password.
                    </p>
                </body>
            </html>
            "###,
            code = otp_code,
        );

        let plain_body = format!(
            "Your login code\n\nEnter this code to finish signing in: {}\n\nThis code expires in 60 minutes. If you didn't try to sign in, please change your password.",
            otp_code,
        );

        self.send_email(to_email, "Your Login Code", &plain_body, &html_body)
            .await
    }
}

#[derive(Clone)]
pub struct MockEmailService;

#[async_trait]
impl EmailProvider for MockEmailService {
    async fn send_verification_otp(
        &self,
        _to_email: &str,
        _otp_code: &str,
        _verification_link: &str,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn send_login_otp(&self, _to_email: &str, _otp_code: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// An email waiting to be delivered.
#[derive(Debug, Clone)]
pub enum EmailJob {
    AccountVerification {
        to_email: String,
        otp_code: String,
        verification_link: String,
    },
    LoginOtp {
        to_email: String,
        otp_code: String,
    },
}

/// Handle to the background email worker.
#[derive(Clone)]
pub struct Mailer {
    tx: mpsc::Sender<EmailJob>,
}

impl Mailer {
    /// Spawn the worker task draining the queue against `provider`.
    pub fn spawn(provider: Arc<dyn EmailProvider>) -> Self {
        let (tx, mut rx) = mpsc::channel::<EmailJob>(64);

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                deliver_with_retries(provider.as_ref(), &job).await;
            }
        });

        Self { tx }
    }

    /// Queue a job without waiting. A full queue drops the job with a log
    /// line; email is best-effort by contract.
    pub fn enqueue(&self, job: EmailJob) {
        if let Err(e) = self.tx.try_send(job) {
            tracing::warn!(error = %e, "email queue full, dropping job");
        }
    }
}

async fn deliver_with_retries(provider: &dyn EmailProvider, job: &EmailJob) {
    for attempt in 1..=SEND_ATTEMPTS {
        let send = async {
            match job {
                EmailJob::AccountVerification {
                    to_email,
                    otp_code,
                    verification_link,
                } => {
                    provider
                        .send_verification_otp(to_email, otp_code, verification_link)
                        .await
                }
                EmailJob::LoginOtp { to_email, otp_code } => {
                    provider.send_login_otp(to_email, otp_code).await
                }
            }
        };

        match tokio::time::timeout(SEND_TIMEOUT, send).await {
            Ok(Ok(())) => return,
            Ok(Err(e)) => {
                tracing::warn!(attempt, error = %e, "email delivery failed");
            }
            Err(_) => {
                tracing::warn!(attempt, "email delivery timed out");
            }
        }

        if attempt < SEND_ATTEMPTS {
            tokio::time::sleep(RETRY_BACKOFF).await;
        }
    }

    tracing::error!("giving up on email job after {} attempts", SEND_ATTEMPTS);
}
