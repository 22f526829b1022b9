//! Email notification delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send
//! plain-text notification emails. Configuration is loaded from environment
//! variables; if `SMTP_HOST` is not set, [`EmailConfig::from_env`] returns
//! `None` and no mailer should be constructed — the dispatcher then records
//! email jobs as failed rather than silently dropping them.

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@rollcall.local";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured.
    ///
    /// | Variable        | Required | Default                   |
    /// |-----------------|----------|---------------------------|
    /// | `SMTP_HOST`     | yes      | —                         |
    /// | `SMTP_PORT`     | no       | `587`                     |
    /// | `SMTP_FROM`     | no       | `noreply@rollcall.local`  |
    /// | `SMTP_USER`     | no       | —                         |
    /// | `SMTP_PASSWORD` | no       | —                         |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends notification emails via SMTP.
///
/// The external contract is `deliver(recipient, template_key, data)`; the
/// template key becomes the subject line and the data is rendered as a
/// plain-text body. Richer templating is out of scope for the pipeline.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    /// Create a new email delivery service with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send one notification email. A single attempt: the dispatcher never
    /// retries a failed send.
    pub async fn deliver(
        &self,
        to_email: &str,
        template_key: &str,
        data: &serde_json::Value,
    ) -> Result<(), EmailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let subject = format!("[Rollcall] {}", subject_for(template_key));
        let body = format!(
            "{}\n\nDetails:\n{}",
            subject_for(template_key),
            serde_json::to_string_pretty(data).unwrap_or_default()
        );

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = to_email, template_key, "Notification email sent");
        Ok(())
    }
}

/// Map a template key to a human-readable subject line.
fn subject_for(template_key: &str) -> &str {
    match template_key {
        "attendance_marked" => "Attendance update",
        "leave_submitted" => "New leave request",
        "leave_reviewed" => "Leave request reviewed",
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
