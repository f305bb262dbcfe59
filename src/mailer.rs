//! Outbound mail over lettre's SMTP transport.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};

use crate::config::SmtpConfig;
use crate::error::NotifyError;

/// One delivery: a single message, possibly with several recipients.
/// A broadcast is one of these with the full recipient list, never a
/// fan-out of separate sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub html_body: Option<String>,
}

/// Seam between the pipeline and the mail host. The pipeline only ever
/// observes success or failure; delivery confirmation is out of scope.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), NotifyError>;
}

#[derive(Clone)]
pub struct SmtpMailer {
    mailer: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let mailer = if config.smtp_username.is_empty() || config.smtp_password.is_empty() {
            tracing::info!(
                smtp_host = %config.smtp_host,
                smtp_port = config.smtp_port,
                "SMTP credentials not configured, using unauthenticated connection (e.g., MailDev)"
            );
            SmtpTransport::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .build()
        } else {
            tracing::info!(
                smtp_host = %config.smtp_host,
                smtp_port = config.smtp_port,
                from = %config.from_email,
                "SMTP transport initialized with authentication and TLS"
            );
            let creds =
                Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

            SmtpTransport::relay(&config.smtp_host)
                .map_err(|e| NotifyError::Mail(e.to_string()))?
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        };

        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::InvalidRecipient {
                address: config.from_email.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(email.subject.clone());

        for address in &email.to {
            let mailbox: Mailbox = address.parse().map_err(
                |e: lettre::address::AddressError| NotifyError::InvalidRecipient {
                    address: address.clone(),
                    reason: e.to_string(),
                },
            )?;
            builder = builder.to(mailbox);
        }

        let message = match &email.html_body {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                email.body.clone(),
                html.clone(),
            )),
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(email.body.clone()),
        }
        .map_err(|e| NotifyError::Mail(e.to_string()))?;

        tracing::info!(
            to = %email.to.join(", "),
            subject = %email.subject,
            "Sending email"
        );

        self.mailer
            .send(&message)
            .map_err(|e| NotifyError::Mail(e.to_string()))?;

        Ok(())
    }
}

/// Fixed subject of the administrative error channel.
pub const ADMIN_ALERT_SUBJECT: &str = "Counselor notification error";

/// Send the diagnostic email for a failed submission. Guarded: a failure
/// here is logged and swallowed so the error channel can never start an
/// error loop of its own.
pub async fn notify_admin(transport: &dyn MailTransport, admin_email: &str, error: &NotifyError) {
    let body = format!(
        "An error occurred in the counselor request notification pipeline:\n\n{}\n",
        error
    );
    let email = OutboundEmail {
        to: vec![admin_email.to_string()],
        subject: ADMIN_ALERT_SUBJECT.to_string(),
        body,
        html_body: None,
    };

    tracing::warn!(to = admin_email, error = %error, "Sending admin error notification");

    if let Err(send_error) = transport.send(&email).await {
        tracing::error!(
            error = %send_error,
            "Failed to deliver admin error notification"
        );
    }
}
