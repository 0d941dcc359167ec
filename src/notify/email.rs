// src/notify/email.rs
//! SMTP delivery of the rendered report. Delivery is best-effort: when the
//! SMTP_* settings are absent the run logs a warning and skips the email
//! rather than failing.

use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

const DEFAULT_SMTP_PORT: u16 = 587;

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    /// Build from SMTP_HOST / SMTP_PORT / SMTP_USER / SMTP_PASS / EMAIL_TO.
    /// Returns `Ok(None)` when any required variable is missing.
    pub fn from_env() -> Result<Option<Self>> {
        let vars = ["SMTP_HOST", "SMTP_USER", "SMTP_PASS", "EMAIL_TO"]
            .map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()));
        let [Some(host), Some(user), Some(pass), Some(to_addr)] = vars else {
            return Ok(None);
        };
        let port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_SMTP_PORT);

        let creds = Credentials::new(user.clone(), pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .context("invalid SMTP_HOST")?
            .port(port)
            .credentials(creds)
            .build();

        let from = user.parse().context("SMTP_USER is not a mail address")?;
        let to = to_addr.parse().context("EMAIL_TO is not a mail address")?;

        Ok(Some(Self { mailer, from, to }))
    }

    pub async fn send_report(&self, html: String) -> Result<()> {
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject("Job Scout — Daily Report")
            .header(header::ContentType::TEXT_HTML)
            .body(html)
            .context("build report email")?;

        self.mailer.send(msg).await.context("send report email")?;
        tracing::info!(to = %self.to, "report email sent");
        Ok(())
    }
}
