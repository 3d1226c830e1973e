// Report delivery over SMTP.
//
// Sends the rendered Markdown as a plain-text message through a relay —
// typically a localhost MTA, hence the unencrypted transport builder.
// Delivery failure is fatal to the run: the report has nowhere else to go.

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

/// Mail delivery client for the daily report.
pub struct Mailer {
    host: String,
    port: u16,
    from: String,
    to: String,
}

impl Mailer {
    pub fn new(host: &str, port: u16, from: &str, to: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Send a Markdown report with the given subject line.
    pub async fn send_markdown(&self, subject: &str, markdown: &str) -> Result<()> {
        let from: Mailbox = self
            .from
            .parse()
            .with_context(|| format!("Invalid EMAIL_FROM address: {}", self.from))?;
        let to: Mailbox = self
            .to
            .parse()
            .with_context(|| format!("Invalid EMAIL_TO address: {}", self.to))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(markdown.to_string())
            .context("Failed to build mail message")?;

        // Plain connection to the relay — TLS termination is the relay's job
        let transport: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
                .port(self.port)
                .build();

        transport
            .send(message)
            .await
            .with_context(|| format!("SMTP delivery via {}:{} failed", self.host, self.port))?;

        info!(subject = subject, to = %self.to, "Report mailed");
        Ok(())
    }
}
