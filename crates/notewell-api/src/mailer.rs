use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use tracing::info;

use crate::error::ApiError;

/// Outbound email. SMTP when configured; otherwise a log-only mode so
/// local setups can fish verification tokens out of the log.
pub enum Mailer {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: String,
    },
    LogOnly,
}

impl Mailer {
    pub fn smtp(
        host: &str,
        port: u16,
        username: String,
        password: String,
        from: String,
    ) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Mailer::Smtp { transport, from })
    }

    pub fn log_only() -> Self {
        Mailer::LogOnly
    }

    /// Fire-and-forget delivery; transport failure surfaces as a mail
    /// error to the caller.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ApiError> {
        match self {
            Mailer::Smtp { transport, from } => {
                let email = Message::builder()
                    .from(from.parse().map_err(|e| ApiError::Mail(format!("invalid from address: {e}")))?)
                    .to(to.parse().map_err(|e| ApiError::Mail(format!("invalid to address: {e}")))?)
                    .subject(subject)
                    .header(ContentType::TEXT_PLAIN)
                    .body(body.to_string())
                    .map_err(|e| ApiError::Mail(e.to_string()))?;

                transport
                    .send(email)
                    .await
                    .map_err(|e| ApiError::Mail(e.to_string()))?;
                Ok(())
            }
            Mailer::LogOnly => {
                info!(to, subject, body, "email transport disabled, logging message");
                Ok(())
            }
        }
    }
}
