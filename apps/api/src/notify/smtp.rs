use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::debug;

use super::{NotificationDispatcher, NotifyError, OutgoingEmail};
use crate::config::MailConfig;

/// SMTP relay dispatcher. The blocking lettre transport runs on the blocking
/// thread pool and is awaited, so the send finishes before the caller moves on.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let builder = if config.use_tls {
            SmtpTransport::starttls_relay(&config.server)?
        } else {
            SmtpTransport::builder_dangerous(&config.server)
        };
        let mut builder = builder.port(config.port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl NotificationDispatcher for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        let message = build_message(email)?;
        let transport = self.transport.clone();

        debug!("sending email to {:?}", email.recipients);
        let response = tokio::task::spawn_blocking(move || transport.send(&message)).await??;
        debug!("SMTP relay answered {}", response.code());
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse::<Mailbox>().map_err(|e| NotifyError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

fn build_message(email: &OutgoingEmail) -> Result<Message, NotifyError> {
    if email.recipients.is_empty() {
        return Err(NotifyError::NotConfigured);
    }

    let mut builder = Message::builder()
        .from(parse_mailbox(&email.sender)?)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN);
    for recipient in &email.recipients {
        builder = builder.to(parse_mailbox(recipient)?);
    }

    Ok(builder.body(email.body.clone())?)
}
