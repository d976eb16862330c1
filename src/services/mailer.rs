use crate::config::EmailSettings;
use crate::core::{render_signup_email, SIGNUP_SUBJECT};
use crate::models::SignupNotification;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use thiserror::Error;

/// SMTPS port; everything else negotiates STARTTLS when offered
const IMPLICIT_TLS_PORT: u16 = 465;

/// Errors that can occur while sending the signup confirmation
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("One or more required values for sending email are missing: {0}")]
    MissingCredentials(String),

    #[error("Invalid SMTP port: {0}")]
    InvalidPort(String),

    #[error("No sender address configured")]
    MissingSender,

    #[error("Invalid email address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    MessageError(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    DeliveryError(#[from] lettre::transport::smtp::Error),
}

/// SMTP connection parameters, all present
#[derive(Debug, Clone)]
pub struct SmtpCredentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl SmtpCredentials {
    /// Pull the connection parameters out of the email settings
    ///
    /// Fails naming every missing field; empty strings count as missing.
    /// A port that is present but not a valid port number is reported after
    /// the missing fields.
    pub fn from_settings(settings: &EmailSettings) -> Result<Self, NotificationError> {
        fn present(value: &Option<String>) -> Option<String> {
            value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
        }

        let host = present(&settings.host);
        let port = present(&settings.port);
        let user = present(&settings.user);
        let password = present(&settings.password);

        match (host, port, user, password) {
            (Some(host), Some(port), Some(user), Some(password)) => {
                let port = match port.trim().parse::<u16>() {
                    Ok(port) if port != 0 => port,
                    _ => return Err(NotificationError::InvalidPort(port)),
                };

                Ok(Self {
                    host,
                    port,
                    user,
                    password,
                })
            }
            (host, port, user, password) => {
                let missing = [
                    ("host", host.is_none()),
                    ("port", port.is_none()),
                    ("user", user.is_none()),
                    ("password", password.is_none()),
                ]
                .iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", ");

                Err(NotificationError::MissingCredentials(missing))
            }
        }
    }
}

/// Hands a finished message to a mail relay
#[async_trait]
pub trait MailRelay: Send + Sync {
    async fn deliver(
        &self,
        credentials: &SmtpCredentials,
        message: Message,
    ) -> Result<(), NotificationError>;
}

/// Delivers over SMTP, opening a fresh connection for every message
///
/// Certificate validation is switched off: the relay the service talks to
/// presents a certificate that does not verify.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtpRelay;

#[async_trait]
impl MailRelay for SmtpRelay {
    async fn deliver(
        &self,
        credentials: &SmtpCredentials,
        message: Message,
    ) -> Result<(), NotificationError> {
        let tls_parameters = TlsParameters::builder(credentials.host.clone())
            .dangerous_accept_invalid_certs(true)
            .build()?;

        let tls = if credentials.port == IMPLICIT_TLS_PORT {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(credentials.host.as_str())
            .port(credentials.port)
            .credentials(Credentials::new(
                credentials.user.clone(),
                credentials.password.clone(),
            ))
            .tls(tls)
            .build();

        let response = transport.send(message).await?;
        tracing::debug!("SMTP relay accepted message: {:?}", response.code());

        Ok(())
    }
}

/// Signup confirmation sender
pub struct Mailer {
    settings: EmailSettings,
    relay: Arc<dyn MailRelay>,
}

impl Mailer {
    pub fn new(settings: EmailSettings, relay: Arc<dyn MailRelay>) -> Self {
        Self { settings, relay }
    }

    /// Mailer delivering through the configured SMTP relay
    pub fn smtp(settings: EmailSettings) -> Self {
        Self::new(settings, Arc::new(SmtpRelay))
    }

    /// Check the relay credentials without sending anything
    pub fn credentials(&self) -> Result<SmtpCredentials, NotificationError> {
        SmtpCredentials::from_settings(&self.settings)
    }

    /// Build the confirmation message and the Message-ID assigned to it
    pub fn compose(
        &self,
        notification: &SignupNotification,
    ) -> Result<(Message, String), NotificationError> {
        let sender = self
            .settings
            .sender_address
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(NotificationError::MissingSender)?;

        let from: Mailbox = sender.parse()?;
        let to: Mailbox = notification.email.trim().parse()?;

        let message_id = format!("<{}@{}>", uuid::Uuid::new_v4(), from.email.domain());

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(SIGNUP_SUBJECT)
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(render_signup_email(notification))?;

        Ok((message, message_id))
    }

    /// Send the signup confirmation, returning its Message-ID
    ///
    /// Takes credentials from [`Mailer::credentials`] so callers check them
    /// before reading the request body.
    #[tracing::instrument(skip_all)]
    pub async fn send_signup_confirmation(
        &self,
        credentials: &SmtpCredentials,
        notification: &SignupNotification,
    ) -> Result<String, NotificationError> {
        let (message, message_id) = self.compose(notification)?;

        tracing::debug!(
            "Sending signup confirmation {} via {}:{}",
            message_id,
            credentials.host,
            credentials.port
        );

        self.relay.deliver(credentials, message).await?;

        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RentRange;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRelay {
        sent: Mutex<Vec<(String, Vec<u8>)>>,
    }

    #[async_trait]
    impl MailRelay for RecordingRelay {
        async fn deliver(
            &self,
            credentials: &SmtpCredentials,
            message: Message,
        ) -> Result<(), NotificationError> {
            self.sent
                .lock()
                .unwrap()
                .push((credentials.host.clone(), message.formatted()));
            Ok(())
        }
    }

    fn settings() -> EmailSettings {
        EmailSettings {
            host: Some("smtp.example.com".to_string()),
            port: Some("587".to_string()),
            user: Some("mailer".to_string()),
            password: Some("secret".to_string()),
            sender_address: Some("signup@example.com".to_string()),
        }
    }

    fn notification() -> SignupNotification {
        SignupNotification {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@x.com".to_string(),
            phone: "555-1234".to_string(),
            address: "1 Main St".to_string(),
            range: RentRange { low: 1000.0, high: 1200.0 },
            rent: 1100.0,
            client_ip: None,
        }
    }

    #[test]
    fn test_credentials_complete() {
        let creds = SmtpCredentials::from_settings(&settings()).unwrap();
        assert_eq!(creds.host, "smtp.example.com");
        assert_eq!(creds.port, 587);
    }

    #[test]
    fn test_credentials_report_each_missing_field() {
        let mut s = settings();
        s.host = None;
        s.password = Some("   ".to_string());

        match SmtpCredentials::from_settings(&s) {
            Err(NotificationError::MissingCredentials(missing)) => {
                assert_eq!(missing, "host, password");
            }
            other => panic!("expected missing credentials, got {:?}", other),
        }
    }

    #[test]
    fn test_compose_sets_headers() {
        let mailer = Mailer::new(settings(), Arc::new(RecordingRelay::default()));
        let (message, message_id) = mailer.compose(&notification()).unwrap();

        assert!(message_id.starts_with('<'));
        assert!(message_id.ends_with("@example.com>"));

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Thank you for signing up!"));
        assert!(raw.contains("To: jane@x.com"));
        assert!(raw.contains("From: signup@example.com"));
        assert!(raw.contains(&message_id));
    }

    #[test]
    fn test_compose_rejects_bad_recipient() {
        let mailer = Mailer::new(settings(), Arc::new(RecordingRelay::default()));
        let mut n = notification();
        n.email = "not an address".to_string();

        assert!(matches!(
            mailer.compose(&n),
            Err(NotificationError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_send_delivers_once() {
        let relay = Arc::new(RecordingRelay::default());
        let mailer = Mailer::new(settings(), relay.clone());

        let credentials = mailer.credentials().unwrap();
        let message_id = mailer
            .send_signup_confirmation(&credentials, &notification())
            .await
            .unwrap();

        let sent = relay.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "smtp.example.com");
        assert!(!message_id.is_empty());
    }

    #[test]
    fn test_missing_port_reported() {
        let mut s = settings();
        s.port = None;
        let mailer = Mailer::new(s, Arc::new(RecordingRelay::default()));

        match mailer.credentials() {
            Err(NotificationError::MissingCredentials(missing)) => assert_eq!(missing, "port"),
            other => panic!("expected missing port, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_port_rejected_when_used() {
        for bad in ["smtp", "70000", "0"] {
            let mut s = settings();
            s.port = Some(bad.to_string());

            match SmtpCredentials::from_settings(&s) {
                Err(NotificationError::InvalidPort(port)) => assert_eq!(port, bad),
                other => panic!("expected invalid port for {}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_port_with_whitespace_accepted() {
        let mut s = settings();
        s.port = Some(" 465 ".to_string());

        assert_eq!(SmtpCredentials::from_settings(&s).unwrap().port, 465);
    }
}
