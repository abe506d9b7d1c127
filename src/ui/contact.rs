//! Contact form state and the outbound mail relay.

use serde::Serialize;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_EMAILJS_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";
const RELAY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("please enter a valid email address")]
    InvalidEmail,
    #[error("email relay is not configured")]
    NotConfigured,
    #[error("relay rejected the message (HTTP {0})")]
    Rejected(u16),
    #[error("could not reach the relay: {0}")]
    Transport(String),
    #[error("relay worker stopped before answering")]
    WorkerDisconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub trait MailRelay: Send + Sync {
    fn send(&self, message: &ContactMessage) -> Result<(), ContactError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailJsRelay {
    endpoint: String,
    service_id: String,
    template_id: String,
    user_id: String,
}

#[derive(Serialize)]
struct EmailJsPayload<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a ContactMessage,
}

impl EmailJsRelay {
    pub fn new(endpoint: String, service_id: String, template_id: String, user_id: String) -> Self {
        Self {
            endpoint,
            service_id,
            template_id,
            user_id,
        }
    }

    fn payload<'a>(&'a self, message: &'a ContactMessage) -> EmailJsPayload<'a> {
        EmailJsPayload {
            service_id: &self.service_id,
            template_id: &self.template_id,
            user_id: &self.user_id,
            template_params: message,
        }
    }
}

impl MailRelay for EmailJsRelay {
    fn send(&self, message: &ContactMessage) -> Result<(), ContactError> {
        let agent = ureq::AgentBuilder::new().timeout(RELAY_TIMEOUT).build();
        match agent.post(&self.endpoint).send_json(self.payload(message)) {
            Ok(response) => {
                log::info!("Contact message relayed (HTTP {})", response.status());
                Ok(())
            }
            Err(ureq::Error::Status(code, _)) => Err(ContactError::Rejected(code)),
            Err(ureq::Error::Transport(transport)) => Err(ContactError::Transport(transport.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Sending,
    Sent,
    Failed(String),
}

/// Fields, validation, and the in-flight relay request of the contact form.
#[derive(Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    state: SubmitState,
    validation: Option<ContactError>,
    pending: Option<Receiver<Result<(), ContactError>>>,
}

impl ContactForm {
    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    pub fn validation_error(&self) -> Option<&ContactError> {
        self.validation.as_ref()
    }

    pub fn validate(&self) -> Result<ContactMessage, ContactError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();
        if name.is_empty() {
            return Err(ContactError::MissingField("name"));
        }
        if email.is_empty() {
            return Err(ContactError::MissingField("email"));
        }
        if !is_valid_email(email) {
            return Err(ContactError::InvalidEmail);
        }
        if message.is_empty() {
            return Err(ContactError::MissingField("message"));
        }
        Ok(ContactMessage {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
    }

    /// Validates the fields and hands the message to `relay` on a worker
    /// thread. Ignored while a send is already in flight.
    pub fn submit(&mut self, relay: Option<Arc<dyn MailRelay>>) {
        if self.state == SubmitState::Sending {
            return;
        }
        let message = match self.validate() {
            Ok(message) => message,
            Err(err) => {
                self.validation = Some(err);
                return;
            }
        };
        self.validation = None;

        let Some(relay) = relay else {
            log::warn!("Contact form submitted without relay credentials");
            self.state = SubmitState::Failed(ContactError::NotConfigured.to_string());
            return;
        };

        let (sender, receiver) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("contact-relay".to_string())
            .spawn(move || {
                let _ = sender.send(relay.send(&message));
            });
        match spawned {
            Ok(_) => {
                self.pending = Some(receiver);
                self.state = SubmitState::Sending;
            }
            Err(err) => {
                log::warn!("Failed to start contact relay worker: {err}");
                self.state = SubmitState::Failed(ContactError::Transport(err.to_string()).to_string());
            }
        }
    }

    /// Collects the relay result, if one has arrived.
    pub fn poll(&mut self) {
        let Some(receiver) = &self.pending else {
            return;
        };
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(ContactError::WorkerDisconnected),
        };
        self.pending = None;
        match result {
            Ok(()) => {
                self.name.clear();
                self.email.clear();
                self.message.clear();
                self.state = SubmitState::Sent;
            }
            Err(err) => {
                log::warn!("Contact relay failed: {err}");
                self.state = SubmitState::Failed(err.to_string());
            }
        }
    }
}

/// A non-empty local part, one `@`, and a dotted domain.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    struct FakeRelay {
        result: Result<(), ContactError>,
        sent: Mutex<Vec<ContactMessage>>,
    }

    impl FakeRelay {
        fn new(result: Result<(), ContactError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    impl MailRelay for FakeRelay {
        fn send(&self, message: &ContactMessage) -> Result<(), ContactError> {
            self.sent.lock().unwrap().push(message.clone());
            self.result.clone()
        }
    }

    fn filled() -> ContactForm {
        ContactForm {
            name: " Ada ".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello".to_string(),
            ..ContactForm::default()
        }
    }

    fn wait_until_settled(form: &mut ContactForm) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while form.state() == &SubmitState::Sending && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
            form.poll();
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@.co"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("a@b@c.co"));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("plain"));
    }

    #[test]
    fn every_field_is_required() {
        let mut form = filled();
        form.message = "   ".to_string();
        assert_eq!(form.validate(), Err(ContactError::MissingField("message")));
        form.name.clear();
        assert_eq!(form.validate(), Err(ContactError::MissingField("name")));
    }

    #[test]
    fn invalid_form_does_not_reach_the_relay() {
        let relay = FakeRelay::new(Ok(()));
        let mut form = filled();
        form.email = "nope".to_string();
        form.submit(Some(relay.clone()));
        assert_eq!(form.state(), &SubmitState::Idle);
        assert_eq!(form.validation_error(), Some(&ContactError::InvalidEmail));
        assert!(relay.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_relay_fails_immediately() {
        let mut form = filled();
        form.submit(None);
        assert_eq!(
            form.state(),
            &SubmitState::Failed(ContactError::NotConfigured.to_string())
        );
        assert_eq!(form.name, " Ada ");
    }

    #[test]
    fn successful_send_clears_the_fields() {
        let relay = FakeRelay::new(Ok(()));
        let mut form = filled();
        form.submit(Some(relay.clone()));
        wait_until_settled(&mut form);
        assert_eq!(form.state(), &SubmitState::Sent);
        assert!(form.name.is_empty() && form.email.is_empty() && form.message.is_empty());
        let sent = relay.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].name, "Ada");
    }

    #[test]
    fn failed_send_keeps_fields_for_retry() {
        let relay = FakeRelay::new(Err(ContactError::Rejected(400)));
        let mut form = filled();
        form.submit(Some(relay.clone()));
        wait_until_settled(&mut form);
        assert_eq!(
            form.state(),
            &SubmitState::Failed(ContactError::Rejected(400).to_string())
        );
        assert_eq!(form.email, "ada@example.com");

        form.submit(Some(relay.clone()));
        wait_until_settled(&mut form);
        assert_eq!(relay.sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn emailjs_payload_shape() {
        let relay = EmailJsRelay::new(
            DEFAULT_EMAILJS_ENDPOINT.to_string(),
            "service".to_string(),
            "template".to_string(),
            "user".to_string(),
        );
        let message = ContactMessage {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hi".to_string(),
        };
        let value = serde_json::to_value(relay.payload(&message)).unwrap();
        assert_eq!(value["service_id"], "service");
        assert_eq!(value["template_id"], "template");
        assert_eq!(value["user_id"], "user");
        assert_eq!(value["template_params"]["name"], "Ada");
        assert_eq!(value["template_params"]["email"], "ada@example.com");
        assert_eq!(value["template_params"]["message"], "Hi");
    }
}
