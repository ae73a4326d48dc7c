use crate::domain::subscription::{SubscriptionData, Unsubscribed};
use crate::envelope::{Envelope, EnvelopeError, ErrorCode};
use crate::source::DataSource;
use crate::subscription::email::{validate_email, EmailError};

/// Message fragments services use to refuse a repeat subscription.
const DUPLICATE_MARKERS: [&str; 2] = ["already subscribed", "이미 구독"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Subscribe,
    Unsubscribe,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Acknowledgement {
    Subscribed(SubscriptionData),
    AlreadySubscribed { email: String },
    Unsubscribed { email: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormFailure {
    Validation(EmailError),
    /// Unsubscribe of an address with no active subscription.
    NotSubscribed(String),
    Remote(EnvelopeError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Idle,
    Validating,
    Submitting { email: String },
    Succeeded(Acknowledgement),
    Failed(FormFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub message: String,
}

/// Validated submission handed to the data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub action: FormAction,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Subscribe(Envelope<SubscriptionData>),
    Unsubscribe(Envelope<Unsubscribed>),
}

/// One email form. Subscribe and unsubscribe each get their own instance and
/// never share input or state.
#[derive(Debug, Clone)]
pub struct EmailForm {
    action: FormAction,
    input: String,
    state: FormState,
}

impl EmailForm {
    pub fn subscribe() -> Self {
        Self::new(FormAction::Subscribe)
    }

    pub fn unsubscribe() -> Self {
        Self::new(FormAction::Unsubscribe)
    }

    fn new(action: FormAction) -> Self {
        Self {
            action,
            input: String::new(),
            state: FormState::Idle,
        }
    }

    pub fn action(&self) -> FormAction {
        self.action
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, FormState::Submitting { .. })
    }

    /// Replaces the input and drops any previous outcome. Ignored (returns
    /// `false`) while a submission is in flight.
    pub fn set_input(&mut self, value: impl Into<String>) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.input = value.into();
        self.state = FormState::Idle;
        true
    }

    pub fn can_submit(&self) -> bool {
        !self.is_submitting()
    }

    pub fn begin_submit(&mut self) -> Option<PendingSubmission> {
        if self.is_submitting() {
            return None;
        }

        self.state = FormState::Validating;
        match validate_email(&self.input) {
            Ok(email) => {
                self.state = FormState::Submitting {
                    email: email.clone(),
                };
                Some(PendingSubmission {
                    action: self.action,
                    email,
                })
            }
            Err(e) => {
                self.state = FormState::Failed(FormFailure::Validation(e));
                None
            }
        }
    }

    pub fn complete(&mut self, outcome: SubmissionOutcome) -> &FormState {
        let email = match &self.state {
            FormState::Submitting { email } => email.clone(),
            _ => {
                tracing::debug!(action = ?self.action, "submission outcome arrived with no pending submission");
                return &self.state;
            }
        };

        let next = match outcome {
            SubmissionOutcome::Subscribe(env) => subscribe_state(env, email),
            SubmissionOutcome::Unsubscribe(env) => unsubscribe_state(env, email),
        };

        let clears_input = matches!(
            next,
            FormState::Succeeded(Acknowledgement::Subscribed(_))
                | FormState::Succeeded(Acknowledgement::Unsubscribed { .. })
        );
        if clears_input {
            self.input.clear();
        }

        self.state = next;
        &self.state
    }

    /// Validate, call the source, and settle on the resulting state.
    pub async fn submit(&mut self, source: &dyn DataSource) -> &FormState {
        let Some(pending) = self.begin_submit() else {
            return &self.state;
        };

        tracing::debug!(action = ?pending.action, "submitting email form");
        let outcome = match pending.action {
            FormAction::Subscribe => SubmissionOutcome::Subscribe(source.subscribe(&pending.email).await),
            FormAction::Unsubscribe => {
                SubmissionOutcome::Unsubscribe(source.unsubscribe(&pending.email).await)
            }
        };
        self.complete(outcome)
    }

    pub fn notice(&self) -> Option<Notice> {
        let (tone, message) = match &self.state {
            FormState::Idle | FormState::Validating | FormState::Submitting { .. } => return None,
            FormState::Succeeded(Acknowledgement::Subscribed(data)) => (
                Tone::Success,
                format!("Subscribed {}. Reports arrive every weekday at 9 AM.", data.email),
            ),
            FormState::Succeeded(Acknowledgement::AlreadySubscribed { email }) => {
                (Tone::Info, format!("{email} is already subscribed."))
            }
            FormState::Succeeded(Acknowledgement::Unsubscribed { email }) => {
                (Tone::Success, format!("Unsubscribed {email}."))
            }
            FormState::Failed(FormFailure::Validation(e)) => (Tone::Error, e.to_string()),
            FormState::Failed(FormFailure::NotSubscribed(message)) => (Tone::Error, message.clone()),
            FormState::Failed(FormFailure::Remote(e)) => (Tone::Error, e.message.clone()),
        };
        Some(Notice { tone, message })
    }
}

fn is_duplicate(err: &EnvelopeError) -> bool {
    err.is(ErrorCode::Conflict)
        || DUPLICATE_MARKERS
            .iter()
            .any(|m| err.message.to_lowercase().contains(m))
}

fn subscribe_state(env: Envelope<SubscriptionData>, email: String) -> FormState {
    match env.into_result() {
        Ok(data) if data.is_new_subscriber() => FormState::Succeeded(Acknowledgement::Subscribed(data)),
        Ok(data) => FormState::Succeeded(Acknowledgement::AlreadySubscribed {
            email: if data.email.is_empty() { email } else { data.email },
        }),
        Err(err) if is_duplicate(&err) => {
            FormState::Succeeded(Acknowledgement::AlreadySubscribed { email })
        }
        Err(err) => FormState::Failed(FormFailure::Remote(err)),
    }
}

fn unsubscribe_state(env: Envelope<Unsubscribed>, email: String) -> FormState {
    match env.into_result() {
        Ok(ack) => FormState::Succeeded(Acknowledgement::Unsubscribed {
            email: if ack.email.is_empty() { email } else { ack.email },
        }),
        Err(err) if err.is(ErrorCode::NotFound) => {
            FormState::Failed(FormFailure::NotSubscribed(err.message))
        }
        Err(err) => FormState::Failed(FormFailure::Remote(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fixture::Fixture;
    use crate::source::{SimulatedDataSource, SimulatedLatency};
    use chrono::{TimeZone, Utc};

    fn source() -> SimulatedDataSource {
        let as_of = Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap();
        SimulatedDataSource::new(Fixture::load(as_of).unwrap(), SimulatedLatency::none())
    }

    #[test]
    fn invalid_input_fails_without_submitting() {
        let mut form = EmailForm::subscribe();
        form.set_input("not-an-email");
        assert!(form.begin_submit().is_none());
        assert_eq!(
            form.state(),
            &FormState::Failed(FormFailure::Validation(EmailError::Malformed))
        );

        form.set_input("");
        assert!(form.begin_submit().is_none());
        assert_eq!(form.notice().unwrap().tone, Tone::Error);
    }

    #[test]
    fn input_is_locked_while_submitting() {
        let mut form = EmailForm::subscribe();
        form.set_input("a@b.co");
        let pending = form.begin_submit().unwrap();
        assert_eq!(pending.email, "a@b.co");
        assert!(!form.can_submit());
        assert!(!form.set_input("other@b.co"));
        assert!(form.begin_submit().is_none());
        assert_eq!(form.input(), "a@b.co");
    }

    #[test]
    fn next_input_returns_to_idle() {
        let mut form = EmailForm::subscribe();
        form.set_input("bad");
        form.begin_submit();
        assert!(matches!(form.state(), FormState::Failed(_)));
        form.set_input("bad@");
        assert_eq!(form.state(), &FormState::Idle);
    }

    #[tokio::test]
    async fn repeat_subscribe_is_acknowledged_not_failed() {
        let source = source();
        let mut form = EmailForm::subscribe();

        form.set_input("trader@example.com");
        let state = form.submit(&source).await.clone();
        assert!(matches!(state, FormState::Succeeded(Acknowledgement::Subscribed(_))));
        assert_eq!(form.input(), "");

        form.set_input("trader@example.com");
        let state = form.submit(&source).await.clone();
        assert_eq!(
            state,
            FormState::Succeeded(Acknowledgement::AlreadySubscribed {
                email: "trader@example.com".into()
            })
        );
        assert_eq!(form.input(), "trader@example.com");
        assert_eq!(form.notice().unwrap().tone, Tone::Info);
        assert_eq!(source.subscription_count().await, 1);
    }

    #[test]
    fn duplicate_refusals_from_services_are_acknowledgements() {
        let mut form = EmailForm::subscribe();
        form.set_input("a@b.co");
        form.begin_submit();
        let state = form.complete(SubmissionOutcome::Subscribe(Envelope::fail(
            ErrorCode::Unknown,
            "이미 구독 중인 이메일입니다.",
        )));
        assert!(matches!(
            state,
            FormState::Succeeded(Acknowledgement::AlreadySubscribed { .. })
        ));

        form.set_input("a@b.co");
        form.begin_submit();
        let state = form.complete(SubmissionOutcome::Subscribe(Envelope::fail(
            ErrorCode::Conflict,
            "duplicate",
        )));
        assert!(matches!(
            state,
            FormState::Succeeded(Acknowledgement::AlreadySubscribed { .. })
        ));
    }

    #[tokio::test]
    async fn unsubscribing_unknown_address_is_a_visible_failure() {
        let source = source();
        let mut form = EmailForm::unsubscribe();
        form.set_input("ghost@example.com");
        let state = form.submit(&source).await.clone();
        assert!(matches!(state, FormState::Failed(FormFailure::NotSubscribed(_))));
        assert_eq!(form.input(), "ghost@example.com");
        assert_eq!(form.notice().unwrap().tone, Tone::Error);
    }

    #[tokio::test]
    async fn unsubscribe_after_subscribe_clears_input() {
        let source = source();
        let mut sub = EmailForm::subscribe();
        sub.set_input("keep@example.com");
        sub.submit(&source).await;

        let mut unsub = EmailForm::unsubscribe();
        unsub.set_input("keep@example.com");
        let state = unsub.submit(&source).await.clone();
        assert_eq!(
            state,
            FormState::Succeeded(Acknowledgement::Unsubscribed {
                email: "keep@example.com".into()
            })
        );
        assert_eq!(unsub.input(), "");
        assert_eq!(source.subscription_count().await, 0);
    }

    #[test]
    fn bare_unsubscribe_ack_names_the_submitted_address() {
        let mut form = EmailForm::unsubscribe();
        form.set_input("quiet@example.com");
        form.begin_submit();
        let state = form.complete(SubmissionOutcome::Unsubscribe(Envelope::ok(Unsubscribed::default())));
        assert_eq!(
            state,
            &FormState::Succeeded(Acknowledgement::Unsubscribed {
                email: "quiet@example.com".into()
            })
        );
        assert_eq!(form.notice().unwrap().message, "Unsubscribed quiet@example.com.");
    }

    #[test]
    fn transport_failure_is_remote_error() {
        let mut form = EmailForm::subscribe();
        form.set_input("a@b.co");
        form.begin_submit();
        let state = form.complete(SubmissionOutcome::Subscribe(Envelope::fail(
            ErrorCode::Transport,
            "Network error",
        )));
        assert!(matches!(state, FormState::Failed(FormFailure::Remote(e)) if e.is(ErrorCode::Transport)));
    }
}
