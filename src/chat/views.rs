//! View state for the login, register and chat screens.
//!
//! Each view owns its form fields and whatever the user currently sees, and
//! calls exactly one [`Backend`] method per user action.  Errors stop here: they
//! become the view's displayed message (or a bot turn, for chat) and are never
//! propagated further.

use std::mem;

use crate::client::Backend;
use crate::error::{Error, Result};
use crate::observability::{CHAT_QUERIES, CHAT_QUERY_FAILURES};
use crate::types::{AuthToken, ChatTurn};

/// Bot text appended when a query fails for any reason.
pub const FAILED_REPLY: &str = "Sorry, something went wrong.";

/// The screen to show next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The login form.
    Login,
    /// The registration form.
    Register,
    /// The chat screen.
    Chat,
}

/// Lifecycle of a login or register form.
///
/// `Idle → Submitting → {Success, Failed}`.  Neither outcome is terminal: the
/// form can be submitted again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormState {
    /// Waiting for input.
    #[default]
    Idle,
    /// A request is in flight.
    Submitting,
    /// The backend issued a token and it has been stored.
    Success,
    /// The last submission failed; see the view's error.
    Failed,
}

#[derive(Debug, Default)]
struct FormStatus {
    state: FormState,
    error: Option<String>,
}

impl FormStatus {
    fn reject(&mut self, message: String) {
        self.state = FormState::Idle;
        self.error = Some(message);
    }

    fn begin(&mut self) {
        self.state = FormState::Submitting;
        self.error = None;
    }

    fn finish(&mut self, result: Result<AuthToken>) -> Option<Navigation> {
        match result {
            Ok(_) => {
                self.state = FormState::Success;
                Some(Navigation::Chat)
            }
            Err(err) => {
                self.state = FormState::Failed;
                self.error = Some(err.user_message());
                None
            }
        }
    }
}

fn first_empty<'a>(fields: &[(&'a str, &str)]) -> Option<&'a str> {
    fields
        .iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
}

/////////////////////////////////////////////// Login //////////////////////////////////////////////

/// The login form.
#[derive(Debug, Default)]
pub struct LoginView {
    /// Email field.
    pub email: String,
    /// Password field.
    pub password: String,
    status: FormStatus,
}

impl LoginView {
    /// Creates an empty login form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current form state.
    pub fn state(&self) -> FormState {
        self.status.state
    }

    /// Message to display, if the last submission failed.
    pub fn error(&self) -> Option<&str> {
        self.status.error.as_deref()
    }

    /// True while a submission is in flight.
    pub fn is_loading(&self) -> bool {
        self.status.state == FormState::Submitting
    }

    /// Submit the form.
    ///
    /// Returns the screen to navigate to when the backend issued a token.  The
    /// token is already in the session store by then.
    pub async fn submit(&mut self, backend: &dyn Backend) -> Option<Navigation> {
        if let Some(field) = first_empty(&[
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
        ]) {
            self.status.reject(format!("Please enter your {field}."));
            return None;
        }
        self.status.begin();
        let result = backend.login(&self.email, &self.password).await;
        if result.is_ok() {
            self.password.clear();
        }
        self.status.finish(result)
    }
}

///////////////////////////////////////////// Register /////////////////////////////////////////////

/// The registration form.
#[derive(Debug, Default)]
pub struct RegisterView {
    /// Username field.
    pub username: String,
    /// Email field.
    pub email: String,
    /// Password field.
    pub password: String,
    status: FormStatus,
}

impl RegisterView {
    /// Creates an empty registration form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current form state.
    pub fn state(&self) -> FormState {
        self.status.state
    }

    /// Message to display, if the last submission failed.
    pub fn error(&self) -> Option<&str> {
        self.status.error.as_deref()
    }

    /// True while a submission is in flight.
    pub fn is_loading(&self) -> bool {
        self.status.state == FormState::Submitting
    }

    /// Submit the form.  Same contract as [`LoginView::submit`].
    pub async fn submit(&mut self, backend: &dyn Backend) -> Option<Navigation> {
        if let Some(field) = first_empty(&[
            ("username", self.username.as_str()),
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
        ]) {
            self.status.reject(format!("Please enter your {field}."));
            return None;
        }
        self.status.begin();
        let result = backend
            .register(&self.username, &self.email, &self.password)
            .await;
        if result.is_ok() {
            self.password.clear();
        }
        self.status.finish(result)
    }
}

/////////////////////////////////////////////// Chat ///////////////////////////////////////////////

/// A question taken from the chat input, not yet answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    question: String,
}

impl PendingQuery {
    /// The question as typed.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Ask the backend.  Failures become the [`FAILED_REPLY`] bot turn.
    pub async fn run(self, backend: &dyn Backend) -> Exchange {
        CHAT_QUERIES.click();
        match backend.query(&self.question).await {
            Ok(response) => Exchange {
                question: ChatTurn::user(self.question),
                reply: ChatTurn::bot(response.answer),
                error: None,
            },
            Err(err) => {
                CHAT_QUERY_FAILURES.click();
                Exchange {
                    question: ChatTurn::user(self.question),
                    reply: ChatTurn::bot(FAILED_REPLY),
                    error: Some(err),
                }
            }
        }
    }
}

/// A resolved query: the user's turn, the bot's turn, and the error if any.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// The user turn.
    pub question: ChatTurn,
    /// The bot turn.
    pub reply: ChatTurn,
    /// The failure behind a [`FAILED_REPLY`], if there was one.
    pub error: Option<Error>,
}

/// The chat screen.
///
/// Turns are only ever appended.  Dropping the view drops the conversation.
#[derive(Debug, Default)]
pub struct ChatView {
    input: String,
    turns: Vec<ChatTurn>,
    in_flight: usize,
}

impl ChatView {
    /// Creates an empty chat view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the input field's contents.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// The input field's contents.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// All turns so far, oldest first.
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Number of queries sent but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Take the input for sending.
    ///
    /// The input field is cleared immediately.  Blank input is left in place and
    /// nothing is sent.
    pub fn begin_send(&mut self) -> Option<PendingQuery> {
        if self.input.trim().is_empty() {
            return None;
        }
        self.in_flight += 1;
        Some(PendingQuery {
            question: mem::take(&mut self.input),
        })
    }

    /// Append a resolved exchange as a (user, bot) pair.
    ///
    /// Exchanges are appended in completion order.
    pub fn complete(&mut self, exchange: &Exchange) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.turns.push(exchange.question.clone());
        self.turns.push(exchange.reply.clone());
    }

    /// Send the current input and wait for the reply.
    ///
    /// Returns `None` when the input was blank.
    pub async fn send(&mut self, backend: &dyn Backend) -> Option<Exchange> {
        let pending = self.begin_send()?;
        let exchange = pending.run(backend).await;
        self.complete(&exchange);
        Some(exchange)
    }
}
