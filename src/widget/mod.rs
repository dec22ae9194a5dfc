//! Chat widget controller.
//!
//! The controller is a thin glue layer between a UI surface and the chat
//! backend. It never touches a concrete document: every UI capability it
//! needs is injected at construction time.
//!
//! # Capabilities
//!
//! - [`PanelView`]: show or hide the panel and focus the text field
//! - [`MessageLog`]: append a rendered message and scroll to the bottom
//! - [`InputField`]: read and clear the pending input
//! - [`ChatBackend`]: exchange one message for one reply
//!
//! # Example
//!
//! ```rust,ignore
//! use olive_chat::widget::{ChatWidget, HttpChatBackend, WidgetEvent};
//!
//! let backend = Arc::new(HttpChatBackend::new("http://127.0.0.1:8000")?);
//! let widget = ChatWidget::new(panel, log, input, backend);
//!
//! widget.handle(WidgetEvent::Toggle);
//! if let Some(pending) = widget.handle(WidgetEvent::Key("Enter".into())) {
//!     pending.await?;
//! }
//! ```

pub mod backend;
pub mod controller;

pub use backend::HttpChatBackend;
pub use controller::ChatWidget;

use thiserror::Error;

/// Bot text shown whenever a request fails, whatever the cause.
pub const FALLBACK_MESSAGE: &str = "Sorry, I encountered an error. Please try again later.";

/// Author of a rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    /// Text typed by the user.
    User,
    /// Reply (or fallback) from the backend.
    Bot,
}

impl Sender {
    /// Style class attached to the rendered node.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::User => "user-message",
            Self::Bot => "bot-message",
        }
    }
}

/// A single entry in the message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    sender: Sender,
}

impl Message {
    /// Create a message typed by the user.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
        }
    }

    /// Create a message from the bot.
    #[must_use]
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
        }
    }

    /// The message text, verbatim.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Who wrote the message.
    #[must_use]
    pub fn sender(&self) -> Sender {
        self.sender
    }
}

/// Panel visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanelState {
    /// Hidden. The initial state.
    #[default]
    Closed,
    /// Visible.
    Open,
}

impl PanelState {
    /// Whether the panel is visible.
    #[must_use]
    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    /// The opposite state.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Open => Self::Closed,
            Self::Closed => Self::Open,
        }
    }
}

impl From<bool> for PanelState {
    fn from(open: bool) -> Self {
        if open { Self::Open } else { Self::Closed }
    }
}

/// UI events the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// The toggle control was activated.
    Toggle,
    /// The send control was activated.
    Send,
    /// A key was pressed while the text field had focus.
    Key(String),
}

/// Coarse classification of [`ChatError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a usable reply body.
    TransportOrParse,
    /// The backend answered and explicitly reported a failure.
    Application,
}

/// Errors produced while exchanging a message with the backend.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The request could not be sent or the body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The reply body was not a JSON object.
    #[error("unreadable reply: {0}")]
    Decode(#[from] serde_json::Error),

    /// The reply carried neither an error nor a string response.
    #[error("reply has no response field")]
    MissingResponse,

    /// The backend reported an error.
    #[error("backend error: {0}")]
    Application(String),
}

impl ChatError {
    /// Which of the two user-indistinguishable failure kinds this is.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Application(_) => ErrorKind::Application,
            Self::Transport(_) | Self::Decode(_) | Self::MissingResponse => {
                ErrorKind::TransportOrParse
            }
        }
    }
}

/// Panel visibility and focus control.
pub trait PanelView: Send + Sync {
    /// Show or hide the panel.
    fn set_visible(&self, visible: bool);
    /// Move keyboard focus to the text field.
    fn focus_input(&self);
}

/// Sink for rendered messages.
///
/// Implementations must display [`Message::text`] as plain text.
pub trait MessageLog: Send + Sync {
    /// Append a node for `message`, tagged with its sender.
    fn append(&self, message: &Message);
    /// Scroll the log to its maximum offset.
    fn scroll_to_bottom(&self);
}

/// Accessor for the pending input.
pub trait InputField: Send + Sync {
    /// Current text in the field.
    fn value(&self) -> String;
    /// Empty the field.
    fn clear(&self);
}

/// One request/response exchange with the chat backend.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send `message` and return the bot reply text.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, an unreadable reply, or a
    /// reply that reports an error.
    async fn send(&self, message: &str) -> Result<String, ChatError>;
}
