//! Terminal frontend for the chat widget.
//!
//! [`ConsoleView`] provides every UI capability the controller needs on top
//! of a line-oriented writer; [`run_console`] wires it to stdin and an
//! [`HttpChatBackend`].

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::AppConfig;
use crate::widget::{
    ChatWidget, HttpChatBackend, InputField, Message, MessageLog, PanelView, Sender, WidgetEvent,
};

const TOGGLE_COMMAND: &str = "/toggle";
const QUIT_COMMAND: &str = "/quit";

/// Console implementation of the widget's UI capabilities.
#[derive(Debug)]
pub struct ConsoleView<W> {
    visible: AtomicBool,
    input: Mutex<String>,
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleView<W> {
    /// Create a view writing to `out`. The panel starts hidden.
    pub fn new(out: W) -> Self {
        Self {
            visible: AtomicBool::new(false),
            input: Mutex::new(String::new()),
            out: Mutex::new(out),
        }
    }

    /// Whether the panel is currently shown.
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    /// Replace the pending input, as if the user had typed `text`.
    pub fn type_text(&self, text: &str) {
        let mut input = self.input.lock().unwrap_or_else(PoisonError::into_inner);
        input.clear();
        input.push_str(text);
    }

    /// Print a status line outside the message log.
    pub fn notice(&self, text: &str) {
        self.write_line(&format!("-- {text} --"));
    }

    /// Consume the view and return the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{line}") {
            tracing::warn!(error = %e, "Failed to write to console");
        }
    }
}

impl<W: Write + Send> PanelView for ConsoleView<W> {
    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
        self.notice(if visible { "chat opened" } else { "chat closed" });
    }

    fn focus_input(&self) {}
}

impl<W: Write + Send> MessageLog for ConsoleView<W> {
    fn append(&self, message: &Message) {
        let label = match message.sender() {
            Sender::User => "you",
            Sender::Bot => "olive",
        };
        self.write_line(&format!("{label}> {}", message.text()));
    }

    fn scroll_to_bottom(&self) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.flush() {
            tracing::warn!(error = %e, "Failed to flush console");
        }
    }
}

impl<W: Write + Send> InputField for ConsoleView<W> {
    fn value(&self) -> String {
        self.input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) {
        self.input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Chat with the server at `config.widget.backend_url` from stdin/stdout.
///
/// Returns after `/quit` or end of input, once every pending reply has
/// been rendered.
pub async fn run_console(config: &AppConfig) -> anyhow::Result<()> {
    let backend = Arc::new(HttpChatBackend::new(&config.widget.backend_url)?);
    tracing::info!(
        name: "console.started",
        endpoint = %backend.endpoint(),
        "Console chat started"
    );

    let view = Arc::new(ConsoleView::new(std::io::stdout()));
    let widget = ChatWidget::new(
        Arc::clone(&view) as Arc<dyn PanelView>,
        Arc::clone(&view) as Arc<dyn MessageLog>,
        Arc::clone(&view) as Arc<dyn InputField>,
        backend,
    );

    widget.handle(WidgetEvent::Toggle);
    view.notice(&format!(
        "type a message and press Enter; {TOGGLE_COMMAND} hides the chat, {QUIT_COMMAND} exits"
    ));

    let mut pending = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            QUIT_COMMAND => break,
            TOGGLE_COMMAND => {
                widget.handle(WidgetEvent::Toggle);
            }
            _ if !view.is_visible() => {
                view.notice(&format!("chat is closed; type {TOGGLE_COMMAND} to open it"));
            }
            _ => {
                view.type_text(&line);
                pending.extend(widget.handle(WidgetEvent::Key("Enter".to_string())));
            }
        }
    }

    for result in futures::future::join_all(pending).await {
        if let Err(e) = result {
            tracing::error!(error = %e, "Reply task failed");
        }
    }

    Ok(())
}
