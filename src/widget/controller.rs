//! The chat widget controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::task::JoinHandle;
use tracing::Instrument;

use super::{
    ChatBackend, FALLBACK_MESSAGE, InputField, Message, MessageLog, PanelState, PanelView,
    WidgetEvent,
};

/// Key that submits the input.
const SUBMIT_KEY: &str = "Enter";

/// Controller binding the injected UI capabilities to the chat backend.
///
/// Submitting spawns a Tokio task per request, so [`ChatWidget::submit`]
/// and [`ChatWidget::handle`] must be called from within a runtime.
/// Overlapping requests are not serialized: replies render in the order
/// they arrive.
pub struct ChatWidget {
    panel: Arc<dyn PanelView>,
    log: Arc<dyn MessageLog>,
    input: Arc<dyn InputField>,
    backend: Arc<dyn ChatBackend>,
    open: AtomicBool,
    next_seq: AtomicU64,
}

impl std::fmt::Debug for ChatWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("panel", &self.panel_state())
            .field("next_seq", &self.next_seq.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ChatWidget {
    /// Create a controller. The panel starts closed.
    #[must_use]
    pub fn new(
        panel: Arc<dyn PanelView>,
        log: Arc<dyn MessageLog>,
        input: Arc<dyn InputField>,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            panel,
            log,
            input,
            backend,
            open: AtomicBool::new(false),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Current panel visibility.
    #[must_use]
    pub fn panel_state(&self) -> PanelState {
        PanelState::from(self.open.load(Ordering::SeqCst))
    }

    /// Dispatch a UI event.
    ///
    /// Returns the pending reply task when the event caused a submit.
    pub fn handle(&self, event: WidgetEvent) -> Option<JoinHandle<()>> {
        match event {
            WidgetEvent::Toggle => {
                self.toggle();
                None
            }
            WidgetEvent::Send => self.submit(),
            WidgetEvent::Key(key) if key == SUBMIT_KEY => self.submit(),
            WidgetEvent::Key(_) => None,
        }
    }

    /// Flip the panel. Opening it focuses the text field.
    pub fn toggle(&self) -> PanelState {
        let state = PanelState::from(self.open.fetch_xor(true, Ordering::SeqCst)).toggled();

        self.panel.set_visible(state.is_open());
        if state.is_open() {
            self.panel.focus_input();
        }

        tracing::debug!(name: "widget.panel.toggled", open = state.is_open(), "Panel toggled");
        state
    }

    /// Submit the pending input.
    ///
    /// Whitespace-only input is ignored and returns `None`. Otherwise the
    /// user message is rendered and the input cleared before this returns;
    /// the reply is rendered by the returned task.
    pub fn submit(&self) -> Option<JoinHandle<()>> {
        let text = self.input.value().trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.render(&Message::user(text.as_str()));
        self.input.clear();

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let backend = Arc::clone(&self.backend);
        let log = Arc::clone(&self.log);
        let span = tracing::info_span!("widget.request", seq);

        let task = async move {
            tracing::debug!(message_length = text.len(), "Sending chat message");

            let reply = match backend.send(&text).await {
                Ok(response) => Message::bot(response),
                Err(e) => {
                    tracing::error!(
                        name: "widget.request.failed",
                        kind = ?e.kind(),
                        error = &e as &(dyn std::error::Error + 'static),
                        "Chat request failed"
                    );
                    Message::bot(FALLBACK_MESSAGE)
                }
            };

            render_into(log.as_ref(), &reply);
        };

        Some(tokio::spawn(task.instrument(span)))
    }

    /// Append `message` to the log and scroll to the bottom.
    pub fn render(&self, message: &Message) {
        render_into(self.log.as_ref(), message);
    }
}

fn render_into(log: &dyn MessageLog, message: &Message) {
    log.append(message);
    log.scroll_to_bottom();
}
