//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use olive_chat::widget::{
    ChatBackend, ChatError, ChatWidget, InputField, Message, MessageLog, PanelView,
};
use tokio::sync::oneshot;

/// In-memory UI surface recording every call the controller makes.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub visibility: Mutex<Vec<bool>>,
    pub focus_count: AtomicUsize,
    pub log: Mutex<Vec<Message>>,
    pub scroll_count: AtomicUsize,
    pub input: Mutex<String>,
}

impl RecordingView {
    pub fn type_text(&self, text: &str) {
        *self.input.lock().unwrap() = text.to_string();
    }

    pub fn input(&self) -> String {
        self.input.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.log.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.messages()
            .iter()
            .map(|m| m.text().to_string())
            .collect()
    }
}

impl PanelView for RecordingView {
    fn set_visible(&self, visible: bool) {
        self.visibility.lock().unwrap().push(visible);
    }

    fn focus_input(&self) {
        self.focus_count.fetch_add(1, Ordering::SeqCst);
    }
}

impl MessageLog for RecordingView {
    fn append(&self, message: &Message) {
        self.log.lock().unwrap().push(message.clone());
    }

    fn scroll_to_bottom(&self) {
        self.scroll_count.fetch_add(1, Ordering::SeqCst);
    }
}

impl InputField for RecordingView {
    fn value(&self) -> String {
        self.input()
    }

    fn clear(&self) {
        self.input.lock().unwrap().clear();
    }
}

/// Backend answering from a queue of canned results.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, ChatError>>>,
    pub sent: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<String, ChatError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatBackend for ScriptedBackend {
    async fn send(&self, message: &str) -> Result<String, ChatError> {
        self.sent.lock().unwrap().push(message.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::MissingResponse))
    }
}

/// Backend whose replies are released by the test, one message at a time.
#[derive(Debug, Default)]
pub struct GatedBackend {
    gates: Mutex<HashMap<String, oneshot::Receiver<Result<String, ChatError>>>>,
}

impl GatedBackend {
    /// Register `message`; the returned sender releases its reply.
    pub fn gate(&self, message: &str) -> oneshot::Sender<Result<String, ChatError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(message.to_string(), rx);
        tx
    }
}

#[async_trait::async_trait]
impl ChatBackend for GatedBackend {
    async fn send(&self, message: &str) -> Result<String, ChatError> {
        let rx = self
            .gates
            .lock()
            .unwrap()
            .remove(message)
            .expect("message was not gated");
        rx.await
            .unwrap_or_else(|_| Err(ChatError::MissingResponse))
    }
}

/// A real connection-refused error from a port nothing listens on.
pub async fn transport_error() -> ChatError {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    reqwest::Client::new()
        .post(format!("http://{addr}/chat/"))
        .send()
        .await
        .unwrap_err()
        .into()
}

pub fn widget_with(backend: Arc<dyn ChatBackend>) -> (ChatWidget, Arc<RecordingView>) {
    let view = Arc::new(RecordingView::default());
    let widget = ChatWidget::new(
        Arc::clone(&view) as Arc<dyn PanelView>,
        Arc::clone(&view) as Arc<dyn MessageLog>,
        Arc::clone(&view) as Arc<dyn InputField>,
        backend,
    );
    (widget, view)
}
