//! AdiBot chat relay.
//!
//! The relay keeps two sequences in step: the transcript posted to the
//! completion endpoint (seeded with the instruction turn) and the bubbles
//! shown to the user. A round appends the user's entry to both, then on
//! success one model entry to both. On failure only a fallback bubble is
//! added; the transcript keeps the user's turn and gains nothing else.
//!
//! One request may be outstanding at a time. The typing flag is raised for
//! exactly that window. The request runs on a spawned task, so a caller that
//! goes away mid-round (a disconnected HTTP client) never leaves a user turn
//! without its reply or fallback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use adiwiyata_core::clock::Clock;
use adiwiyata_core::models::attachment::Attachment;
use adiwiyata_core::models::chat::{ChatRole, ChatTurn, Part};
use adiwiyata_core::models::message::{DisplayMessage, FALLBACK_REPLY, Sender};
use adiwiyata_core::time::format_clock;
use adiwiyata_gemini::client::CompletionClient;
use adiwiyata_gemini::text::strip_escapes;
use jiff::tz::TimeZone;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::BoardError;

/// Everything the chat panel renders, plus the transcript behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatState {
    pub transcript: Vec<ChatTurn>,
    pub messages: Vec<DisplayMessage>,
    pub pending_attachment: Option<Attachment>,
    pub typing: bool,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            transcript: vec![ChatTurn::seed()],
            messages: Vec::new(),
            pending_attachment: None,
            typing: false,
        }
    }
}

/// How a send attempt ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum SendOutcome {
    /// Nothing to send.
    Ignored,
    /// A request is already outstanding.
    Busy,
    /// The relay was closed before or during the round.
    Discarded,
    /// The model replied; carries the bot bubble.
    Replied(DisplayMessage),
    /// The round failed; carries the fallback bubble.
    Failed(DisplayMessage),
}

pub struct ChatRelay {
    client: Arc<dyn CompletionClient>,
    clock: Arc<dyn Clock>,
    zone: TimeZone,
    state: Mutex<ChatState>,
    changes: watch::Sender<u64>,
    closed: AtomicBool,
}

impl ChatRelay {
    pub fn new(client: Arc<dyn CompletionClient>, clock: Arc<dyn Clock>, zone: TimeZone) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            client,
            clock,
            zone,
            state: Mutex::new(ChatState::default()),
            changes,
            closed: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.changes.send_modify(|revision| *revision += 1);
    }

    fn sent_at(&self) -> String {
        format_clock(self.clock.now(), &self.zone)
    }

    pub fn state(&self) -> ChatState {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<DisplayMessage> {
        self.lock().messages.clone()
    }

    pub fn transcript(&self) -> Vec<ChatTurn> {
        self.lock().transcript.clone()
    }

    pub fn is_typing(&self) -> bool {
        self.lock().typing
    }

    pub fn has_attachment(&self) -> bool {
        self.lock().pending_attachment.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Observe changes to the message list and typing flag.
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Number of live [`watch`](Self::watch) receivers.
    pub fn observer_count(&self) -> usize {
        self.changes.receiver_count()
    }

    /// Encode `bytes` and hold them as the pending attachment, replacing any
    /// earlier one. Only images are accepted.
    pub fn attach(&self, bytes: &[u8], mime_type: &str) -> Result<(), BoardError> {
        let attachment = Attachment::from_bytes(bytes, mime_type);
        if !attachment.is_image() {
            return Err(BoardError::UnsupportedAttachment(mime_type.to_string()));
        }
        if bytes.is_empty() {
            return Err(BoardError::EmptyAttachment);
        }
        debug!(mime_type, size = bytes.len(), "attachment pending");
        self.lock().pending_attachment = Some(attachment);
        self.notify();
        Ok(())
    }

    pub fn clear_attachment(&self) {
        let had = self.lock().pending_attachment.take().is_some();
        if had {
            self.notify();
        }
    }

    /// Stop accepting rounds and drop the result of any in-flight request.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("chat relay closed");
            self.notify();
        }
    }

    /// Run one relay round with `text` and the pending attachment.
    ///
    /// The pending attachment is consumed by every attempt that has
    /// something to send, including refused ones. The completion request runs
    /// on its own task, so dropping this future does not cancel the round: the
    /// reply or the fallback bubble still lands.
    pub async fn send(self: &Arc<Self>, text: &str) -> SendOutcome {
        let contents = match self.begin_round(text.trim()) {
            Ok(contents) => contents,
            Err(refused) => return refused,
        };
        self.notify();

        let relay = Arc::clone(self);
        let round = tokio::spawn(async move { relay.finish_round(contents).await });
        match round.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "relay round task failed");
                self.fail_round()
            }
        }
    }

    /// Commit the user's entry to both sequences and raise the typing flag.
    /// Returns the transcript to post, or the outcome of a refused attempt.
    fn begin_round(&self, trimmed: &str) -> Result<Vec<ChatTurn>, SendOutcome> {
        let mut state = self.lock();
        let attachment = state.pending_attachment.take();
        let dropped = attachment.is_some();

        let refused = if self.is_closed() {
            Some(SendOutcome::Discarded)
        } else if trimmed.is_empty() && attachment.is_none() {
            Some(SendOutcome::Ignored)
        } else if state.typing {
            Some(SendOutcome::Busy)
        } else {
            None
        };
        if let Some(refused) = refused {
            drop(state);
            if dropped {
                debug!(outcome = ?refused, "pending attachment dropped with refused send");
                self.notify();
            }
            return Err(refused);
        }

        let mut parts = Vec::with_capacity(2);
        if !trimmed.is_empty() {
            parts.push(Part::text(trimmed));
        }
        if let Some(attachment) = &attachment {
            parts.push(attachment.to_part());
        }

        state.messages.push(DisplayMessage::new(
            Sender::User,
            trimmed,
            attachment,
            self.sent_at(),
        ));
        state.transcript.push(ChatTurn::new(ChatRole::User, parts));
        state.typing = true;
        Ok(state.transcript.clone())
    }

    async fn finish_round(&self, contents: Vec<ChatTurn>) -> SendOutcome {
        let _typing = TypingGuard { relay: self };
        let result = self.client.generate(&contents).await;

        let mut state = self.lock();
        if self.is_closed() {
            debug!("completion arrived after close, discarded");
            return SendOutcome::Discarded;
        }

        let outcome = match result {
            Ok(raw) => {
                let reply = strip_escapes(&raw);
                state.transcript.push(ChatTurn::model_text(reply.clone()));
                let bubble = DisplayMessage::new(Sender::Bot, reply, None, self.sent_at());
                state.messages.push(bubble.clone());
                info!(turns = state.transcript.len(), "relay round completed");
                SendOutcome::Replied(bubble)
            }
            Err(e) => {
                warn!(error = %e, "relay round failed");
                let bubble = DisplayMessage::new(Sender::Bot, FALLBACK_REPLY, None, self.sent_at());
                state.messages.push(bubble.clone());
                SendOutcome::Failed(bubble)
            }
        };
        state.typing = false;
        drop(state);
        self.notify();

        outcome
    }

    /// Close out a round whose task died before it could.
    fn fail_round(&self) -> SendOutcome {
        if self.is_closed() {
            return SendOutcome::Discarded;
        }
        let bubble = DisplayMessage::new(Sender::Bot, FALLBACK_REPLY, None, self.sent_at());
        {
            let mut state = self.lock();
            state.messages.push(bubble.clone());
            state.typing = false;
        }
        self.notify();
        SendOutcome::Failed(bubble)
    }
}

/// Lowers the typing flag when the round ends, however it ends.
struct TypingGuard<'a> {
    relay: &'a ChatRelay,
}

impl Drop for TypingGuard<'_> {
    fn drop(&mut self) {
        let was_typing = {
            let mut state = self.relay.lock();
            std::mem::replace(&mut state.typing, false)
        };
        if was_typing {
            self.relay.notify();
        }
    }
}
