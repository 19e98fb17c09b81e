//! Live comment board.
//!
//! The board holds the latest projection of the `comments` collection. Every
//! store snapshot fully replaces it through [`apply_snapshot`]; nothing is
//! patched incrementally, so reordering and removals between snapshots need
//! no special handling.
//!
//! Submitting does not insert anything locally. The write goes to the store
//! and the new comment shows up when the subscription fires again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use adiwiyata_core::clock::Clock;
use adiwiyata_core::collections;
use adiwiyata_core::models::comment::CommentRecord;
use adiwiyata_store::document::{Document, NewDocument};
use adiwiyata_store::store::{DocumentStore, SnapshotListener, Subscription};
use jiff::Timestamp;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::BoardError;

/// View state of the board.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommentBoardState {
    pub comments: Vec<CommentRecord>,
    /// Bumped on every applied snapshot.
    pub revision: u64,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Blank input, nothing written.
    Ignored,
    /// One write dispatched.
    Sent,
}

/// Reduce a store snapshot into the next board state.
///
/// Store order is preserved. A missing or unparseable timestamp (such as a
/// server timestamp that has not resolved yet) is normalized to `now`.
/// Documents without usable text are skipped.
pub fn apply_snapshot(
    state: &CommentBoardState,
    documents: &[Document],
    now: Timestamp,
) -> CommentBoardState {
    let comments = documents
        .iter()
        .filter_map(|doc| {
            let Some(text) = doc
                .str_field(collections::COMMENT_TEXT)
                .map(str::trim)
                .filter(|t| !t.is_empty())
            else {
                debug!(id = %doc.id, "skipping comment without text");
                return None;
            };

            let created_at = doc
                .str_field(collections::COMMENT_TIMESTAMP)
                .and_then(|raw| raw.parse::<Timestamp>().ok())
                .unwrap_or(now);

            Some(CommentRecord {
                id: doc.id.clone(),
                text: text.to_string(),
                created_at,
            })
        })
        .collect();

    CommentBoardState {
        comments,
        revision: state.revision + 1,
    }
}

/// A mounted comment board.
///
/// Mounting opens the store subscription; unmounting (or dropping the board)
/// releases it. Snapshots the store delivers after unmount are ignored.
pub struct CommentBoard {
    store: Arc<dyn DocumentStore>,
    state: Arc<watch::Sender<CommentBoardState>>,
    mounted: Arc<AtomicBool>,
    subscription: Mutex<Option<Subscription>>,
}

impl CommentBoard {
    pub fn mount(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Result<Self, BoardError> {
        let (tx, _) = watch::channel(CommentBoardState::default());
        let state = Arc::new(tx);
        let mounted = Arc::new(AtomicBool::new(true));

        let listener: SnapshotListener = {
            let state = Arc::clone(&state);
            let mounted = Arc::clone(&mounted);
            Arc::new(move |snapshot| {
                if !mounted.load(Ordering::Acquire) {
                    debug!("snapshot after unmount dropped");
                    return;
                }
                let now = clock.now();
                state.send_modify(|current| {
                    *current = apply_snapshot(current, &snapshot.documents, now);
                });
            })
        };

        let subscription = store.subscribe(collections::COMMENTS, listener)?;
        info!(collection = collections::COMMENTS, "comment board mounted");

        Ok(Self {
            store,
            state,
            mounted,
            subscription: Mutex::new(Some(subscription)),
        })
    }

    /// Current state.
    pub fn state(&self) -> CommentBoardState {
        self.state.borrow().clone()
    }

    /// Observe state changes. Fires once per applied snapshot.
    pub fn watch(&self) -> watch::Receiver<CommentBoardState> {
        self.state.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Post a comment. Blank text is ignored.
    ///
    /// The write is fire-and-forget: failures are logged and never retried
    /// or reported back. Must be called from within a tokio runtime.
    pub fn submit(&self, text: &str) -> SubmitOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return SubmitOutcome::Ignored;
        }

        let document = NewDocument::new()
            .field(collections::COMMENT_TEXT, trimmed)
            .server_timestamp(collections::COMMENT_TIMESTAMP);
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            match store.write(collections::COMMENTS, document).await {
                Ok(id) => debug!(id = %id, "comment written"),
                Err(e) => warn!(error = %e, "comment write failed"),
            }
        });

        SubmitOutcome::Sent
    }

    /// Release the subscription. Idempotent.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(subscription) = subscription {
            subscription.release();
            info!(collection = collections::COMMENTS, "comment board unmounted");
        }
    }
}

impl Drop for CommentBoard {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// The comment input field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentForm {
    pub input: String,
}

impl CommentForm {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Submit the current input. Cleared right after a send, before the
    /// write lands; left alone when ignored.
    pub fn submit(&mut self, board: &CommentBoard) -> SubmitOutcome {
        let outcome = board.submit(&self.input);
        if outcome == SubmitOutcome::Sent {
            self.input.clear();
        }
        outcome
    }
}
