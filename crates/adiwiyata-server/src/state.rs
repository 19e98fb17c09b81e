use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use adiwiyata_board::chat::ChatRelay;
use adiwiyata_board::comments::CommentBoard;
use adiwiyata_core::clock::Clock;
use adiwiyata_core::time::fixed_zone;
use adiwiyata_gemini::client::{CompletionClient, GeminiClient, GeminiConfig};
use adiwiyata_site::render::{CommentView, Renderer};
use adiwiyata_store::firestore::{FirestoreConfig, FirestoreStore};
use adiwiyata_store::memory::MemoryStore;
use adiwiyata_store::store::DocumentStore;
use jiff::tz::TimeZone;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::{SiteConfig, StoreSettings};
use crate::sessions::{SessionLimits, SessionRegistry};

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub board: Arc<CommentBoard>,
    pub sessions: Arc<SessionRegistry>,
    pub renderer: Arc<Renderer>,
    pub completion: Arc<dyn CompletionClient>,
    pub clock: Arc<dyn Clock>,
    pub zone: TimeZone,
    pub video_id: String,
    pub assets_dir: PathBuf,
    pub max_attachment_bytes: usize,
    pub sweep_interval: Duration,
}

impl AppState {
    /// Mount the comment board on `store` and wire the rest from `config`.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        completion: Arc<dyn CompletionClient>,
        clock: Arc<dyn Clock>,
        config: &SiteConfig,
    ) -> eyre::Result<Self> {
        let zone = fixed_zone(config.display_utc_offset_hours)?;
        let board = CommentBoard::mount(store, Arc::clone(&clock))?;
        let renderer = Renderer::new()?;
        let sessions = SessionRegistry::new(
            Arc::clone(&clock),
            SessionLimits {
                max_sessions: config.chat.max_sessions,
                idle_ttl: Duration::from_secs(config.chat.idle_ttl_secs),
            },
        );

        Ok(Self {
            board: Arc::new(board),
            sessions: Arc::new(sessions),
            renderer: Arc::new(renderer),
            completion,
            clock,
            zone,
            video_id: config.video_id.clone(),
            assets_dir: config.assets_dir.clone(),
            max_attachment_bytes: config.max_attachment_bytes,
            sweep_interval: Duration::from_secs(config.chat.sweep_interval_secs.max(1)),
        })
    }

    /// A fresh relay sharing this state's completion client and clock.
    pub fn new_relay(&self) -> ChatRelay {
        ChatRelay::new(
            Arc::clone(&self.completion),
            Arc::clone(&self.clock),
            self.zone.clone(),
        )
    }

    /// The board's current comments, aged against the clock.
    pub fn comment_views(&self) -> Vec<CommentView> {
        let now = self.clock.now();
        self.board
            .state()
            .comments
            .iter()
            .map(|record| CommentView::new(record, now))
            .collect()
    }

    /// Periodically close idle chat sessions. Runs until aborted.
    pub fn spawn_session_sweeper(&self) -> JoinHandle<()> {
        let sessions = Arc::clone(&self.sessions);
        let period = self.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let expired = sessions.sweep();
                if expired > 0 {
                    tracing::debug!(expired, open = sessions.len(), "session sweep");
                }
            }
        })
    }

    /// Release the board subscription and close every chat relay.
    pub fn shutdown(&self) {
        self.sessions.close_all();
        self.board.unmount();
    }
}

/// The document store named by `settings`. Firestore needs a tokio runtime.
pub fn build_store(settings: &StoreSettings) -> eyre::Result<Arc<dyn DocumentStore>> {
    match settings {
        StoreSettings::Memory => {
            tracing::warn!("using in-memory comment store; comments are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreSettings::Firestore {
            project_id,
            api_key,
            base_url,
            poll_interval_ms,
        } => {
            let mut config = FirestoreConfig::new(project_id.clone());
            config.api_key = api_key.clone();
            config.base_url = base_url.clone();
            config.poll_interval = Duration::from_millis(*poll_interval_ms);
            Ok(Arc::new(FirestoreStore::new(config)?))
        }
    }
}

/// The Gemini client. A missing key is not fatal: every round then fails
/// into the fallback reply.
pub fn build_completion(config: &SiteConfig) -> eyre::Result<Arc<dyn CompletionClient>> {
    let settings = &config.gemini;
    if settings.api_key.as_deref().is_none_or(str::is_empty) {
        tracing::warn!("GEMINI_API_KEY not set; AdiBot will answer with the fallback reply");
    }
    let client = GeminiClient::new(GeminiConfig {
        api_key: settings.api_key.clone(),
        model: settings.model.clone(),
        base_url: settings.base_url.clone(),
        timeout: Duration::from_secs(settings.timeout_secs),
    })?;
    Ok(Arc::new(client))
}
