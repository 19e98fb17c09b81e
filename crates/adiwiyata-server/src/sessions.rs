use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use adiwiyata_board::chat::ChatRelay;
use adiwiyata_core::clock::Clock;
use jiff::{SignedDuration, Timestamp};
use tracing::{info, warn};
use uuid::Uuid;

/// Bounds on open chat sessions.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub max_sessions: usize,
    /// A session untouched for this long, with no open stream and no round
    /// in flight, is closed by [`SessionRegistry::sweep`].
    pub idle_ttl: Duration,
}

struct Entry {
    relay: Arc<ChatRelay>,
    last_seen: Timestamp,
}

impl Entry {
    fn is_idle(&self, now: Timestamp, ttl: SignedDuration) -> bool {
        now.duration_since(self.last_seen) >= ttl
            && self.relay.observer_count() == 0
            && !self.relay.is_typing()
    }
}

/// Live chat relays, one per browser session.
pub struct SessionRegistry {
    relays: Mutex<HashMap<Uuid, Entry>>,
    clock: Arc<dyn Clock>,
    limits: SessionLimits,
}

impl SessionRegistry {
    pub fn new(clock: Arc<dyn Clock>, limits: SessionLimits) -> Self {
        Self {
            relays: Mutex::new(HashMap::new()),
            clock,
            limits,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Entry>> {
        self.relays.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn idle_ttl(&self) -> SignedDuration {
        SignedDuration::try_from(self.limits.idle_ttl).unwrap_or(SignedDuration::MAX)
    }

    /// Register `relay` under a fresh id. Idle sessions are swept first when
    /// the registry is full; `None` means it is still full.
    pub fn insert(&self, relay: ChatRelay) -> Option<(Uuid, Arc<ChatRelay>)> {
        if self.len() >= self.limits.max_sessions {
            self.sweep();
        }

        let id = Uuid::new_v4();
        let relay = Arc::new(relay);
        let open = {
            let mut relays = self.lock();
            if relays.len() >= self.limits.max_sessions {
                warn!(max = self.limits.max_sessions, "chat session limit reached");
                return None;
            }
            relays.insert(
                id,
                Entry {
                    relay: Arc::clone(&relay),
                    last_seen: self.clock.now(),
                },
            );
            relays.len()
        };
        info!(session = %id, open, "chat session opened");
        Some((id, relay))
    }

    /// Look up a session and mark it as active.
    pub fn get(&self, id: &Uuid) -> Option<Arc<ChatRelay>> {
        let now = self.clock.now();
        let mut relays = self.lock();
        let entry = relays.get_mut(id)?;
        entry.last_seen = now;
        Some(Arc::clone(&entry.relay))
    }

    /// Forget a session and close its relay, discarding any in-flight reply.
    pub fn remove(&self, id: &Uuid) -> Option<Arc<ChatRelay>> {
        let relay = self.lock().remove(id)?.relay;
        relay.close();
        info!(session = %id, "chat session closed");
        Some(relay)
    }

    /// Close every idle session. Returns how many were closed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let ttl = self.idle_ttl();
        let expired: Vec<(Uuid, Arc<ChatRelay>)> = {
            let mut relays = self.lock();
            let ids: Vec<Uuid> = relays
                .iter()
                .filter(|(_, entry)| entry.is_idle(now, ttl))
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| relays.remove(&id).map(|entry| (id, entry.relay)))
                .collect()
        };

        for (id, relay) in &expired {
            relay.close();
            info!(session = %id, "idle chat session expired");
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close every relay. Used on shutdown.
    pub fn close_all(&self) {
        let relays: Vec<_> = self.lock().drain().map(|(_, entry)| entry.relay).collect();
        for relay in &relays {
            relay.close();
        }
    }
}
