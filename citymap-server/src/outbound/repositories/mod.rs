use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use citymap_core::SessionState;
use tokio::time::Instant;
use tracing::{Level, event};

use crate::domain::{
    models::{SessionId, StoreSessionError, StoredSession},
    ports::SessionRepository,
};

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

#[derive(Debug)]
struct Entry {
    state: SessionState,
    version: u64,
    last_access: Instant,
}

/// Keeps sessions in process memory. Sessions are lost on restart.
///
/// A session expires once it has not been loaded or stored for `idle_ttl`. When
/// `max_sessions` are live, creating one more drops the least recently used.
#[derive(Debug, Clone)]
pub struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, Entry>>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl InMemorySessionRepository {
    pub fn new(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::default(),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Entry>> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_access) < self.idle_ttl);
        if sessions.len() < before {
            event!(Level::DEBUG, "Expired {} idle sessions", before - sessions.len());
        }

        sessions
    }

    pub(crate) fn load_now(&self, id: SessionId) -> Option<StoredSession> {
        let mut sessions = self.lock();
        let entry = sessions.get_mut(&id)?;
        entry.last_access = Instant::now();

        Some(StoredSession::new(entry.state.clone(), entry.version))
    }

    pub(crate) fn store_now(
        &self,
        id: SessionId,
        state: SessionState,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreSessionError> {
        let mut sessions = self.lock();
        let now = Instant::now();

        match (sessions.get_mut(&id), expected_version) {
            (Some(entry), Some(expected)) if entry.version == expected => {
                entry.state = state;
                entry.version += 1;
                entry.last_access = now;
                Ok(entry.version)
            }
            (None, None) => {
                if sessions.len() >= self.max_sessions {
                    let oldest = sessions
                        .iter()
                        .min_by_key(|(_, entry)| entry.last_access)
                        .map(|(id, _)| *id);
                    if let Some(oldest) = oldest {
                        sessions.remove(&oldest);
                        event!(Level::DEBUG, "Dropped session {} to make room", oldest);
                    }
                }

                sessions.insert(
                    id,
                    Entry {
                        state,
                        version: 1,
                        last_access: now,
                    },
                );
                event!(Level::DEBUG, "Created session {}", id);
                Ok(1)
            }
            _ => Err(StoreSessionError::Stale(id)),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionRepository for InMemorySessionRepository {
    async fn load_session(&self, id: SessionId) -> Option<StoredSession> {
        self.load_now(id)
    }

    async fn store_session(
        &self,
        id: SessionId,
        session: SessionState,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreSessionError> {
        self.store_now(id, session, expected_version)
    }
}
