//! In-memory registry of running review sessions.
//!
//! Sessions live only in this process; restarting the server drops them,
//! together with any `again` progress they hold. Idle sessions are swept
//! out, finished ones sooner than unfinished ones.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;
use vocab_core::ReviewSession;

use crate::error::{ApiError, Result};

/// Default idle time before an unfinished session is dropped.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// Idle time before a finished session is dropped.
pub const DEFAULT_COMPLETED_TTL: Duration = Duration::from_secs(5 * 60);

/// Handle to one session; gradings on it are serialized by the mutex.
pub type SessionHandle = Arc<Mutex<ReviewSession>>;

struct Entry {
    handle: SessionHandle,
    last_seen: std::sync::Mutex<Instant>,
}

impl Entry {
    fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .map(|seen| seen.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    fn touch(&self) {
        if let Ok(mut seen) = self.last_seen.lock() {
            *seen = Instant::now();
        }
    }

    /// A session busy in a grading counts as unfinished.
    fn is_complete(&self) -> bool {
        self.handle
            .try_lock()
            .map(|session| session.is_complete())
            .unwrap_or(false)
    }
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    idle_ttl: Duration,
    completed_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttls(DEFAULT_IDLE_TTL, DEFAULT_COMPLETED_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that drops unfinished sessions after `idle_ttl` and
    /// finished ones after `completed_ttl` without access.
    pub fn with_ttls(idle_ttl: Duration, completed_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
            completed_ttl: completed_ttl.min(idle_ttl),
        }
    }

    /// Register a session and return its id
    pub async fn insert(&self, session: ReviewSession) -> Uuid {
        self.sweep().await;

        let id = Uuid::new_v4();
        self.sessions.write().await.insert(
            id,
            Entry {
                handle: Arc::new(Mutex::new(session)),
                last_seen: std::sync::Mutex::new(Instant::now()),
            },
        );
        id
    }

    /// Look up a session by id
    pub async fn get(&self, id: Uuid) -> Result<SessionHandle> {
        let sessions = self.sessions.read().await;
        let entry = sessions
            .get(&id)
            .ok_or_else(|| ApiError::NotFound(format!("Quiz session {}", id)))?;
        entry.touch();
        Ok(entry.handle.clone())
    }

    /// Drop a session; returns whether it existed
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drop expired sessions; returns how many were removed
    pub async fn sweep(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let idle = entry.idle_for();
            let ttl = if entry.is_complete() {
                self.completed_ttl
            } else {
                self.idle_ttl
            };
            idle < ttl
        });
        before - sessions.len()
    }
}
