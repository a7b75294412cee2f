//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the in-memory registry of
//! planner sessions.

use crate::config::Config;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use study_planner_core::{PlannerSession, StudyPlanner};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub planner: StudyPlanner,
    pub sessions: SessionRegistry,
}

//=========================================================================================
// SessionRegistry (One Entry Per Browser Tab)
//=========================================================================================

struct Entry {
    session: PlannerSession,
    last_touched: Instant,
}

/// Holds every live `PlannerSession`. Sessions exist only in memory and are
/// dropped on delete, on restart, or once idle past `idle_ttl`.
///
/// The lock is only ever held for short synchronous edits; handlers copy
/// what they need out before awaiting the generation service.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
            max_sessions,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.session_idle_ttl, config.max_sessions)
    }

    /// Sweeps idle sessions, then registers a new one. Returns `None` when
    /// the registry is still full after the sweep.
    pub async fn create(&self) -> Option<PlannerSession> {
        let mut sessions = self.inner.write().await;

        let before = sessions.len();
        // A session waiting on the generation service is never evicted.
        sessions.retain(|_, entry| {
            entry.session.is_pending() || entry.last_touched.elapsed() < self.idle_ttl
        });
        if sessions.len() < before {
            info!(evicted = before - sessions.len(), "Dropped idle planner sessions");
        }

        if sessions.len() >= self.max_sessions {
            return None;
        }

        let session = PlannerSession::new();
        sessions.insert(
            session.id,
            Entry {
                session: session.clone(),
                last_touched: Instant::now(),
            },
        );
        Some(session)
    }

    /// Returns a copy of the session, if it exists.
    pub async fn get(&self, id: Uuid) -> Option<PlannerSession> {
        self.update(id, |session| session.clone()).await
    }

    /// Applies `edit` to the session under the write lock.
    pub async fn update<R>(&self, id: Uuid, edit: impl FnOnce(&mut PlannerSession) -> R) -> Option<R> {
        let mut sessions = self.inner.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_touched = Instant::now();
        Some(edit(&mut entry.session))
    }

    pub async fn remove(&self, id: Uuid) -> Option<PlannerSession> {
        self.inner.write().await.remove(&id).map(|entry| entry.session)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
