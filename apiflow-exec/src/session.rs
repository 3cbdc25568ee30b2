//! Shared, lock-protected session handles.
//!
//! All writes to a session go through one `tokio::sync::Mutex`; interpolation reads a
//! snapshot taken under the same lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use apiflow_core::{ConfigValue, ScopeKind, SessionSnapshot, SessionState, StepResult};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct SharedSession {
    id: Uuid,
    inner: Arc<Mutex<SessionState>>,
}

impl Default for SharedSession {
    fn default() -> Self {
        Self::new(SessionState::new())
    }
}

impl SharedSession {
    pub fn new(state: SessionState) -> Self {
        Self {
            id: state.session_id(),
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    /// Exclusive access for multi-step updates that must not interleave with other writers.
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn set_environment<K, V>(&self, partial: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.lock().await.set_environment(partial);
    }

    pub async fn set_flow_inputs<K, V>(&self, partial: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.lock().await.set_flow_inputs(partial);
    }

    pub async fn set_runtime_var(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.lock().await.set_runtime_var(key, value);
    }

    pub async fn set_step_output(&self, step_id: impl Into<String>, result: StepResult) {
        self.inner.lock().await.set_step_output(step_id, result);
    }

    pub async fn set_config<K, V>(&self, partial: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<ConfigValue>,
    {
        self.inner.lock().await.set_config(partial);
    }

    pub async fn clear(&self, scope: ScopeKind) {
        self.inner.lock().await.clear(scope);
    }

    pub async fn reset(&self) {
        self.inner.lock().await.reset();
    }

    pub async fn close(&self) {
        self.inner.lock().await.close();
    }

    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_closed()
    }

    async fn is_stale(&self, max_idle: Duration, now: DateTime<Utc>) -> bool {
        self.inner.lock().await.is_stale(max_idle, now)
    }
}

/// Live sessions by id. Idle sessions are closed and dropped by [`SessionManager::evict_idle`].
pub struct SessionManager {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
    max_idle: Duration,
}

impl SessionManager {
    pub fn new(max_idle: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_idle,
        }
    }

    pub async fn create(&self) -> SharedSession {
        let session = SharedSession::default();
        self.sessions
            .write()
            .await
            .insert(session.session_id(), session.clone());
        tracing::debug!(session_id = %session.session_id(), "session created");
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Closes and forgets a session. Handles still held elsewhere see a closed session.
    pub async fn close(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                session.close().await;
                tracing::debug!(session_id = %id, "session closed");
                true
            }
            None => false,
        }
    }

    /// Closes every session idle for longer than the configured maximum as of `now`.
    pub async fn evict_idle(&self, now: DateTime<Utc>) -> Vec<Uuid> {
        let mut sessions = self.sessions.write().await;
        let mut stale = Vec::new();
        for (id, session) in sessions.iter() {
            if session.is_stale(self.max_idle, now).await {
                stale.push(*id);
            }
        }
        for id in &stale {
            if let Some(session) = sessions.remove(id) {
                session.close().await;
            }
        }
        if !stale.is_empty() {
            tracing::info!(evicted = stale.len(), "evicted idle sessions");
        }
        stale
    }
}
