use crate::models::gesture::Prediction;
use crate::models::session::{Session, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

// ==============================================================================
// Configuration
// ==============================================================================

/// How new session ids are minted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionIdScheme {
    /// Unix seconds as a decimal string, suffixed `-2`, `-3`, ... on collision
    #[default]
    Timestamp,
    /// Random v4 UUID
    Uuid,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ==============================================================================
// Session Store
// ==============================================================================

/// In-memory store of active analysis sessions.
///
/// Appends hold the map read lock plus the session's own mutex, so writes to
/// one session are serialized while other sessions proceed in parallel.
/// Finalize takes the map write lock, which waits out every in-flight append;
/// a removed session can never be mutated.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Mutex<Session>>>,
    scheme: SessionIdScheme,
}

impl SessionStore {
    pub fn new(scheme: SessionIdScheme) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            scheme,
        }
    }

    /// Start a new empty session and return its id
    pub async fn create(&self) -> SessionId {
        self.create_at(Utc::now()).await
    }

    pub async fn create_at(&self, started_at: DateTime<Utc>) -> SessionId {
        let mut sessions = self.sessions.write().await;

        let id = match self.scheme {
            SessionIdScheme::Timestamp => {
                let base = started_at.timestamp().to_string();
                let mut candidate = SessionId::new(&base);
                let mut suffix = 2u32;
                while sessions.contains_key(&candidate) {
                    candidate = SessionId::new(format!("{}-{}", base, suffix));
                    suffix += 1;
                }
                if suffix > 2 {
                    warn!(
                        %base,
                        id = %candidate,
                        "session id collision within one second, suffixed"
                    );
                }
                candidate
            }
            SessionIdScheme::Uuid => SessionId::new(Uuid::new_v4().to_string()),
        };

        sessions.insert(id.clone(), Mutex::new(Session::new(id.clone(), started_at)));
        debug!(session_id = %id, active = sessions.len(), "session created");
        id
    }

    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Record one analyzed frame. Returns the session's frame count after
    /// the append.
    pub async fn append(
        &self,
        id: &SessionId,
        prediction: Option<Prediction>,
    ) -> StoreResult<u64> {
        let sessions = self.sessions.read().await;
        let entry = sessions
            .get(id)
            .ok_or_else(|| StoreError::SessionNotFound(id.clone()))?;

        let mut session = entry.lock().await;
        session.record(prediction);
        Ok(session.frames_processed)
    }

    /// Remove the session and hand it back for scoring
    pub async fn finalize(&self, id: &SessionId) -> StoreResult<Session> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(id)
            .map(Mutex::into_inner)
            .ok_or_else(|| StoreError::SessionNotFound(id.clone()))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionIdScheme::default())
    }
}
