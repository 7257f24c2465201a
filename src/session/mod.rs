use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

/// How long a session stays alive without being touched.
const SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);
/// How often the background sweeper evicts expired sessions.
const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Profile of the Google account that owns a session.
#[derive(Debug, Clone)]
pub struct OwnerProfile {
    pub email: String,
    pub name: String,
    pub picture: String,
}

/// Per-session Google credential. Opaque to the cleanup engine; the Gmail
/// client uses it as a bearer token.
#[derive(Debug, Clone)]
pub struct MailboxCredential {
    pub access_token: String,
}

/// A logged-in user. Owned exclusively by the [`SessionStore`]; callers only
/// ever hold clones and refer back to the store by handle.
#[derive(Debug, Clone)]
pub struct Session {
    pub handle: String,
    pub owner: OwnerProfile,
    pub credential: MailboxCredential,
    pub created_at: DateTime<Utc>,
    expires_at: Instant,
}

/// Concurrency-safe map from opaque session handles to credentialed
/// sessions, with sliding TTL expiry.
///
/// Every operation takes the write half of one lock, so a lookup that
/// refreshes the expiry can never race a sweep evicting the same record.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a freshly authorized user and return the new session handle.
    pub async fn create(&self, owner: OwnerProfile, credential: MailboxCredential) -> String {
        let handle = Uuid::new_v4().to_string();
        let session = Session {
            handle: handle.clone(),
            owner,
            credential,
            created_at: Utc::now(),
            expires_at: Instant::now() + SESSION_TTL,
        };

        tracing::debug!("Session {} created for {}", session.handle, session.owner.email);
        self.sessions.write().await.insert(handle.clone(), session);
        handle
    }

    /// Look up a session by handle, extending its expiry on success.
    ///
    /// An expired record is evicted on the spot and reported as absent.
    pub async fn get(&self, handle: &str) -> Option<Session> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(handle)?;

        if session.expires_at <= now {
            let created_at = session.created_at;
            sessions.remove(handle);
            tracing::debug!("Session {} (created {}) expired; evicting", handle, created_at);
            return None;
        }

        session.expires_at = now + SESSION_TTL;
        Some(session.clone())
    }

    /// Drop a session. No-op if the handle is unknown.
    pub async fn remove(&self, handle: &str) {
        self.sessions.write().await.remove(handle);
    }

    /// Evict every session whose expiry has passed.
    pub async fn sweep(&self) {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Instant::now();
        sessions.retain(|_, session| session.expires_at > now);

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!("Swept {} expired sessions ({} remain)", evicted, sessions.len());
        }
    }

    /// Run [`sweep`](Self::sweep) every ten minutes until the returned handle
    /// is aborted.
    pub fn spawn_sweeper(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(SWEEP_INTERVAL);
            // The first tick fires immediately; skip it so sweeps start one
            // interval after boot.
            ticks.tick().await;
            loop {
                ticks.tick().await;
                self.sweep().await;
            }
        })
    }

    #[cfg(test)]
    async fn contains(&self, handle: &str) -> bool {
        self.sessions.read().await.contains_key(handle)
    }
}
