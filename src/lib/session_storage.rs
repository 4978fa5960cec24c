use std::collections::HashMap;

use std::sync::{
    Arc,
    Mutex,
    RwLock
};

use std::thread;

use std::time::{
    Duration as STDDuration
};

use chrono::{
    DateTime,
    Utc,
    Duration
};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::SessionState;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("no such session. Requested ID: {0}")]
    NotFound(Uuid),
    #[error("session limit of {0} reached, try again later")]
    SessionLimit(usize),
}

pub struct StoredSession {
    pub state: SessionState,
    pub last_access: DateTime<Utc>,
}

/// In-memory sessions, one lock per session
#[derive(Clone)]
pub struct SessionStorage {
    pub sessions: Arc<RwLock<HashMap<Uuid, Mutex<StoredSession>>>>,
    pub ttl: Duration,
    pub max_sessions: usize,
}

impl SessionStorage {
    /// TTLs beyond the representable range are clamped
    pub fn new(ttl_seconds: i64, max_sessions: usize) -> Self {
        return SessionStorage {
            sessions: Arc::new(RwLock::new(HashMap::<Uuid, Mutex<StoredSession>>::new())),
            ttl: Duration::try_seconds(ttl_seconds).unwrap_or(Duration::MAX),
            max_sessions: max_sessions,
        };
    }
    pub fn create(&self) -> Result<Uuid, StorageError> {
        self.insert(SessionState::new())
    }
    /// Stores a prepared session (e.g. rebuilt from an export) under a new ID
    pub fn insert(&self, state: SessionState) -> Result<Uuid, StorageError> {
        let mut sessions = self.sessions.write().expect("Sessions are poisoned [RWLock]");
        if sessions.len() >= self.max_sessions {
            return Err(StorageError::SessionLimit(self.max_sessions));
        }
        let id = Uuid::new_v4();
        sessions.insert(id, Mutex::new(StoredSession { state, last_access: Utc::now() }));
        info!("Session created: {} (active: {})", id, sessions.len());
        Ok(id)
    }
    /// Runs `action` on the session state while holding only this session's lock.
    /// Refreshes the idle timer.
    pub fn with_session<R, F>(&self, id: &Uuid, action: F) -> Result<R, StorageError>
    where
        F: FnOnce(&mut SessionState) -> R,
    {
        let sessions = self.sessions.read().expect("Sessions are poisoned [RWLock]");
        let session_guarded = match sessions.get(id) {
            Some(val) => val,
            None => {
                return Err(StorageError::NotFound(*id));
            }
        };
        let mut session = session_guarded.lock().expect("Session is poisoned [Mutex]");
        session.last_access = Utc::now();
        Ok(action(&mut session.state))
    }
    pub fn remove(&self, id: &Uuid) -> Result<(), StorageError> {
        let mut sessions = self.sessions.write().expect("Sessions are poisoned [RWLock]");
        match sessions.remove(id) {
            Some(_) => {
                info!("Session deleted: {}", id);
                Ok(())
            },
            None => Err(StorageError::NotFound(*id)),
        }
    }
    pub fn len(&self) -> usize {
        self.sessions.read().expect("Sessions are poisoned [RWLock]").len()
    }
    /// Drops every session idle since before `now - ttl`. Returns the number of evicted sessions.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let deadline = match now.checked_sub_signed(self.ttl) {
            Some(deadline) => deadline,
            None => {
                // Nothing can be idle for that long
                return 0;
            }
        };
        let mut sessions = self.sessions.write().expect("Sessions are poisoned [RWLock]");
        let before = sessions.len();
        sessions.retain(|id, session_guarded| {
            let session = session_guarded.lock().expect("Session is poisoned [Mutex]");
            let keep = session.last_access >= deadline;
            if !keep {
                info!("Session expired: {} (last access {})", id, session.last_access);
            }
            keep
        });
        before - sessions.len()
    }
    pub fn start_sweeper_thread(&self, millis: u64) {
        let this = self.clone();
        thread::spawn(move || {
            this.start_sweeper(millis);
        });
    }
    pub fn start_sweeper(&self, millis: u64) {
        info!("Idle sessions would be evicted every {} ms (TTL {} s)", millis, self.ttl.num_seconds());
        loop {
            thread::sleep(STDDuration::from_millis(millis));
            let evicted = self.evict_expired(Utc::now());
            debug!("Sweep done. Evicted: {} | Active: {}", evicted, self.len());
        }
    }
}
