// src/services/session_store.rs
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::models::profile::ProfileId;
use crate::models::session::{Session, SessionProfile};

/// Server-side registry of open sessions, shared by all workers. A session
/// exists from `init` (login) until `clear` (logout), revocation, or expiry.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn init(&self, profile: SessionProfile) -> Session {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            profile,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, s| !s.is_expired_at(now));
        sessions.insert(session.id, session.clone());
        session
    }

    /// Live session by id; expired entries are dropped on sight.
    pub fn get(&self, id: &Uuid) -> Option<Session> {
        let now = Utc::now();
        let found = {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            sessions.get(id).cloned()
        };
        match found {
            Some(s) if s.is_expired_at(now) => {
                self.clear(id);
                None
            }
            other => other,
        }
    }

    /// Returns true when a session was removed.
    pub fn clear(&self, id: &Uuid) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    /// Drop every session opened for a profile, e.g. after it is edited or
    /// deleted. Returns how many were dropped.
    pub fn revoke_profile(&self, profile_id: ProfileId) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, s| s.profile.id != profile_id);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
