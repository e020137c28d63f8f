use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponse, Response},
};
use metaprompt_core::SessionState;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "metaprompt_session";

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct Entry {
    state: SessionState,
    last_seen: Instant,
    /// Monotonic touch order, used to pick the least recently used entry.
    seq: u64,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<Uuid, Entry>,
    next_seq: u64,
}

/// In-memory per-browser state, keyed by the session cookie.
///
/// Sessions never share state. A session is only stored once something is
/// written to it; it is dropped after `idle_ttl` without requests, or when
/// the store is full and it is the least recently used.
pub struct SessionStore {
    sessions: Mutex<Sessions>,
    idle_ttl: Duration,
    max_sessions: usize,
}

/// The session a request belongs to. `is_new` means the request carried no
/// cookie for a live session.
#[derive(Debug, Clone, Copy)]
pub struct SessionHandle {
    pub id: Uuid,
    pub is_new: bool,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS)
    }

    pub fn with_limits(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.last_seen) >= self.idle_ttl
    }

    /// Find the session named by the request's cookie. A missing, malformed,
    /// expired or unknown cookie yields a fresh id; nothing is stored until
    /// the first `update`.
    pub fn resolve(&self, headers: &HeaderMap) -> SessionHandle {
        let now = Instant::now();
        let mut guard = self.lock();
        let sessions = &mut *guard;
        if let Some(id) = session_id_from_headers(headers) {
            let expired = sessions
                .entries
                .get(&id)
                .map(|entry| self.is_expired(entry, now));
            match expired {
                Some(false) => {
                    let seq = sessions.next_seq;
                    sessions.next_seq += 1;
                    if let Some(entry) = sessions.entries.get_mut(&id) {
                        entry.last_seen = now;
                        entry.seq = seq;
                    }
                    return SessionHandle { id, is_new: false };
                }
                Some(true) => {
                    sessions.entries.remove(&id);
                    debug!(session = %id, "session expired");
                }
                None => {}
            }
        }
        SessionHandle {
            id: Uuid::new_v4(),
            is_new: true,
        }
    }

    /// Run `f` against a session's state, storing the session if needed.
    pub fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let now = Instant::now();
        let mut guard = self.lock();
        let sessions = &mut *guard;
        if !sessions.entries.contains_key(&id) {
            self.make_room(sessions, now);
            debug!(session = %id, "new session");
        }
        let seq = sessions.next_seq;
        sessions.next_seq += 1;
        let entry = sessions.entries.entry(id).or_insert_with(|| Entry {
            state: SessionState::new(),
            last_seen: now,
            seq,
        });
        entry.last_seen = now;
        entry.seq = seq;
        f(&mut entry.state)
    }

    /// Drop expired sessions, then the least recently used ones until there
    /// is room for one more.
    fn make_room(&self, sessions: &mut Sessions, now: Instant) {
        sessions
            .entries
            .retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_ttl);
        while sessions.entries.len() >= self.max_sessions {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.seq)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    sessions.entries.remove(&id);
                    debug!(session = %id, "evicted least recently used session");
                }
                None => break,
            }
        }
    }

    /// Copy of a session's current state; idle state for unknown sessions.
    pub fn snapshot(&self, id: Uuid) -> SessionState {
        let now = Instant::now();
        self.lock()
            .entries
            .get(&id)
            .filter(|entry| !self.is_expired(entry, now))
            .map(|entry| entry.state.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.lock().entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Turn `response` into a full response, attaching the session cookie
    /// when the session is new and has been stored.
    pub fn respond(&self, session: SessionHandle, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if session.is_new && self.contains(session.id) {
            if let Ok(value) = HeaderValue::from_str(&cookie_value(session.id)) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}

fn cookie_value(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// Extract the session id from any `Cookie` header on the request.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}
