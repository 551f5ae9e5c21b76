//! Server-side cookie sessions.
//!
//! The cookie only carries an opaque random id; the session record itself
//! lives in a process-wide [`SessionStore`]. Each session is keyed
//! independently, so concurrent requests only contend on the map shard
//! that holds their entry.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use dashmap::DashMap;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::SessionConfig;

/// Typed session values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    pub authenticated: bool,
    /// Display name of the logged-in user
    pub user: String,
}

/// A session loaded for the current request.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    /// Whether the id names a live entry in the store
    stored: bool,
    pub data: SessionData,
}

impl Session {
    fn new() -> Self {
        Self {
            id: generate_session_id(),
            stored: false,
            data: SessionData::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_stored(&self) -> bool {
        self.stored
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.authenticated
    }

    /// Anonymous -> Authenticated
    pub fn authenticate(&mut self, user: impl Into<String>) {
        self.data.authenticated = true;
        self.data.user = user.into();
    }

    /// Authenticated -> Anonymous
    pub fn clear(&mut self) {
        self.data.authenticated = false;
    }
}

#[derive(Debug, Clone)]
struct SessionEntry {
    data: SessionData,
    expires_at: Instant,
}

/// Upper bound on session lifetime (10 years)
const MAX_SESSION_AGE_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Thread-safe session store using dashmap
#[derive(Debug)]
pub struct SessionStore {
    entries: DashMap<String, SessionEntry>,
    config: SessionConfig,
    max_age: Duration,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            entries: DashMap::new(),
            max_age: Duration::from_secs(config.max_age_secs.min(MAX_SESSION_AGE_SECS)),
            config,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Get the session named by the request cookie. Falls back to a fresh
    /// anonymous session, which is only stored once it is saved.
    pub fn load(&self, jar: &CookieJar) -> Session {
        let Some(cookie) = jar.get(&self.config.cookie_name) else {
            return Session::new();
        };
        let id = cookie.value();
        let now = Instant::now();

        let found = self
            .entries
            .get(id)
            .map(|entry| (entry.expires_at > now).then(|| entry.data.clone()));

        match found {
            Some(Some(data)) => Session {
                id: id.to_string(),
                stored: true,
                data,
            },
            Some(None) => {
                // Expired: drop it so the id can never be revived
                self.entries.remove_if(id, |_, entry| entry.expires_at <= now);
                tracing::debug!("Session expired, starting a new one");
                Session::new()
            }
            None => Session::new(),
        }
    }

    /// Swap the session onto a fresh id and forget the old one. Called on
    /// login so an id handed out earlier can never become authenticated.
    pub fn regenerate(&self, session: Session) -> Session {
        if session.stored {
            self.entries.remove(&session.id);
        }
        Session {
            id: generate_session_id(),
            stored: false,
            data: session.data,
        }
    }

    /// Persist the session and set its cookie on the response jar.
    pub fn save(&self, jar: CookieJar, session: Session) -> CookieJar {
        let now = Instant::now();
        let expires_at = now
            .checked_add(self.max_age)
            .or_else(|| now.checked_add(Duration::from_secs(24 * 60 * 60)))
            .unwrap_or(now);
        self.entries.insert(
            session.id.clone(),
            SessionEntry {
                data: session.data,
                expires_at,
            },
        );

        let cookie = Cookie::build((self.config.cookie_name.clone(), session.id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure)
            .max_age(time::Duration::seconds(
                i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX),
            ))
            .build();
        jar.add(cookie)
    }

    /// Clean up expired entries to prevent memory leaks
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Get the number of stored sessions (for monitoring)
    pub fn session_count(&self) -> usize {
        self.entries.len()
    }
}

/// 32 random bytes, hex encoded
fn generate_session_id() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Spawn a background task to periodically purge expired sessions
pub fn spawn_cleanup_task(store: Arc<SessionStore>, cleanup_interval_secs: u64) {
    tokio::spawn(async move {
        let interval = Duration::from_secs(cleanup_interval_secs.max(1));
        loop {
            tokio::time::sleep(interval).await;
            store.cleanup_expired();
            tracing::debug!(
                "Session cleanup complete, {} sessions remaining",
                store.session_count()
            );
        }
    });
}
