//! Session middleware configuration.
//!
//! Sessions live in the process and only ever hold the verified
//! [`crate::models::CurrentCustomer`]. Restarting the service logs every
//! customer out; they log in again through the identity provider.
//!
//! The store is a `moka` cache: each record is evicted once its expiry date
//! passes, and the cache is capped so abandoned logins cannot grow it without
//! bound.

use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::{
    SameSite,
    time::{Duration, OffsetDateTime},
};
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "rx_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Most sessions held at once.
const MAX_SESSIONS: u64 = 100_000;

/// In-memory session store that evicts records at their expiry date.
#[derive(Clone, Debug)]
pub struct CacheSessionStore {
    sessions: Cache<Id, Record>,
}

impl CacheSessionStore {
    /// Create a store holding at most `max_sessions` records.
    #[must_use]
    pub fn new(max_sessions: u64) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(max_sessions)
                .expire_after(RecordExpiry)
                .build(),
        }
    }
}

impl Default for CacheSessionStore {
    fn default() -> Self {
        Self::new(MAX_SESSIONS)
    }
}

#[async_trait]
impl SessionStore for CacheSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        loop {
            let entry = self
                .sessions
                .entry(record.id)
                .or_insert(record.clone())
                .await;
            if entry.is_fresh() {
                return Ok(());
            }
            // Id collision
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.sessions.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .sessions
            .get(session_id)
            .await
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.sessions.invalidate(session_id).await;
        Ok(())
    }
}

/// Expires cache entries at the record's own expiry date.
struct RecordExpiry;

impl RecordExpiry {
    fn remaining(record: &Record) -> StdDuration {
        StdDuration::try_from(record.expiry_date - OffsetDateTime::now_utc())
            .unwrap_or(StdDuration::ZERO)
    }
}

impl moka::Expiry<Id, Record> for RecordExpiry {
    fn expire_after_create(&self, _id: &Id, record: &Record, _at: Instant) -> Option<StdDuration> {
        Some(Self::remaining(record))
    }

    fn expire_after_update(
        &self,
        _id: &Id,
        record: &Record,
        _at: Instant,
        _current: Option<StdDuration>,
    ) -> Option<StdDuration> {
        Some(Self::remaining(record))
    }
}

/// Create the session layer.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<CacheSessionStore> {
    SessionManagerLayer::new(CacheSessionStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        .with_secure(config.secure_cookies())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
