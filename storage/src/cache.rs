//! In-memory TTL cache: bounded staleness for reads, explicit invalidation on writes.
//!
//! Three independent namespaces (settings, model list, per-user fields) are
//! bundled in [`BotCache`], constructed once at the composition root with an
//! injected [`Clock`] and shared by `Arc`. Cache operations are synchronous,
//! never suspend and never fail; the mutex is held only for the map access.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bot_core::{Role, TtsSettings};

use crate::clock::Clock;

/// TTL for the settings namespace.
pub const SETTINGS_CACHE_TTL: Duration = Duration::from_secs(60);
/// TTL for the model-list slot.
pub const MODELS_CACHE_TTL: Duration = Duration::from_secs(300);
/// TTL for per-user sub-entries (role, TTS preferences).
pub const USER_CACHE_TTL: Duration = Duration::from_secs(120);

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// A namespace of independently-TTLed entries.
///
/// `get` returns the value only while `now - stored_at < ttl`; expired
/// entries are treated as misses and dropped lazily on the next `get`.
pub struct TtlMap<K, V> {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlMap<K, V> {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value if present and fresh, otherwise reports a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` with the current timestamp, overwriting unconditionally.
    pub fn put(&self, key: K, value: V) {
        let entry = Entry {
            value,
            stored_at: self.clock.now(),
        };
        self.entries.lock().unwrap().insert(key, entry);
    }

    /// Removes one entry.
    pub fn invalidate(&self, key: &K) {
        self.entries.lock().unwrap().remove(key);
    }

    /// Clears the whole namespace.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

/// Single-value variant of [`TtlMap`], used for the model list.
pub struct TtlSlot<V> {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entry: Mutex<Option<Entry<V>>>,
}

impl<V: Clone> TtlSlot<V> {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Option<V> {
        let now = self.clock.now();
        let mut entry = self.entry.lock().unwrap();
        match entry.as_ref() {
            Some(e) if now.duration_since(e.stored_at) < self.ttl => Some(e.value.clone()),
            Some(_) => {
                *entry = None;
                None
            }
            None => None,
        }
    }

    pub fn put(&self, value: V) {
        *self.entry.lock().unwrap() = Some(Entry {
            value,
            stored_at: self.clock.now(),
        });
    }

    pub fn invalidate(&self) {
        *self.entry.lock().unwrap() = None;
    }
}

/// All cache namespaces for the bot, sharing one clock.
///
/// Per-user data is split into two sibling maps (`roles`, `tts`) so that
/// invalidating one field of a user leaves the other untouched.
pub struct BotCache {
    pub settings: TtlMap<String, String>,
    pub models: TtlSlot<Vec<String>>,
    pub roles: TtlMap<i64, Role>,
    pub tts: TtlMap<i64, TtsSettings>,
}

impl BotCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            settings: TtlMap::new(clock.clone(), SETTINGS_CACHE_TTL),
            models: TtlSlot::new(clock.clone(), MODELS_CACHE_TTL),
            roles: TtlMap::new(clock.clone(), USER_CACHE_TTL),
            tts: TtlMap::new(clock, USER_CACHE_TTL),
        }
    }

    /// Drops every cached field of one user.
    pub fn invalidate_user(&self, user_id: i64) {
        self.roles.invalidate(&user_id);
        self.tts.invalidate(&user_id);
    }
}
