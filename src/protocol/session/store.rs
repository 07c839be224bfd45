use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::shared::config::SessionStoreConfig;
use crate::shared::entities::{SessionId, VoiceSession};
use crate::shared::ports::{SessionHandle, SessionStore};

struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// Process-local session map with idle TTL and a size cap.
///
/// Sessions currently borrowed by a request (handle cloned elsewhere) are never
/// evicted by the TTL sweep and are the last choice when the size cap is hit.
#[derive(Clone)]
pub struct InMemorySessionStore {
    inner: Arc<Mutex<HashMap<SessionId, Entry>>>,
    ttl: Option<Duration>,
    max_entries: usize,
}

impl InMemorySessionStore {
    pub fn new(cfg: &SessionStoreConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl: cfg.ttl,
            max_entries: cfg.max_entries.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Entry>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// TTL sweep against an explicit clock reading.
    pub fn evict_expired_at(&self, now: Instant) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let mut map = self.lock();
        let before = map.len();
        map.retain(|id, entry| {
            let idle = now.saturating_duration_since(entry.last_seen);
            let keep = idle < ttl || Arc::strong_count(&entry.handle) > 1;
            if !keep {
                debug!("[session] evict idle session_id={}", id);
            }
            keep
        });
        before - map.len()
    }

    /// Removes the least recently seen idle session. Only when every session is in
    /// use does the oldest of them go.
    fn evict_lru(map: &mut HashMap<SessionId, Entry>) {
        let oldest = map
            .iter()
            .min_by_key(|(_, entry)| (Arc::strong_count(&entry.handle) > 1, entry.last_seen))
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            map.remove(&id);
            info!("[session] capacity reached, evicted session_id={}", id);
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn get_or_create(&self, id: &SessionId) -> SessionHandle {
        let now = Instant::now();
        let mut map = self.lock();
        if let Some(entry) = map.get_mut(id) {
            entry.last_seen = now;
            return entry.handle.clone();
        }
        while map.len() >= self.max_entries {
            Self::evict_lru(&mut map);
        }
        let handle: SessionHandle =
            Arc::new(tokio::sync::Mutex::new(VoiceSession::new(id.clone())));
        map.insert(
            id.clone(),
            Entry {
                handle: handle.clone(),
                last_seen: now,
            },
        );
        debug!("[session] created session_id={}", id);
        handle
    }

    fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        let mut map = self.lock();
        map.get_mut(id).map(|entry| {
            entry.last_seen = Instant::now();
            entry.handle.clone()
        })
    }

    fn evict_expired(&self) -> usize {
        self.evict_expired_at(Instant::now())
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(ttl_sec: Option<u64>, max_entries: usize) -> InMemorySessionStore {
        InMemorySessionStore::new(&SessionStoreConfig {
            ttl: ttl_sec.map(Duration::from_secs),
            max_entries,
            sweep_interval: Duration::from_secs(60),
        })
    }

    fn id(raw: &str) -> SessionId {
        SessionId::new(raw).unwrap()
    }

    #[tokio::test]
    async fn unknown_id_is_created_with_defaults() {
        let store = store(Some(60), 10);
        assert!(store.get(&id("a")).is_none());
        let handle = store.get_or_create(&id("a"));
        {
            let mut session = handle.lock().await;
            assert_eq!(session.load, 5.0);
            session.load = 20.0;
        }
        let again = store.get_or_create(&id("a"));
        assert_eq!(again.lock().await.load, 20.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn idle_sessions_expire() {
        let store = store(Some(60), 10);
        drop(store.get_or_create(&id("a")));
        let held = store.get_or_create(&id("b"));
        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(store.evict_expired_at(later), 1);
        assert!(store.get(&id("a")).is_none());
        assert!(store.get(&id("b")).is_some());
        drop(held);
    }

    #[test]
    fn zero_ttl_config_disables_sweep() {
        let store = store(None, 10);
        drop(store.get_or_create(&id("a")));
        let much_later = Instant::now() + Duration::from_secs(86_400);
        assert_eq!(store.evict_expired_at(much_later), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let store = store(None, 2);
        drop(store.get_or_create(&id("a")));
        std::thread::sleep(Duration::from_millis(2));
        drop(store.get_or_create(&id("b")));
        std::thread::sleep(Duration::from_millis(2));
        drop(store.get(&id("a")));
        std::thread::sleep(Duration::from_millis(2));
        drop(store.get_or_create(&id("c")));
        assert_eq!(store.len(), 2);
        assert!(store.get(&id("b")).is_none());
        assert!(store.get(&id("a")).is_some());
        assert!(store.get(&id("c")).is_some());
    }

    #[test]
    fn capacity_spares_sessions_in_use() {
        let store = store(None, 2);
        let held = store.get_or_create(&id("a"));
        std::thread::sleep(Duration::from_millis(2));
        drop(store.get_or_create(&id("b")));
        std::thread::sleep(Duration::from_millis(2));
        drop(store.get_or_create(&id("c")));
        assert!(store.get(&id("a")).is_some());
        assert!(store.get(&id("b")).is_none());
        assert!(store.get(&id("c")).is_some());
        drop(held);
    }

    #[test]
    fn capacity_falls_back_to_oldest_when_all_in_use() {
        let store = store(None, 2);
        let a = store.get_or_create(&id("a"));
        std::thread::sleep(Duration::from_millis(2));
        let b = store.get_or_create(&id("b"));
        std::thread::sleep(Duration::from_millis(2));
        drop(store.get_or_create(&id("c")));
        assert_eq!(store.len(), 2);
        assert!(store.get(&id("a")).is_none());
        assert!(store.get(&id("b")).is_some());
        drop((a, b));
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let store = store(Some(60), 10);
        let mut tasks = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let handle = store.get_or_create(&id("shared"));
                let mut session = handle.lock().await;
                let current = session.wake_count;
                tokio::task::yield_now().await;
                session.wake_count = current + 1;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        let handle = store.get_or_create(&id("shared"));
        assert_eq!(handle.lock().await.wake_count, 32);
    }
}
