use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use log::debug;

use crate::shared::error::runtime::HistoryError;
use crate::shared::ports::{HistoryEntry, HistoryPort};

#[derive(Default)]
struct UserLog {
    entries: VecDeque<HistoryEntry>,
    last_write: u64,
}

#[derive(Default)]
struct Inner {
    users: HashMap<String, UserLog>,
    clock: u64,
}

/// Audit log of anticipation readings kept in process memory.
///
/// Each user keeps at most `max_per_user` entries, oldest dropped first. At most
/// `max_users` users are tracked; a new user displaces the one written least recently.
pub struct InMemoryHistory {
    max_per_user: usize,
    max_users: usize,
    inner: Mutex<Inner>,
}

impl InMemoryHistory {
    pub fn new(max_per_user: usize, max_users: usize) -> Self {
        Self {
            max_per_user: max_per_user.max(1),
            max_users: max_users.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn user_count(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.users.len())
            .unwrap_or_else(|e| e.into_inner().users.len())
    }
}

impl Inner {
    fn evict_least_recent(&mut self) {
        let oldest = self
            .users
            .iter()
            .min_by_key(|(_, log)| log.last_write)
            .map(|(user, _)| user.clone());
        if let Some(user) = oldest {
            self.users.remove(&user);
            debug!("[history] user cap reached, dropped user={}", user);
        }
    }
}

impl HistoryPort for InMemoryHistory {
    fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| HistoryError::WriteFailed("history lock poisoned".to_string()))?;
        if !inner.users.contains_key(&entry.user_id) {
            while inner.users.len() >= self.max_users {
                inner.evict_least_recent();
            }
        }
        inner.clock += 1;
        let now = inner.clock;
        let log = inner.users.entry(entry.user_id.clone()).or_default();
        log.last_write = now;
        if log.entries.len() >= self.max_per_user {
            log.entries.pop_front();
        }
        log.entries.push_back(entry);
        Ok(())
    }

    fn recent(&self, user_id: &str, limit: usize) -> Vec<HistoryEntry> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .users
            .get(user_id)
            .map(|log| log.entries.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }
}
