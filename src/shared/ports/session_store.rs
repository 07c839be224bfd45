use std::sync::Arc;

use tokio::sync::Mutex;

use crate::shared::entities::{SessionId, VoiceSession};

/// Exclusive access to one session. Holding the lock serialises every
/// read-modify-write on that session id.
pub type SessionHandle = Arc<Mutex<VoiceSession>>;

pub trait SessionStore: Send + Sync {
    /// Returns the session, creating it with default metrics if the id is unknown.
    fn get_or_create(&self, id: &SessionId) -> SessionHandle;

    fn get(&self, id: &SessionId) -> Option<SessionHandle>;

    /// Drops sessions idle past the configured TTL and returns how many were removed.
    fn evict_expired(&self) -> usize;

    fn len(&self) -> usize;
}
