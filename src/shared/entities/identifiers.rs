use std::fmt;

use thiserror::Error;

/// Opaque voice-channel identifier chosen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionIdError {
    #[error("SessionId is empty")]
    Empty,
}

impl SessionId {
    pub const DEFAULT: &'static str = "default";

    pub fn new(value: impl Into<String>) -> Result<Self, SessionIdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(SessionIdError::Empty);
        }
        Ok(Self(value))
    }

    /// Requests without a usable id share the `"default"` session.
    pub fn or_default(value: Option<&str>) -> Self {
        value
            .and_then(|v| Self::new(v).ok())
            .unwrap_or_else(|| Self(Self::DEFAULT.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_rejected() {
        assert_eq!(SessionId::new("  "), Err(SessionIdError::Empty));
        assert_eq!(SessionId::new("kitchen").unwrap().as_str(), "kitchen");
    }

    #[test]
    fn missing_id_falls_back_to_default() {
        assert_eq!(SessionId::or_default(None).as_str(), "default");
        assert_eq!(SessionId::or_default(Some("")).as_str(), "default");
        assert_eq!(SessionId::or_default(Some("s-1")).as_str(), "s-1");
    }
}
