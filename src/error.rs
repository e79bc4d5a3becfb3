use thiserror::Error;

/// Errors surfaced by the simulation engine.
#[derive(Error, Debug, Clone)]
pub enum SimError {
    #[error("Invalid bracket: {0}")]
    InvalidBracket(String),

    #[error("Unknown mode '{id}'. Available modes: {}", .available.join(", "))]
    UnknownMode { id: String, available: Vec<String> },

    #[error("Mode '{0}' is already registered")]
    DuplicateModeRegistration(String),

    #[error("Invalid mode configuration: {0}")]
    InvalidMode(String),

    #[error("Slot '{0}' references team '{1}' which is not in the roster")]
    UnknownTeamReference(String, String),

    #[error("Unknown slot id '{0}'")]
    UnknownSlot(String),

    #[error("Team '{team}' is not a participant of slot '{slot}'")]
    InvalidWinner { slot: String, team: String },

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),
}

impl SimError {
    /// Whether the caller can continue simulating after hitting this error.
    ///
    /// Unknown team references are skippable (the propagator drops the game
    /// and keeps going); everything else invalidates the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SimError::UnknownTeamReference(_, _))
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_mode_lists_available() {
        let err = SimError::UnknownMode {
            id: "nope".to_string(),
            available: vec!["statistical".to_string(), "chaos".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("nope"));
        assert!(msg.contains("statistical"));
        assert!(msg.contains("chaos"));
    }

    #[test]
    fn test_recoverability() {
        assert!(SimError::UnknownTeamReference("s".into(), "t".into()).is_recoverable());
        assert!(!SimError::InvalidBracket("cycle".into()).is_recoverable());
    }
}
