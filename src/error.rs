/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;

/// Errors surfaced to the caller of a game operation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("{kind} {id} does not exist")]
    NotFound { kind: &'static str, id: String },

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GameError {
    pub fn session_not_found(code: &str) -> Self {
        GameError::NotFound {
            kind: "game",
            id: code.to_string(),
        }
    }

    pub fn round_not_found(id: &str) -> Self {
        GameError::NotFound {
            kind: "round",
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NotFound { .. } => "NOT_FOUND",
            GameError::InvalidInput(_) => "INVALID_INPUT",
            GameError::Conflict(_) => "CONFLICT",
            GameError::Internal(_) => "INTERNAL",
        }
    }
}

/// Reject empty or whitespace-only required fields
pub fn require_non_empty(field: &str, value: &str) -> GameResult<()> {
    if value.trim().is_empty() {
        return Err(GameError::InvalidInput(format!("{} must be non-empty", field)));
    }
    Ok(())
}
