//! Error types for Stackyard operations.
//!
//! None of these are fatal to a running simulation: the robot controller
//! logs them and treats the affected action as "no progress this tick".

use thiserror::Error;

/// Result type for Stackyard operations.
pub type Result<T> = std::result::Result<T, StackyardError>;

/// Errors that can occur while building or driving a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StackyardError {
    #[error("Cell ({x},{y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },

    #[error("Cell ({x},{y}) is a wall")]
    Wall { x: i32, y: i32 },

    #[error("Cell ({x},{y}) already holds a box")]
    CellOccupied { x: i32, y: i32 },

    #[error("Cell ({x},{y}) holds no box")]
    NoBox { x: i32, y: i32 },

    #[error("Agent '{0}' not found")]
    UnknownAgent(String),

    #[error("Agent '{0}' is already registered")]
    DuplicateAgent(String),

    #[error("Mailbox of agent '{0}' is full")]
    MailboxFull(String),

    #[error("Mailbox of agent '{0}' is closed")]
    MailboxClosed(String),

    #[error("No async runtime to serve agent '{0}'")]
    NoRuntime(String),

    #[error("Malformed message content: {0}")]
    MalformedContent(String),

    #[error("Invalid value for {field}: {value} ({reason})")]
    Config {
        field: String,
        value: String,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StackyardError {
    fn from(e: std::io::Error) -> Self {
        StackyardError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StackyardError {
    fn from(e: serde_json::Error) -> Self {
        StackyardError::Serialization(e.to_string())
    }
}

// Convenience constructors
impl StackyardError {
    pub fn unknown_agent(name: impl Into<String>) -> Self {
        StackyardError::UnknownAgent(name.into())
    }

    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        StackyardError::Config {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_cell() {
        let e = StackyardError::Wall { x: 3, y: 4 };
        assert_eq!(e.to_string(), "Cell (3,4) is a wall");
    }

    #[test]
    fn config_constructor_formats_value() {
        let e = StackyardError::invalid_config("grid.rows", 0, "must be positive");
        assert_eq!(
            e.to_string(),
            "Invalid value for grid.rows: 0 (must be positive)"
        );
    }
}
