use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CliError {
    pub message: String,
    pub exit_code: i32,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: 2,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: 3,
        }
    }

    pub fn ambiguous(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: 4,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: 5,
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: 6,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: 7,
        }
    }

    /// A named collection is absent from the store. Callers that can degrade
    /// (the streaks view) check for this with `is_missing_collection`;
    /// everyone else propagates it as a regular not-found failure.
    pub fn missing_collection(name: &str) -> Self {
        Self::not_found(format!("Collection not found: {}", name))
    }

    pub fn is_missing_collection(&self) -> bool {
        self.exit_code == 3 && self.message.starts_with("Collection not found")
    }
}
