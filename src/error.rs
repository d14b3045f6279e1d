//! Batch-level error type.
//!
//! Anything that stops a whole run (bad input file, missing column, missing
//! API key, unusable model artifacts, failed export) is an `AppError`. Row-level
//! problems never become an `AppError`; the streams recover from them.

/// Input file, configuration, or column-contract problem.
pub const EXIT_INPUT: u8 = 2;
/// Classifier artifacts missing or unusable.
pub const EXIT_MODEL: u8 = 3;
/// Failed to write an output file.
pub const EXIT_OUTPUT: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// A required input column is absent. Raised before any row is processed.
    pub fn missing_column(name: &str) -> Self {
        Self::new(EXIT_INPUT, format!("Missing required column: `{name}`"))
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
