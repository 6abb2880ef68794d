use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Cannot parse command '{input}': {reason}")]
    CommandParseError { input: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    High,
    Critical,
}

impl LabError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LabError::CommandParseError { .. } => ErrorSeverity::Low,
            LabError::ConfigValidationError { .. } | LabError::InvalidConfigValueError { .. } => {
                ErrorSeverity::High
            }
            LabError::IoError(_) | LabError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LabError::IoError(e) => format!("Could not read or write a file: {}", e),
            LabError::SerializationError(e) => format!("Could not render readouts: {}", e),
            LabError::ConfigValidationError { field, message } => {
                format!("The lab configuration is invalid ({}): {}", field, message)
            }
            LabError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("Setting {} = {} is not allowed: {}", field, value, reason),
            LabError::CommandParseError { input, reason } => {
                format!("Unknown bench command '{}': {}", input, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LabError::IoError(_) => "Check that the file exists and is readable",
            LabError::SerializationError(_) => "Retry without --json",
            LabError::ConfigValidationError { .. } => "Make sure the file is valid TOML",
            LabError::InvalidConfigValueError { .. } => {
                "Fix the value in the config file or remove it to use the default"
            }
            LabError::CommandParseError { .. } => "Type 'help' to list bench commands",
        }
    }
}

pub type Result<T> = std::result::Result<T, LabError>;
