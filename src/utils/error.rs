use thiserror::Error;

#[derive(Error, Debug)]
pub enum FarmError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FarmError {
    pub fn validation(message: impl Into<String>) -> Self {
        FarmError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FarmError::ConfigValidationError { .. }
            | FarmError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            FarmError::ValidationError { .. } => ErrorCategory::Input,
            FarmError::ProcessingError { .. }
            | FarmError::CsvError(_)
            | FarmError::SerializationError(_) => ErrorCategory::Processing,
            FarmError::IoError(_) | FarmError::ZipError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            FarmError::ConfigValidationError { field, .. } => {
                format!("Check the '{}' entry of your configuration file", field)
            }
            FarmError::InvalidConfigValueError { field, reason, .. } => {
                format!("Fix '{}': {}", field, reason)
            }
            FarmError::ValidationError { .. } => {
                "Correct the input value named above and try again".to_string()
            }
            FarmError::IoError(_) | FarmError::ZipError(_) => {
                "Make sure the output directory exists and is writable".to_string()
            }
            FarmError::CsvError(_) | FarmError::SerializationError(_) => {
                "Check that the input file is well-formed".to_string()
            }
            FarmError::ProcessingError { .. } => "Re-run with --verbose for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::Processing => format!("Could not process data: {}", self),
            ErrorCategory::Storage => format!("Could not read or write files: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, FarmError>;
