use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    #[error("Row {line} has {found} values but the header has {expected} columns")]
    RowShapeMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Header path conflict at '{path}': {message}")]
    PathConflict { path: String, message: String },

    #[error("Record store error: {message}")]
    StoreError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Validation,
    Storage,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn malformed(message: impl Into<String>) -> Self {
        EtlError::MalformedInput {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        EtlError::ValidationError {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        EtlError::StoreError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::MalformedInput { .. }
            | EtlError::RowShapeMismatch { .. }
            | EtlError::PathConflict { .. }
            | EtlError::CsvError(_) => ErrorCategory::Input,
            EtlError::ValidationError { .. } => ErrorCategory::Validation,
            EtlError::StoreError { .. } | EtlError::SerializationError(_) => {
                ErrorCategory::Storage
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Validation => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            // 存儲失敗通常可重試
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::MalformedInput { .. } => {
                "Provide a header line and at least one data row".to_string()
            }
            EtlError::RowShapeMismatch { line, .. } => format!(
                "Fix line {} so it has one value per header column (quoted fields and embedded commas are not supported)",
                line
            ),
            EtlError::ValidationError { message } if message.contains("'address'") => {
                "Split the address column into address.line1, address.city, ... columns".to_string()
            }
            EtlError::ValidationError { .. } => {
                "Every row needs name.firstName, name.lastName and a positive integer age".to_string()
            }
            EtlError::PathConflict { path, .. } => format!(
                "Header '{}' is used both as a value and as a parent path; rename one of the columns",
                path
            ),
            EtlError::StoreError { .. } | EtlError::SerializationError(_) => {
                "Check the store location and retry; no rows were committed".to_string()
            }
            EtlError::CsvError(_) => "Make sure the file is UTF-8 encoded CSV".to_string(),
            EtlError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                "Check --csv-path (or CSV_FILE_PATH) points at an existing file".to_string()
            }
            EtlError::IoError(_) => "Check file permissions and available disk space".to_string(),
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("The CSV input could not be read: {}", self),
            ErrorCategory::Validation => format!("A row failed validation: {}", self),
            ErrorCategory::Storage => format!("Saving records failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_shape_mismatch_message() {
        let err = EtlError::RowShapeMismatch {
            line: 3,
            expected: 4,
            found: 3,
        };
        assert_eq!(
            err.to_string(),
            "Row 3 has 3 values but the header has 4 columns"
        );
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_not_found_suggests_csv_path() {
        let err = EtlError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.recovery_suggestion().contains("--csv-path"));
    }

    #[test]
    fn test_scalar_address_suggests_split_columns() {
        let err = EtlError::validation("line 2: 'address' must be written as address.<field> columns");
        assert!(err.recovery_suggestion().contains("address.city"));

        let err = EtlError::validation("line 2: invalid age value (age is missing)");
        assert!(err.recovery_suggestion().contains("positive integer age"));
    }

    #[test]
    fn test_store_errors_are_retryable() {
        let err = EtlError::store("disk full");
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.user_friendly_message().starts_with("Saving records failed"));
    }
}
