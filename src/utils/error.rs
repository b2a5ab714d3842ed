use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Download of {url} failed with HTTP status {status}")]
    HttpStatusError { url: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Template rendering error: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("Missing required column '{column}' (found: {found})")]
    MissingColumnError { column: String, found: String },

    #[error("No provider rows found in {source_name}")]
    EmptyInputError { source_name: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Input,
    Configuration,
    Output,
}

/// Drives the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Transient, a later scheduled run may succeed.
    Medium,
    /// Bad input or configuration.
    High,
    /// Local system failure.
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl DashboardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashboardError::ApiError(_) | DashboardError::HttpStatusError { .. } => {
                ErrorCategory::Network
            }
            DashboardError::CsvError(_)
            | DashboardError::MissingColumnError { .. }
            | DashboardError::EmptyInputError { .. } => ErrorCategory::Input,
            DashboardError::ConfigError { .. } | DashboardError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            DashboardError::IoError(_)
            | DashboardError::SerializationError(_)
            | DashboardError::TemplateError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DashboardError::ApiError(e) if e.is_timeout() => {
                "The register download timed out".to_string()
            }
            DashboardError::ApiError(_) => "Could not download the CASP register".to_string(),
            DashboardError::HttpStatusError { url, status } => {
                format!("The register server answered {} for {}", status, url)
            }
            DashboardError::CsvError(e) => format!("The register CSV is malformed: {}", e),
            DashboardError::MissingColumnError { column, .. } => {
                format!("The register CSV has no '{}' column", column)
            }
            DashboardError::EmptyInputError { source_name } => {
                format!("The register at {} contains no providers", source_name)
            }
            DashboardError::IoError(e) => format!("File system error: {}", e),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DashboardError::ApiError(_) | DashboardError::HttpStatusError { .. } => {
                "Check network access and the source URL, or pass --csv with a local copy"
            }
            DashboardError::CsvError(_) => {
                "Make sure the file is a comma-separated export of the ESMA CASP register"
            }
            DashboardError::MissingColumnError { .. } => {
                "The register layout may have changed; compare the CSV header with the expected columns"
            }
            DashboardError::EmptyInputError { .. } => {
                "The published file may be truncated; the previous dashboard was left untouched"
            }
            DashboardError::ConfigError { .. } | DashboardError::InvalidConfigValueError { .. } => {
                "Review the command-line flags and the TOML configuration file"
            }
            DashboardError::IoError(_) => "Check that the output directory exists and is writable",
            DashboardError::SerializationError(_) | DashboardError::TemplateError(_) => {
                "Re-run with --verbose and report the log output"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
