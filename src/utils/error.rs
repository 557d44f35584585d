use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_yaml::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 輸入內容有誤 (workflow、properties、resource)
    Input,
    Io,
    Config,
}

impl ProjectError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ParseError { .. } | Self::ValidationError { .. } => ErrorCategory::Input,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::Io,
            Self::ConfigError { .. } => ErrorCategory::Config,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ParseError { .. } => {
                "Check that the workflow is valid JSON or YAML and declares an `id` and at least one state"
            }
            Self::ValidationError { .. } => {
                "Check the project name, resource file names and resource types"
            }
            Self::IoError(_) => "Check that input files exist and the output directory is writable",
            Self::SerializationError(_) => "Check the workflow document for values YAML cannot represent",
            Self::ConfigError { .. } => "Check the project configuration file and command line flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjectError>;
