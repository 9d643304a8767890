use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport failure: {message}")]
    TransportFailure { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Page fixture error: {message}")]
    FixtureError { message: String },
}

impl FormsError {
    /// Whether the error came from the network layer rather than local setup.
    pub fn is_transport(&self) -> bool {
        matches!(self, FormsError::Http(_) | FormsError::TransportFailure { .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FormsError::Http(_) | FormsError::TransportFailure { .. } => {
                "The form endpoint could not be reached".to_string()
            }
            FormsError::Io(e) => format!("Could not read a file: {}", e),
            FormsError::Toml(_) | FormsError::Serialization(_) => {
                "A configuration file could not be parsed".to_string()
            }
            FormsError::InvalidUrl(e) => format!("A URL is malformed: {}", e),
            FormsError::ConfigValidationError { field, .. }
            | FormsError::InvalidConfigValueError { field, .. }
            | FormsError::MissingConfigError { field } => {
                format!("The setting '{}' is not valid", field)
            }
            FormsError::FixtureError { message } => format!("The page fixture is invalid: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FormsError::Http(_) | FormsError::TransportFailure { .. } => {
                "Check that the form action URL points at a running server"
            }
            FormsError::Io(_) => "Check the file path and its permissions",
            FormsError::Toml(_) | FormsError::Serialization(_) => {
                "Fix the syntax of the TOML file"
            }
            FormsError::InvalidUrl(_) => "Use an absolute http(s) base URL",
            FormsError::ConfigValidationError { .. }
            | FormsError::InvalidConfigValueError { .. }
            | FormsError::MissingConfigError { .. } => {
                "Review the settings file against the documented defaults"
            }
            FormsError::FixtureError { .. } => "Check the element ids referenced by the steps",
        }
    }
}

pub type Result<T> = std::result::Result<T, FormsError>;
