use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("{0}")]
    Validation(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WAPI error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("{count} {object_type} objects match {filter}; refusing to pick one")]
    Ambiguous {
        object_type: String,
        filter: String,
        count: usize,
    },
}

impl ModuleError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ModuleError::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ModuleError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, ModuleError>;
