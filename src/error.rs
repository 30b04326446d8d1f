use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

impl LoadError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        LoadError::Csv {
            path: path.display().to_string(),
            source,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },

    #[error("unusable service account credentials: {0}")]
    Credentials(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("token exchange failed: {0}")]
    Auth(String),

    #[error("sheets api http {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("http client unavailable: {0:#}")]
    Client(anyhow::Error),

    #[error("invalid sheets api url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to sign token request: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}
