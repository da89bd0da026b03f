use thiserror::Error;

#[derive(Error, Debug)]
pub enum WifiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("API error: {code} - {message}")]
    Api { code: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Chart rendering failed: {0}")]
    Chart(String),
}

impl WifiError {
    /// Plotters errors are generic over the drawing backend; flatten them to a
    /// message so the enum stays backend-agnostic.
    pub fn chart(err: impl std::fmt::Display) -> Self {
        WifiError::Chart(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WifiError>;
