use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplaceError {
    #[error("Mapping schema error: {0}")]
    Schema(String),

    #[error("Mapping parse error: {0}")]
    Parse(String),

    #[error("Malformed document: {0}")]
    Format(String),

    #[error("Failed to serialize document: {0}")]
    Serialization(String),

    #[error("Output collision: {0}")]
    Collision(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReplaceError {
    /// Short machine-readable kind, used in run summaries and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Schema(_) => "schema",
            Self::Parse(_) => "parse",
            Self::Format(_) => "format",
            Self::Serialization(_) => "serialization",
            Self::Collision(_) => "collision",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::Toml(_) => "toml",
            Self::Json(_) => "json",
        }
    }
}

impl From<csv::Error> for ReplaceError {
    fn from(e: csv::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReplaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_errors_become_parse_errors() {
        let bytes: &[u8] = b"Postnr;Id\n1000;A1\n2000\n";
        let mut reader = csv::ReaderBuilder::new().delimiter(b';').from_reader(bytes);
        let err = reader
            .records()
            .find_map(|r| r.err())
            .map(ReplaceError::from)
            .unwrap();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_display_includes_detail() {
        let err = ReplaceError::Schema("missing column 'Id'".into());
        assert_eq!(err.to_string(), "Mapping schema error: missing column 'Id'");
        assert_eq!(err.kind(), "schema");
    }
}
