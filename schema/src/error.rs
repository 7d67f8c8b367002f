use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema {label} is not valid JSON: {source}")]
    Parse {
        label:  String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed schema {label}: {message}")]
    Malformed {
        label:   String,
        message: String,
    },

    #[error("Unknown message kind \"{0}\"")]
    UnknownKind(String),
}

impl SchemaError {
    pub(crate) fn malformed(label: &str, message: impl Into<String>) -> Self {
        SchemaError::Malformed {
            label:   label.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SchemaError::Io {
            path: path.into(),
            source,
        }
    }
}
