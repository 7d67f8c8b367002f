use cw_bindgen_schema::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed schema {document}: {message}")]
    MalformedSchema {
        document: String,
        message:  String,
    },

    #[error("Unresolved reference \"{reference}\" in {document}")]
    UnresolvedReference {
        document:  String,
        reference: String,
    },

    #[error("Unsupported schema construct \"{construct}\" at {document}#{path}")]
    UnsupportedSchemaConstruct {
        document:  String,
        path:      String,
        construct: String,
    },

    #[error("Emission conflict on \"{name}\": {message}")]
    EmissionConflict {
        name:    String,
        message: String,
    },
}

impl CompileError {
    pub(crate) fn malformed(document: &str, message: impl Into<String>) -> Self {
        CompileError::MalformedSchema {
            document: document.to_string(),
            message:  message.into(),
        }
    }

    pub(crate) fn conflict(name: &str, message: impl Into<String>) -> Self {
        CompileError::EmissionConflict {
            name:    name.to_string(),
            message: message.into(),
        }
    }
}

impl From<SchemaError> for CompileError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Io { path, source } => CompileError::Io { path, source },
            SchemaError::Parse { label, source } => CompileError::MalformedSchema {
                document: label,
                message:  format!("not valid JSON: {}", source),
            },
            SchemaError::Malformed { label, message } => CompileError::MalformedSchema {
                document: label,
                message,
            },
            SchemaError::UnknownKind(kind) => CompileError::MalformedSchema {
                document: kind.clone(),
                message:  format!("unknown message kind \"{}\"", kind),
            },
        }
    }
}
