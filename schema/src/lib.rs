//! Schema documents for the cw-bindgen compiler.
//!
//! A CosmWasm contract publishes one JSON Schema document per message kind
//! (`instantiate_msg.json`, `execute_msg.json`, ...), optionally one per query
//! response, and newer toolchains bundle them all into a single IDL file.
//! This crate turns those files into [`SchemaSources`] and parses each one
//! into an immutable [`SchemaDocument`].
//!
//! ```
//! use cw_bindgen_schema::*;
//! use serde_json::json;
//!
//! let sources = SchemaSources::new()
//!     .with_message(MessageKind::Instantiate, json!({ "title": "InstantiateMsg", "type": "object" }));
//!
//! let docs = sources.documents().unwrap();
//! assert_eq!(docs.len(), 1);
//! assert_eq!(docs[0].name(), "InstantiateMsg");
//! ```

pub mod document;
pub mod error;
pub mod kind;
pub mod source;

pub use document::*;
pub use error::SchemaError;
pub use kind::MessageKind;
pub use source::*;
