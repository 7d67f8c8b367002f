//! cw-bindgen
//!
//! Runtime support for the bindings generated by `cw-bindgen-compiler`.
//!
//! - [`Transport`], the seam between a generated client and whatever signs,
//!   broadcasts and queries on chain.
//! - [`encode_msg`] / [`decode_response`], the JSON codec every generated
//!   client method goes through.
//! - Re-exports of [`compile`] and [`SchemaSources`], so a build script only
//!   needs this one dependency.

pub mod transport;

pub use cw_bindgen_compiler::{compile, CompileError, GeneratedModule};
pub use cw_bindgen_schema::{MessageKind, SchemaSource, SchemaSources};
pub use transport::{Transport, TransportError};

use serde::{de::DeserializeOwned, Serialize};

/// Encodes a contract message as the JSON bytes the contract expects.
pub fn encode_msg<T: Serialize>(msg: &T) -> Result<Vec<u8>, TransportError> {
    serde_json::to_vec(msg).map_err(TransportError::Encode)
}

/// Decodes the raw bytes of a query response.
pub fn decode_response<R: DeserializeOwned>(bytes: &[u8]) -> Result<R, TransportError> {
    serde_json::from_slice(bytes).map_err(TransportError::Decode)
}

pub mod schema {
    pub use cw_bindgen_schema::{DocumentRole, MessageKind, SchemaDocument, SchemaSource, SchemaSources};
}
