//! cw-bindgen-compiler
//!
//! Turns the JSON Schemas a CosmWasm contract publishes into a Rust module:
//!  1) the loader parses every document and resolves `$ref`s,
//!  2) the mapper lowers each schema into a [`TypeNode`] stored once per name,
//!  3) the Rust emitter renders serde types, dependencies first,
//!  4) the client generator adds a typed `<Contract>Client` over a `Transport`.
//!
//! ```
//! use cw_bindgen_compiler::compile;
//! use cw_bindgen_schema::{MessageKind, SchemaSources};
//! use serde_json::json;
//!
//! let sources = SchemaSources::new()
//!     .with_message(MessageKind::Instantiate, json!({ "type": "object", "properties": {} }))
//!     .with_message(MessageKind::Execute, json!({ "type": "string", "enum": ["reset"] }));
//! let module = compile("counter", &sources).unwrap();
//! assert_eq!(module.client_methods, vec!["reset"]);
//! ```

pub mod compiler;
pub mod error;
pub mod gen_client;
pub mod gen_rust;
pub mod loader;
mod mapper;
pub mod resolver;
pub mod types;
pub mod utils;
pub mod verifier;

pub use compiler::{compile, emit_module, Declaration, DeclarationKind, GeneratedModule};
pub use error::CompileError;
pub use loader::load_interface;
pub use types::{ContractInterface, DefId, Definition, DefinitionTable, Field, Primitive, TypeNode, Variant};
