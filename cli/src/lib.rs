//! cw-bindgen-cli
//!
//! The build driver behind the `cw-bindgen` binary: reads a [`DriverConfig`],
//! compiles every listed contract in parallel and writes each generated
//! module atomically next to the previous one.

pub mod config;
pub mod driver;

pub use config::{ContractTarget, DriverConfig};
pub use driver::{compile_contract, run, write_atomic, DriverReport};
