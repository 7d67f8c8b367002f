// @generated by cw-bindgen from the `forest` contract schema. Do not edit by hand.

#[allow(unused_imports)]
use cw_bindgen::{Transport, TransportError};
#[allow(unused_imports)]
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree(pub Vec<Tree>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain(pub Option<Box<Chain>>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantiateMsg {
    pub tree: Tree,
    pub chain: Chain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecuteMsg {
    #[serde(rename = "plant")]
    Plant(Tree),
}

impl ExecuteMsg {
    /// Builds [`ExecuteMsg::Plant`].
    pub fn plant(payload: Tree) -> Self {
        Self::Plant(payload)
    }
}

/// Typed client for the `forest` contract.
///
/// Messages are encoded as JSON and handed to the [`Transport`], which owns
/// signing, broadcasting and querying.
pub struct ForestClient<T: Transport> {
    transport:        T,
    contract_address: String,
}

impl<T: Transport> ForestClient<T> {
    pub fn new(transport: T, contract_address: impl Into<String>) -> Self {
        Self {
            transport,
            contract_address: contract_address.into(),
        }
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Executes `plant`.
    pub fn plant(&self, payload: Tree) -> Result<T::TxHandle, TransportError> {
        let msg = ExecuteMsg::plant(payload);
        self.transport.execute(&self.contract_address, &cw_bindgen::encode_msg(&msg)?)
    }
}
