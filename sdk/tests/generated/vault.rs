// @generated by cw-bindgen from the `vault` contract schema. Do not edit by hand.

#[allow(unused_imports)]
use cw_bindgen::{Transport, TransportError};
#[allow(unused_imports)]
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantiateMsg {
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteMsgDeposit {
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteMsgWithdraw {
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecuteMsg {
    #[serde(rename = "deposit")]
    Deposit(ExecuteMsgDeposit),
    #[serde(rename = "withdraw")]
    Withdraw(ExecuteMsgWithdraw),
}

impl ExecuteMsg {
    /// Builds [`ExecuteMsg::Deposit`].
    pub fn deposit(payload: ExecuteMsgDeposit) -> Self {
        Self::Deposit(payload)
    }

    /// Builds [`ExecuteMsg::Withdraw`].
    pub fn withdraw(payload: ExecuteMsgWithdraw) -> Self {
        Self::Withdraw(payload)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMsgBalance {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryMsg {
    #[serde(rename = "config")]
    Config,
    #[serde(rename = "balance")]
    Balance(QueryMsgBalance),
}

impl QueryMsg {
    /// Builds [`QueryMsg::Config`].
    pub fn config() -> Self {
        Self::Config
    }

    /// Builds [`QueryMsg::Balance`].
    pub fn balance(payload: QueryMsgBalance) -> Self {
        Self::Balance(payload)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub owner: String,
}

/// Typed client for the `vault` contract.
///
/// Messages are encoded as JSON and handed to the [`Transport`], which owns
/// signing, broadcasting and querying.
pub struct VaultClient<T: Transport> {
    transport:        T,
    contract_address: String,
}

impl<T: Transport> VaultClient<T> {
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

    /// Executes `deposit`.
    pub fn deposit(&self, payload: ExecuteMsgDeposit) -> Result<T::TxHandle, TransportError> {
        let msg = ExecuteMsg::deposit(payload);
        self.transport.execute(&self.contract_address, &cw_bindgen::encode_msg(&msg)?)
    }

    /// Executes `withdraw`.
    pub fn withdraw(&self, payload: ExecuteMsgWithdraw) -> Result<T::TxHandle, TransportError> {
        let msg = ExecuteMsg::withdraw(payload);
        self.transport.execute(&self.contract_address, &cw_bindgen::encode_msg(&msg)?)
    }

    /// Queries `config`.
    pub fn config(&self) -> Result<ConfigResponse, TransportError> {
        let msg = QueryMsg::config();
        let response = self.transport.query(&self.contract_address, &cw_bindgen::encode_msg(&msg)?)?;
        cw_bindgen::decode_response(&response)
    }

    /// Queries `balance`.
    pub fn balance<R: serde::de::DeserializeOwned>(&self, payload: QueryMsgBalance) -> Result<R, TransportError> {
        let msg = QueryMsg::balance(payload);
        let response = self.transport.query(&self.contract_address, &cw_bindgen::encode_msg(&msg)?)?;
        cw_bindgen::decode_response(&response)
    }
}
