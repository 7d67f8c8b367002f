use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Carries encoded messages to a deployed contract.
///
/// Generated clients only build and encode messages; signing, fees, gas and
/// the RPC connection all live behind this trait.
pub trait Transport {
    /// Whatever the transport hands back for a broadcast transaction.
    type TxHandle;

    fn execute(&self, contract_address: &str, msg: &[u8]) -> Result<Self::TxHandle, TransportError>;

    /// Returns the raw JSON bytes of the query response.
    fn query(&self, contract_address: &str, msg: &[u8]) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    type TxHandle = T::TxHandle;

    fn execute(&self, contract_address: &str, msg: &[u8]) -> Result<Self::TxHandle, TransportError> {
        (**self).execute(contract_address, msg)
    }

    fn query(&self, contract_address: &str, msg: &[u8]) -> Result<Vec<u8>, TransportError> {
        (**self).query(contract_address, msg)
    }
}
