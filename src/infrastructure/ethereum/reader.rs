//! Typed, time-bounded contract reads over a [`ChainAccess`]

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256};
use alloy_sol_types::SolCall;
use anyhow::{anyhow, Context, Result};
use futures::future::join_all;

use super::contracts::IERC725Y;
use super::erc725;
use super::ChainAccess;

/// Encodes `sol!` calls, bounds each one with a timeout and decodes the result
#[derive(Clone)]
pub struct ContractReader {
    chain: Arc<dyn ChainAccess>,
    timeout: Duration,
}

impl ContractReader {
    pub fn new(chain: Arc<dyn ChainAccess>, timeout: Duration) -> Self {
        Self { chain, timeout }
    }

    pub fn endpoint_name(&self) -> String {
        self.chain.endpoint_name()
    }

    /// Execute a read-only call and decode its return value
    pub async fn call<C>(&self, to: Address, call: &C) -> Result<C::Return>
    where
        C: SolCall + Sync,
    {
        let input = Bytes::from(call.abi_encode());
        let output = tokio::time::timeout(self.timeout, self.chain.call(to, input))
            .await
            .map_err(|_| anyhow!("{} on {to} timed out after {:?}", C::SIGNATURE, self.timeout))??;
        C::abi_decode_returns(&output)
            .with_context(|| format!("failed to decode {} output from {to}", C::SIGNATURE))
    }

    /// ERC725Y `getData(bytes32)`
    pub async fn get_data(&self, address: Address, key: B256) -> Result<Bytes> {
        self.call(address, &IERC725Y::getDataCall { dataKey: key }).await
    }

    /// ERC725Y read by LSP2 key name
    pub async fn fetch_data(&self, address: Address, key_name: &str) -> Result<Bytes> {
        self.get_data(address, erc725::data_key(key_name)).await
    }

    /// ERC725Y reads for several key names, issued concurrently
    pub async fn fetch_data_many(&self, address: Address, key_names: &[&str]) -> Vec<Result<Bytes>> {
        join_all(key_names.iter().map(|name| self.fetch_data(address, name))).await
    }

    /// Read every element of an LSP2 address array (e.g. "LSP5ReceivedAssets[]")
    ///
    /// Any failing read fails the whole array.
    pub async fn fetch_address_array(&self, address: Address, key_name: &str) -> Result<Vec<Address>> {
        let length_key = erc725::data_key(key_name);
        let raw_length = self
            .get_data(address, length_key)
            .await
            .with_context(|| format!("read {key_name} length on {address}"))?;
        let length = erc725::decode_array_length(&raw_length)?;

        let mut items = Vec::with_capacity(length as usize);
        for index in 0..length {
            let key = erc725::array_element_key(&length_key, index);
            let raw = self
                .get_data(address, key)
                .await
                .with_context(|| format!("read {key_name} element {index} on {address}"))?;
            items.push(erc725::decode_address(&raw)?);
        }
        Ok(items)
    }
}
