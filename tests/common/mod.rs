//! In-process chain and signature directory used by the integration tests
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, FixedBytes, B256, U256};
use alloy_sol_types::{SolCall, SolValue};
use anyhow::{anyhow, bail, Result};

use lspscope::domain::abi::SelectorSignature;
use lspscope::domain::assets::AssetStandard;
use lspscope::infrastructure::abi::SignatureDirectory;
use lspscope::infrastructure::assets::ReconcilerOptions;
use lspscope::infrastructure::ethereum::contracts::{IERC165, IERC20, IERC725Y, IERC777};
use lspscope::infrastructure::ethereum::{erc725, ChainAccess};
use lspscope::store::{AssetStore, LookupCache};
use lspscope::{Context, ContextParts, DirectoryError};

/// Scripted behaviour of one deployed contract
#[derive(Debug, Clone, Default)]
pub struct MockContract {
    /// `supportsInterface` reverts when false
    pub eip165: bool,
    pub interfaces: HashSet<FixedBytes<4>>,
    /// `getData` reverts when false
    pub erc725y: bool,
    pub data: HashMap<B256, Bytes>,
    pub decimals: Option<u8>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub balances: HashMap<Address, U256>,
    /// `totalSupply` and `allowance` answer
    pub erc20: bool,
    pub granularity: bool,
}

impl MockContract {
    /// LSP7 token with LSP4 metadata
    pub fn lsp7(name: &str, symbol: &str, decimals: Option<u8>) -> Self {
        let mut contract = Self {
            eip165: true,
            erc725y: true,
            decimals,
            erc20: true,
            ..Self::default()
        };
        contract.interfaces.insert(AssetStandard::Lsp7DigitalAsset.interface_ids()[0]);
        contract.set_data(erc725::LSP4_TOKEN_NAME, name.as_bytes());
        contract.set_data(erc725::LSP4_TOKEN_SYMBOL, symbol.as_bytes());
        contract
    }

    /// LSP8 collection with LSP4 metadata
    pub fn lsp8(name: &str, symbol: &str) -> Self {
        let mut contract = Self {
            eip165: true,
            erc725y: true,
            ..Self::default()
        };
        contract
            .interfaces
            .insert(AssetStandard::Lsp8IdentifiableDigitalAsset.interface_ids()[0]);
        contract.set_data(erc725::LSP4_TOKEN_NAME, name.as_bytes());
        contract.set_data(erc725::LSP4_TOKEN_SYMBOL, symbol.as_bytes());
        contract
    }

    /// Plain ERC20 without EIP-165
    pub fn erc20(name: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            decimals: Some(decimals),
            name: Some(name.to_string()),
            symbol: Some(symbol.to_string()),
            erc20: true,
            ..Self::default()
        }
    }

    /// Universal Profile holding `received` in its LSP5 index
    pub fn profile(received: &[Address]) -> Self {
        let mut contract = Self {
            eip165: true,
            erc725y: true,
            ..Self::default()
        };
        contract
            .interfaces
            .insert(AssetStandard::Lsp3ProfileMetadata.interface_ids()[0]);
        contract.set_received_assets(received);
        contract
    }

    pub fn set_data(&mut self, key_name: &str, value: &[u8]) {
        self.data
            .insert(erc725::data_key(key_name), Bytes::copy_from_slice(value));
    }

    pub fn set_received_assets(&mut self, received: &[Address]) {
        let length_key = erc725::data_key(erc725::LSP5_RECEIVED_ASSETS);
        self.data.insert(
            length_key,
            Bytes::copy_from_slice(&(received.len() as u128).to_be_bytes()),
        );
        for (index, asset) in received.iter().enumerate() {
            let key = erc725::array_element_key(&length_key, index as u128);
            self.data.insert(key, Bytes::copy_from_slice(asset.as_slice()));
        }
    }

    pub fn with_balance(mut self, owner: Address, amount: U256) -> Self {
        self.balances.insert(owner, amount);
        self
    }

    fn answer(&self, input: &[u8]) -> Result<Vec<u8>> {
        let selector: [u8; 4] = input
            .get(..4)
            .ok_or_else(|| anyhow!("missing selector"))?
            .try_into()?;

        match selector {
            IERC165::supportsInterfaceCall::SELECTOR if self.eip165 => {
                let call = IERC165::supportsInterfaceCall::abi_decode(input)?;
                Ok(self.interfaces.contains(&call.interfaceId).abi_encode())
            }
            IERC725Y::getDataCall::SELECTOR if self.erc725y => {
                let call = IERC725Y::getDataCall::abi_decode(input)?;
                let value = self.data.get(&call.dataKey).cloned().unwrap_or_default();
                Ok((value,).abi_encode_params())
            }
            IERC20::decimalsCall::SELECTOR => match self.decimals {
                Some(decimals) => Ok(U256::from(decimals).abi_encode()),
                None => bail!("execution reverted"),
            },
            IERC20::balanceOfCall::SELECTOR if self.decimals.is_some() || self.erc20 => {
                let call = IERC20::balanceOfCall::abi_decode(input)?;
                let balance = self.balances.get(&call.owner).copied().unwrap_or_default();
                Ok(balance.abi_encode())
            }
            IERC20::nameCall::SELECTOR => match &self.name {
                Some(name) => Ok((name.clone(),).abi_encode_params()),
                None => bail!("execution reverted"),
            },
            IERC20::symbolCall::SELECTOR => match &self.symbol {
                Some(symbol) => Ok((symbol.clone(),).abi_encode_params()),
                None => bail!("execution reverted"),
            },
            IERC20::totalSupplyCall::SELECTOR | IERC20::allowanceCall::SELECTOR if self.erc20 => {
                Ok(U256::from(1_000u64).abi_encode())
            }
            IERC777::granularityCall::SELECTOR if self.granularity => {
                Ok(U256::from(1u64).abi_encode())
            }
            _ => bail!("execution reverted"),
        }
    }
}

/// Chain with scripted contracts; unknown addresses behave like EOAs
#[derive(Default)]
pub struct MockChain {
    contracts: Mutex<HashMap<Address, MockContract>>,
    offline: AtomicBool,
    stalled: Mutex<HashSet<[u8; 4]>>,
    calls: AtomicUsize,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn deploy(&self, address: Address, contract: MockContract) {
        self.contracts.lock().unwrap().insert(address, contract);
    }

    /// Make every call fail, as when the RPC endpoint is unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Hold calls to `selector` far longer than any reader timeout
    pub fn stall(&self, selector: [u8; 4]) {
        self.stalled.lock().unwrap().insert(selector);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ChainAccess for MockChain {
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            bail!("connection refused");
        }

        let stalled = input
            .get(..4)
            .is_some_and(|selector| self.stalled.lock().unwrap().contains(selector));
        if stalled {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }

        let contract = self.contracts.lock().unwrap().get(&to).cloned();
        match contract {
            Some(contract) => contract.answer(&input).map(Bytes::from),
            // eth_call to an account without code returns nothing
            None => Ok(Bytes::new()),
        }
    }

    fn endpoint_name(&self) -> String {
        "mock://chain".to_string()
    }
}

/// Directory returning scripted candidates and counting requests
#[derive(Default)]
pub struct MockDirectory {
    responses: Mutex<HashMap<String, Vec<SelectorSignature>>>,
    failing: AtomicBool,
    requests: AtomicUsize,
}

impl MockDirectory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Candidates for `selector`, oldest registration first
    pub fn register(&self, selector: &str, signatures: &[&str]) {
        let candidates = signatures
            .iter()
            .enumerate()
            .map(|(id, text)| SelectorSignature {
                id: Some(id as u64 + 1),
                text: text.to_string(),
            })
            .collect();
        self.responses
            .lock()
            .unwrap()
            .insert(selector.to_string(), candidates);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SignatureDirectory for MockDirectory {
    fn lookup_url(&self, selector: &str) -> String {
        format!("mock://signatures/?hex_signature={selector}")
    }

    async fn lookup(&self, selector: &str) -> Result<Vec<SelectorSignature>, DirectoryError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DirectoryError::Rejected {
                status: 503,
                body: serde_json::json!({ "detail": "service unavailable" }),
            });
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }
}

pub fn address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn context_with(
    chain: Arc<MockChain>,
    directory: Arc<MockDirectory>,
    store: Arc<AssetStore>,
    samples: Vec<Address>,
) -> Context {
    Context::new(ContextParts {
        chain,
        directory,
        lookup_cache: LookupCache::open_in_memory().unwrap(),
        asset_store: store,
        call_timeout: Duration::from_secs(2),
        reconciler: ReconcilerOptions {
            samples,
            concurrency: 3,
            max_age: None,
        },
    })
}

pub fn context(chain: Arc<MockChain>, directory: Arc<MockDirectory>) -> Context {
    context_with(
        chain,
        directory,
        Arc::new(AssetStore::open_in_memory().unwrap()),
        Vec::new(),
    )
}
