//! EIP-165 / ERC725Y interface probing

use std::collections::BTreeSet;

use alloy::primitives::Address;
use futures::future::join_all;

use crate::domain::assets::{AssetStandard, MethodFallback};
use crate::infrastructure::ethereum::contracts::{IERC165, IERC20, IERC777};
use crate::infrastructure::ethereum::{erc725, ContractReader};

/// What a contract said about one standard through `supportsInterface`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeAnswer {
    Supported,
    Unsupported,
    /// Every call failed or the standard has no interface id
    Inconclusive,
}

/// Detects which asset standards a contract implements.
///
/// Call failures never escape: a failed read is a negative or inconclusive
/// answer, not an error.
#[derive(Clone)]
pub struct InterfaceProbe {
    reader: ContractReader,
}

impl InterfaceProbe {
    pub fn new(reader: ContractReader) -> Self {
        Self { reader }
    }

    /// All probed standards the address implements
    pub async fn classify(&self, address: Address) -> BTreeSet<AssetStandard> {
        let checks = AssetStandard::PROBED
            .iter()
            .map(|standard| async move { (*standard, self.supports(address, *standard).await) });

        join_all(checks)
            .await
            .into_iter()
            .filter_map(|(standard, supported)| supported.then_some(standard))
            .collect()
    }

    pub async fn supports(&self, address: Address, standard: AssetStandard) -> bool {
        if standard.is_excluded() {
            return false;
        }

        match self.interface_answer(address, standard).await {
            ProbeAnswer::Supported => return true,
            ProbeAnswer::Unsupported => return false,
            ProbeAnswer::Inconclusive => {}
        }

        if let Some(name) = standard.supported_standard() {
            if self.has_schema(address, name).await {
                return true;
            }
        }

        match standard.method_fallback() {
            Some(fallback) => self.answers_methods(address, fallback).await,
            None => false,
        }
    }

    /// Ask `supportsInterface` for every id of the standard
    pub async fn interface_answer(&self, address: Address, standard: AssetStandard) -> ProbeAnswer {
        let ids = standard.interface_ids();
        if ids.is_empty() {
            return ProbeAnswer::Inconclusive;
        }

        let answers = join_all(ids.iter().map(|id| {
            let call = IERC165::supportsInterfaceCall { interfaceId: *id };
            async move { self.reader.call(address, &call).await }
        }))
        .await;

        let mut answered = false;
        for (id, answer) in ids.iter().zip(answers) {
            match answer {
                Ok(true) => {
                    tracing::debug!(%address, %standard, %id, "interface supported");
                    return ProbeAnswer::Supported;
                }
                Ok(false) => answered = true,
                Err(err) => tracing::debug!(%address, %id, "supportsInterface failed: {err:#}"),
            }
        }

        if answered {
            ProbeAnswer::Unsupported
        } else {
            ProbeAnswer::Inconclusive
        }
    }

    /// Compare `SupportedStandards:<name>` with its expected value
    async fn has_schema(&self, address: Address, name: &str) -> bool {
        let (key, expected) = erc725::supported_standard(name);
        match self.reader.get_data(address, key).await {
            Ok(value) => value[..] == expected[..],
            Err(err) => {
                tracing::debug!(%address, schema = name, "schema read failed: {err:#}");
                false
            }
        }
    }

    async fn answers_methods(&self, address: Address, fallback: MethodFallback) -> bool {
        match fallback {
            MethodFallback::Erc20 => {
                let supply_call = IERC20::totalSupplyCall {};
                let allowance_call = IERC20::allowanceCall {
                    owner: Address::ZERO,
                    spender: Address::ZERO,
                };
                let (supply, allowance) = tokio::join!(
                    self.reader.call(address, &supply_call),
                    self.reader.call(address, &allowance_call),
                );
                supply.is_ok() && allowance.is_ok()
            }
            MethodFallback::Erc777 => self
                .reader
                .call(address, &IERC777::granularityCall {})
                .await
                .is_ok(),
        }
    }
}
