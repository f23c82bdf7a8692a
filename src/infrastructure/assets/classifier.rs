//! Token metadata and balance lookup for probed contracts

use alloy::primitives::{Address, U256};

use crate::domain::assets::{AssetStandard, Classification, Skip, TokenInfo, UNDEFINED_TEXT};
use crate::infrastructure::ethereum::contracts::IERC20;
use crate::infrastructure::ethereum::{erc725, ContractReader};

use super::InterfaceProbe;

/// Builds a [`TokenInfo`] for an address once the probe confirms the standard
#[derive(Clone)]
pub struct AssetClassifier {
    reader: ContractReader,
    probe: InterfaceProbe,
}

impl AssetClassifier {
    pub fn new(reader: ContractReader) -> Self {
        Self {
            probe: InterfaceProbe::new(reader.clone()),
            reader,
        }
    }

    /// Describe `address` as `standard`, with the balance held by `owner`
    pub async fn describe(
        &self,
        address: Address,
        standard: AssetStandard,
        owner: Option<Address>,
        is_owned: bool,
    ) -> Classification {
        if standard.is_excluded() {
            return Err(Skip::Excluded(standard));
        }
        if !self.probe.supports(address, standard).await {
            return Err(Skip::Unsupported(standard));
        }

        let (decimals, balance) = self.decimals_and_balance(address, owner, is_owned).await;
        let (name, symbol) = self.name_and_symbol(address).await;

        Ok(TokenInfo {
            kind: standard,
            label: TokenInfo::make_label(standard, &name, &symbol, &address),
            address,
            name,
            symbol,
            decimals,
            balance,
        })
    }

    async fn decimals_and_balance(
        &self,
        address: Address,
        owner: Option<Address>,
        is_owned: bool,
    ) -> (String, U256) {
        let assumed = U256::from(u8::from(is_owned));

        let decimals = match self.reader.call(address, &IERC20::decimalsCall {}).await {
            Ok(decimals) => decimals,
            Err(err) => {
                tracing::debug!(%address, "no decimals(), treating as non-divisible: {err:#}");
                return ("0".to_string(), assumed);
            }
        };
        if decimals == 0 {
            return ("0".to_string(), assumed);
        }

        let balance = match owner {
            Some(owner) => match self
                .reader
                .call(address, &IERC20::balanceOfCall { owner })
                .await
            {
                Ok(raw) => normalize_balance(raw, decimals),
                Err(err) => {
                    tracing::debug!(%address, %owner, "balanceOf failed: {err:#}");
                    U256::ZERO
                }
            },
            None => U256::ZERO,
        };
        (decimals.to_string(), balance)
    }

    /// LSP4 metadata first, then `name()`/`symbol()`, then the placeholder
    async fn name_and_symbol(&self, address: Address) -> (String, String) {
        let mut values = self
            .reader
            .fetch_data_many(address, &[erc725::LSP4_TOKEN_NAME, erc725::LSP4_TOKEN_SYMBOL])
            .await
            .into_iter()
            .map(|value| value.ok().and_then(|raw| erc725::decode_string(&raw)));
        let lsp4_name = values.next().flatten();
        let lsp4_symbol = values.next().flatten();

        let name = match lsp4_name {
            Some(name) => name,
            None => self
                .reader
                .call(address, &IERC20::nameCall {})
                .await
                .unwrap_or_else(|_| UNDEFINED_TEXT.to_string()),
        };
        let symbol = match lsp4_symbol {
            Some(symbol) => symbol,
            None => self
                .reader
                .call(address, &IERC20::symbolCall {})
                .await
                .unwrap_or_else(|_| UNDEFINED_TEXT.to_string()),
        };
        (name, symbol)
    }
}

/// Whole units of a raw balance, truncated
pub fn normalize_balance(raw: U256, decimals: u8) -> U256 {
    match U256::from(10u8).checked_pow(U256::from(decimals)) {
        Some(unit) => raw / unit,
        None => U256::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_balance() {
        let raw = U256::from(123_456_789_000_000_000_000u128);
        assert_eq!(normalize_balance(raw, 18), U256::from(123));
        assert_eq!(normalize_balance(raw, 0), raw);
        assert_eq!(normalize_balance(U256::from(999), 3), U256::ZERO);
    }

    #[test]
    fn test_normalize_huge_decimals() {
        assert_eq!(normalize_balance(U256::MAX, 255), U256::ZERO);
        assert_eq!(normalize_balance(U256::MAX, 77), U256::from(1));
    }
}
