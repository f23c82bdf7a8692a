//! Classified tokens and the per-account asset registry

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AssetStandard;

/// Placeholder used when neither ERC725Y nor the contract provides a name/symbol
pub const UNDEFINED_TEXT: &str = "<undef>";

/// Display metadata and balance of a classified asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(rename = "type")]
    pub kind: AssetStandard,
    pub address: Address,
    pub name: String,
    pub symbol: String,
    /// Decimal string; "0" when the contract has no `decimals()`
    pub decimals: String,
    /// Whole units held, truncated; a JSON number
    #[serde(with = "whole_units")]
    pub balance: U256,
    pub label: String,
}

impl TokenInfo {
    /// "LSP7 Name (SYM) 0x12345678..."
    pub fn make_label(kind: AssetStandard, name: &str, symbol: &str, address: &Address) -> String {
        let address = address.to_checksum(None);
        let prefix: String = address.chars().take(10).collect();
        format!("{} {} ({}) {}...", kind.short_code(), name, symbol, prefix)
    }
}

/// Persisted set of assets known for one connected account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRegistry {
    /// Every candidate address, deduplicated
    pub assets: Vec<Address>,
    pub lsp7: Vec<TokenInfo>,
    pub lsp8: Vec<TokenInfo>,
}

/// Balances as decimal JSON numbers.
///
/// Values past `u64::MAX` do not fit a JSON number without loss and are
/// written as decimal strings. Reading also accepts `0x` hex strings.
mod whole_units {
    use std::str::FromStr;

    use alloy_primitives::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        match u64::try_from(*value) {
            Ok(small) => serializer.serialize_u64(small),
            Err(_) => serializer.serialize_str(&value.to_string()),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(U256::from(value)),
            Repr::Text(text) => U256::from_str(text.trim()).map_err(de::Error::custom),
        }
    }
}

/// Why an address produced no [`TokenInfo`] for a standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Skip {
    #[error("{0} is never probed")]
    Excluded(AssetStandard),

    #[error("contract does not implement {0}")]
    Unsupported(AssetStandard),
}

/// Outcome of classifying one address against one standard
pub type Classification = Result<TokenInfo, Skip>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_label_format() {
        let address = Address::from_str("0x517216362D594516c6f96Ee34b2c502d65B847E4").unwrap();
        let label = TokenInfo::make_label(AssetStandard::Lsp7DigitalAsset, "Gold", "GLD", &address);
        assert_eq!(label, "LSP7 Gold (GLD) 0x51721636...");
    }

    #[test]
    fn test_token_json_shape() {
        let token = TokenInfo {
            kind: AssetStandard::Lsp8IdentifiableDigitalAsset,
            address: Address::ZERO,
            name: "Art".into(),
            symbol: "ART".into(),
            decimals: "0".into(),
            balance: U256::from(100),
            label: "LSP8 Art (ART) 0x00000000...".into(),
        };
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["type"], "LSP8IdentifiableDigitalAsset");
        assert_eq!(json["decimals"], "0");
        assert_eq!(json["balance"], 100);
        assert!(serde_json::to_string(&token).unwrap().contains(r#""balance":100"#));

        let back: TokenInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn test_balance_beyond_u64() {
        let token = TokenInfo {
            kind: AssetStandard::Lsp7DigitalAsset,
            address: Address::ZERO,
            name: "Huge".into(),
            symbol: "HUGE".into(),
            decimals: "0".into(),
            balance: U256::MAX,
            label: String::new(),
        };
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["balance"], U256::MAX.to_string());

        let back: TokenInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back.balance, U256::MAX);
    }

    #[test]
    fn test_hex_balance_is_read() {
        let mut json = serde_json::to_value(TokenInfo {
            kind: AssetStandard::Lsp7DigitalAsset,
            address: Address::ZERO,
            name: "Gold".into(),
            symbol: "GLD".into(),
            decimals: "18".into(),
            balance: U256::ZERO,
            label: String::new(),
        })
        .unwrap();
        json["balance"] = serde_json::json!("0x64");

        let token: TokenInfo = serde_json::from_value(json).unwrap();
        assert_eq!(token.balance, U256::from(100));
    }
}
