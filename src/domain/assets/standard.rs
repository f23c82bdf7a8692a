//! Asset standards and how each one is recognised on chain

use std::fmt;

use alloy_primitives::{fixed_bytes, FixedBytes};
use serde::{Deserialize, Serialize};

/// Extra method calls used when EIP-165 cannot answer for a standard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodFallback {
    /// `totalSupply()` and `allowance(address,address)` both answer
    Erc20,
    /// `granularity()` answers
    Erc777,
}

/// Token / account standards an address can be classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetStandard {
    #[serde(rename = "LSP7DigitalAsset")]
    Lsp7DigitalAsset,
    #[serde(rename = "LSP8IdentifiableDigitalAsset")]
    Lsp8IdentifiableDigitalAsset,
    #[serde(rename = "LSP3ProfileMetadata")]
    Lsp3ProfileMetadata,
    #[serde(rename = "LSP9Vault")]
    Lsp9Vault,
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC777")]
    Erc777,
    #[serde(rename = "UP")]
    UniversalProfile,
    #[serde(rename = "SC")]
    SmartContract,
    #[serde(rename = "EoA")]
    ExternallyOwned,
    Unknown,
}

impl AssetStandard {
    /// Standards the interface probe checks, in classification preference order
    pub const PROBED: [AssetStandard; 7] = [
        AssetStandard::Lsp7DigitalAsset,
        AssetStandard::Lsp8IdentifiableDigitalAsset,
        AssetStandard::Erc20,
        AssetStandard::Erc721,
        AssetStandard::Erc777,
        AssetStandard::Lsp3ProfileMetadata,
        AssetStandard::Lsp9Vault,
    ];

    /// Standards that describe a holdable asset
    pub const ASSETS: [AssetStandard; 5] = [
        AssetStandard::Lsp7DigitalAsset,
        AssetStandard::Lsp8IdentifiableDigitalAsset,
        AssetStandard::Erc20,
        AssetStandard::Erc721,
        AssetStandard::Erc777,
    ];

    /// EIP-165 interface ids, newest first. Older ids cover earlier
    /// releases of the LUKSO contracts still deployed on test networks.
    pub fn interface_ids(self) -> &'static [FixedBytes<4>] {
        const LSP7: [FixedBytes<4>; 3] = [
            fixed_bytes!("0xc52d6008"),
            fixed_bytes!("0xb3c4928f"),
            fixed_bytes!("0xdaa746b7"),
        ];
        const LSP8: [FixedBytes<4>; 3] = [
            fixed_bytes!("0x3a271706"),
            fixed_bytes!("0xecad9f75"),
            fixed_bytes!("0x30dc5278"),
        ];
        const LSP0: [FixedBytes<4>; 1] = [fixed_bytes!("0x24871b3d")];
        const LSP9: [FixedBytes<4>; 1] = [fixed_bytes!("0x28af17e6")];
        const ERC20: [FixedBytes<4>; 1] = [fixed_bytes!("0x36372b07")];
        const ERC721: [FixedBytes<4>; 1] = [fixed_bytes!("0x80ac58cd")];

        match self {
            AssetStandard::Lsp7DigitalAsset => &LSP7,
            AssetStandard::Lsp8IdentifiableDigitalAsset => &LSP8,
            AssetStandard::Lsp3ProfileMetadata => &LSP0,
            AssetStandard::Lsp9Vault => &LSP9,
            AssetStandard::Erc20 => &ERC20,
            AssetStandard::Erc721 => &ERC721,
            _ => &[],
        }
    }

    /// Name of the `SupportedStandards:<name>` ERC725Y entry, if the standard has one.
    ///
    /// LSP7 and LSP8 share `LSP4DigitalAsset`, which cannot tell them apart, so
    /// they are left to EIP-165 alone.
    pub fn supported_standard(self) -> Option<&'static str> {
        match self {
            AssetStandard::Lsp3ProfileMetadata => Some("LSP3Profile"),
            AssetStandard::Lsp9Vault => Some("LSP9Vault"),
            _ => None,
        }
    }

    pub fn method_fallback(self) -> Option<MethodFallback> {
        match self {
            AssetStandard::Erc20 => Some(MethodFallback::Erc20),
            AssetStandard::Erc777 => Some(MethodFallback::Erc777),
            _ => None,
        }
    }

    /// Kinds that are never probed: probing them is meaningless
    pub fn is_excluded(self) -> bool {
        matches!(
            self,
            AssetStandard::UniversalProfile
                | AssetStandard::SmartContract
                | AssetStandard::ExternallyOwned
                | AssetStandard::Unknown
        )
    }

    /// Short code used in token labels
    pub fn short_code(self) -> &'static str {
        match self {
            AssetStandard::Lsp7DigitalAsset => "LSP7",
            AssetStandard::Lsp8IdentifiableDigitalAsset => "LSP8",
            AssetStandard::Lsp3ProfileMetadata => "LSP3",
            AssetStandard::Lsp9Vault => "LSP9",
            AssetStandard::Erc20 => "ERC20",
            AssetStandard::Erc721 => "ERC721",
            AssetStandard::Erc777 => "ERC777",
            AssetStandard::UniversalProfile => "UP",
            AssetStandard::SmartContract => "SC",
            AssetStandard::ExternallyOwned => "EoA",
            AssetStandard::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AssetStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_code())
    }
}
