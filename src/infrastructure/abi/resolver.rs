//! Calldata resolution: directory lookup, candidate verification and caching

use std::sync::Arc;

use crate::domain::abi::{CalldataDecoder, DecodedCall, SelectorSignature};
use crate::error::DecodeError;
use crate::store::LookupCache;

use super::directory::SignatureDirectory;

/// Resolves raw calldata into a verified [`DecodedCall`]
pub struct CallResolver {
    directory: Arc<dyn SignatureDirectory>,
    decoder: Arc<dyn CalldataDecoder>,
    cache: LookupCache,
}

impl CallResolver {
    pub fn new(
        directory: Arc<dyn SignatureDirectory>,
        decoder: Arc<dyn CalldataDecoder>,
        cache: LookupCache,
    ) -> Self {
        Self {
            directory,
            decoder,
            cache,
        }
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    /// Decode hex calldata, with or without a `0x` prefix
    pub async fn decode(&self, raw: &str) -> Result<DecodedCall, DecodeError> {
        let (selector, payload) = split_calldata(raw)?;
        let url = self.directory.lookup_url(&selector);

        if let Some(call) = self.cached(&url, &payload) {
            tracing::debug!(%selector, signature = %call.signature, "lookup cache hit");
            return Ok(call);
        }

        let candidates = self.directory.lookup(&selector).await?;
        let Some(call) = first_verified(self.decoder.as_ref(), &candidates, &payload) else {
            tracing::debug!(%selector, candidates = candidates.len(), "no candidate verified");
            return Err(DecodeError::UndecodableData { selector });
        };

        if let Err(err) = self.cache.put_call(&url, &call) {
            tracing::warn!(%url, "failed to cache decoding: {err:#}");
        }
        tracing::info!(%selector, signature = %call.signature, "decoded calldata");
        Ok(call)
    }

    /// Cached decoding, re-verified against this payload
    fn cached(&self, url: &str, payload: &[u8]) -> Option<DecodedCall> {
        let cached = match self.cache.get_call(url) {
            Ok(cached) => cached?,
            Err(err) => {
                tracing::warn!(%url, "ignoring unreadable cache entry: {err:#}");
                return None;
            }
        };

        match self.decoder.try_decode(&cached.signature, payload) {
            Ok(call) => Some(call),
            Err(rejection) => {
                tracing::debug!(
                    signature = %cached.signature,
                    %rejection,
                    "cached signature does not fit payload"
                );
                None
            }
        }
    }
}

/// Split calldata into a lowercase selector (no `0x`) and the argument bytes
fn split_calldata(raw: &str) -> Result<(String, Vec<u8>), DecodeError> {
    let trimmed = raw.trim();
    let hex_data = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex_data.len() < 8 || !hex_data.is_char_boundary(8) {
        return Err(DecodeError::NotEnoughData);
    }

    let (selector, tail) = hex_data.split_at(8);
    if !selector.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidHex(format!("selector '{selector}'")));
    }
    let payload = hex::decode(tail).map_err(|err| DecodeError::InvalidHex(err.to_string()))?;

    Ok((selector.to_ascii_lowercase(), payload))
}

/// First candidate that verifies, most recently registered first
fn first_verified(
    decoder: &dyn CalldataDecoder,
    candidates: &[SelectorSignature],
    payload: &[u8],
) -> Option<DecodedCall> {
    candidates
        .iter()
        .rev()
        .find_map(|candidate| match decoder.try_decode(&candidate.text, payload) {
            Ok(call) => Some(call),
            Err(rejection) => {
                tracing::debug!(signature = %candidate.text, %rejection, "candidate rejected");
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::abi::AlloyCalldataDecoder;

    #[test]
    fn test_split_calldata() {
        let (selector, payload) = split_calldata("0x40C10F19abcd").unwrap();
        assert_eq!(selector, "40c10f19");
        assert_eq!(payload, vec![0xab, 0xcd]);

        let (selector, payload) = split_calldata("d0e30db0").unwrap();
        assert_eq!(selector, "d0e30db0");
        assert!(payload.is_empty());
    }

    #[test]
    fn test_split_calldata_too_short() {
        assert!(matches!(split_calldata("0x"), Err(DecodeError::NotEnoughData)));
        assert!(matches!(split_calldata(""), Err(DecodeError::NotEnoughData)));
        assert!(matches!(
            split_calldata("0x40c10f"),
            Err(DecodeError::NotEnoughData)
        ));
    }

    #[test]
    fn test_split_calldata_invalid_hex() {
        assert!(matches!(
            split_calldata("0xzzzzzzzz"),
            Err(DecodeError::InvalidHex(_))
        ));
        assert!(matches!(
            split_calldata("0x40c10f19abc"),
            Err(DecodeError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_first_verified_prefers_latest() {
        // Both candidates decode a single word; the last one listed wins.
        let payload = alloy::primitives::U256::from(1).to_be_bytes::<32>().to_vec();
        let candidates = vec![
            SelectorSignature::new("first(uint256)"),
            SelectorSignature::new("second(bool)"),
            SelectorSignature::new("third(uint128)"),
        ];

        let call = first_verified(&AlloyCalldataDecoder, &candidates, &payload).unwrap();
        assert_eq!(call.signature, "third(uint128)");
    }

    #[test]
    fn test_first_verified_skips_rejections() {
        let payload = alloy::primitives::U256::from(2).to_be_bytes::<32>().to_vec();
        let candidates = vec![
            SelectorSignature::new("first(uint256)"),
            SelectorSignature::new("second(bool)"),
        ];

        let call = first_verified(&AlloyCalldataDecoder, &candidates, &payload).unwrap();
        assert_eq!(call.signature, "first(uint256)");

        assert!(first_verified(&AlloyCalldataDecoder, &[], &payload).is_none());
    }
}
