//! Round-trip verified calldata decoder using alloy-dyn-abi

use alloy_dyn_abi::{DynSolType, DynSolValue};

use crate::domain::abi::{
    function_name, parameter_types, CalldataDecoder, DecodedArgument, DecodedCall, Rejection,
};

/// Functions whose bytes32 arguments are ERC725Y data keys
const KEY_FUNCTIONS: [&str; 2] = ["setData", "getData"];

/// Decoder that accepts a signature only when re-encoding the decoded
/// arguments reproduces the payload exactly
#[derive(Debug, Default, Clone, Copy)]
pub struct AlloyCalldataDecoder;

impl AlloyCalldataDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl CalldataDecoder for AlloyCalldataDecoder {
    fn try_decode(&self, signature: &str, payload: &[u8]) -> Result<DecodedCall, Rejection> {
        let kinds =
            parameter_types(signature).map_err(|err| Rejection::Signature(err.to_string()))?;

        let types: Vec<DynSolType> = kinds
            .iter()
            .map(|kind| {
                DynSolType::parse(kind).map_err(|err| Rejection::UnsupportedType {
                    kind: kind.clone(),
                    reason: err.to_string(),
                })
            })
            .collect::<Result<_, _>>()?;

        check_static_words(&types, payload)?;

        let values = if types.is_empty() {
            Vec::new()
        } else {
            let tuple_type = DynSolType::Tuple(types);
            match tuple_type.abi_decode_params(payload) {
                Ok(DynSolValue::Tuple(values)) => values,
                Ok(other) => vec![other],
                Err(err) => return Err(Rejection::Decode(err.to_string())),
            }
        };

        let encoded = if values.is_empty() {
            Vec::new()
        } else {
            DynSolValue::Tuple(values.clone()).abi_encode_params()
        };
        if encoded != payload {
            return Err(Rejection::RoundTripMismatch);
        }

        let name = function_name(signature).to_string();
        let keyed = KEY_FUNCTIONS.contains(&name.as_str());

        let arguments = kinds
            .into_iter()
            .zip(values.iter())
            .enumerate()
            .map(|(idx, (kind, value))| DecodedArgument {
                is_key_like: keyed && kind.starts_with("bytes32"),
                kind,
                name: format!("arg{}", idx + 1),
                value: format_dyn_sol_value(value),
            })
            .collect();

        Ok(DecodedCall {
            label: format!("Decoded {signature}"),
            function_name: name,
            signature: signature.to_string(),
            arguments,
        })
    }
}

/// Check the head words of statically encoded bools and addresses.
///
/// A bool word must be exactly 0 or 1 and an address word must have its
/// 12 high bytes clear; anything else means the candidate is wrong. Every
/// parameter's head must fit in what is left of the payload, and no fixed
/// array anywhere in the type may need more bytes than the whole payload.
fn check_static_words(types: &[DynSolType], payload: &[u8]) -> Result<(), Rejection> {
    let mut offset = 0usize;
    for (index, ty) in types.iter().enumerate() {
        let head = head_size(ty).ok_or(Rejection::Truncated { index })?;
        offset
            .checked_add(head)
            .filter(|end| *end <= payload.len())
            .ok_or(Rejection::Truncated { index })?;
        if !fits(ty, payload.len()) {
            return Err(Rejection::Truncated { index });
        }
        check_word(ty, payload, &mut offset, index)?;
    }
    Ok(())
}

fn check_word(
    ty: &DynSolType,
    payload: &[u8],
    offset: &mut usize,
    index: usize,
) -> Result<(), Rejection> {
    if !has_guarded_word(ty) {
        let size = head_size(ty).ok_or(Rejection::Truncated { index })?;
        *offset = offset
            .checked_add(size)
            .ok_or(Rejection::Truncated { index })?;
        return Ok(());
    }

    match ty {
        DynSolType::Tuple(inner) => {
            for ty in inner {
                check_word(ty, payload, offset, index)?;
            }
        }
        DynSolType::FixedArray(inner, len) => {
            for _ in 0..*len {
                check_word(inner, payload, offset, index)?;
            }
        }
        DynSolType::Bool => {
            let word = word_at(payload, *offset, index)?;
            if word[..31].iter().any(|b| *b != 0) || word[31] > 1 {
                return Err(Rejection::InvalidBool { index });
            }
            *offset += 32;
        }
        DynSolType::Address => {
            let word = word_at(payload, *offset, index)?;
            if word[..12].iter().any(|b| *b != 0) {
                return Err(Rejection::InvalidAddress { index });
            }
            *offset += 32;
        }
        _ => *offset += 32,
    }
    Ok(())
}

/// Bytes a type occupies in the head; `None` on overflow
fn head_size(ty: &DynSolType) -> Option<usize> {
    if ty.is_dynamic() {
        return Some(32);
    }
    match ty {
        DynSolType::Tuple(inner) => inner
            .iter()
            .try_fold(0usize, |total, ty| total.checked_add(head_size(ty)?)),
        DynSolType::FixedArray(inner, len) => head_size(inner)?.checked_mul(*len),
        _ => Some(32),
    }
}

/// Whether every fixed array in the type can be encoded in `limit` bytes
fn fits(ty: &DynSolType, limit: usize) -> bool {
    match ty {
        DynSolType::FixedArray(inner, len) => {
            head_size(inner)
                .and_then(|size| size.checked_mul(*len))
                .is_some_and(|size| size <= limit)
                && fits(inner, limit)
        }
        DynSolType::Array(inner) => fits(inner, limit),
        DynSolType::Tuple(inner) => inner.iter().all(|ty| fits(ty, limit)),
        _ => true,
    }
}

/// Static bool or address words reachable without following an offset
fn has_guarded_word(ty: &DynSolType) -> bool {
    if ty.is_dynamic() {
        return false;
    }
    match ty {
        DynSolType::Bool | DynSolType::Address => true,
        DynSolType::Tuple(inner) => inner.iter().any(has_guarded_word),
        DynSolType::FixedArray(inner, len) => *len > 0 && has_guarded_word(inner),
        _ => false,
    }
}

fn word_at(payload: &[u8], offset: usize, index: usize) -> Result<&[u8], Rejection> {
    offset
        .checked_add(32)
        .and_then(|end| payload.get(offset..end))
        .ok_or(Rejection::Truncated { index })
}

/// Format a DynSolValue for display
fn format_dyn_sol_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => {
            let bytes = &word.as_slice()[..(*size).min(32)];
            format!("0x{}", hex::encode(bytes))
        }
        DynSolValue::Address(addr) => addr.to_checksum(None),
        DynSolValue::Function(func) => format!("0x{}", hex::encode(func.as_slice())),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Array(arr) | DynSolValue::FixedArray(arr) => {
            let items: Vec<String> = arr.iter().map(format_dyn_sol_value).collect();
            format!("[{}]", items.join(", "))
        }
        DynSolValue::Tuple(fields) => {
            let items: Vec<String> = fields.iter().map(format_dyn_sol_value).collect();
            format!("({})", items.join(", "))
        }
        #[allow(unreachable_patterns)]
        other => format!("{other:?}"),
    }
}
