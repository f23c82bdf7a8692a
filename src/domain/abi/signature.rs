//! Text signature parsing

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("missing '(' in signature '{0}'")]
    MissingOpen(String),

    #[error("signature '{0}' must end with ')'")]
    MissingClose(String),

    #[error("unbalanced parentheses in '{0}'")]
    Unbalanced(String),

    #[error("empty parameter type in '{0}'")]
    EmptyType(String),
}

/// Function name part of a signature ("mint" for "mint(address,uint256)")
pub fn function_name(signature: &str) -> &str {
    signature
        .split_once('(')
        .map(|(name, _)| name)
        .unwrap_or(signature)
        .trim()
}

/// Split the parameter list of a text signature into top-level types.
///
/// Commas inside tuple parentheses do not split, so
/// `swap((address,uint256)[],bytes)` yields `["(address,uint256)[]", "bytes"]`.
pub fn parameter_types(signature: &str) -> Result<Vec<String>, SignatureError> {
    let signature = signature.trim();
    let open = signature
        .find('(')
        .ok_or_else(|| SignatureError::MissingOpen(signature.to_string()))?;
    let inner = signature[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| SignatureError::MissingClose(signature.to_string()))?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut types = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (idx, ch) in inner.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| SignatureError::Unbalanced(signature.to_string()))?;
            }
            ',' if depth == 0 => {
                types.push(clean_type(&inner[start..idx], signature)?);
                start = idx + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(SignatureError::Unbalanced(signature.to_string()));
    }
    types.push(clean_type(&inner[start..], signature)?);

    Ok(types)
}

fn clean_type(raw: &str, signature: &str) -> Result<String, SignatureError> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(SignatureError::EmptyType(signature.to_string()));
    }
    Ok(cleaned)
}
