//! Textual principal checks

use super::AuthError;
use regex::Regex;
use std::sync::LazyLock;

/// Principal of an unauthenticated caller
pub const ANONYMOUS_PRINCIPAL: &str = "2vxsx-fae";

/// Longest textual principal (29 bytes in base32 with dashes)
const MAX_PRINCIPAL_LEN: usize = 63;

static PRINCIPAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z2-7]{1,5}(?:-[a-z2-7]{1,5})*$").expect("valid principal regex")
});

/// Check the shape of a textual principal and return it normalized.
///
/// Only the shape is checked; the checksum is the identity provider's concern.
pub fn validate_principal(credential: &str) -> Result<String, AuthError> {
    let principal = credential.trim().to_ascii_lowercase();

    if principal.is_empty() {
        return Err(AuthError::InvalidCredential("empty principal".to_string()));
    }
    if principal.len() > MAX_PRINCIPAL_LEN {
        return Err(AuthError::InvalidCredential(format!(
            "principal longer than {MAX_PRINCIPAL_LEN} characters"
        )));
    }
    if !PRINCIPAL_RE.is_match(&principal) {
        return Err(AuthError::InvalidCredential(format!(
            "'{principal}' is not a textual principal"
        )));
    }
    if principal == ANONYMOUS_PRINCIPAL {
        return Err(AuthError::Anonymous);
    }

    Ok(principal)
}
