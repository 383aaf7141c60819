use crate::error::{AuthError, AuthResult};

/// Scheme name expected in front of the token, compared case-insensitively.
pub const BEARER_SCHEME: &str = "bearer";

/// Extract the token from an `Authorization` header value.
///
/// The value must be exactly two whitespace-separated fields, the first of
/// which is `Bearer` in any letter case. The second field is returned
/// verbatim.
pub fn extract_bearer_token(header_value: &str) -> AuthResult<&str> {
    if header_value.is_empty() {
        return Err(AuthError::MissingHeader);
    }

    let mut fields = header_value.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
            Ok(token)
        }
        _ => Err(AuthError::MalformedHeader),
    }
}
