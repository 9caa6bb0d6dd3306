//! Short code generation and input validation.

use rand::RngExt;
use url::Url;

use super::StoreError;

/// Alphabet for generated codes
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random short code of exactly `length` characters
pub fn generate_short_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Check a caller-supplied short code: 1..=max_length of `[A-Za-z0-9_-]`
pub fn validate_requested_code(code: &str, max_length: usize) -> Result<(), StoreError> {
    if code.is_empty() || code.len() > max_length {
        return Err(StoreError::InvalidInput(format!(
            "short code must be 1-{max_length} characters"
        )));
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(StoreError::InvalidInput(
            "short code may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }

    Ok(())
}

/// Check that the destination is an absolute URL with a host.
/// The caller keeps the string exactly as supplied.
pub fn validate_url(raw: &str) -> Result<(), StoreError> {
    if raw.trim().is_empty() {
        return Err(StoreError::InvalidInput("URL cannot be empty".to_string()));
    }

    // The parser strips these silently, so the stored string would differ from what was checked
    if raw != raw.trim() || raw.chars().any(char::is_control) {
        return Err(StoreError::InvalidInput(format!(
            "{raw:?} contains whitespace or control characters"
        )));
    }

    let parsed = Url::parse(raw)
        .map_err(|e| StoreError::InvalidInput(format!("'{raw}' is not a valid URL: {e}")))?;

    if !parsed.has_host() {
        return Err(StoreError::InvalidInput(format!(
            "'{raw}' is not an absolute URL with a host"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_code_length_and_alphabet() {
        for length in [1, 6, 12] {
            let code = generate_short_code(length);
            assert_eq!(code.len(), length);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_generated_codes_vary() {
        let codes: HashSet<String> = (0..200).map(|_| generate_short_code(8)).collect();
        assert!(codes.len() > 190);
    }

    #[test]
    fn test_requested_code_rules() {
        assert!(validate_requested_code("abc", 32).is_ok());
        assert!(validate_requested_code("my-link_2024", 32).is_ok());
        assert!(validate_requested_code("", 32).is_err());
        assert!(validate_requested_code("abcd", 3).is_err());
        assert!(validate_requested_code("has space", 32).is_err());
        assert!(validate_requested_code("slash/code", 32).is_err());
        assert!(validate_requested_code("ünïcode", 32).is_err());
    }

    #[test]
    fn test_url_validation() {
        assert!(validate_url("https://example.com/a").is_ok());
        assert!(validate_url("http://example.com:8080/path?q=1#frag").is_ok());

        assert!(matches!(validate_url(""), Err(StoreError::InvalidInput(_))));
        assert!(matches!(validate_url("   "), Err(StoreError::InvalidInput(_))));
        assert!(matches!(
            validate_url("not-a-url"),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_url("/relative/path"),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_url("mailto:someone@example.com"),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_url_with_control_or_surrounding_whitespace_rejected() {
        for raw in [
            "https://example.com/a\nb",
            "https://example.com/a\tb",
            " https://example.com",
            "https://example.com ",
            "https://example.com/\u{7f}",
        ] {
            assert!(
                matches!(validate_url(raw), Err(StoreError::InvalidInput(_))),
                "{raw:?} should be rejected"
            );
        }
    }
}
