//! Email address normalization and validation utilities.
//!
//! Aliases are used as lookup keys by the mail-forwarding worker, so they are
//! normalized to a stable lower-case form. Destinations are only trimmed.

use validator::ValidateEmail;

/// Errors that can occur during address normalization.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EmailNormalizationError {
    #[error("Address is empty")]
    Empty,

    #[error("Invalid address format: {0}")]
    InvalidFormat(String),

    #[error("Address domain must contain a dot: {0}")]
    MissingDomainDot(String),
}

/// Normalizes an alias address to its canonical lookup form.
///
/// # Normalization Rules
///
/// 1. Surrounding whitespace is removed
/// 2. The whole address is lower-cased
/// 3. The result must be a syntactically valid address (see [`validate_address`])
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_alias("  Sales@Example.COM ").unwrap(), "sales@example.com");
/// ```
pub fn normalize_alias(input: &str) -> Result<String, EmailNormalizationError> {
    let address = input.trim().to_lowercase();
    validate_address(&address)?;
    Ok(address)
}

/// Normalizes a destination address.
///
/// Destinations are trimmed and validated but keep their case, since the
/// local part of a mailbox address may be case-sensitive.
pub fn normalize_destination(input: &str) -> Result<String, EmailNormalizationError> {
    let address = input.trim();
    validate_address(address)?;
    Ok(address.to_string())
}

/// Checks that an already-trimmed string is a deliverable-looking address.
///
/// Requires the `validator` crate to accept the address and the domain part to
/// contain at least one dot, which rules out bare hosts such as `user@localhost`.
pub fn validate_address(address: &str) -> Result<(), EmailNormalizationError> {
    if address.is_empty() {
        return Err(EmailNormalizationError::Empty);
    }

    if !ValidateEmail::validate_email(&address) {
        return Err(EmailNormalizationError::InvalidFormat(address.to_string()));
    }

    let domain = address.rsplit_once('@').map(|(_, d)| d).unwrap_or_default();
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(EmailNormalizationError::MissingDomainDot(
            address.to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_alias_lowercases_and_trims() {
        assert_eq!(
            normalize_alias("  Sales@Example.COM \n").unwrap(),
            "sales@example.com"
        );
    }

    #[test]
    fn test_normalize_destination_keeps_case() {
        assert_eq!(
            normalize_destination(" Alice.Smith@example.com ").unwrap(),
            "Alice.Smith@example.com"
        );
    }

    #[test]
    fn test_empty_address() {
        assert_eq!(normalize_alias("   "), Err(EmailNormalizationError::Empty));
        assert_eq!(
            normalize_destination(""),
            Err(EmailNormalizationError::Empty)
        );
    }

    #[test]
    fn test_invalid_format() {
        assert!(matches!(
            normalize_alias("not-an-address"),
            Err(EmailNormalizationError::InvalidFormat(_))
        ));
        assert!(matches!(
            normalize_alias("@example.com"),
            Err(EmailNormalizationError::InvalidFormat(_))
        ));
        assert!(matches!(
            normalize_alias("user@"),
            Err(EmailNormalizationError::InvalidFormat(_))
        ));
        assert!(normalize_alias("two@@example.com").is_err());
    }

    #[test]
    fn test_domain_without_dot_is_rejected() {
        assert!(matches!(
            normalize_alias("user@localhost"),
            Err(EmailNormalizationError::MissingDomainDot(_))
        ));
    }

    #[test]
    fn test_common_valid_addresses() {
        assert!(validate_address("user@example.com").is_ok());
        assert!(validate_address("first.last+tag@mail.example.co.uk").is_ok());
        assert!(validate_address("agent1@acme.com").is_ok());
    }
}
