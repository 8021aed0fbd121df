//! Email address validation

use super::ValidationError;

/// Column width of `users.email`
const MAX_EMAIL_LEN: usize = 100;

/// Validated, normalized email address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new email address.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 100 characters
    /// - Exactly one `@` with a non-empty local part and a dotted domain
    ///
    /// The address is kept as typed apart from trimming; uniqueness in the
    /// store is exact-match.
    ///
    /// # Example
    /// ```
    /// use inkpost_server::models::EmailAddress;
    ///
    /// assert!(EmailAddress::new("ada@example.com").is_ok());
    /// assert!(EmailAddress::new("ada").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }

        if trimmed.chars().count() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "missing '@'",
            });
        };

        if local.is_empty() || domain.contains('@') || trimmed.contains(char::is_whitespace) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "not a valid address",
            });
        }

        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "domain must contain a dot",
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
