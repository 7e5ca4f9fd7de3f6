//! Customer accounts and credentials.
//!
//! The domain `Customer` never carries the password hash; hashes live behind
//! the persistence boundary and only verification verdicts cross it. Raw
//! passwords are wrapped in [`Password`], which zeroizes its buffer on drop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use zeroize::Zeroize as _;

/// Validation failures for account inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomerValidationError {
    /// The email address is structurally invalid.
    #[error("email address is not valid")]
    InvalidEmail,
    /// The display name is empty or longer than 64 characters.
    #[error("display name must be 1-64 characters")]
    InvalidDisplayName,
    /// The password is empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// The password is shorter than the registration minimum.
    #[error("password must be at least 8 characters")]
    PasswordTooShort,
}

/// A validated, lowercased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    ///
    /// The check is structural (`local@domain.tld`, sane length), not a full
    /// RFC 5321 grammar; deliverability is the mail provider's problem.
    ///
    /// # Errors
    ///
    /// Returns [`CustomerValidationError::InvalidEmail`] for malformed input.
    pub fn new(raw: impl Into<String>) -> Result<Self, CustomerValidationError> {
        let normalised = raw.into().trim().to_ascii_lowercase();
        if normalised.len() > 254 {
            return Err(CustomerValidationError::InvalidEmail);
        }
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(CustomerValidationError::InvalidEmail);
        };
        let domain_ok = domain.split('.').count() >= 2
            && domain.split('.').all(|label| !label.is_empty())
            && !domain.contains('@');
        if local.is_empty() || local.contains(char::is_whitespace) || !domain_ok {
            return Err(CustomerValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// The normalised address text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// A raw password, zeroized when dropped. Never serialized or logged.
#[derive(Clone)]
pub struct Password(String);

impl Drop for Password {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl Password {
    /// Wrap a password for login, requiring only non-emptiness.
    ///
    /// # Errors
    ///
    /// Returns [`CustomerValidationError::EmptyPassword`] for blank input.
    pub fn for_login(raw: impl Into<String>) -> Result<Self, CustomerValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(CustomerValidationError::EmptyPassword);
        }
        Ok(Self(raw))
    }

    /// Wrap a password for registration, enforcing the minimum length.
    ///
    /// # Errors
    ///
    /// Returns [`CustomerValidationError::EmptyPassword`] or
    /// [`CustomerValidationError::PasswordTooShort`].
    pub fn for_registration(raw: impl Into<String>) -> Result<Self, CustomerValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(CustomerValidationError::EmptyPassword);
        }
        if raw.chars().count() < 8 {
            return Err(CustomerValidationError::PasswordTooShort);
        }
        Ok(Self(raw))
    }

    /// Expose the raw bytes to the hasher/verifier.
    #[must_use]
    pub fn reveal(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Login credentials: a validated email plus the raw password.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Password,
}

impl LoginCredentials {
    /// Build credentials from raw request parts.
    ///
    /// # Errors
    ///
    /// Returns [`CustomerValidationError`] for a malformed email or empty
    /// password.
    pub fn try_from_parts(
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CustomerValidationError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            password: Password::for_login(password)?,
        })
    }

    /// The login email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// The raw password.
    #[must_use]
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Registration payload: credentials plus profile fields.
#[derive(Debug, Clone)]
pub struct Registration {
    email: EmailAddress,
    display_name: String,
    password: Password,
}

impl Registration {
    /// Build a registration from raw request parts.
    ///
    /// # Errors
    ///
    /// Returns [`CustomerValidationError`] for malformed email, display
    /// name, or a password below the registration minimum.
    pub fn try_from_parts(
        email: impl Into<String>,
        display_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CustomerValidationError> {
        let display_name = display_name.into().trim().to_owned();
        if display_name.is_empty() || display_name.chars().count() > 64 {
            return Err(CustomerValidationError::InvalidDisplayName);
        }
        Ok(Self {
            email: EmailAddress::new(email)?,
            display_name,
            password: Password::for_registration(password)?,
        })
    }

    /// The registration email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// The trimmed display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// The raw password.
    #[must_use]
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// A registered shop customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Primary key.
    pub id: Uuid,
    /// Unique login email.
    pub email: EmailAddress,
    /// Name shown in the account area and on orders.
    pub display_name: String,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last profile modification timestamp.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Ivan@Example.COM", "ivan@example.com")]
    #[case("  spaced@shop.bg  ", "spaced@shop.bg")]
    fn email_is_normalised(#[case] raw: &str, #[case] expected: &str) {
        let email = EmailAddress::new(raw).expect("valid email");
        assert_eq!(email.as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("no-at-sign")]
    #[case("@missing-local.bg")]
    #[case("double@@shop.bg")]
    #[case("bare@tld")]
    #[case("bad domain@shop .bg")]
    fn malformed_emails_are_rejected(#[case] raw: &str) {
        assert_eq!(
            EmailAddress::new(raw),
            Err(CustomerValidationError::InvalidEmail)
        );
    }

    #[test]
    fn password_debug_never_reveals_content() {
        let password = Password::for_login("hunter2222").expect("non-empty");
        assert_eq!(format!("{password:?}"), "Password(***)");
    }

    #[test]
    fn short_registration_password_is_rejected() {
        let error = Registration::try_from_parts("ivan@shop.bg", "Ivan", "short")
            .expect_err("short password");
        assert_eq!(error, CustomerValidationError::PasswordTooShort);
    }

    #[test]
    fn login_accepts_short_passwords() {
        // Login must verify whatever was registered historically.
        assert!(LoginCredentials::try_from_parts("ivan@shop.bg", "short").is_ok());
    }

    #[test]
    fn blank_display_name_is_rejected() {
        let error = Registration::try_from_parts("ivan@shop.bg", "   ", "longenough")
            .expect_err("blank display name");
        assert_eq!(error, CustomerValidationError::InvalidDisplayName);
    }
}
