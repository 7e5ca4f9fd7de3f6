//! Driving port for account use-cases.
//!
//! Inbound adapters register, authenticate, and load customers through this
//! port without knowing the backing infrastructure, so HTTP handler tests
//! substitute a test double instead of wiring persistence and password
//! hashing.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::customer::{Customer, LoginCredentials, Registration};
use crate::domain::error::Error;

/// Domain use-case port for customer accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account.
    ///
    /// A duplicate email maps to [`crate::domain::ErrorCode::Conflict`];
    /// the message never reveals whether the address was known before.
    async fn register(&self, registration: &Registration) -> Result<Customer, Error>;

    /// Validate credentials and return the customer.
    ///
    /// Unknown email and wrong password produce the same
    /// `unauthorized` error so login cannot probe for registered addresses.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Customer, Error>;

    /// Load a customer by id, `None` when the account no longer exists.
    async fn find(&self, customer_id: Uuid) -> Result<Option<Customer>, Error>;
}

/// Fixture email recognised by [`FixtureAccountService`].
pub const FIXTURE_EMAIL: &str = "ivan@example.bg";

/// Fixture password recognised by [`FixtureAccountService`].
pub const FIXTURE_PASSWORD: &str = "parola1234";

/// Fixture customer id issued by [`FixtureAccountService`].
pub const FIXTURE_CUSTOMER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// In-memory authenticator used until persistence is wired and in handler
/// tests: one known account, registration always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountService;

impl FixtureAccountService {
    fn fixture_customer() -> Result<Customer, Error> {
        let id = Uuid::parse_str(FIXTURE_CUSTOMER_ID)
            .map_err(|err| Error::internal(format!("invalid fixture customer id: {err}")))?;
        let email = crate::domain::customer::EmailAddress::new(FIXTURE_EMAIL)
            .map_err(|err| Error::internal(format!("invalid fixture email: {err}")))?;
        let now = Utc::now();
        Ok(Customer {
            id,
            email,
            display_name: "Ivan Petrov".to_owned(),
            created_at: now,
            updated_at: now,
        })
    }
}

#[async_trait]
impl AccountService for FixtureAccountService {
    async fn register(&self, registration: &Registration) -> Result<Customer, Error> {
        if registration.email().as_str() == FIXTURE_EMAIL {
            return Err(Error::conflict("email is already registered"));
        }
        let now = Utc::now();
        Ok(Customer {
            id: Uuid::new_v4(),
            email: registration.email().clone(),
            display_name: registration.display_name().to_owned(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Customer, Error> {
        if credentials.email().as_str() == FIXTURE_EMAIL
            && credentials.password().reveal() == FIXTURE_PASSWORD
        {
            Self::fixture_customer()
        } else {
            Err(Error::unauthorized("invalid email or password"))
        }
    }

    async fn find(&self, customer_id: Uuid) -> Result<Option<Customer>, Error> {
        let customer = Self::fixture_customer()?;
        Ok((customer.id == customer_id).then_some(customer))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[case(FIXTURE_EMAIL, FIXTURE_PASSWORD, true)]
    #[case(FIXTURE_EMAIL, "wrong", false)]
    #[case("other@example.bg", FIXTURE_PASSWORD, false)]
    #[tokio::test]
    async fn fixture_authenticates_only_the_known_account(
        #[case] email: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let service = FixtureAccountService;
        let credentials =
            LoginCredentials::try_from_parts(email, password).expect("credentials shape");
        let result = service.authenticate(&credentials).await;
        match (should_succeed, result) {
            (true, Ok(customer)) => assert_eq!(customer.id.to_string(), FIXTURE_CUSTOMER_ID),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(customer)) => panic!("expected failure, got customer: {customer:?}"),
        }
    }

    #[tokio::test]
    async fn fixture_register_rejects_the_known_email() {
        let registration =
            Registration::try_from_parts(FIXTURE_EMAIL, "Ivan", "longenough").expect("fixture");
        let err = FixtureAccountService
            .register(&registration)
            .await
            .expect_err("duplicate email should conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }
}
