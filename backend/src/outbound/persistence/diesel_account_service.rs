//! PostgreSQL-backed account service with Argon2id password hashing.
//!
//! Hashing and verification run on the blocking thread pool; Argon2 is
//! deliberately slow and must not stall the async executor. Login failures
//! are uniform: unknown email and wrong password produce the same error so
//! the endpoint cannot be used to probe for registered addresses.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::diesel_helpers::{diesel_error_message, is_unique_violation, pool_error_message};
use super::models::{CustomerRow, NewCustomerRow};
use super::pool::{DbPool, PoolError};
use super::schema::customers;
use crate::domain::Error;
use crate::domain::customer::{Customer, EmailAddress, LoginCredentials, Registration};
use crate::domain::ports::AccountService;

/// Diesel-backed implementation of the account driving port.
#[derive(Clone)]
pub struct DieselAccountService {
    pool: DbPool,
}

impl DieselAccountService {
    /// Create a new service with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> Error {
    Error::service_unavailable(pool_error_message(error))
}

fn map_diesel_error(error: &diesel::result::Error) -> Error {
    Error::internal(diesel_error_message(error, "account store"))
}

async fn hash_password(password: String) -> Result<String, Error> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
    })
    .await
    .map_err(|err| Error::internal(format!("hashing task failed: {err}")))?
}

async fn verify_password(password: String, stored_hash: String) -> Result<bool, Error> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|err| Error::internal(format!("stored hash malformed: {err}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|err| Error::internal(format!("verification task failed: {err}")))?
}

fn row_to_customer(row: CustomerRow) -> Result<Customer, Error> {
    let email = EmailAddress::new(row.email)
        .map_err(|err| Error::internal(format!("stored email malformed: {err}")))?;
    Ok(Customer {
        id: row.id,
        email,
        display_name: row.display_name,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl AccountService for DieselAccountService {
    async fn register(&self, registration: &Registration) -> Result<Customer, Error> {
        let password_hash = hash_password(registration.password().reveal().to_owned()).await?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewCustomerRow {
            id: Uuid::new_v4(),
            email: registration.email().as_str(),
            display_name: registration.display_name(),
            password_hash: &password_hash,
        };
        let row: CustomerRow = diesel::insert_into(customers::table)
            .values(&new_row)
            .returning(CustomerRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    Error::conflict("email is already registered")
                } else {
                    map_diesel_error(&err)
                }
            })?;
        row_to_customer(row)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Customer, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CustomerRow> = customers::table
            .filter(customers::email.eq(credentials.email().as_str()))
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;

        let invalid = || Error::unauthorized("invalid email or password");
        let Some(row) = row else {
            return Err(invalid());
        };
        let verified = verify_password(
            credentials.password().reveal().to_owned(),
            row.password_hash.clone(),
        )
        .await?;
        if !verified {
            return Err(invalid());
        }
        row_to_customer(row)
    }

    async fn find(&self, customer_id: Uuid) -> Result<Option<Customer>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CustomerRow> = customers::table
            .filter(customers::id.eq(customer_id))
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        row.map(row_to_customer).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify_round_trip() {
        let hash = hash_password("parola1234".to_owned())
            .await
            .expect("hashing succeeds");
        assert!(hash.starts_with("$argon2"));
        assert!(
            verify_password("parola1234".to_owned(), hash.clone())
                .await
                .expect("verification runs")
        );
        assert!(
            !verify_password("wrong".to_owned(), hash)
                .await
                .expect("verification runs")
        );
    }
}
