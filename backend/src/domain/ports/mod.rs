//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`AccountService`, `CheckoutService`) are consumed by
//! inbound adapters; driven ports (repositories, gateway, mailer, notifier,
//! lookup) are implemented by outbound adapters. Every port ships a
//! `Fixture*` implementation for wiring without infrastructure and a
//! mockall mock for unit tests.

mod accounts;
mod catalog_repository;
mod checkout;
mod mail_sender;
mod order_notifier;
mod order_repository;
mod payment_gateway;
mod products_query;
mod vehicle_catalog;
mod vehicle_lookup;

#[cfg(test)]
pub use accounts::MockAccountService;
pub use accounts::{
    AccountService, FIXTURE_CUSTOMER_ID, FIXTURE_EMAIL, FIXTURE_PASSWORD, FixtureAccountService,
};
#[cfg(test)]
pub use catalog_repository::MockCatalogRepository;
pub use catalog_repository::{CatalogRepository, CatalogRepositoryError, FixtureCatalogRepository};
#[cfg(test)]
pub use checkout::MockCheckoutService;
pub use checkout::{
    CallbackOutcome, CartQuote, CheckoutContact, CheckoutOutcome, CheckoutService, PricedCartLine,
};
#[cfg(test)]
pub use mail_sender::MockMailSender;
pub use mail_sender::{FixtureMailSender, MailError, MailSender, OutgoingEmail};
#[cfg(test)]
pub use order_notifier::MockOrderNotifier;
pub use order_notifier::{FixtureOrderNotifier, NotifyError, OrderNotifier};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{
    FixtureOrderRepository, NewOrder, OrderRepository, OrderRepositoryError, TransitionOutcome,
};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub(crate) use payment_gateway::event_from_body;
pub use payment_gateway::{
    CallbackError, FIXTURE_SIGNATURE, FixturePaymentGateway, PaymentEvent, PaymentEventKind,
    PaymentGateway, PaymentGatewayError, PaymentSession, PaymentSessionRequest,
};
#[cfg(test)]
pub use products_query::MockProductsQuery;
pub use products_query::{FixtureProductsQuery, ProductsQuery, ProductsQueryError};
#[cfg(test)]
pub use vehicle_catalog::MockVehicleCatalog;
pub use vehicle_catalog::{FixtureVehicleCatalog, VehicleCatalog, VehicleCatalogError};
#[cfg(test)]
pub use vehicle_lookup::MockVehicleLookup;
pub use vehicle_lookup::{FixtureVehicleLookup, VehicleLookup, VehicleLookupError};
