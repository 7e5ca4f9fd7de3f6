//! Port wiring: pick Diesel/reqwest adapters where configuration allows,
//! fixtures otherwise.

use std::sync::Arc;

use actix_web::web;

use chasti_backend::domain::CheckoutServiceImpl;
use chasti_backend::domain::ports::{
    AccountService, CatalogRepository, FixtureAccountService, FixtureCatalogRepository,
    FixtureMailSender, FixtureOrderNotifier, FixtureOrderRepository, FixturePaymentGateway,
    FixtureProductsQuery, FixtureVehicleCatalog, FixtureVehicleLookup, MailSender, OrderNotifier,
    OrderRepository, PaymentGateway, ProductsQuery, VehicleCatalog, VehicleLookup,
};
use chasti_backend::inbound::http::state::{HttpState, HttpStatePorts};
use chasti_backend::outbound::email::HttpMailer;
use chasti_backend::outbound::notify::ChatWebhookNotifier;
use chasti_backend::outbound::payment::HostedCheckoutGateway;
use chasti_backend::outbound::persistence::{
    DieselAccountService, DieselCatalogRepository, DieselOrderRepository, DieselProductsQuery,
    DieselVehicleCatalog,
};
use chasti_backend::outbound::vehicle_lookup::HttpVinLookup;

use super::config::ServerConfig;

fn adapter_error(err: reqwest::Error) -> std::io::Error {
    std::io::Error::other(format!("failed to build outbound adapter: {err}"))
}

/// Assemble the HTTP state from the configuration.
///
/// # Errors
///
/// Returns [`std::io::Error`] when an outbound HTTP client cannot be built.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let (accounts, products, catalog, vehicles, orders): (
        Arc<dyn AccountService>,
        Arc<dyn ProductsQuery>,
        Arc<dyn CatalogRepository>,
        Arc<dyn VehicleCatalog>,
        Arc<dyn OrderRepository>,
    ) = match &config.db_pool {
        Some(pool) => (
            Arc::new(DieselAccountService::new(pool.clone())),
            Arc::new(DieselProductsQuery::new(pool.clone())),
            Arc::new(DieselCatalogRepository::new(pool.clone())),
            Arc::new(DieselVehicleCatalog::new(pool.clone())),
            Arc::new(DieselOrderRepository::new(pool.clone())),
        ),
        None => (
            Arc::new(FixtureAccountService),
            Arc::new(FixtureProductsQuery::default()),
            Arc::new(FixtureCatalogRepository::default()),
            Arc::new(FixtureVehicleCatalog::default()),
            Arc::new(FixtureOrderRepository::default()),
        ),
    };

    let payments: Arc<dyn PaymentGateway> = match &config.integrations.payment {
        Some(settings) => Arc::new(
            HostedCheckoutGateway::new(settings.clone()).map_err(adapter_error)?,
        ),
        None => Arc::new(FixturePaymentGateway),
    };
    let mail: Arc<dyn MailSender> = match &config.integrations.mailer {
        Some(settings) => Arc::new(HttpMailer::new(settings.clone()).map_err(adapter_error)?),
        None => Arc::new(FixtureMailSender),
    };
    let notifier: Arc<dyn OrderNotifier> = match &config.integrations.ops_webhook {
        Some(settings) => {
            Arc::new(ChatWebhookNotifier::new(settings.clone()).map_err(adapter_error)?)
        }
        None => Arc::new(FixtureOrderNotifier),
    };
    let vin_lookup: Arc<dyn VehicleLookup> = match &config.integrations.vin_lookup {
        Some(settings) => Arc::new(HttpVinLookup::new(settings.clone()).map_err(adapter_error)?),
        None => Arc::new(FixtureVehicleLookup),
    };

    let checkout = Arc::new(CheckoutServiceImpl::new(
        products.clone(),
        orders.clone(),
        payments,
        mail,
        notifier,
    ));

    Ok(web::Data::new(HttpState::from(HttpStatePorts {
        accounts,
        products,
        catalog,
        vehicles,
        vin_lookup,
        orders,
        checkout,
    })))
}
