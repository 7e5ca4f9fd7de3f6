//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{IntegrationConfig, ServerConfig};

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use chasti_backend::ApiDoc;
use chasti_backend::Trace;
use chasti_backend::inbound::http::account::{current_customer, login, logout, register};
use chasti_backend::inbound::http::cart::{
    add_cart_item, clear_cart, get_cart, set_cart_item_quantity,
};
use chasti_backend::inbound::http::catalog::{list_brands, list_categories};
use chasti_backend::inbound::http::checkout::checkout;
use chasti_backend::inbound::http::health::{HealthState, live, ready};
use chasti_backend::inbound::http::orders::{get_order, list_orders};
use chasti_backend::inbound::http::payments::payment_callback;
use chasti_backend::inbound::http::products::{get_product, list_products};
use chasti_backend::inbound::http::state::HttpState;
use chasti_backend::inbound::http::vehicles::{
    decode_vin, list_vehicle_brands, list_vehicle_engines, list_vehicle_models,
};

use state_builders::build_http_state;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(list_products)
        .service(get_product)
        .service(list_brands)
        .service(list_categories)
        .service(list_vehicle_brands)
        .service(list_vehicle_models)
        .service(list_vehicle_engines)
        .service(decode_vin)
        .service(get_cart)
        .service(add_cart_item)
        .service(set_cart_item_quantity)
        .service(clear_cart)
        .service(checkout)
        .service(payment_callback)
        .service(list_orders)
        .service(get_order)
        .service(register)
        .service(login)
        .service(logout)
        .service(current_customer);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when adapters cannot be built or the socket
/// cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        integrations: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
