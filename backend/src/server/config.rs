//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};

use chasti_backend::outbound::email::HttpMailerConfig;
use chasti_backend::outbound::notify::ChatWebhookConfig;
use chasti_backend::outbound::payment::HostedCheckoutConfig;
use chasti_backend::outbound::persistence::DbPool;
use chasti_backend::outbound::vehicle_lookup::VinLookupConfig;

/// Settings for the outbound integrations; unset integrations fall back to
/// their fixture implementations so a bare development server still runs.
#[derive(Default, Clone)]
pub struct IntegrationConfig {
    /// Hosted payment provider settings.
    pub payment: Option<HostedCheckoutConfig>,
    /// Transactional email provider settings.
    pub mailer: Option<HttpMailerConfig>,
    /// Ops chat webhook settings.
    pub ops_webhook: Option<ChatWebhookConfig>,
    /// VIN decode service settings.
    pub vin_lookup: Option<VinLookupConfig>,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) integrations: IntegrationConfig,
}

impl ServerConfig {
    /// Construct a server configuration from session and binding settings.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            integrations: IntegrationConfig::default(),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without a pool every repository port falls back to its fixture, which
    /// keeps local smoke runs possible with nothing but the binary.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach outbound integration settings.
    #[must_use]
    pub fn with_integrations(mut self, integrations: IntegrationConfig) -> Self {
        self.integrations = integrations;
        self
    }

    /// The socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
