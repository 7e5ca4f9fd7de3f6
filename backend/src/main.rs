//! Storefront backend entry point.
//!
//! Wires configuration from flags and environment variables, applies pending
//! database migrations, and starts the HTTP server. Without `DATABASE_URL`
//! the server runs against fixture ports, which is enough for smoke-testing
//! the HTTP surface locally.

mod server;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use chasti_backend::inbound::http::health::HealthState;
use chasti_backend::outbound::email::HttpMailerConfig;
use chasti_backend::outbound::notify::ChatWebhookConfig;
use chasti_backend::outbound::payment::HostedCheckoutConfig;
use chasti_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use chasti_backend::outbound::vehicle_lookup::VinLookupConfig;
use server::{IntegrationConfig, ServerConfig, create_server};

const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(15);

/// Storefront API server for the Chasti auto-parts shop.
#[derive(Debug, Parser)]
#[command(name = "chasti-backend", version)]
struct Settings {
    /// Socket address to bind.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,
    /// PostgreSQL connection string; fixture data is served when unset.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    /// File holding the session key material.
    #[arg(long, env = "SESSION_KEY_FILE", default_value = "/var/run/secrets/session_key")]
    session_key_file: PathBuf,
    /// Allow a generated throwaway session key when the file is missing.
    #[arg(
        long,
        env = "SESSION_ALLOW_EPHEMERAL",
        action = clap::ArgAction::Set,
        default_value_t = false
    )]
    session_allow_ephemeral: bool,
    /// Mark the session cookie `Secure` (disable only behind plain HTTP dev).
    #[arg(
        long,
        env = "SESSION_COOKIE_SECURE",
        action = clap::ArgAction::Set,
        default_value_t = true
    )]
    cookie_secure: bool,
    /// Hosted payment session endpoint.
    #[arg(long, env = "PAYMENT_ENDPOINT")]
    payment_endpoint: Option<Url>,
    /// Payment provider API key.
    #[arg(long, env = "PAYMENT_API_KEY", hide_env_values = true)]
    payment_api_key: Option<String>,
    /// Shared secret verifying payment callbacks.
    #[arg(long, env = "PAYMENT_CALLBACK_SECRET", hide_env_values = true)]
    payment_callback_secret: Option<String>,
    /// Transactional email send endpoint.
    #[arg(long, env = "MAIL_ENDPOINT")]
    mail_endpoint: Option<Url>,
    /// Email provider API key.
    #[arg(long, env = "MAIL_API_KEY", hide_env_values = true)]
    mail_api_key: Option<String>,
    /// Sender address on outgoing mail.
    #[arg(long, env = "MAIL_FROM", default_value = "orders@chasti.example")]
    mail_from: String,
    /// Ops chat incoming-webhook URL.
    #[arg(long, env = "OPS_WEBHOOK_URL")]
    ops_webhook_url: Option<Url>,
    /// Public vehicle-data API base for VIN decoding.
    #[arg(
        long,
        env = "VIN_DECODE_BASE_URL",
        default_value = "https://vpic.nhtsa.dot.gov/api/"
    )]
    vin_decode_base_url: Url,
}

/// Load the session key from disk, with a dev-only ephemeral fallback.
fn load_session_key(path: &PathBuf, allow_ephemeral: bool) -> Result<Key> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(err) => {
            if cfg!(debug_assertions) || allow_ephemeral {
                warn!(path = %path.display(), error = %err, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(eyre!(
                    "failed to read session key at {}: {err}",
                    path.display()
                ))
            }
        }
    }
}

/// Assemble integration settings from whatever is configured.
fn build_integrations(settings: &Settings) -> IntegrationConfig {
    let payment = match (
        &settings.payment_endpoint,
        &settings.payment_api_key,
        &settings.payment_callback_secret,
    ) {
        (Some(endpoint), Some(api_key), Some(callback_secret)) => Some(HostedCheckoutConfig {
            endpoint: endpoint.clone(),
            api_key: api_key.clone(),
            callback_secret: callback_secret.clone(),
            timeout: OUTBOUND_TIMEOUT,
        }),
        (None, None, None) => None,
        _ => {
            warn!("partial payment configuration ignored; set endpoint, key, and callback secret");
            None
        }
    };
    let mailer = match (&settings.mail_endpoint, &settings.mail_api_key) {
        (Some(endpoint), Some(api_key)) => Some(HttpMailerConfig {
            endpoint: endpoint.clone(),
            api_key: api_key.clone(),
            from: settings.mail_from.clone(),
            timeout: OUTBOUND_TIMEOUT,
        }),
        (None, None) => None,
        _ => {
            warn!("partial mail configuration ignored; set both endpoint and key");
            None
        }
    };
    let ops_webhook = settings
        .ops_webhook_url
        .as_ref()
        .map(|webhook_url| ChatWebhookConfig {
            webhook_url: webhook_url.clone(),
            timeout: OUTBOUND_TIMEOUT,
        });
    let vin_lookup = Some(VinLookupConfig {
        base_url: settings.vin_decode_base_url.clone(),
        timeout: OUTBOUND_TIMEOUT,
    });
    IntegrationConfig {
        payment,
        mailer,
        ops_webhook,
        vin_lookup,
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %err, "tracing init failed");
    }

    let settings = Settings::parse();
    let key = load_session_key(&settings.session_key_file, settings.session_allow_ephemeral)?;

    let mut config = ServerConfig::new(key, settings.cookie_secure, SameSite::Lax, settings.bind);
    if let Some(database_url) = settings.database_url.clone() {
        let applied = tokio::task::spawn_blocking({
            let database_url = database_url.clone();
            move || run_pending_migrations(&database_url)
        })
        .await??;
        info!(applied, "database migrations up to date");
        let pool = DbPool::new(PoolConfig::new(database_url)).await?;
        config = config.with_db_pool(pool);
    } else {
        warn!("DATABASE_URL not set; serving fixture data only");
    }
    config = config.with_integrations(build_integrations(&settings));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(addr = %settings.bind, "storefront API listening");
    server.await?;
    Ok(())
}
