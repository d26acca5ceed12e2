use std::{env, time::Duration};

use log::*;
use sf_common::{helpers::parse_boolean_flag, Secret};
use storefront_engine::StoreConfig;

const DEFAULT_SF_HOST: &str = "127.0.0.1";
const DEFAULT_SF_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.db";
const DEFAULT_PENDING_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Business settings handed to the order engine
    pub store: StoreConfig,
    /// Staff routes require this value in the `sf_admin_token` header. If it is not set, staff routes are closed.
    pub admin_token: Secret<String>,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
    /// How often the pending-order badge count is refreshed.
    pub pending_poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SF_HOST.to_string(),
            port: DEFAULT_SF_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            store: StoreConfig::default(),
            admin_token: Secret::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            pending_poll_interval: DEFAULT_PENDING_POLL_INTERVAL,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SF_HOST").ok().unwrap_or_else(|| DEFAULT_SF_HOST.into());
        let port = env::var("SF_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for SF_PORT. {e} Using the default, {DEFAULT_SF_PORT}, instead.");
                    DEFAULT_SF_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SF_PORT);
        let database_url = env::var("SF_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ SF_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let admin_token = env::var("SF_ADMIN_TOKEN").ok().filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
            warn!("🚨️ SF_ADMIN_TOKEN is not set. All staff routes will be refused until it is configured.");
            String::default()
        });
        let admin_token = Secret::new(admin_token);
        let use_x_forwarded_for = parse_boolean_flag(env::var("SF_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("SF_USE_FORWARDED").ok(), false);
        let pending_poll_interval = configure_poll_interval();
        let store = StoreConfig::from_env_or_default();
        Self {
            host,
            port,
            database_url,
            store,
            admin_token,
            use_x_forwarded_for,
            use_forwarded,
            pending_poll_interval,
        }
    }
}

fn configure_poll_interval() -> Duration {
    env::var("SF_PENDING_POLL_INTERVAL")
        .map_err(|_| {
            info!(
                "🪛️ SF_PENDING_POLL_INTERVAL is not set. Using the default value of {} s.",
                DEFAULT_PENDING_POLL_INTERVAL.as_secs()
            )
        })
        .and_then(|s| {
            s.parse::<u64>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for SF_PENDING_POLL_INTERVAL. {e}"))
                .and_then(|secs| {
                    if secs == 0 {
                        warn!("🪛️ SF_PENDING_POLL_INTERVAL must be at least 1 second.");
                        Err(())
                    } else {
                        Ok(Duration::from_secs(secs))
                    }
                })
        })
        .ok()
        .unwrap_or(DEFAULT_PENDING_POLL_INTERVAL)
}

//-------------------------------------------------  StaffAccess  ------------------------------------------------------
/// The part of the configuration that the staff-token middleware needs.
#[derive(Clone, Debug, Default)]
pub struct StaffAccess {
    pub admin_token: Secret<String>,
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl StaffAccess {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            admin_token: config.admin_token.clone(),
            use_x_forwarded_for: config.use_x_forwarded_for,
            use_forwarded: config.use_forwarded,
        }
    }

    pub fn with_token(token: &str) -> Self {
        Self { admin_token: Secret::new(token.to_string()), ..Default::default() }
    }
}
