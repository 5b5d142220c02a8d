use std::env;

use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use stripe_tools::StripeConfig;
use vinyl_common::Secret;
use vinyl_market_engine::{
    checkout_objects::{CheckoutUrls, DEFAULT_CANCEL_URL, DEFAULT_SUCCESS_URL},
    sqlite_db::db_url,
};

use crate::errors::ServerError;

const DEFAULT_VMS_HOST: &str = "127.0.0.1";
const DEFAULT_VMS_PORT: u16 = 8480;
const DEFAULT_MAIL_FROM: &str = "orders@vinyl-market.local";
const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Where the hosted payment page redirects the buyer.
    pub checkout_urls: CheckoutUrls,
    pub stripe: StripeConfig,
    pub notifications: NotificationConfig,
    /// Capacity of each event channel. Events published to a full channel are dropped.
    pub event_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_VMS_HOST.to_string(),
            port: DEFAULT_VMS_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            checkout_urls: CheckoutUrls::default(),
            stripe: StripeConfig::default(),
            notifications: NotificationConfig::default(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("VMS_HOST").ok().unwrap_or_else(|| DEFAULT_VMS_HOST.into());
        let port = env::var("VMS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for VMS_PORT. {e} Using the default, {DEFAULT_VMS_PORT}, instead."
                    );
                    DEFAULT_VMS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_VMS_PORT);
        let database_url = db_url();
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!("🪛️ Could not load the authentication configuration. {e}. Reverting to the default configuration.");
            AuthConfig::default()
        });
        let success_url = env::var("VMS_CHECKOUT_SUCCESS_URL").ok().unwrap_or_else(|| {
            info!("🪛️ VMS_CHECKOUT_SUCCESS_URL is not set. Using {DEFAULT_SUCCESS_URL}");
            DEFAULT_SUCCESS_URL.to_string()
        });
        let cancel_url = env::var("VMS_CHECKOUT_CANCEL_URL").ok().unwrap_or_else(|| {
            info!("🪛️ VMS_CHECKOUT_CANCEL_URL is not set. Using {DEFAULT_CANCEL_URL}");
            DEFAULT_CANCEL_URL.to_string()
        });
        let event_buffer_size = env::var("VMS_EVENT_BUFFER_SIZE")
            .ok()
            .and_then(|s| {
                s.parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .or_else(|| {
                        warn!("🪛️ Invalid value for VMS_EVENT_BUFFER_SIZE: {s}. Using {DEFAULT_EVENT_BUFFER_SIZE}");
                        None
                    })
            })
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        Self {
            host,
            port,
            database_url,
            auth,
            checkout_urls: CheckoutUrls { success_url, cancel_url },
            stripe: StripeConfig::new_from_env_or_default(),
            notifications: NotificationConfig::from_env_or_defaults(),
            event_buffer_size,
        }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 secret that bearer tokens are signed with.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. Tokens issued \
             elsewhere will be rejected. DO NOT operate on production like this. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: &str) -> Self {
        Self { jwt_secret: Secret::new(jwt_secret.to_string()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("VMS_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [VMS_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("VMS_JWT_SECRET is empty".into()));
        }
        Ok(Self::new(&secret))
    }
}

//---------------------------------------------  NotificationConfig  ---------------------------------------------------
#[derive(Clone, Debug)]
pub struct NotificationConfig {
    /// HTTP endpoint of the mail relay. Without one, receipts are only logged.
    pub mail_relay_url: Option<String>,
    pub mail_from: String,
    pub telegram: Option<TelegramConfig>,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub api_base: String,
    pub bot_token: Secret<String>,
    pub channel_id: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { mail_relay_url: None, mail_from: DEFAULT_MAIL_FROM.to_string(), telegram: None }
    }
}

impl NotificationConfig {
    pub fn from_env_or_defaults() -> Self {
        let mail_relay_url = env::var("VMS_MAIL_RELAY_URL").ok().filter(|s| !s.trim().is_empty());
        if mail_relay_url.is_none() {
            info!("🪛️ VMS_MAIL_RELAY_URL is not set. Order receipts will be logged, not sent.");
        }
        let mail_from = env::var("VMS_MAIL_FROM").ok().unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string());
        let token = env::var("VMS_TELEGRAM_BOT_TOKEN").ok().filter(|s| !s.trim().is_empty());
        let channel_id = env::var("VMS_TELEGRAM_CHANNEL_ID").ok().filter(|s| !s.trim().is_empty());
        let telegram = match (token, channel_id) {
            (Some(token), Some(channel_id)) => Some(TelegramConfig {
                api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
                bot_token: Secret::new(token),
                channel_id,
            }),
            (None, None) => {
                info!("🪛️ Telegram is not configured. New orders will not be broadcast.");
                None
            },
            _ => {
                warn!(
                    "🪛️ Only one of VMS_TELEGRAM_BOT_TOKEN and VMS_TELEGRAM_CHANNEL_ID is set. Both are needed. \
                     Telegram broadcasts are disabled."
                );
                None
            },
        };
        Self { mail_relay_url, mail_from, telegram }
    }
}
