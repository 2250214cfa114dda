use std::{env, net::IpAddr, str::FromStr, time::Duration};

use log::*;
use shop_common::{parse_boolean_flag, Money, Secret, DEFAULT_CURRENCY_CODE};
use shop_engine::{
    order_objects::{LookupPolicy, DEFAULT_LOOKUP_ATTEMPTS, DEFAULT_LOOKUP_INTERVAL},
    pricing::{DeliveryConfig, DEFAULT_FREE_DELIVERY_THRESHOLD, DEFAULT_STANDARD_DELIVERY_PERCENTAGE},
};

const DEFAULT_SHOP_HOST: &str = "127.0.0.1";
const DEFAULT_SHOP_PORT: u16 = 8460;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/shop.db";
const DEFAULT_SIGNATURE_TOLERANCE: Duration = Duration::from_secs(300);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    pub delivery: DeliveryConfig,
    /// How long the webhook waits for checkout to write an order before creating it itself
    pub lookup_policy: LookupPolicy,
    pub stripe: StripeConfig,
}

#[derive(Clone, Debug)]
pub struct StripeConfig {
    /// The signing secret of the webhook endpoint (`whsec_…`)
    pub webhook_secret: Secret<String>,
    /// If false, webhook signatures are not checked. **DANGER**: only for local testing.
    pub signature_checks: bool,
    /// How old a signed webhook timestamp may be before the request is rejected
    pub signature_tolerance: Duration,
    /// The currency payment intents are created in
    pub currency: String,
    /// If supplied, requests against /stripe endpoints will be checked against a whitelist of IP addresses.
    /// To explicitly disable the whitelist, set this to "false", "none", or "0".
    pub whitelist: Option<Vec<IpAddr>>,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            webhook_secret: Secret::default(),
            signature_checks: true,
            signature_tolerance: DEFAULT_SIGNATURE_TOLERANCE,
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            whitelist: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SHOP_HOST.to_string(),
            port: DEFAULT_SHOP_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            delivery: DeliveryConfig::default(),
            lookup_policy: LookupPolicy::default(),
            stripe: StripeConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SHOP_HOST").ok().unwrap_or_else(|| DEFAULT_SHOP_HOST.into());
        let port = parse_env("SHOP_PORT", DEFAULT_SHOP_PORT);
        let database_url = env::var("SHOP_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SHOP_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let use_x_forwarded_for = parse_boolean_flag(env::var("SHOP_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("SHOP_USE_FORWARDED").ok(), false);
        let free_delivery_threshold: Money =
            parse_env("SHOP_FREE_DELIVERY_THRESHOLD", DEFAULT_FREE_DELIVERY_THRESHOLD);
        let standard_delivery_percentage =
            match parse_env("SHOP_STANDARD_DELIVERY_PERCENTAGE", DEFAULT_STANDARD_DELIVERY_PERCENTAGE) {
                p if p > 100 => {
                    warn!(
                        "🪛️ SHOP_STANDARD_DELIVERY_PERCENTAGE cannot be more than 100. Using the default, \
                         {DEFAULT_STANDARD_DELIVERY_PERCENTAGE}, instead."
                    );
                    DEFAULT_STANDARD_DELIVERY_PERCENTAGE
                },
                p => p,
            };
        let delivery = DeliveryConfig::new(free_delivery_threshold, standard_delivery_percentage);
        info!(
            "🪛️ Delivery is free from {free_delivery_threshold}, and {standard_delivery_percentage}% of the order total \
             below that"
        );
        let attempts = parse_env("SHOP_WEBHOOK_LOOKUP_ATTEMPTS", DEFAULT_LOOKUP_ATTEMPTS);
        let interval = env::var("SHOP_WEBHOOK_LOOKUP_INTERVAL_MS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for SHOP_WEBHOOK_LOOKUP_INTERVAL_MS ({s}). {e}"))
                    .ok()
            })
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_LOOKUP_INTERVAL);
        let lookup_policy = LookupPolicy::new(attempts, interval);
        let stripe = StripeConfig::from_env_or_defaults();
        Self {
            host,
            port,
            database_url,
            use_x_forwarded_for,
            use_forwarded,
            delivery,
            lookup_policy,
            stripe,
        }
    }
}

impl StripeConfig {
    pub fn from_env_or_defaults() -> Self {
        let webhook_secret = env::var("SHOP_STRIPE_WH_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ SHOP_STRIPE_WH_SECRET is not set. Please set it to the signing secret of your Stripe webhook \
                 endpoint."
            );
            String::default()
        });
        let webhook_secret = Secret::new(webhook_secret);
        let signature_checks = parse_boolean_flag(env::var("SHOP_STRIPE_SIGNATURE_CHECKS").ok(), true);
        if !signature_checks {
            warn!("🚨️ Stripe webhook signature checks are DISABLED. Anyone can post payment notifications.");
        }
        let signature_tolerance = env::var("SHOP_STRIPE_SIGNATURE_TOLERANCE")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for SHOP_STRIPE_SIGNATURE_TOLERANCE ({s}). {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SIGNATURE_TOLERANCE);
        let currency = env::var("SHOP_STRIPE_CURRENCY")
            .map(|s| s.trim().to_lowercase())
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string());
        let whitelist = env::var("SHOP_STRIPE_IP_WHITELIST").ok().and_then(|s| parse_whitelist(&s));
        match &whitelist {
            Some(whitelist) if whitelist.is_empty() => {
                warn!(
                    "🚨️ The Stripe IP whitelist was configured, but is empty. The server will run, but won't \
                     accept any Stripe webhook calls."
                );
            },
            None => {
                info!("🪛️ No Stripe IP whitelist is set. Only signature validation will be used.");
            },
            Some(v) => {
                let addrs = v.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
                info!("🪛️ Stripe IP whitelist: {addrs}");
            },
        }
        Self { webhook_secret, signature_checks, signature_tolerance, currency, whitelist }
    }
}

/// Parses a comma-separated list of IP addresses. "none", "false" and "0" disable the whitelist. Invalid entries are
/// skipped.
pub fn parse_whitelist(s: &str) -> Option<Vec<IpAddr>> {
    if ["none", "false", "0"].contains(&s.trim().to_lowercase().as_str()) {
        info!(
            "🪛️ Stripe IP whitelist is disabled. If this is not what you want, set SHOP_STRIPE_IP_WHITELIST to a \
             comma-separated list of IP addresses to enable it."
        );
        return None;
    }
    let ip_addrs = s
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            s.parse::<IpAddr>()
                .map_err(|e| warn!("🪛️ Ignoring invalid IP address ({s}) in SHOP_STRIPE_IP_WHITELIST: {e}"))
                .ok()
        })
        .collect::<Vec<IpAddr>>();
    Some(ip_addrs)
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default, {default}.");
            default
        },
    }
}
