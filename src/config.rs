use std::env;

use crate::pricing::PricingConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub dev_mode: bool,
    /// Shared HS256 secret for bearer tokens minted by the identity provider
    pub auth_jwt_secret: String,
    /// Razorpay API credentials. When absent, order creation and payment
    /// verification respond with a configuration error.
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    /// Single source of truth for the yearly plan price and GST rate,
    /// injected into every handler that computes amounts.
    pub pricing: PricingConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("PLAYOGA_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_price: f64 = env::var("PLAYOGA_BASE_PRICE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(PricingConfig::DEFAULT_BASE_PRICE);

        let gst_rate: f64 = env::var("PLAYOGA_GST_RATE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(PricingConfig::DEFAULT_GST_RATE);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "playoga.db".to_string()),
            dev_mode,
            auth_jwt_secret: env::var("AUTH_JWT_SECRET")
                .unwrap_or_else(|_| "playoga-dev-secret".to_string()),
            razorpay_key_id: env::var("RAZORPAY_KEY_ID").ok(),
            razorpay_key_secret: env::var("RAZORPAY_KEY_SECRET").ok(),
            pricing: PricingConfig { base_price, gst_rate },
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
