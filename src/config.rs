use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub payments: PaymentConfig,
}

/// Settings for the outbound payment gateway.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub base_url: String,
    pub secret_key: String,
    pub currency: String,
    pub callback_url: String,
    pub return_url: String,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let payments = PaymentConfig::from_env(&host, port);
        Ok(Self {
            port,
            database_url,
            host,
            payments,
        })
    }
}

impl PaymentConfig {
    pub fn from_env(host: &str, port: u16) -> Self {
        let timeout_secs = env::var("GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(10);
        Self {
            base_url: env::var("CHAPA_BASE_URL")
                .unwrap_or_else(|_| "https://api.chapa.co".to_string()),
            secret_key: env::var("CHAPA_SECRET_KEY").unwrap_or_default(),
            currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "ETB".to_string()),
            callback_url: env::var("PAYMENT_CALLBACK_URL")
                .unwrap_or_else(|_| format!("http://{host}:{port}/api/payments/verify")),
            return_url: env::var("PAYMENT_RETURN_URL")
                .unwrap_or_else(|_| "http://localhost:3000/payment/success".to_string()),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}
