use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: Server,
    pub db: Db,
    pub payment: Payment,
    pub reconciliation: Reconciliation,
    pub webhook_delivery: WebhookDelivery,
    pub observability: Observability,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Db {
    pub url: String,
    pub max_connections: u32,
}

/// Payment provider connection (Connect-style processor REST API).
#[derive(Debug, Deserialize, Clone)]
pub struct Payment {
    pub base_url: String,
    pub secret_key: String,
    pub request_timeout_ms: u64,
}

/// Background sweep that resumes interrupted approve-then-pay flows.
#[derive(Debug, Deserialize, Clone)]
pub struct Reconciliation {
    pub poll_interval_ms: u64,
    pub max_batch: u32,
    /// Age after which an unfinished payment attempt is picked up.
    pub stale_after_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookDelivery {
    pub poll_interval_ms: u64,
    pub batch_size: u32,
    pub request_timeout_ms: u64,
    pub max_attempts: u32,
    pub backoff_initial_ms: u64,
    pub backoff_max_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Observability {
    pub service_name: String,
    pub enable_metrics: bool,
}

/// Load settings from `config/default.toml`, `config/<env>.toml`, and env overrides.
pub fn load() -> Result<Settings, config::ConfigError> {
    let env_name = std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());
    config::Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{env_name}")).required(false))
        .add_source(config::Environment::with_prefix("WORKPAY").separator("__"))
        .build()?
        .try_deserialize()
}


pub mod test_support {
    use super::*;

    /// Settings for unit and integration tests; no config files required.
    pub fn test_settings(db_url: &str) -> Settings {
        Settings {
            server: Server {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            db: Db {
                url: db_url.to_string(),
                max_connections: 5,
            },
            payment: Payment {
                base_url: "http://127.0.0.1:0".to_string(),
                secret_key: "sk_test_key".to_string(),
                request_timeout_ms: 2000,
            },
            reconciliation: Reconciliation {
                poll_interval_ms: 1000,
                max_batch: 100,
                stale_after_seconds: 60,
            },
            webhook_delivery: WebhookDelivery {
                poll_interval_ms: 1000,
                batch_size: 100,
                request_timeout_ms: 2000,
                max_attempts: 5,
                backoff_initial_ms: 500,
                backoff_max_ms: 30000,
            },
            observability: Observability {
                service_name: "workpay".to_string(),
                enable_metrics: false,
            },
        }
    }
}
