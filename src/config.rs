// src/config.rs

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::{Map, Value, json};

const DEFAULT_PAYSTACK_BASE_URL: &str = "https://api.paystack.co";
const DEFAULT_SPENDING_FILE: &str = "server/spending.json";
const DEFAULT_DOCKER_IMAGE: &str = "ghcr.io/parkervcp/yolks:nodejs_18";
const DEFAULT_STARTUP: &str = "if [[ -d .git ]] && [[ {{AUTO_UPDATE}} == \"1\" ]]; then git pull; fi; \
/usr/local/bin/npm install; /usr/local/bin/{{CMD_RUN}}";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub paystack_secret_key: String,
    pub paystack_base_url: String,
    pub panel_api_key: String,
    pub panel_base_url: String,
    pub spending_file: PathBuf,
    pub node_id: i64,
    pub egg_id: i64,
    pub docker_image: String,
    pub startup: String,
    pub egg_environment: Map<String, Value>,
    pub min_deposit_kes: f64,
    pub card_callback_url: Option<String>,
    pub http_timeout: Duration,
    pub panel_fanout: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let paystack_secret_key = required("PAYSTACK_SECRET_KEY")?;
        let panel_api_key = required("PTERODACTYL_API_KEY")?;
        let panel_base_url = required("PTERODACTYL_URL")?;

        let egg_environment = match env::var("PTERODACTYL_EGG_ENVIRONMENT") {
            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        name: "PTERODACTYL_EGG_ENVIRONMENT",
                        reason: "expected a JSON object".to_string(),
                    });
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: "PTERODACTYL_EGG_ENVIRONMENT",
                        reason: e.to_string(),
                    });
                }
            },
            Err(_) => default_egg_environment(),
        };

        Ok(Self {
            port: parsed("PORT", 5000)?,
            paystack_secret_key,
            paystack_base_url: env::var("PAYSTACK_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PAYSTACK_BASE_URL.to_string()),
            panel_api_key,
            panel_base_url,
            spending_file: env::var("SPENDING_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SPENDING_FILE)),
            node_id: parsed("PTERODACTYL_NODE_ID", 1)?,
            egg_id: parsed("PTERODACTYL_EGG_ID", 15)?,
            docker_image: env::var("PTERODACTYL_DOCKER_IMAGE")
                .unwrap_or_else(|_| DEFAULT_DOCKER_IMAGE.to_string()),
            startup: env::var("PTERODACTYL_STARTUP").unwrap_or_else(|_| DEFAULT_STARTUP.to_string()),
            egg_environment,
            min_deposit_kes: parsed("MIN_DEPOSIT_KES", 10.0)?,
            card_callback_url: env::var("CARD_CALLBACK_URL").ok().filter(|v| !v.is_empty()),
            http_timeout: Duration::from_secs(parsed("HTTP_TIMEOUT_SECS", 30)?),
            panel_fanout: parsed::<usize>("PANEL_FANOUT", 4)?.max(1),
        })
    }

    /// Settings pointing at explicit upstream URLs, with every optional value defaulted.
    pub fn with_upstreams(
        paystack_base_url: impl Into<String>,
        panel_base_url: impl Into<String>,
        spending_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            port: 5000,
            paystack_secret_key: "sk_test_wolfhost".to_string(),
            paystack_base_url: paystack_base_url.into(),
            panel_api_key: "ptla_wolfhost".to_string(),
            panel_base_url: panel_base_url.into(),
            spending_file: spending_file.into(),
            node_id: 1,
            egg_id: 15,
            docker_image: DEFAULT_DOCKER_IMAGE.to_string(),
            startup: DEFAULT_STARTUP.to_string(),
            egg_environment: default_egg_environment(),
            min_deposit_kes: 10.0,
            card_callback_url: None,
            http_timeout: Duration::from_secs(30),
            panel_fanout: 4,
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parsed<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

fn default_egg_environment() -> Map<String, Value> {
    let value = json!({
        "USER_UPLOAD": "0",
        "AUTO_UPDATE": "0",
        "CMD_RUN": "npm start",
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
