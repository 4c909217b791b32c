use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub redis_url: String,
    pub weather_api_key: Option<String>,
    /// Expected number of distinct restaurants the duplicate filter is sized
    /// for. Changing this after the filter exists requires a full rebuild.
    pub bloom_capacity: u64,
    /// Target false-positive rate of the duplicate filter.
    pub bloom_error_rate: f64,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "3000"),
            redis_url: try_load("REDIS_URL", "redis://localhost:6379"),
            weather_api_key: env::var("WEATHER_API_KEY").ok(),
            bloom_capacity: try_load("BLOOM_CAPACITY", "100000"),
            bloom_error_rate: try_load("BLOOM_ERROR_RATE", "0.01"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
