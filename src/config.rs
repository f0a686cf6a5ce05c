use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_CONTENT_CACHE_TTL_MINUTES, DEFAULT_CONTENT_TIMEOUT_SECS, DEFAULT_RETENTION_DAYS,
};
use crate::logging::LogConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    pub worker: WorkerConfig,
    pub content: ContentConfig,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub enable_data_retention: bool,
    pub retention_days: i64,
    pub retention_cron: String,
}

#[derive(Debug, Clone)]
pub struct ContentConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    pub cache_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/meteorsim.sled"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                enable_data_retention: env_or_bool("ENABLE_DATA_RETENTION", false),
                retention_days: env_or_parse("RETENTION_DAYS", DEFAULT_RETENTION_DAYS),
                retention_cron: env_or("RETENTION_CRON", "0 0 3 * * *"),
            },
            content: ContentConfig {
                api_url: env_or("CONTENT_API_URL", "http://localhost:5000/api"),
                timeout_secs: env_or_parse("CONTENT_TIMEOUT_SECS", DEFAULT_CONTENT_TIMEOUT_SECS),
                cache_ttl_minutes: env_or_parse(
                    "CONTENT_CACHE_TTL_MINUTES",
                    DEFAULT_CONTENT_CACHE_TTL_MINUTES,
                ),
            },
        }
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            log_level: self.log_level.clone(),
            enable_file_logs: self.enable_file_logs,
            log_dir: self.log_dir.clone(),
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
