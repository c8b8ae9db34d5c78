use std::env;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_DISTANCE_MATRIX_URL: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub google_maps_api_key: Option<String>,
    pub distance_matrix_url: String,
    pub distance_timeout: Duration,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub fleet_summary_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let log_format = match env::var("LOG_FORMAT") {
            Ok(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Ok(raw) if raw.eq_ignore_ascii_case("compact") => LogFormat::Compact,
            Ok(raw) => {
                return Err(AppError::Internal(format!(
                    "invalid LOG_FORMAT: {raw}, expected compact or json"
                )));
            }
            Err(_) => LogFormat::Compact,
        };

        let fleet_summary_concurrency: usize = parse_or_default("FLEET_SUMMARY_CONCURRENCY", 8)?;
        if fleet_summary_concurrency == 0 {
            return Err(AppError::Internal(
                "invalid FLEET_SUMMARY_CONCURRENCY: must be > 0".to_string(),
            ));
        }

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format,
            google_maps_api_key: non_empty("GOOGLE_MAPS_API_KEY"),
            distance_matrix_url: env::var("DISTANCE_MATRIX_URL")
                .unwrap_or_else(|_| DEFAULT_DISTANCE_MATRIX_URL.to_string()),
            distance_timeout: Duration::from_millis(parse_or_default("DISTANCE_TIMEOUT_MS", 5000)?),
            database_url: non_empty("DATABASE_URL"),
            database_max_connections: parse_or_default("DATABASE_MAX_CONNECTIONS", 5)?,
            fleet_summary_concurrency,
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
