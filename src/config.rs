use std::env::VarError;
use std::net::SocketAddr;
use std::str::FromStr;

use tracing::Level;

use crate::error::Error;
use crate::format::Locale;
use crate::stats::BaselineStrategy;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DatabaseBackend {
    Mongo,
    Memory,
}

impl FromStr for DatabaseBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<DatabaseBackend, String> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(DatabaseBackend::Mongo),
            "memory" => Ok(DatabaseBackend::Memory),
            other => Err(format!("unknown backend '{}', expected 'mongo' or 'memory'", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub backend: DatabaseBackend,
    pub bind_address: SocketAddr,
    pub locale: Locale,
    pub baseline: BaselineStrategy,
    pub seed_on_start: bool,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            mongo_uri: "mongodb://localhost:27017".to_string(),
            mongo_database: "adtech".to_string(),
            backend: DatabaseBackend::Mongo,
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3001)),
            locale: Locale::Fr,
            baseline: BaselineStrategy::default(),
            seed_on_start: false,
            log_level: Level::DEBUG,
        }
    }
}

/// Loads `.env` if present, then reads the process environment.
pub fn load_config() -> Result<Config, Error> {
    dotenvy::dotenv().ok();
    build_config(|key| std::env::var(key))
}

/// Builds the configuration from an arbitrary lookup so it can be exercised
/// without touching the process environment.
pub fn build_config<F>(lookup: F) -> Result<Config, Error>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let defaults = Config::default();

    let parse = |var: &str| -> Option<Result<String, Error>> {
        match lookup(var) {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(Ok(value.trim().to_string())),
            Err(VarError::NotPresent) => None,
            Err(err) => Some(Err(Error::InvalidConfiguration {
                variable: var.to_string(),
                reason: err.to_string(),
            })),
        }
    };

    let parse_with = |var: &str, default| -> Result<_, Error> { parse(var).unwrap_or(Ok(default)) };

    Ok(Config {
        mongo_uri: parse_with("MONGO_URI", defaults.mongo_uri)?,
        mongo_database: parse_with("MONGO_DATABASE", defaults.mongo_database)?,
        backend: parse_value("DATABASE_BACKEND", parse("DATABASE_BACKEND"), defaults.backend)?,
        bind_address: parse_value("BIND_ADDRESS", parse("BIND_ADDRESS"), defaults.bind_address)?,
        locale: parse_value("LOCALE", parse("LOCALE"), defaults.locale)?,
        baseline: parse_value("OVERVIEW_BASELINE", parse("OVERVIEW_BASELINE"), defaults.baseline)?,
        seed_on_start: parse_value("SEED_ON_START", parse("SEED_ON_START"), defaults.seed_on_start)?,
        log_level: parse_value("LOG_LEVEL", parse("LOG_LEVEL"), defaults.log_level)?,
    })
}

fn parse_value<T>(var: &str, raw: Option<Result<String, Error>>, default: T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: ToString,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw?.parse::<T>().map_err(|err| Error::InvalidConfiguration {
            variable: var.to_string(),
            reason: err.to_string(),
        }),
    }
}
