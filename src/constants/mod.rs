use std::str::FromStr;

use crate::api::error::SystemError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Postgres,
    Memory,
}

impl FromStr for Storage {
    type Err = SystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(Storage::Postgres),
            "memory" => Ok(Storage::Memory),
            other => Err(SystemError::config(format!("Unknown STORAGE '{other}'"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Env {
    pub jwt_secret: String,
    pub access_token_expiration: u64,
    pub storage: Storage,
    pub database_url: Option<String>,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub workers: usize,
    pub app_env: String,
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(key: &str, default: &str) -> Result<T, SystemError> {
    var_or(key, default)
        .parse::<T>()
        .map_err(|_| SystemError::config(format!("{key} has an invalid value")))
}

impl Env {
    pub fn from_env() -> Result<Self, SystemError> {
        let jwt_secret = std::env::var("SECRET_KEY").map_err(|_| {
            SystemError::config("SECRET_KEY must be set in .env file or environment variable")
        })?;

        let access_token_expiration = parse_var::<u64>("ACCESS_TOKEN_EXPIRATION", "900")?;
        let storage = var_or("STORAGE", "postgres").parse::<Storage>()?;

        let database_url = std::env::var("DATABASE_URL").ok();
        if storage == Storage::Postgres && database_url.is_none() {
            return Err(SystemError::config(
                "DATABASE_URL must be set in .env file or environment variable",
            ));
        }

        let frontend_url = var_or("FRONTEND_URL", "http://localhost:5173");
        let ip = var_or("IP", "127.0.0.1");
        let port = parse_var::<u16>("PORT", "8080")?;
        let workers = parse_var::<usize>("WORKERS", "2")?;
        let app_env = var_or("APP_ENV", "development");

        Ok(Env {
            jwt_secret,
            access_token_expiration,
            storage,
            database_url,
            frontend_url,
            ip,
            port,
            workers,
            app_env,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}
