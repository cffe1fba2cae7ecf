use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use chirpy_api::tokens::SECRET_ENV;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub public_dir: PathBuf,
    pub polka_key: String,
    pub request_timeout: Duration,
    /// Argon2 memory cost override in KiB; `None` keeps argon2's default.
    pub hash_memory_kib: Option<u32>,
    /// Wipe the store on shutdown.
    pub debug: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let debug_flag = std::env::args().skip(1).any(|arg| arg == "--debug");
        Self::from_lookup(|key| std::env::var(key).ok(), debug_flag)
    }

    /// Build from any key lookup. The JWT secret is only checked here; the
    /// token service re-reads it from the environment on every call.
    pub fn from_lookup<F>(lookup: F, debug_flag: bool) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup(SECRET_ENV).unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("{SECRET_ENV} is unset or still a placeholder; set it in your .env file");
        }

        let polka_key = lookup("CHIRPY_POLKA_KEY").unwrap_or_default();
        if polka_key.is_empty() {
            bail!("CHIRPY_POLKA_KEY is unset");
        }

        let host = var("CHIRPY_HOST", "0.0.0.0");
        let port: u16 = var("CHIRPY_PORT", "8080")
            .parse()
            .context("CHIRPY_PORT is not a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("CHIRPY_HOST/CHIRPY_PORT do not form a socket address")?;

        let timeout_ms: u64 = var("CHIRPY_REQUEST_TIMEOUT_MS", "250")
            .parse()
            .context("CHIRPY_REQUEST_TIMEOUT_MS is not a number")?;

        let hash_memory_kib = lookup("CHIRPY_HASH_MEMORY_KIB")
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("CHIRPY_HASH_MEMORY_KIB is not a number")?;

        let debug = debug_flag
            || lookup("CHIRPY_DEBUG").is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes"));

        Ok(Self {
            addr,
            db_path: var("CHIRPY_DB_PATH", "./db/database.json").into(),
            public_dir: var("CHIRPY_PUBLIC_DIR", "./public").into(),
            polka_key,
            request_timeout: Duration::from_millis(timeout_ms),
            hash_memory_kib,
            debug,
        })
    }
}
