//! Configuration loading from environment variables.

use std::net::{IpAddr, SocketAddr};

const DEFAULT_DATABASE_URL: &str = "sqlite://tasks.db";

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL
    pub database_url: String,
    /// HTTP listen address
    pub listen_addr: SocketAddr,
    /// Upper bound on pooled database connections
    pub max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `TASKS_DATABASE_URL`: SQLite connection string (default: `sqlite://tasks.db`)
    /// - `TASKS_HOST`: listen address (default: 0.0.0.0)
    /// - `TASKS_PORT`: listen port (default: 3000)
    /// - `TASKS_DB_MAX_CONNECTIONS`: pool size (default: 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("TASKS_DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let host: IpAddr = std::env::var("TASKS_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("TASKS_HOST", "must be an IP address"))?;

        let port: u16 = std::env::var("TASKS_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("TASKS_PORT", "must be a valid port number"))?;

        let max_connections: u32 = std::env::var("TASKS_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::Invalid(
                "TASKS_DB_MAX_CONNECTIONS",
                "must be a positive integer",
            ))?;

        Ok(Self {
            database_url,
            listen_addr: SocketAddr::new(host, port),
            max_connections,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Serializes tests that modify environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 4] = [
        "TASKS_DATABASE_URL",
        "TASKS_HOST",
        "TASKS_PORT",
        "TASKS_DB_MAX_CONNECTIONS",
    ];

    /// Sets env vars for a test and restores them on drop
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn clean() -> Self {
            let mut guard = Self { vars: Vec::new() };
            for key in VARS {
                guard.remove(key);
            }
            guard
        }

        fn set(&mut self, key: &str, value: &str) {
            self.vars.push((key.to_string(), env::var(key).ok()));
            env::set_var(key, value);
        }

        fn remove(&mut self, key: &str) {
            self.vars.push((key.to_string(), env::var(key).ok()));
            env::remove_var(key);
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.vars.drain(..).rev() {
                match value {
                    Some(v) => env::set_var(&key, v),
                    None => env::remove_var(&key),
                }
            }
        }
    }

    #[test]
    fn defaults_when_unset() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _guard = EnvGuard::clean();

        let config = Config::from_env().unwrap();

        assert_eq!(config.database_url, "sqlite://tasks.db");
        assert_eq!(config.listen_addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn custom_values() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::clean();
        guard.set("TASKS_DATABASE_URL", "sqlite::memory:");
        guard.set("TASKS_HOST", "127.0.0.1");
        guard.set("TASKS_PORT", "8080");
        guard.set("TASKS_DB_MAX_CONNECTIONS", "12");

        let config = Config::from_env().unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.listen_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.max_connections, 12);
    }

    #[test]
    fn invalid_port() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::clean();
        guard.set("TASKS_PORT", "99999");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("TASKS_PORT", _)));
        assert!(err.to_string().contains("TASKS_PORT"));
    }

    #[test]
    fn invalid_host() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::clean();
        guard.set("TASKS_HOST", "not-an-ip");

        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("TASKS_HOST", _))
        ));
    }

    #[test]
    fn zero_connections_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::clean();
        guard.set("TASKS_DB_MAX_CONNECTIONS", "0");

        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("TASKS_DB_MAX_CONNECTIONS", _))
        ));
    }
}
