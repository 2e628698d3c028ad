//! Environment-derived startup configuration.

use std::env;
use std::net::{AddrParseError, SocketAddr};

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("WS_PORT {raw:?} is not a valid port number")]
    InvalidPort { raw: String },
    #[error("WS_HOST/WS_PORT do not form a valid socket address: {0}")]
    InvalidAddr(#[from] AddrParseError),
}

/// Startup configuration read from `WS_HOST` / `WS_PORT` (and `RUST_LOG` /
/// `LOG_LEVEL` for the tracing filter, read separately in `main`).
#[derive(Debug, Clone, Copy)]
pub struct HubConfig {
    pub bind_addr: SocketAddr,
}

impl HubConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("WS_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_owned());
        let port = match env::var("WS_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { raw })?,
            Err(_) => DEFAULT_PORT,
        };
        let bind_addr = format!("{host}:{port}").parse()?;
        Ok(HubConfig { bind_addr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serialize env-var-mutating tests: `std::env` is process-global.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env<F: FnOnce() -> R, R>(host: Option<&str>, port: Option<&str>, f: F) -> R {
        let _guard = ENV_LOCK.lock().unwrap();
        let prev_host = env::var("WS_HOST").ok();
        let prev_port = env::var("WS_PORT").ok();
        match host {
            Some(h) => env::set_var("WS_HOST", h),
            None => env::remove_var("WS_HOST"),
        }
        match port {
            Some(p) => env::set_var("WS_PORT", p),
            None => env::remove_var("WS_PORT"),
        }
        let result = f();
        match prev_host {
            Some(h) => env::set_var("WS_HOST", h),
            None => env::remove_var("WS_HOST"),
        }
        match prev_port {
            Some(p) => env::set_var("WS_PORT", p),
            None => env::remove_var("WS_PORT"),
        }
        result
    }

    #[test]
    fn defaults_when_unset() {
        with_env(None, None, || {
            let cfg = HubConfig::from_env().unwrap();
            assert_eq!(cfg.bind_addr.port(), DEFAULT_PORT);
            assert_eq!(cfg.bind_addr.ip().to_string(), DEFAULT_HOST);
        });
    }

    #[test]
    fn reads_host_and_port_from_env() {
        with_env(Some("127.0.0.1"), Some("5003"), || {
            let cfg = HubConfig::from_env().unwrap();
            assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:5003");
        });
    }

    #[test]
    fn rejects_unparseable_port() {
        with_env(None, Some("not-a-port"), || {
            let err = HubConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidPort { .. }));
        });
    }
}
