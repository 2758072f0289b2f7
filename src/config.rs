use std::env;

use anyhow::{Context, Result};

use crate::keywords::align::SentinelMode;

/// Default port for `keyalign serve`.
pub const DEFAULT_PORT: u16 = 5002;

/// Default upload limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 16;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// variable is optional; CLI flags override the bind address and port.
#[derive(Debug, Clone)]
pub struct Config {
    /// How the "-" placeholder takes part in alignment (KEYALIGN_SENTINEL_MODE)
    pub sentinel_mode: SentinelMode,
    /// Address the web server binds to (KEYALIGN_BIND)
    pub bind: String,
    /// Port the web server listens on (KEYALIGN_PORT)
    pub port: u16,
    /// Maximum accepted upload size in bytes (KEYALIGN_MAX_UPLOAD_MB)
    pub max_upload_bytes: usize,
    /// Secret for HMAC session cookie signing (KEYALIGN_SESSION_SECRET).
    /// Randomly generated when unset, so sessions don't survive a restart.
    #[cfg(feature = "web")]
    pub session_secret: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sentinel_mode: SentinelMode::default(),
            bind: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            #[cfg(feature = "web")]
            session_secret: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let sentinel_mode = match env::var("KEYALIGN_SENTINEL_MODE") {
            Ok(v) => v
                .parse::<SentinelMode>()
                .map_err(anyhow::Error::msg)
                .context("Invalid KEYALIGN_SENTINEL_MODE")?,
            Err(_) => defaults.sentinel_mode,
        };

        let port = match env::var("KEYALIGN_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .with_context(|| format!("Invalid KEYALIGN_PORT: {v}"))?,
            Err(_) => defaults.port,
        };

        let max_upload_bytes = match env::var("KEYALIGN_MAX_UPLOAD_MB") {
            Ok(v) => upload_limit_bytes(&v)?,
            Err(_) => defaults.max_upload_bytes,
        };

        #[cfg(feature = "web")]
        let session_secret = match env::var("KEYALIGN_SESSION_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!("KEYALIGN_SESSION_SECRET not set, using a random per-process secret");
                crate::web::auth::random_secret()
            }
        };

        Ok(Self {
            sentinel_mode,
            bind: env::var("KEYALIGN_BIND").unwrap_or(defaults.bind),
            port,
            max_upload_bytes,
            #[cfg(feature = "web")]
            session_secret,
        })
    }
}

/// Convert a KEYALIGN_MAX_UPLOAD_MB value to bytes.
fn upload_limit_bytes(megabytes: &str) -> Result<usize> {
    megabytes
        .trim()
        .parse::<usize>()
        .with_context(|| format!("Invalid KEYALIGN_MAX_UPLOAD_MB: {megabytes}"))?
        .checked_mul(1024 * 1024)
        .with_context(|| format!("KEYALIGN_MAX_UPLOAD_MB too large: {megabytes}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_limit_in_bytes() {
        assert_eq!(upload_limit_bytes("16").unwrap(), 16 * 1024 * 1024);
        assert_eq!(upload_limit_bytes(" 1 ").unwrap(), 1024 * 1024);
    }

    #[test]
    fn test_upload_limit_overflow_is_an_error() {
        let err = upload_limit_bytes(&usize::MAX.to_string()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_upload_limit_not_a_number() {
        assert!(upload_limit_bytes("lots").is_err());
        assert!(upload_limit_bytes("-1").is_err());
    }
}
