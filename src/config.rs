// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `APP_ENV` | Deployment environment (`production` or `development`) | `development` |
//! | `TOKEN_SECRET` | HS256 signing secret for access/refresh tokens | Required in production |
//! | `ACCESS_TOKEN_TTL_MINUTES` | Access token lifetime | `15` |
//! | `REFRESH_TOKEN_TTL_DAYS` | Refresh token lifetime | `7` |
//! | `SWEEP_INTERVAL_SECS` | Expired refresh-token sweep interval | `3600` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

use chrono::Duration;
use thiserror::Error;
use tracing::warn;

/// Environment variable holding the token signing secret.
pub const TOKEN_SECRET_ENV: &str = "TOKEN_SECRET";

/// Environment variable selecting the deployment environment.
pub const APP_ENV_ENV: &str = "APP_ENV";

/// Placeholder secret used when `TOKEN_SECRET` is unset in development.
/// Refusing to serve with this value in production is enforced at startup.
const DEV_TOKEN_SECRET: &str = "dev-secret-change-me";

/// Fatal configuration errors. The process must not serve traffic if any
/// of these occur at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOKEN_SECRET must be set in production")]
    MissingSecret,
    #[error("TOKEN_SECRET must not be the development default in production")]
    DefaultSecret,
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },
}

/// Authentication settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// HS256 signing secret shared by access and refresh tokens.
    pub token_secret: String,
    /// Access token lifetime.
    pub access_ttl: Duration,
    /// Refresh token lifetime.
    pub refresh_ttl: Duration,
    /// Interval between expired-record sweeps, in seconds.
    pub sweep_interval_secs: u64,
}

impl AuthSettings {
    /// Load settings from the environment.
    ///
    /// In production (`APP_ENV=production`) a real `TOKEN_SECRET` is
    /// mandatory: missing or default values are a fatal [`ConfigError`].
    /// In development a placeholder secret is substituted with a loud
    /// warning so local setups work out of the box.
    pub fn from_env() -> Result<Self, ConfigError> {
        let production = env::var(APP_ENV_ENV)
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let token_secret = match env::var(TOKEN_SECRET_ENV) {
            Ok(secret) if secret == DEV_TOKEN_SECRET => {
                if production {
                    return Err(ConfigError::DefaultSecret);
                }
                warn!("TOKEN_SECRET is the development default; do not use in production");
                secret
            }
            Ok(secret) => secret,
            Err(_) => {
                if production {
                    return Err(ConfigError::MissingSecret);
                }
                warn!("TOKEN_SECRET not set; using insecure development default");
                DEV_TOKEN_SECRET.to_string()
            }
        };

        Ok(Self {
            token_secret,
            access_ttl: Duration::minutes(parse_env("ACCESS_TOKEN_TTL_MINUTES", 15)?),
            refresh_ttl: Duration::days(parse_env("REFRESH_TOKEN_TTL_DAYS", 7)?),
            sweep_interval_secs: parse_env("SWEEP_INTERVAL_SECS", 3600)? as u64,
        })
    }

    /// Settings with a fixed secret and short lifetimes, for tests.
    pub fn for_tests() -> Self {
        Self {
            token_secret: "test-secret-not-for-production".to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            sweep_interval_secs: 3600,
        }
    }
}

fn parse_env(var: &str, default: i64) -> Result<i64, ConfigError> {
    match env::var(var) {
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_have_sane_lifetimes() {
        let settings = AuthSettings::for_tests();
        assert!(settings.access_ttl < settings.refresh_ttl);
        assert!(settings.access_ttl > Duration::zero());
    }
}
