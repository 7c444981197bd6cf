use crate::models::{AppTimezone, SigningMode, TokenFileConfig};
use chrono::FixedOffset;
use chrono_tz::Tz;
use common::jwt::MAX_CLOCK_SKEW;
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default expiry window for issued tokens, in seconds.
pub const DEFAULT_TOKEN_EXPIRE_SECONDS: i64 = 900;

/// Upper bound for the expiry window (one year).
pub const MAX_TOKEN_EXPIRE_SECONDS: i64 = 365 * 24 * 3600;

/// Default renew window, in seconds before expiry.
pub const DEFAULT_TOKEN_RENEW_SECONDS: i64 = 300;

/// Default tolerance for `iat` claims in the future.
pub const DEFAULT_JWT_CLOCK_SKEW_SECONDS: i64 = 0;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

pub const DEFAULT_SECRETS_FOLDER: &str = "./secrets/";

/// Default delay between a shutdown signal and closing the listener.
pub const DEFAULT_DRAIN_SECONDS: u64 = 0;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub signing_mode: SigningMode,
    /// HMAC secret used in shared-secret mode.
    pub app_secret: Option<SecretString>,
    /// Root directory key file paths are resolved against.
    pub secrets_folder: PathBuf,
    pub tokens: TokenFileConfig,
    pub token_expire_seconds: i64,
    pub token_renew_seconds: i64,
    pub timezone: AppTimezone,
    pub jwt_clock_skew_seconds: i64,
    /// Seconds to keep serving after SIGTERM/SIGINT.
    pub drain_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid signing mode: {0}")]
    InvalidSigningMode(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Invalid token windows: {0}")]
    InvalidTokenWindows(String),

    #[error("Invalid clock skew: {0}")]
    InvalidClockSkew(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Failed to read token configuration file {path}: {reason}")]
    TokenFile { path: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let signing_mode = parse_signing_mode(vars)?;

        let app_secret = vars
            .get("JWT_APP_SECRET")
            .filter(|s| !s.is_empty())
            .map(|s| SecretString::from(s.clone()));

        if signing_mode == SigningMode::SharedSecret && app_secret.is_none() {
            return Err(ConfigError::MissingEnvVar("JWT_APP_SECRET".to_string()));
        }

        let secrets_folder = PathBuf::from(
            vars.get("SECRETS_FOLDER")
                .cloned()
                .unwrap_or_else(|| DEFAULT_SECRETS_FOLDER.to_string()),
        );

        let tokens = match vars.get("TOKEN_CONFIG_FILE").filter(|p| !p.is_empty()) {
            Some(path) => load_token_file(path)?,
            None => TokenFileConfig::default(),
        };

        let token_expire_seconds =
            parse_i64(vars, "TOKEN_EXPIRE_SECONDS", DEFAULT_TOKEN_EXPIRE_SECONDS)?;
        let token_renew_seconds =
            parse_i64(vars, "TOKEN_RENEW_SECONDS", DEFAULT_TOKEN_RENEW_SECONDS)?;

        if !(1..=MAX_TOKEN_EXPIRE_SECONDS).contains(&token_expire_seconds) {
            return Err(ConfigError::InvalidTokenWindows(format!(
                "TOKEN_EXPIRE_SECONDS must be in 1..={MAX_TOKEN_EXPIRE_SECONDS}, got {token_expire_seconds}"
            )));
        }

        if token_renew_seconds < 0 || token_renew_seconds >= token_expire_seconds {
            return Err(ConfigError::InvalidTokenWindows(format!(
                "TOKEN_RENEW_SECONDS must be in 0..{token_expire_seconds}, got {token_renew_seconds}"
            )));
        }

        let timezone = match vars.get("APP_TIMEZONE") {
            Some(value) => parse_timezone(value)?,
            None => AppTimezone::default(),
        };

        let jwt_clock_skew_seconds = parse_i64(
            vars,
            "JWT_CLOCK_SKEW_SECONDS",
            DEFAULT_JWT_CLOCK_SKEW_SECONDS,
        )?;

        #[allow(clippy::cast_possible_wrap)]
        let max_skew = MAX_CLOCK_SKEW.as_secs() as i64;
        if !(0..=max_skew).contains(&jwt_clock_skew_seconds) {
            return Err(ConfigError::InvalidClockSkew(format!(
                "JWT_CLOCK_SKEW_SECONDS must be in 0..={max_skew}, got {jwt_clock_skew_seconds}"
            )));
        }

        let drain_seconds = match vars.get("TA_DRAIN_SECONDS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "TA_DRAIN_SECONDS".to_string(),
                    reason: e.to_string(),
                })?,
            None => DEFAULT_DRAIN_SECONDS,
        };

        Ok(Config {
            bind_address,
            signing_mode,
            app_secret,
            secrets_folder,
            tokens,
            token_expire_seconds,
            token_renew_seconds,
            timezone,
            jwt_clock_skew_seconds,
            drain_seconds,
        })
    }
}

fn parse_signing_mode(vars: &HashMap<String, String>) -> Result<SigningMode, ConfigError> {
    if let Some(mode) = vars.get("SIGNING_MODE") {
        return match mode.trim().to_ascii_lowercase().as_str() {
            "shared_secret" | "secret" => Ok(SigningMode::SharedSecret),
            "certificate" | "pem" => Ok(SigningMode::Certificate),
            other => Err(ConfigError::InvalidSigningMode(other.to_string())),
        };
    }

    // Legacy boolean switch
    let use_pem = vars
        .get("SHOULD_USE_PEM_TO_SIGN_JWT")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false);

    Ok(if use_pem {
        SigningMode::Certificate
    } else {
        SigningMode::SharedSecret
    })
}

fn parse_i64(vars: &HashMap<String, String>, name: &str, default: i64) -> Result<i64, ConfigError> {
    match vars.get(name) {
        Some(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidValue {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(default),
    }
}

/// Parse `UTC`, `Z`, an IANA zone name such as `America/Sao_Paulo`, or a
/// fixed `±HH:MM` offset.
pub fn parse_timezone(value: &str) -> Result<AppTimezone, ConfigError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
        return Ok(AppTimezone::default());
    }

    match trimmed.chars().next() {
        Some('+') | Some('-') => parse_fixed_offset(trimmed).map(AppTimezone::Fixed),
        _ => trimmed
            .parse::<Tz>()
            .map(AppTimezone::Named)
            .map_err(|_| ConfigError::InvalidTimezone(trimmed.to_string())),
    }
}

fn parse_fixed_offset(trimmed: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = || ConfigError::InvalidTimezone(trimmed.to_string());

    let (sign, rest) = match trimmed.chars().next() {
        Some('+') => (1, trimmed.get(1..).ok_or_else(invalid)?),
        Some('-') => (-1, trimmed.get(1..).ok_or_else(invalid)?),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let two_digits = |v: &str| v.len() == 2 && v.chars().all(|c| c.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return Err(invalid());
    }
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

fn load_token_file(path: &str) -> Result<TokenFileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TokenFile {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| ConfigError::TokenFile {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
