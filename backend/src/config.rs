use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Token lifetimes from one hour up to one year.
pub const JWT_TTL_HOURS_RANGE: RangeInclusive<i64> = 1..=24 * 365;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub ml_service_url: Option<String>,
    pub chatbot_service_url: String,
    pub upstream_timeout: Duration,
    pub catalog_path: Option<String>,
    pub allow_fallback_match: bool,
    pub assign_tiers: bool,
    pub predictor_seed: Option<u64>,
    pub users_table: Option<String>,
    pub min_password_length: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = optional("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            port: parse_or("PORT", 8081)?,
            jwt_secret,
            jwt_ttl_hours: within(
                "JWT_TTL_HOURS",
                parse_or("JWT_TTL_HOURS", 24 * 7)?,
                JWT_TTL_HOURS_RANGE,
            )?,
            ml_service_url: optional("ML_SERVICE_URL"),
            chatbot_service_url: optional("CHATBOT_API_URL")
                .unwrap_or_else(|| "http://localhost:8002".to_string()),
            upstream_timeout: Duration::from_secs(parse_or("UPSTREAM_TIMEOUT_SECS", 5)?),
            catalog_path: optional("COLLEGE_CATALOG_PATH"),
            allow_fallback_match: parse_or("ALLOW_FALLBACK_MATCH", true)?,
            assign_tiers: parse_or("ASSIGN_TIERS", false)?,
            predictor_seed: optional("PREDICTOR_SEED")
                .map(|raw| parse_value("PREDICTOR_SEED", &raw))
                .transpose()?,
            users_table: optional("DYNAMODB_USERS_TABLE"),
            min_password_length: parse_or("MIN_PASSWORD_LENGTH", 8)?,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match optional(key) {
        Some(raw) => parse_value(key, &raw),
        None => {
            log::debug!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: format!("{} ({})", raw, e),
    })
}

fn within<T>(key: &'static str, value: T, range: RangeInclusive<T>) -> Result<T, ConfigError>
where
    T: PartialOrd + Display,
{
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!(
                "{} is outside {}..={}",
                value,
                range.start(),
                range.end()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_reports_key_and_input() {
        let err = parse_value::<u16>("PORT", "eighty").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("PORT"));
        assert!(message.contains("eighty"));
    }

    #[test]
    fn parse_value_reads_booleans() {
        assert!(parse_value::<bool>("ALLOW_FALLBACK_MATCH", "true").unwrap());
        assert!(!parse_value::<bool>("ALLOW_FALLBACK_MATCH", "false").unwrap());
        assert!(parse_value::<bool>("ALLOW_FALLBACK_MATCH", "yes").is_err());
    }

    #[test]
    fn jwt_ttl_must_be_in_range() {
        assert_eq!(within("JWT_TTL_HOURS", 168, JWT_TTL_HOURS_RANGE).unwrap(), 168);
        assert_eq!(within("JWT_TTL_HOURS", 1, JWT_TTL_HOURS_RANGE).unwrap(), 1);
        for bad in [0, -5, 24 * 365 + 1, 10_000_000_000] {
            let err = within("JWT_TTL_HOURS", bad, JWT_TTL_HOURS_RANGE).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "JWT_TTL_HOURS", .. }));
        }
    }
}
