//! Layered configuration: built-in defaults, then `stride.toml` in the
//! working directory, then `STRIDE_*` environment variables. `DATABASE_URL`
//! is honoured on its own since sqlx tooling already expects it.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrideConfig {
    pub database_url: Option<String>,
    pub default_target: u32,
    pub holidays_csv: Option<PathBuf>,
    pub cache_ttl_secs: u64,
    pub report_limit: usize,
}

impl Default for StrideConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            default_target: 75,
            holidays_csv: None,
            cache_ttl_secs: 300,
            report_limit: 50,
        }
    }
}

impl StrideConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file("stride.toml"))
            .merge(Env::prefixed("STRIDE_"))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.default_target) {
            return Err(ConfigError::InvalidValue {
                field: "default_target".to_string(),
                reason: format!("{} is outside 1..=100", self.default_target),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_apply_without_sources() {
        Jail::expect_with(|_jail| {
            let config: StrideConfig = StrideConfig::figment().extract()?;
            assert_eq!(config.default_target, 75);
            assert_eq!(config.cache_ttl_secs, 300);
            assert!(config.database_url.is_none());
            Ok(())
        });
    }

    #[test]
    fn toml_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "stride.toml",
                r#"
                default_target = 80
                holidays_csv = "holidays.csv"
                "#,
            )?;
            jail.set_env("STRIDE_DEFAULT_TARGET", "85");
            jail.set_env("DATABASE_URL", "postgres://localhost/stride");

            let config: StrideConfig = StrideConfig::figment().extract()?;
            assert_eq!(config.default_target, 85);
            assert_eq!(config.holidays_csv, Some(PathBuf::from("holidays.csv")));
            assert_eq!(
                config.database_url.as_deref(),
                Some("postgres://localhost/stride")
            );
            Ok(())
        });
    }

    #[test]
    fn out_of_range_target_is_rejected() {
        let config = StrideConfig {
            default_target: 0,
            ..StrideConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
