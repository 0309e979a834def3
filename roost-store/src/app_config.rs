use chrono::NaiveTime;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// When absent, the service runs on the in-memory stores.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub booking_rules: BookingRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
}

fn default_jwt_secret() -> String {
    // Development fallback; deployments set ROOST__AUTH__JWT_SECRET.
    "roost-dev-secret".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
        }
    }
}

/// Tunable business rules for the booking lifecycle.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    /// Local time-of-day after which a same-day booking can no longer be
    /// cancelled.
    #[serde(default = "default_cancel_cutoff")]
    pub cancel_cutoff: NaiveTime,
    /// 0 = bookable through the end of the current month; each extra unit
    /// adds a whole month to the horizon.
    #[serde(default)]
    pub horizon_months: u32,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

fn default_cancel_cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 30, 0).expect("valid cutoff")
}

fn default_sweep_interval() -> u64 {
    // Hourly keeps the staleness window small without hammering the ledger;
    // the sweep is idempotent so the cadence is safe to tune freely.
    3600
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            cancel_cutoff: default_cancel_cutoff(),
            horizon_months: 0,
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Base configuration file, then the environment-specific file,
            // then a local override file (not checked in), all optional so a
            // bare binary starts with defaults.
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Settings from the environment (with a prefix of ROOST).
            // E.g. `ROOST__SERVER__PORT=9090` sets `server.port`.
            .add_source(config::Environment::with_prefix("ROOST").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_a_bare_deployment() {
        let rules = BookingRules::default();
        assert_eq!(rules.cancel_cutoff, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
        assert_eq!(rules.horizon_months, 0);
        assert_eq!(rules.sweep_interval_seconds, 3600);

        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert!(config.database.is_none());
    }

    #[test]
    fn cutoff_parses_from_config_notation() {
        #[derive(Deserialize)]
        struct Wrapper {
            cutoff: NaiveTime,
        }
        let parsed: Wrapper = serde_json::from_str(r#"{"cutoff": "09:45:00"}"#).unwrap();
        assert_eq!(parsed.cutoff, NaiveTime::from_hms_opt(9, 45, 0).unwrap());
    }
}
