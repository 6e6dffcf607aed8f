use kanary_core::error::{ApiError, Result};

/// Runtime settings, environment-sourced and immutable after startup.
#[derive(Debug, Clone)]
pub struct Settings {
    // Application
    pub app_name: String,
    pub app_env: String,
    pub debug: bool,
    pub port: u16,
    pub log_level: String,

    // Version identity
    pub version: String,
    pub build_number: Option<String>,
    pub git_commit: Option<String>,
    pub git_branch: Option<String>,

    // Feature flags
    pub enable_slow_endpoint: bool,
    pub slow_endpoint_delay: u64,
    /// Percentage of requests to fail (0-100).
    pub error_rate: f64,

    // Monitoring
    pub metrics_path: String,
}

impl Settings {
    /// Build settings from a key lookup, applying defaults and validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = Self {
            app_name: lookup("APP_NAME").unwrap_or_else(|| "kanary".to_string()),
            app_env: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            debug: parse_bool("DEBUG", lookup("DEBUG"), false)?,
            port: parse_num("PORT", lookup("PORT"), 8000)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            version: lookup("VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            build_number: lookup("BUILD_NUMBER"),
            git_commit: lookup("GIT_COMMIT"),
            git_branch: lookup("GIT_BRANCH"),
            enable_slow_endpoint: parse_bool(
                "ENABLE_SLOW_ENDPOINT",
                lookup("ENABLE_SLOW_ENDPOINT"),
                true,
            )?,
            slow_endpoint_delay: parse_num(
                "SLOW_ENDPOINT_DELAY",
                lookup("SLOW_ENDPOINT_DELAY"),
                5,
            )?,
            error_rate: parse_num("ERROR_RATE", lookup("ERROR_RATE"), 0.0)?,
            metrics_path: lookup("METRICS_PATH").unwrap_or_else(|| "/metrics".to_string()),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ApiError::Validation("PORT must be non-zero".into()));
        }
        if self.slow_endpoint_delay > 30 {
            return Err(ApiError::Validation(
                "SLOW_ENDPOINT_DELAY must be between 0 and 30".into(),
            ));
        }
        if !self.error_rate.is_finite() || !(0.0..=100.0).contains(&self.error_rate) {
            return Err(ApiError::Validation(
                "ERROR_RATE must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, raw: Option<String>, default: bool) -> Result<bool> {
    match raw.as_deref() {
        None => Ok(default),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ApiError::Validation(format!(
                "{key} must be a boolean, got {other:?}"
            ))),
        },
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ApiError::Validation(format!("{key} must be a number, got {v:?}"))),
    }
}
