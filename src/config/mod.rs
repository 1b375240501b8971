use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub coupons: CouponConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CouponConfig {
    /// Default page size for coupon listings
    pub per_page: i64,
}

impl Default for CouponConfig {
    fn default() -> Self {
        Self { per_page: 20 }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("database.url", "sqlite://coupons.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("coupons.per_page", 20)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with COUPONS__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("COUPONS").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://coupons.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            coupons: CouponConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.coupons.per_page, 20);
        assert!(settings.database.url.starts_with("sqlite:"));
    }
}
