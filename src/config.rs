use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expires_in_days: i64,
    /// Tax rate in basis points (1250 = 12.5%).
    pub tax_rate_bps: i64,
    /// Flat delivery fee in minor units, charged on delivery orders only.
    pub delivery_fee: i64,
    /// Return password reset tokens in the API response. There is no mail
    /// transport, so this is the only way to hand a token out.
    pub expose_reset_token: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 5000);
        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            jwt_expires_in_days: parse_or("JWT_EXPIRES_IN_DAYS", 7),
            tax_rate_bps: parse_or("TAX_RATE_BPS", 1250),
            delivery_fee: parse_or("DELIVERY_FEE", 500),
            expose_reset_token: parse_or("EXPOSE_RESET_TOKEN", false),
        })
    }

    /// Configuration for tests and tools that never read the environment.
    pub fn for_tests(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            jwt_expires_in_days: 7,
            tax_rate_bps: 1250,
            delivery_fee: 500,
            expose_reset_token: true,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
