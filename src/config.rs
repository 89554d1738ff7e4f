use anyhow::Context;

/// Upper bound on `JWT_TTL_HOURS` (one year).
pub const MAX_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let var_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let database_url = match var("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                var_or("DB_USER", "postgres"),
                var_or("DB_PASSWORD", "password"),
                var_or("DB_HOST", "localhost"),
                var_or("DB_PORT", "5432"),
                var_or("DB_NAME", "budget_tracker"),
            ),
        };

        // No fallback key: a missing secret must stop the process.
        let secret = var("JWT_SECRET").context("JWT_SECRET must be set to a non-empty value")?;

        let jwt = JwtConfig {
            secret,
            ttl_hours: var("JWT_TTL_HOURS")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|h| (1..=MAX_TTL_HOURS).contains(h))
                .unwrap_or(24),
        };

        Ok(Self {
            database_url,
            max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            host: var_or("APP_HOST", "0.0.0.0"),
            port: var("APP_PORT")
                .or_else(|| var("PORT"))
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            jwt,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
