use std::env;

/// Longest accepted session lifetime; larger values fall back to the default.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    /// In-memory repositories are used when this is unset.
    pub database_url: Option<String>,
    /// Connection tries at start-up before giving up on the database.
    pub db_connect_attempts: u32,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub default_locale: String,
    pub supported_locales: Vec<String>,
    pub static_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            database_url: None,
            db_connect_attempts: 5,
            jwt_secret: "dev-secret-change-in-production".to_string(),
            session_ttl_hours: 24,
            default_locale: "en".to_string(),
            supported_locales: ["en", "fr", "de", "es", "ru"]
                .iter()
                .map(|l| l.to_string())
                .collect(),
            static_dir: "static".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let supported_locales = env::var("SUPPORTED_LOCALES")
            .map(|raw| parse_locales(&raw))
            .ok()
            .filter(|locales| !locales.is_empty())
            .unwrap_or(defaults.supported_locales);

        let default_locale = env::var("DEFAULT_LOCALE")
            .map(|l| l.trim().to_lowercase())
            .ok()
            .filter(|l| supported_locales.contains(l))
            .unwrap_or_else(|| supported_locales[0].clone());

        Self {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("PORT")
                .or_else(|_| env::var("SERVER_PORT"))
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.server_port),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            db_connect_attempts: env::var("DB_CONNECT_ATTEMPTS")
                .ok()
                .and_then(|a| a.trim().parse().ok())
                .filter(|a: &u32| *a > 0)
                .unwrap_or(defaults.db_connect_attempts),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|h| parse_ttl_hours(&h))
                .unwrap_or(defaults.session_ttl_hours),
            default_locale,
            supported_locales,
            static_dir: env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn is_supported_locale(&self, locale: &str) -> bool {
        self.supported_locales.iter().any(|l| l == locale)
    }
}

fn parse_ttl_hours(raw: &str) -> Option<i64> {
    raw.trim()
        .parse()
        .ok()
        .filter(|h| (1..=MAX_SESSION_TTL_HOURS).contains(h))
}

fn parse_locales(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locales() {
        assert_eq!(parse_locales(" EN, fr,,de "), vec!["en", "fr", "de"]);
        assert!(parse_locales(" , ").is_empty());
    }

    #[test]
    fn test_session_ttl_bounds() {
        assert_eq!(parse_ttl_hours(" 48 "), Some(48));
        assert_eq!(parse_ttl_hours("8760"), Some(MAX_SESSION_TTL_HOURS));
        assert_eq!(parse_ttl_hours("8761"), None);
        assert_eq!(parse_ttl_hours("1000000000000"), None);
        assert_eq!(parse_ttl_hours("0"), None);
        assert_eq!(parse_ttl_hours("-5"), None);
        assert_eq!(parse_ttl_hours("day"), None);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server_address(), "0.0.0.0:5000");
        assert!(config.is_supported_locale("fr"));
        assert!(!config.is_supported_locale("xx"));
        assert!(config.database_url.is_none());
        assert_eq!(config.db_connect_attempts, 5);
    }
}
