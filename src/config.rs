//! Process configuration, read once from the environment at startup.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_QUESTIONS_PATH: &str = "data/questions.json";
pub const DEFAULT_STATE_PATH: &str = "data/db.json";
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Static question bank (JSON)
    pub questions_path: PathBuf,
    /// Persisted game snapshot (JSON)
    pub state_path: PathBuf,
    /// Frontend build served for every non-API path
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            questions_path: DEFAULT_QUESTIONS_PATH.into(),
            state_path: DEFAULT_STATE_PATH.into(),
            static_dir: DEFAULT_STATIC_DIR.into(),
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables:
    /// - PORT
    /// - OLYMPIA_QUESTIONS_PATH
    /// - OLYMPIA_STATE_PATH
    /// - OLYMPIA_STATIC_DIR
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = match env_value("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Invalid PORT {:?}, using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        Self {
            port,
            questions_path: env_value("OLYMPIA_QUESTIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.questions_path),
            state_path: env_value("OLYMPIA_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_path),
            static_dir: env_value("OLYMPIA_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        }
    }
}

/// Trimmed, non-empty environment value
fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 4] = [
        "PORT",
        "OLYMPIA_QUESTIONS_PATH",
        "OLYMPIA_STATE_PATH",
        "OLYMPIA_STATIC_DIR",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        assert_eq!(ServerConfig::from_env(), ServerConfig::default());
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("PORT", "8080");
        std::env::set_var("OLYMPIA_QUESTIONS_PATH", "/srv/show/questions.json");
        std::env::set_var("OLYMPIA_STATE_PATH", " /var/lib/olympia/db.json ");

        let config = ServerConfig::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.questions_path,
            PathBuf::from("/srv/show/questions.json")
        );
        assert_eq!(config.state_path, PathBuf::from("/var/lib/olympia/db.json"));
        assert_eq!(config.static_dir, PathBuf::from(DEFAULT_STATIC_DIR));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_or_blank_values_fall_back() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("OLYMPIA_STATE_PATH", "   ");

        let config = ServerConfig::from_env();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.state_path, PathBuf::from(DEFAULT_STATE_PATH));
        clear_env();
    }
}
