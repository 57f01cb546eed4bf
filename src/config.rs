use std::time::Duration;

// ============================================================================
// API Configuration
// ============================================================================
//
// Explicitly constructed and handed to the API client at construction time.
// `from_env` is a convenience for the runner; tests build configs directly.
//
// ============================================================================

const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Relative paths of every endpoint the harness talks to
#[derive(Debug, Clone, PartialEq)]
pub struct ApiPaths {
    pub create_customer: String,
    pub get_request: String,
    pub get_customer: String,
    pub browse_customer: String,
    pub update_customer: String,
    pub get_update_request: String,
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self {
            create_customer: "/customer".to_string(),
            get_request: "/get-request".to_string(),
            get_customer: "/get-customer".to_string(),
            browse_customer: "/browse-customer".to_string(),
            update_customer: "/customer".to_string(),
            get_update_request: "/get-update-request".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub paths: ApiPaths,
    /// Ceiling for create, update and browse calls
    pub submit_timeout: Duration,
    /// Ceiling for single status and customer lookups
    pub lookup_timeout: Duration,
}

// The API key stays out of logs and panics.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("paths", &self.paths)
            .field("submit_timeout", &self.submit_timeout)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish()
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            paths: ApiPaths::default(),
            submit_timeout: Duration::from_secs(DEFAULT_SUBMIT_TIMEOUT_SECS),
            lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
        }
    }

    pub fn with_paths(mut self, paths: ApiPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_timeouts(mut self, submit: Duration, lookup: Duration) -> Self {
        self.submit_timeout = submit;
        self.lookup_timeout = lookup;
        self
    }

    /// Same endpoints, different key. Used to exercise the 401/403 path.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine; variables may come from the shell.
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(error = %e, "No .env file loaded");
        }

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("AWS_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar("AWS_BASE_URL"))?;
        let api_key = lookup("AWS_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar("AWS_API_KEY"))?;

        let defaults = ApiPaths::default();
        let path = |name: &str, default: String| lookup(name).unwrap_or(default);
        let paths = ApiPaths {
            create_customer: path("AWS_PATH_CREATE_CUSTOMER", defaults.create_customer),
            get_request: path("AWS_PATH_GET_REQUEST", defaults.get_request),
            get_customer: path("AWS_PATH_GET_CUSTOMER", defaults.get_customer),
            browse_customer: path("AWS_PATH_BROWSE_CUSTOMER", defaults.browse_customer),
            update_customer: path("AWS_PATH_UPDATE_CUSTOMER", defaults.update_customer),
            get_update_request: path("AWS_PATH_GET_UPDATE_REQUEST", defaults.get_update_request),
        };

        let submit_timeout = parse_secs(
            &lookup,
            "AWS_SUBMIT_TIMEOUT_SECS",
            DEFAULT_SUBMIT_TIMEOUT_SECS,
        )?;
        let lookup_timeout = parse_secs(
            &lookup,
            "AWS_LOOKUP_TIMEOUT_SECS",
            DEFAULT_LOOKUP_TIMEOUT_SECS,
        )?;

        Ok(Self::new(base_url, api_key)
            .with_paths(paths)
            .with_timeouts(submit_timeout, lookup_timeout))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn parse_secs<F>(lookup: &F, name: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_lookup_uses_defaults() {
        let vars = source(&[
            ("AWS_BASE_URL", "https://api.example.com/"),
            ("AWS_API_KEY", "secret"),
        ]);

        let config = ApiConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.paths, ApiPaths::default());
        assert_eq!(config.submit_timeout, Duration::from_secs(60));
        assert_eq!(config.lookup_timeout, Duration::from_secs(30));
        assert_eq!(config.url("/customer"), "https://api.example.com/customer");
    }

    #[test]
    fn test_from_lookup_requires_api_key() {
        let vars = source(&[("AWS_BASE_URL", "https://api.example.com")]);

        let result = ApiConfig::from_lookup(|k| vars.get(k).cloned());
        assert!(matches!(result, Err(ConfigError::MissingVar("AWS_API_KEY"))));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars = source(&[
            ("AWS_BASE_URL", "http://localhost:8080"),
            ("AWS_API_KEY", "secret"),
            ("AWS_PATH_GET_REQUEST", "/v2/get-request"),
            ("AWS_LOOKUP_TIMEOUT_SECS", "5"),
        ]);

        let config = ApiConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.paths.get_request, "/v2/get-request");
        assert_eq!(config.paths.create_customer, "/customer");
        assert_eq!(config.lookup_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let vars = source(&[
            ("AWS_BASE_URL", "http://localhost:8080"),
            ("AWS_API_KEY", "secret"),
            ("AWS_SUBMIT_TIMEOUT_SECS", "soon"),
        ]);

        let result = ApiConfig::from_lookup(|k| vars.get(k).cloned());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "AWS_SUBMIT_TIMEOUT_SECS", .. })
        ));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ApiConfig::new("http://localhost", "top-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
