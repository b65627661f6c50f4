//! Client configuration: credentials, environment selection and transport settings.
//!
//! The client never reads configuration on its own. Embedding applications
//! either build a [`ClientConfig`] explicitly, deserialize it from their own
//! config files, or use [`ClientConfig::from_env`].

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::environment::Environment;
use crate::error::{ClientError, ClientResult};

pub const USERNAME_VAR: &str = "PWNHEALTH_USERNAME";
pub const PASSWORD_VAR: &str = "PWNHEALTH_PASSWORD";
pub const ENVIRONMENT_VAR: &str = "PWNHEALTH_ENVIRONMENT";
pub const TIMEOUT_SECS_VAR: &str = "PWNHEALTH_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP Basic credentials for the remote API.
///
/// The password is held as a [`SecretString`]: it is redacted from `Debug`
/// output and only exposed when the Authorization header is built.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(deserialize_with = "deserialize_secret")]
    password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// The password, still wrapped. Only the transport exposes it.
    #[must_use]
    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

/// Configuration for [`crate::LabOrderClient`]
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use pwnhealth_client::{ClientConfig, Credentials, Environment};
///
/// let config = ClientConfig::production(Credentials::new("api-user", "api-pass"))
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(config.environment, Environment::Production);
/// assert_eq!(config.resolved_base_url(), "https://api16.pwnhealth.com/");
/// ```
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default)]
    pub environment: Environment,
    /// Per-request timeout. Expiry surfaces as a transport timeout.
    #[serde(
        rename = "timeout_secs",
        default = "default_timeout",
        deserialize_with = "deserialize_secs"
    )]
    pub timeout: Duration,
    /// Replaces the environment's endpoint (sandboxes, mock servers).
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ClientConfig {
    #[must_use]
    pub fn new(credentials: Credentials, environment: Environment) -> Self {
        Self {
            credentials,
            environment,
            timeout: DEFAULT_TIMEOUT,
            base_url: None,
        }
    }

    #[must_use]
    pub fn staging(credentials: Credentials) -> Self {
        Self::new(credentials, Environment::Staging)
    }

    #[must_use]
    pub fn production(credentials: Credentials) -> Self {
        Self::new(credentials, Environment::Production)
    }

    /// Set a custom request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send requests to `base_url` instead of the environment's endpoint
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// The endpoint requests will be issued against.
    #[must_use]
    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
    }

    /// Create configuration from environment variables
    ///
    /// Expects:
    /// - `PWNHEALTH_USERNAME`: API username (required)
    /// - `PWNHEALTH_PASSWORD`: API password (required)
    /// - `PWNHEALTH_ENVIRONMENT`: `production` or `staging` (default: `staging`)
    /// - `PWNHEALTH_TIMEOUT_SECS`: request timeout in seconds (default: 30)
    ///
    /// # Errors
    /// Returns `ClientError::Configuration` when a required variable is missing
    /// or a value cannot be parsed.
    pub fn from_env() -> ClientResult<Self> {
        let username = required_var(USERNAME_VAR)?;
        let password = required_var(PASSWORD_VAR)?;

        let environment = match std::env::var(ENVIRONMENT_VAR) {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => Environment::default(),
        };

        let mut config = Self::new(Credentials::new(username, password), environment);

        if let Ok(value) = std::env::var(TIMEOUT_SECS_VAR) {
            let secs: u64 = value.trim().parse().map_err(|e| {
                ClientError::configuration(format!("{TIMEOUT_SECS_VAR} must be whole seconds: {e}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

fn required_var(name: &str) -> ClientResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ClientError::configuration(format!("{name} not set"))),
    }
}

const fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

fn deserialize_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("user", "pass")
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::staging(credentials());
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(
            config.resolved_base_url(),
            "https://api16-staging.pwnhealth.com/"
        );
    }

    #[test]
    fn test_config_with_timeout_and_base_url() {
        let config = ClientConfig::production(credentials())
            .with_timeout(Duration::from_secs(5))
            .with_base_url("http://127.0.0.1:9999");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.resolved_base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ClientConfig::staging(Credentials::new("user", "hunter2"));
        let rendered = format!("{config:?}");
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_deserialize_from_host_config() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"username": "lab", "password": "secret", "environment": "production", "timeout_secs": 12}"#,
        )
        .unwrap();
        assert_eq!(config.credentials.username, "lab");
        assert_eq!(config.credentials.password().expose_secret(), "secret");
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_deserialize_defaults_to_staging() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"username": "lab", "password": "secret"}"#).unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                (USERNAME_VAR, Some("env-user")),
                (PASSWORD_VAR, Some("env-pass")),
                (ENVIRONMENT_VAR, Some("production")),
                (TIMEOUT_SECS_VAR, Some("7")),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.credentials.username, "env-user");
                assert_eq!(config.credentials.password().expose_secret(), "env-pass");
                assert_eq!(config.environment, Environment::Production);
                assert_eq!(config.timeout, Duration::from_secs(7));
            },
        );
    }

    #[test]
    fn test_from_env_defaults_environment() {
        temp_env::with_vars(
            [
                (USERNAME_VAR, Some("env-user")),
                (PASSWORD_VAR, Some("env-pass")),
                (ENVIRONMENT_VAR, None),
                (TIMEOUT_SECS_VAR, None),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.environment, Environment::Staging);
                assert_eq!(config.timeout, Duration::from_secs(30));
            },
        );
    }

    #[test]
    fn test_from_env_missing_password() {
        temp_env::with_vars(
            [
                (USERNAME_VAR, Some("env-user")),
                (PASSWORD_VAR, None::<&str>),
            ],
            || {
                let err = ClientConfig::from_env().unwrap_err();
                assert!(matches!(err, ClientError::Configuration(ref m) if m.contains(PASSWORD_VAR)));
            },
        );
    }

    #[test]
    fn test_from_env_rejects_bad_timeout() {
        temp_env::with_vars(
            [
                (USERNAME_VAR, Some("env-user")),
                (PASSWORD_VAR, Some("env-pass")),
                (ENVIRONMENT_VAR, None),
                (TIMEOUT_SECS_VAR, Some("soon")),
            ],
            || {
                assert!(matches!(
                    ClientConfig::from_env(),
                    Err(ClientError::Configuration(_))
                ));
            },
        );
    }
}
