//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `UPRELAY_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `UPRELAY_` override YAML values
//! 3. **GITHUB_TOKEN / GITHUB_USERNAME** - Special case: override `store.token` and
//!    `store.account` if set, so the relay can run with just the two secrets exported
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `UPRELAY_STORE__REPOSITORY=assets` sets the `store.repository` field.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! UPRELAY_PORT=8080
//!
//! # Remote store secrets (preferred method)
//! GITHUB_TOKEN="ghp_..."
//! GITHUB_USERNAME="my-account"
//!
//! # Override nested values
//! UPRELAY_STORE__REQUEST_TIMEOUT=10s
//! UPRELAY_PUBLIC_BASE_URL="https://static.example.org"
//! ```

use clap::Parser;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "UPRELAY_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Base URL where uploaded files become publicly reachable; the upload
    /// response URL is `{public_base_url}/{brandName}/{fileName}`
    pub public_base_url: Url,
    /// Convenience: remote store access token via GITHUB_TOKEN.
    /// Promoted into `store.token` during load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    /// Convenience: remote store account identifier via GITHUB_USERNAME.
    /// Promoted into `store.account` during load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,
    /// Remote object store (GitHub contents API) configuration
    pub store: StoreConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

/// Remote object store configuration.
///
/// The relay writes to a fixed repository under the configured account using
/// the GitHub contents API. The token and account identifier are the two
/// process-scoped secrets; when either is missing the relay starts anyway and
/// every upload request fails with a configuration error.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Base URL of the remote store API
    pub api_base: Url,
    /// Access token for the remote store (usually via GITHUB_TOKEN)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Account identifier owning the destination repository (usually via GITHUB_USERNAME)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// Fixed destination repository name
    pub repository: String,
    /// Client identifier sent as the User-Agent header on every store request
    pub user_agent: String,
    /// Timeout for each outbound store request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse("https://api.github.com").unwrap(),
            token: None,
            account: None,
            repository: "static".to_string(),
            user_agent: "StaticMediaUploader".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            // The relay is meant to be called from arbitrary brand frontends
            allowed_origins: vec![CorsOrigin::Wildcard],
            max_age: Some(3600),
        }
    }
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_base_url: Url::parse("https://static.thegreekdirectory.org").unwrap(),
            github_token: None,
            github_username: None,
            store: StoreConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // The bare GITHUB_* variables win over anything in the store section,
        // so a deployment can rotate secrets without touching the config file.
        if let Some(token) = config.github_token.take() {
            config.store.token = Some(token);
        }
        if let Some(account) = config.github_username.take() {
            config.store.account = Some(account);
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values.
            // UPRELAY_CONFIG selects the file itself (handled by Args) and
            // must not reach the deny_unknown_fields deserializer.
            .merge(Env::prefixed("UPRELAY_").ignore(&["CONFIG"]).split("__"))
            // Common GITHUB_TOKEN / GITHUB_USERNAME secret patterns
            .merge(Env::raw().only(&["GITHUB_TOKEN", "GITHUB_USERNAME"]))
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.store.repository.is_empty() {
            anyhow::bail!("Config validation: store.repository cannot be empty");
        }

        if self.store.user_agent.is_empty() {
            anyhow::bail!("Config validation: store.user_agent cannot be empty");
        }

        if self.store.request_timeout.is_zero() {
            anyhow::bail!("Config validation: store.request_timeout must be positive (default: 30s)");
        }

        if self.cors.allowed_origins.is_empty() {
            anyhow::bail!("Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.");
        }

        for url in [&self.public_base_url, &self.store.api_base] {
            if !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!("Config validation: {} must be an http(s) URL", url);
            }
        }

        Ok(())
    }

    /// Whether both remote store secrets are present
    pub fn store_configured(&self) -> bool {
        self.store.token.is_some() && self.store.account.is_some()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.public_base_url.as_str(), "https://static.thegreekdirectory.org/");
        assert_eq!(config.store.api_base.as_str(), "https://api.github.com/");
        assert_eq!(config.store.repository, "static");
        assert_eq!(config.store.user_agent, "StaticMediaUploader");
        assert_eq!(config.store.request_timeout, Duration::from_secs(30));
        assert!(!config.store_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
public_base_url: https://static.example.org
"#,
            )?;

            jail.set_env("UPRELAY_HOST", "127.0.0.1");
            jail.set_env("UPRELAY_PORT", "9090");
            jail.set_env("UPRELAY_STORE__REPOSITORY", "assets");

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            // Env vars should override
            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 9090);
            assert_eq!(config.store.repository, "assets");

            // YAML values should be preserved
            assert_eq!(config.public_base_url.as_str(), "https://static.example.org/");

            Ok(())
        });
    }

    #[test]
    fn test_github_secrets_promoted_into_store() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "host: 0.0.0.0\n")?;

            jail.set_env("GITHUB_TOKEN", "ghp_test");
            jail.set_env("GITHUB_USERNAME", "acme-hosting");

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            assert!(config.store_configured());
            assert_eq!(config.store.token.as_deref(), Some("ghp_test"));
            assert_eq!(config.store.account.as_deref(), Some("acme-hosting"));
            // Promoted fields are consumed, not left dangling at the top level
            assert!(config.github_token.is_none());
            assert!(config.github_username.is_none());

            Ok(())
        });
    }

    #[test]
    fn test_github_env_wins_over_store_section() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
store:
  token: from-yaml
  account: yaml-account
"#,
            )?;

            jail.set_env("GITHUB_TOKEN", "from-env");

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            assert_eq!(config.store.token.as_deref(), Some("from-env"));
            assert_eq!(config.store.account.as_deref(), Some("yaml-account"));

            Ok(())
        });
    }

    #[test]
    fn test_config_path_env_var_is_not_an_unknown_field() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.yaml", "port: 9191\n")?;

            // Selects the config file; must not leak into the Config fields
            jail.set_env("UPRELAY_CONFIG", "custom.yaml");

            let args = Args {
                config: "custom.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;
            assert_eq!(config.port, 9191);

            Ok(())
        });
    }

    #[test]
    fn test_missing_secrets_is_not_a_load_error() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "host: 0.0.0.0\n")?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            // Loading succeeds - the missing secrets only fail requests at runtime
            let config = Config::load(&args)?;
            assert!(!config.store_configured());

            Ok(())
        });
    }

    #[test]
    fn test_validation_rejects_empty_repository() {
        let mut config = Config::default();
        config.store.repository = String::new();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("repository"));
    }

    #[test]
    fn test_validation_rejects_empty_cors_origins() {
        let mut config = Config::default();
        config.cors.allowed_origins = vec![];

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("allowed_origins"));
    }

    #[test]
    fn test_request_timeout_humantime_format() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
store:
  request_timeout: 10s
"#,
            )?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;
            assert_eq!(config.store.request_timeout, Duration::from_secs(10));

            Ok(())
        });
    }
}
