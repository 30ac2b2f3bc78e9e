//! Layered configuration
//!
//! Configuration merges three layers, later ones winning: built-in
//! defaults, a `config.toml` in the working directory, and environment
//! variables prefixed `RESTKIT_` (nested keys separated with `__`, e.g.
//! `RESTKIT_SERVICE__PORT=9090`).
//!
//! # Example
//!
//! ```rust,no_run
//! use restkit::config::Config;
//!
//! let config = Config::load().expect("valid configuration");
//! config.install();
//! println!("listening on port {}", config.service.port);
//! ```

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::problem::ProblemOptions;

/// Service identity and runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub port: u16,
    pub log_level: String,
    /// Deployment environment. `dev` and `test` enable verbose problem
    /// responses.
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "restkit-service".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            environment: "prod".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Whether internal failure details may be surfaced to clients.
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        matches!(self.environment.as_str(), "dev" | "test")
    }
}

/// API rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Namespace prefix applied to every error code.
    pub error_prefix: String,
    /// Page size when `page` is given without `limit`.
    pub default_per_page: u64,
    /// Separator joining flattened form-error key segments.
    pub flatten_separator: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            error_prefix: "error.".to_string(),
            default_per_page: 10,
            flatten_separator: "_".to_string(),
        }
    }
}

/// Database pool settings, used when the `database` feature is enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connection_timeout_secs: 30,
            max_retries: 3,
            retry_delay_secs: 2,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

impl Config {
    /// Load configuration: defaults, then `config.toml`, then `RESTKIT_`
    /// environment variables.
    pub fn load() -> Result<Self> {
        Ok(Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("RESTKIT_").split("__"))
            .extract()?)
    }

    /// Problem-rendering options derived from this configuration, ready
    /// for [`crate::problem::install`].
    #[must_use]
    pub fn problem_options(&self) -> ProblemOptions {
        ProblemOptions {
            verbose: self.service.is_verbose(),
            prefix: self.api.error_prefix.clone(),
        }
    }

    /// Install every runtime setting this configuration carries: problem
    /// rendering options, the default page size, and the form-error
    /// flatten separator. Call once at startup; later calls are ignored.
    pub fn install(&self) {
        crate::problem::install(self.problem_options());
        crate::criteria::install_default_per_page(self.api.default_per_page);
        crate::resource::install_flatten_separator(self.api.flatten_separator.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.api.error_prefix, "error.");
        assert_eq!(config.api.default_per_page, 10);
        assert!(config.database.is_none());
        assert!(!config.service.is_verbose());
    }

    #[test]
    fn test_dev_and_test_environments_are_verbose() {
        for env in ["dev", "test"] {
            let service = ServiceConfig {
                environment: env.to_string(),
                ..ServiceConfig::default()
            };
            assert!(service.is_verbose(), "{env} should be verbose");
        }
    }

    #[test]
    fn test_problem_options_follow_environment() {
        let mut config = Config::default();
        config.service.environment = "dev".to_string();
        config.api.error_prefix = "api.".to_string();

        let opts = config.problem_options();
        assert!(opts.verbose);
        assert_eq!(opts.prefix, "api.");
    }

    #[test]
    fn test_env_layer_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("RESTKIT_SERVICE__PORT", "9090");
            jail.set_env("RESTKIT_SERVICE__ENVIRONMENT", "test");
            let config: Config = Figment::from(Serialized::defaults(Config::default()))
                .merge(Env::prefixed("RESTKIT_").split("__"))
                .extract()?;
            assert_eq!(config.service.port, 9090);
            assert!(config.service.is_verbose());
            Ok(())
        });
    }
}
