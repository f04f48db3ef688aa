//! Configuration file and environment support.
//!
//! Configuration is loaded with the following precedence (highest to
//! lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `GROUP_ACCESS_`, e.g.
//!    `GROUP_ACCESS_GITLAB_TOKEN`)
//! 3. Local config file (./group-access-tool.toml)
//! 4. XDG config file (~/.config/group-access-tool/config.toml)
//! 5. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [gitlab]
//! uri = "https://gitlab.example.com"  # default: https://gitlab.com
//! token = "glpat-..."                 # or use GROUP_ACCESS_GITLAB_TOKEN
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Host URI used when neither flag, environment nor config file name one.
pub const DEFAULT_URI: &str = "https://gitlab.com";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitLab configuration.
    pub gitlab: GitLabConfig,
}

/// GitLab configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitLabConfig {
    /// GitLab host URI (e.g., "https://gitlab.example.com").
    /// Can also be set via GROUP_ACCESS_GITLAB_URI.
    pub uri: Option<String>,
    /// GitLab API token (personal access token).
    /// Can also be set via GROUP_ACCESS_GITLAB_TOKEN.
    pub token: Option<String>,
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        // XDG config file, if present
        if let Some(proj_dirs) = ProjectDirs::from("", "", "group-access-tool") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        // Local config file (higher priority than XDG)
        let local_config = PathBuf::from("group-access-tool.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./group-access-tool.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // GROUP_ACCESS_ prefixed environment variables,
        // e.g. GROUP_ACCESS_GITLAB_URI -> gitlab.uri
        builder = builder.add_source(
            Environment::with_prefix("GROUP_ACCESS")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Resolve the host URI: CLI flag, then environment/config file, then
    /// the default.
    pub fn gitlab_uri(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.gitlab.uri.clone())
            .unwrap_or_else(|| DEFAULT_URI.to_string())
    }

    /// Resolve the access token: CLI flag, then environment/config file.
    /// `None` means anonymous access.
    pub fn gitlab_token(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.gitlab.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_overrides_config() {
        let config = Config {
            gitlab: GitLabConfig {
                uri: Some("https://gitlab.example.com".to_string()),
                token: Some("from-config".to_string()),
            },
        };

        assert_eq!(
            config.gitlab_uri(Some("https://other.example.com".to_string())),
            "https://other.example.com"
        );
        assert_eq!(
            config.gitlab_token(Some("from-flag".to_string())),
            Some("from-flag".to_string())
        );
    }

    #[test]
    fn test_config_value_used_without_flag() {
        let config = Config {
            gitlab: GitLabConfig {
                uri: Some("https://gitlab.example.com".to_string()),
                token: None,
            },
        };

        assert_eq!(config.gitlab_uri(None), "https://gitlab.example.com");
        assert_eq!(config.gitlab_token(None), None);
    }

    #[test]
    fn test_default_uri() {
        let config = Config::default();
        assert_eq!(config.gitlab_uri(None), DEFAULT_URI);
    }
}
