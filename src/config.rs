//! Configuration types for memcentral-migrate.

use serde::{Deserialize, Serialize};

/// Main migration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Source Redis URL (redis://host:port or rediss://... for TLS).
    pub source_url: String,
    /// Destination Memory Server base URL (http://host:port).
    pub target_url: String,
    /// Migration options.
    #[serde(default)]
    pub options: MigrationOptions,
}

/// Migration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Keys requested per SCAN page. The store may return fewer or more.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Dry run mode (enumerate and count, never write).
    #[serde(default)]
    pub dry_run: bool,
    /// Skip the interactive confirmation prompt.
    #[serde(default)]
    pub assume_yes: bool,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            dry_run: false,
            assume_yes: false,
        }
    }
}

fn default_page_size() -> usize {
    100
}

impl MigrationConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL is empty or has an unsupported scheme.
    pub fn validate(&self) -> crate::error::Result<()> {
        validate_source_url(&self.source_url)?;
        validate_target_url(&self.target_url)?;
        if self.options.page_size == 0 {
            return Err(crate::error::Error::Config(
                "page_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Validates the source store URL scheme.
pub fn validate_source_url(url: &str) -> crate::error::Result<()> {
    if !url.starts_with("redis://") && !url.starts_with("rediss://") {
        return Err(crate::error::Error::Config(format!(
            "Invalid source URL scheme in '{url}'. Allowed: redis, rediss"
        )));
    }
    if url.len() < 10 || !url.contains("://") {
        return Err(crate::error::Error::Config(format!(
            "Invalid source URL format: {url}"
        )));
    }
    Ok(())
}

/// Validates the destination API base URL scheme.
pub fn validate_target_url(url: &str) -> crate::error::Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(crate::error::Error::Config(format!(
            "Invalid target URL scheme in '{url}'. Allowed: http, https"
        )));
    }
    if url.len() < 10 || !url.contains("://") {
        return Err(crate::error::Error::Config(format!(
            "Invalid target URL format: {url}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> MigrationConfig {
        MigrationConfig {
            source_url: "redis://localhost:16379".to_string(),
            target_url: "http://localhost:8000".to_string(),
            options: MigrationOptions::default(),
        }
    }

    #[test]
    fn test_options_defaults() {
        let options = MigrationOptions::default();
        assert_eq!(options.page_size, 100);
        assert!(!options.dry_run);
        assert!(!options.assume_yes);
    }

    #[test]
    fn test_validate_ok() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_source_scheme() {
        let mut config = test_config();
        config.source_url = "http://localhost:16379".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_target_scheme() {
        let mut config = test_config();
        config.target_url = "redis://localhost:8000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = test_config();
        config.options.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_tls_schemes() {
        assert!(validate_source_url("rediss://cloud.redis.io:6380").is_ok());
        assert!(validate_target_url("https://memory.example.com").is_ok());
    }
}
