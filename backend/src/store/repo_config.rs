//! Store configuration file support.
//!
//! This module provides utilities for reading store configuration from
//! TOML configuration files.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::RepositoryError;
use crate::store::SupabaseConfig;

/// Store configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub supabase: SupabaseSettings,
}

/// Store backend type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// Supabase project settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupabaseSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_schedule_table")]
    pub schedule_table: String,
    #[serde(default = "default_profile_table")]
    pub profile_table: String,
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

fn default_schedule_table() -> String {
    "schedule".to_string()
}

fn default_profile_table() -> String {
    "profile".to_string()
}

fn default_timeout_sec() -> u64 {
    30
}

impl RepositoryConfig {
    /// Load store configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: RepositoryConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load store configuration from the default location.
    ///
    /// Searches for `repository.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if found and parsed successfully
    /// * `Err(RepositoryError)` if no config file found or parse error
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = vec![
            PathBuf::from("repository.toml"),
            PathBuf::from("backend/repository.toml"),
            PathBuf::from("../repository.toml"),
            PathBuf::from("./repository.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No repository.toml found in standard locations",
        ))
    }

    /// Get the store backend type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Convert to SupabaseConfig if this is a Supabase configuration.
    #[cfg(feature = "supabase-repo")]
    pub fn to_supabase_config(&self) -> Result<Option<SupabaseConfig>, RepositoryError> {
        let repo_type = self
            .repository_type()
            .map_err(|e| RepositoryError::configuration(format!("Invalid repository type: {}", e)))?;

        if repo_type != RepositoryType::Supabase {
            return Ok(None);
        }

        if self.supabase.url.is_empty() {
            return Err(RepositoryError::configuration(
                "Supabase repository requires 'supabase.url' setting",
            ));
        }

        if self.supabase.api_key.is_empty() {
            return Err(RepositoryError::configuration(
                "Supabase repository requires 'supabase.api_key' setting",
            ));
        }

        Ok(Some(SupabaseConfig {
            url: self.supabase.url.clone(),
            api_key: self.supabase.api_key.clone(),
            schedule_table: self.supabase.schedule_table.clone(),
            profile_table: self.supabase.profile_table.clone(),
            timeout_sec: self.supabase.timeout_sec,
        }))
    }

    /// Convert to SupabaseConfig when the feature is disabled.
    #[cfg(not(feature = "supabase-repo"))]
    pub fn to_supabase_config(&self) -> Result<Option<SupabaseConfig>, RepositoryError> {
        let repo_type = self
            .repository_type()
            .map_err(|e| RepositoryError::configuration(format!("Invalid repository type: {}", e)))?;

        if repo_type == RepositoryType::Supabase {
            return Err(RepositoryError::configuration(
                "Supabase repository feature not enabled",
            ));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_config() {
        let toml = r#"
[repository]
type = "memory"
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.repository.repo_type, "memory");
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Memory);
    }

    #[cfg(feature = "supabase-repo")]
    #[test]
    fn test_parse_supabase_config() {
        let toml = r#"
[repository]
type = "supabase"

[supabase]
url = "https://abc.supabase.co"
api_key = "service-key"
schedule_table = "availability"
profile_table = "account"
timeout_sec = 15
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.repository.repo_type, "supabase");
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Supabase);

        let supabase_config = config.to_supabase_config().unwrap().unwrap();
        assert_eq!(supabase_config.url, "https://abc.supabase.co");
        assert_eq!(supabase_config.api_key, "service-key");
        assert_eq!(supabase_config.schedule_table, "availability");
        assert_eq!(supabase_config.profile_table, "account");
        assert_eq!(supabase_config.timeout_sec, 15);
    }

    #[cfg(feature = "supabase-repo")]
    #[test]
    fn test_supabase_table_names_default() {
        let toml = r#"
[repository]
type = "supabase"

[supabase]
url = "https://abc.supabase.co"
api_key = "service-key"
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        let supabase_config = config.to_supabase_config().unwrap().unwrap();
        assert_eq!(supabase_config.schedule_table, "schedule");
        assert_eq!(supabase_config.profile_table, "profile");
        assert_eq!(supabase_config.timeout_sec, 30);
    }

    #[cfg(feature = "supabase-repo")]
    #[test]
    fn test_supabase_requires_url_and_key() {
        let toml = r#"
[repository]
type = "supabase"

[supabase]
url = ""
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert!(config.to_supabase_config().is_err());

        let toml = r#"
[repository]
type = "supabase"

[supabase]
url = "https://abc.supabase.co"
api_key = ""
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert!(config.to_supabase_config().is_err());
    }

    #[test]
    fn test_memory_config_converts_to_none() {
        let toml = r#"
[repository]
type = "memory"
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert!(config.to_supabase_config().unwrap().is_none());
    }
}
