//! Store factory for dependency injection.
//!
//! This module provides utilities for creating and configuring store backend
//! instances based on runtime configuration.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
use super::repositories::MemoryRepository;
#[cfg(feature = "supabase-repo")]
use super::repositories::SupabaseRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use super::SupabaseConfig;

/// Store backend type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Hosted Supabase REST implementation
    Supabase,
    /// In-memory repository
    Memory,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse store backend type from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("supabase", "memory")
    ///
    /// # Returns
    /// * `Ok(RepositoryType)` if valid
    /// * `Err` if invalid
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "supabase" | "hosted" => Ok(Self::Supabase),
            "memory" | "local" => Ok(Self::Memory),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get store backend type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE` environment variable. Defaults to Supabase if
    /// a project URL is present, otherwise Memory.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Memory);
        }

        if std::env::var("SUPABASE_URL").is_ok() {
            Self::Supabase
        } else {
            Self::Memory
        }
    }
}

/// Factory for creating store backend instances.
///
/// This factory provides a centralized way to create backend instances
/// with proper initialization and configuration.
///
/// # Example
/// ```ignore
/// use meetly_rust::store::{RepositoryFactory, RepositoryType, SupabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Create hosted repository
///     let config = SupabaseConfig::from_env()?;
///     let _hosted = RepositoryFactory::create(RepositoryType::Supabase, Some(&config)).await?;
///
///     // Create in-memory repository
///     let memory = RepositoryFactory::create_memory();
///
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a store backend instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of backend to create
    /// * `supabase_config` - Optional project configuration (required for Supabase)
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullRepository>)` - Boxed backend instance
    /// * `Err(RepositoryError)` - If creation fails
    pub async fn create(
        repo_type: RepositoryType,
        supabase_config: Option<&SupabaseConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Supabase => {
                #[cfg(feature = "supabase-repo")]
                {
                    let config = supabase_config.ok_or_else(|| {
                        RepositoryError::configuration(
                            "Supabase repository requires SupabaseConfig",
                        )
                    })?;
                    let hosted = Self::create_supabase(config).await?;
                    Ok(hosted as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "supabase-repo"))]
                {
                    let _ = supabase_config;
                    Err(RepositoryError::configuration(
                        "Supabase repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Memory => Ok(Self::create_memory()),
        }
    }

    /// Create a hosted Supabase repository.
    ///
    /// # Arguments
    /// * `config` - Project configuration
    ///
    /// # Returns
    /// * `Ok(Arc<SupabaseRepository>)` - Hosted repository instance
    /// * `Err(RepositoryError)` - If initialization fails
    #[cfg(feature = "supabase-repo")]
    pub async fn create_supabase(
        config: &SupabaseConfig,
    ) -> RepositoryResult<Arc<SupabaseRepository>> {
        let repo = SupabaseRepository::new(config.clone())?;
        Ok(Arc::new(repo))
    }

    /// Create an in-memory repository.
    ///
    /// # Returns
    /// Boxed in-memory repository instance
    pub fn create_memory() -> Arc<dyn FullRepository> {
        Arc::new(MemoryRepository::new())
    }

    /// Create a store backend from environment configuration.
    ///
    /// Reads `REPOSITORY_TYPE` environment variable to determine which
    /// backend to create. Defaults to Supabase if a project URL is set,
    /// otherwise Memory.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullRepository>)` - Backend instance
    /// * `Err(RepositoryError)` - If creation fails
    pub async fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = RepositoryType::from_env();

        match repo_type {
            RepositoryType::Supabase => {
                #[cfg(feature = "supabase-repo")]
                {
                    let config =
                        SupabaseConfig::from_env().map_err(RepositoryError::configuration)?;
                    let hosted = Self::create_supabase(&config).await?;
                    Ok(hosted as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "supabase-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "Supabase repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Memory => Ok(Self::create_memory()),
        }
    }

    /// Create a store backend from a TOML configuration file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the repository.toml configuration file
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullRepository>)` - Backend instance
    /// * `Err(RepositoryError)` - If creation fails
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config).await
    }

    /// Create a store backend from the default configuration file location.
    ///
    /// Searches for `repository.toml` in standard locations and creates
    /// the appropriate backend instance.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullRepository>)` - Backend instance
    /// * `Err(RepositoryError)` - If creation fails
    pub async fn from_default_config() -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_default_location()?;
        Self::from_repository_config(&config).await
    }

    /// Create a store backend from a RepositoryConfig instance.
    ///
    /// # Arguments
    /// * `config` - Store configuration
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullRepository>)` - Backend instance
    /// * `Err(RepositoryError)` - If creation fails
    async fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config
            .repository_type()
            .map_err(|e| RepositoryError::configuration(format!("Invalid repository type: {}", e)))?;

        match repo_type {
            RepositoryType::Supabase => {
                #[cfg(feature = "supabase-repo")]
                {
                    let supabase_config = config.to_supabase_config()?.ok_or_else(|| {
                        RepositoryError::configuration(
                            "Supabase repository requires project configuration",
                        )
                    })?;
                    let hosted = Self::create_supabase(&supabase_config).await?;
                    Ok(hosted as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "supabase-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "Supabase repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Memory => Ok(Self::create_memory()),
        }
    }
}

/// Builder for configuring store backend creation.
///
/// This provides a fluent API for configuring and creating backend instances.
///
/// # Example
/// ```ignore
/// use meetly_rust::store::{RepositoryBuilder, RepositoryType, SupabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Requires the `supabase-repo` feature.
///     let config = SupabaseConfig::from_env()?;
///
///     let repo = RepositoryBuilder::new()
///         .repository_type(RepositoryType::Supabase)
///         .supabase_config(config)
///         .build()
///         .await?;
///
///     Ok(())
/// }
/// ```
pub struct RepositoryBuilder {
    repo_type: RepositoryType,
    #[cfg(feature = "supabase-repo")]
    supabase_config: Option<SupabaseConfig>,
}

impl RepositoryBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults to Supabase if configured, otherwise Memory.
    pub fn new() -> Self {
        Self {
            repo_type: RepositoryType::from_env(),
            #[cfg(feature = "supabase-repo")]
            supabase_config: None,
        }
    }

    /// Set the store backend type.
    pub fn repository_type(mut self, repo_type: RepositoryType) -> Self {
        self.repo_type = repo_type;
        self
    }

    /// Set the Supabase configuration.
    #[cfg(feature = "supabase-repo")]
    pub fn supabase_config(mut self, config: SupabaseConfig) -> Self {
        self.supabase_config = Some(config);
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env(mut self) -> Result<Self, RepositoryError> {
        self.repo_type = RepositoryType::from_env();

        if self.repo_type == RepositoryType::Supabase {
            #[cfg(feature = "supabase-repo")]
            {
                let config = SupabaseConfig::from_env().map_err(RepositoryError::configuration)?;
                self.supabase_config = Some(config);
            }
            #[cfg(not(feature = "supabase-repo"))]
            {
                return Err(RepositoryError::configuration(
                    "Supabase repository feature not enabled",
                ));
            }
        }

        Ok(self)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the repository.toml configuration file
    ///
    /// # Returns
    /// * `Ok(Self)` - Builder with loaded configuration
    /// * `Err(RepositoryError)` - If file cannot be read or parsed
    pub fn from_config_file<P: AsRef<Path>>(
        mut self,
        config_path: P,
    ) -> Result<Self, RepositoryError> {
        let repo_config = RepositoryConfig::from_file(config_path)?;

        self.repo_type = repo_config
            .repository_type()
            .map_err(|e| RepositoryError::configuration(format!("Invalid repository type: {}", e)))?;

        if self.repo_type == RepositoryType::Supabase {
            #[cfg(feature = "supabase-repo")]
            {
                let config = repo_config.to_supabase_config()?.ok_or_else(|| {
                    RepositoryError::configuration(
                        "Supabase repository requires project configuration",
                    )
                })?;
                self.supabase_config = Some(config);
            }
            #[cfg(not(feature = "supabase-repo"))]
            {
                return Err(RepositoryError::configuration(
                    "Supabase repository feature not enabled",
                ));
            }
        }

        Ok(self)
    }

    /// Load configuration from default location.
    ///
    /// Searches for `repository.toml` in standard locations.
    ///
    /// # Returns
    /// * `Ok(Self)` - Builder with loaded configuration
    /// * `Err(RepositoryError)` - If no config file found or parse error
    pub fn from_default_config(mut self) -> Result<Self, RepositoryError> {
        let repo_config = RepositoryConfig::from_default_location()?;

        self.repo_type = repo_config
            .repository_type()
            .map_err(|e| RepositoryError::configuration(format!("Invalid repository type: {}", e)))?;

        if self.repo_type == RepositoryType::Supabase {
            #[cfg(feature = "supabase-repo")]
            {
                let config = repo_config.to_supabase_config()?.ok_or_else(|| {
                    RepositoryError::configuration(
                        "Supabase repository requires project configuration",
                    )
                })?;
                self.supabase_config = Some(config);
            }
            #[cfg(not(feature = "supabase-repo"))]
            {
                return Err(RepositoryError::configuration(
                    "Supabase repository feature not enabled",
                ));
            }
        }

        Ok(self)
    }

    /// Build the store backend instance.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullRepository>)` - Configured backend
    /// * `Err(RepositoryError)` - If build fails
    pub async fn build(self) -> RepositoryResult<Arc<dyn FullRepository>> {
        #[cfg(feature = "supabase-repo")]
        let supabase_config = self.supabase_config.as_ref();
        #[cfg(not(feature = "supabase-repo"))]
        let supabase_config = None;

        RepositoryFactory::create(self.repo_type, supabase_config).await
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
