//! Record store module for availability and profile persistence.
//!
//! This module provides abstractions for record storage via the Repository
//! pattern, allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! The store module follows a layered architecture:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (editor UI, bots, CLIs)              │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (crate::services) - Business Logic       │
//! │  - Schedule decode with fallbacks                        │
//! │  - Debounced autosave                                    │
//! │  - Profile/schedule timezone sync                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────▼──────────────────────────────┐
//!     │   Supabase REST            Memory            │
//!     │     (hosted)             (in-process)        │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! # Repository Pattern
//! The module includes:
//! - `repository`: Trait definitions for store operations
//! - `repositories::supabase`: Hosted implementation speaking the Supabase REST surface
//! - `repositories::memory`: In-memory implementation for unit testing and local development
//! - `factory`: Factory for creating backend instances
//!
//! # Recommended Usage
//!
//! **For new code, use the service layer:**
//! ```ignore
//! use meetly_rust::services::AvailabilityService;
//! use meetly_rust::session::{SessionContext, UserId};
//! use meetly_rust::store::RepositoryFactory;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let service = AvailabilityService::new(repo);
//!
//!     let ctx = SessionContext::new(UserId::new("user-1"));
//!     let loaded = service.load(&ctx).await;
//!     Ok(())
//! }
//! ```
//!
//! There is deliberately no process-wide repository singleton: every
//! operation takes a [`crate::session::SessionContext`], so two signed-in
//! users never share ambient state.

#[cfg(not(any(feature = "supabase-repo", feature = "memory-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod checksum;
pub mod factory;
pub mod records;
pub mod repo_config;
pub mod repositories;
pub mod repository;

// Supabase config is colocated with the repository implementation.
#[cfg(feature = "supabase-repo")]
pub use repositories::supabase::SupabaseConfig;
#[cfg(not(feature = "supabase-repo"))]
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    _private: (),
}

pub use checksum::calculate_checksum;
pub use records::{ProfileDraft, ProfileRecord, ScheduleDraft, ScheduleRecord, WriteGuard};
pub use repo_config::RepositoryConfig;

// Repository traits and implementations
pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repositories::MemoryRepository;
#[cfg(feature = "supabase-repo")]
pub use repositories::SupabaseRepository;
pub use repository::{
    ErrorContext, FullRepository, ProfileRepository, RepositoryError, RepositoryResult,
    ScheduleRepository,
};
