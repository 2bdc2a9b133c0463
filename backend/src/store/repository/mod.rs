//! Abstract interface over the hosted record store.
//!
//! One trait per table keeps test doubles small; [`FullRepository`] is the
//! combined surface the factory hands out and services depend on.

pub mod error;
pub mod profile;
pub mod schedule;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use profile::ProfileRepository;
pub use schedule::ScheduleRepository;

use async_trait::async_trait;

/// Combined store interface covering both hosted tables.
#[async_trait]
pub trait FullRepository: ScheduleRepository + ProfileRepository {
    /// Verify the store is reachable.
    ///
    /// # Returns
    /// * `Ok(true)` - the store answered
    /// * `Err(RepositoryError)` - it did not
    async fn health_check(&self) -> RepositoryResult<bool>;
}
