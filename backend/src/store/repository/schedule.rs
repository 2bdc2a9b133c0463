//! Schedule repository trait for availability row operations.
//!
//! The `schedule` table holds one row per user: the encoded weekly
//! availability (`timing`), the IANA timezone it is interpreted in, and a
//! revision counter for guarded writes.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::Timezone;
use crate::session::SessionContext;
use crate::store::records::{ScheduleDraft, ScheduleRecord, WriteGuard};

/// Repository trait for the per-user schedule row.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Fetch the schedule row for the session user.
    ///
    /// # Returns
    /// * `Ok(Some(ScheduleRecord))` - the stored row
    /// * `Ok(None)` - no row exists for this user yet
    /// * `Err(RepositoryError)` - if the operation fails
    async fn fetch_schedule(
        &self,
        ctx: &SessionContext,
    ) -> RepositoryResult<Option<ScheduleRecord>>;

    /// Write the schedule row for the session user, update-else-insert.
    ///
    /// An existing row is updated in place; otherwise a new row is inserted
    /// at revision 1. `guard` decides what happens when another writer got
    /// there first: `LastWriteWins` overwrites, `ExpectRevision` fails with
    /// a conflict and leaves the row untouched.
    ///
    /// # Returns
    /// * `Ok(ScheduleRecord)` - the row as stored after the write
    /// * `Err(RepositoryError::Conflict)` - the revision guard did not match
    /// * `Err(RepositoryError)` - if the operation fails
    async fn save_schedule(
        &self,
        ctx: &SessionContext,
        draft: &ScheduleDraft,
        guard: WriteGuard,
    ) -> RepositoryResult<ScheduleRecord>;

    /// Update only the timezone column of the session user's schedule row.
    ///
    /// Profile saves use this to keep the schedule row's timezone in sync.
    /// Matching no row is a no-op.
    ///
    /// # Returns
    /// * `Ok(true)` - a row was updated
    /// * `Ok(false)` - no schedule row exists for this user
    /// * `Err(RepositoryError)` - if the operation fails
    async fn update_schedule_timezone(
        &self,
        ctx: &SessionContext,
        timezone: &Timezone,
    ) -> RepositoryResult<bool>;
}
