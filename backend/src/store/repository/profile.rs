//! Profile repository trait for user profile row operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::Timezone;
use crate::session::SessionContext;
use crate::store::records::{ProfileDraft, ProfileRecord};

/// Repository trait for the `profile` table, keyed by the auth user id.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch the profile row for the session user.
    ///
    /// # Returns
    /// * `Ok(Some(ProfileRecord))` - the stored row
    /// * `Ok(None)` - the user has no profile yet
    /// * `Err(RepositoryError)` - if the operation fails
    async fn fetch_profile(&self, ctx: &SessionContext)
        -> RepositoryResult<Option<ProfileRecord>>;

    /// Write the profile row for the session user, update-else-insert.
    ///
    /// # Returns
    /// * `Ok(ProfileRecord)` - the row as stored after the write
    /// * `Err(RepositoryError)` - if the operation fails
    async fn save_profile(
        &self,
        ctx: &SessionContext,
        draft: &ProfileDraft,
    ) -> RepositoryResult<ProfileRecord>;

    /// Update only the timezone column of the session user's profile row.
    ///
    /// Schedule saves use this to keep the profile row's timezone in sync.
    /// Matching no row is a no-op.
    ///
    /// # Returns
    /// * `Ok(true)` - a row was updated
    /// * `Ok(false)` - no profile row exists for this user
    /// * `Err(RepositoryError)` - if the operation fails
    async fn update_profile_timezone(
        &self,
        ctx: &SessionContext,
        timezone: &Timezone,
    ) -> RepositoryResult<bool>;
}
