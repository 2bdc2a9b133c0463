//! Profile loading and saving.

use std::sync::Arc;

use crate::session::SessionContext;
use crate::store::{FullRepository, ProfileDraft, ProfileRecord, RepositoryResult};

/// A non-fatal problem encountered after a successful profile save.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileSaveWarning {
    /// The profile row was written, but the schedule timezone sync failed.
    #[error("Availability timezone sync failed: {detail}")]
    ScheduleSyncFailed { detail: String },
}

/// Result of a successful profile save.
#[derive(Debug, Clone)]
pub struct ProfileSaveReceipt {
    /// The stored row after the write.
    pub record: ProfileRecord,
    /// Non-fatal problems during post-save sync.
    pub warnings: Vec<ProfileSaveWarning>,
}

/// Loads and saves profiles against any store backend.
#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn FullRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self { repo }
    }

    /// Load the user's profile row, if one exists.
    pub async fn load(&self, ctx: &SessionContext) -> RepositoryResult<Option<ProfileRecord>> {
        self.repo.fetch_profile(ctx).await
    }

    /// Persist the profile, then sync its timezone onto the schedule row.
    ///
    /// Timezone lives on both rows and the two pickers must agree, so a
    /// profile save pushes its zone onto the user's schedule as well. A
    /// missing schedule row is fine; a failed sync is surfaced as a warning
    /// without undoing the profile write.
    pub async fn save(
        &self,
        ctx: &SessionContext,
        draft: &ProfileDraft,
    ) -> RepositoryResult<ProfileSaveReceipt> {
        let record = self.repo.save_profile(ctx, draft).await?;
        log::info!("Saved profile for {}", ctx.user_id);

        let mut warnings = Vec::new();
        match self
            .repo
            .update_schedule_timezone(ctx, &draft.timezone)
            .await
        {
            Ok(true) => {
                log::debug!("Synced timezone to schedule for {}", ctx.user_id);
            }
            Ok(false) => {
                // No schedule row yet; nothing to sync.
            }
            Err(e) => {
                log::warn!("Schedule timezone sync failed for {}: {}", ctx.user_id, e);
                warnings.push(ProfileSaveWarning::ScheduleSyncFailed {
                    detail: e.to_string(),
                });
            }
        }

        Ok(ProfileSaveReceipt { record, warnings })
    }
}
