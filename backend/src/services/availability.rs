//! Availability loading and saving.
//!
//! Loading never hard-fails: a missing row falls back to the profile
//! timezone, a malformed row falls back to defaults, and every degradation
//! is reported as a warning value the caller can show.

use std::sync::Arc;

use crate::models::{ScheduleParseError, Timezone, WeekPlan, WeeklySchedule};
use crate::session::SessionContext;
use crate::store::{
    FullRepository, RepositoryError, ScheduleDraft, ScheduleRecord, WriteGuard,
};

/// Where the loaded schedule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// A stored schedule row
    Stored,
    /// No schedule row; the timezone was taken from the profile
    ProfileFallback,
    /// Neither row was usable; built-in defaults
    Default,
}

/// A non-fatal problem encountered while loading.
///
/// Rendered messages are suitable for an inline banner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadWarning {
    /// The schedule row could not be fetched.
    #[error("Availability could not be loaded; showing defaults: {detail}")]
    StoreUnavailable { detail: String },
    /// A schedule row exists but its timing payload failed to parse.
    #[error("Stored availability was unreadable and has been reset: {detail}")]
    MalformedTiming { detail: String },
    /// A stored row names a timezone that is not a known IANA zone.
    #[error("Stored timezone '{name}' is not recognized")]
    UnknownTimezone { name: String },
    /// The profile fallback read failed.
    #[error("Profile could not be loaded: {detail}")]
    ProfileUnavailable { detail: String },
}

/// A non-fatal problem encountered after a successful save.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveWarning {
    /// The schedule row was written, but the profile timezone sync failed.
    #[error("Profile timezone sync failed: {detail}")]
    ProfileSyncFailed { detail: String },
}

/// Error from a save pipeline. Loads do not fail; they degrade.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The store rejected or failed the write.
    #[error(transparent)]
    Store(#[from] RepositoryError),
    /// The schedule could not be encoded for storage.
    #[error(transparent)]
    Encode(#[from] ScheduleParseError),
}

impl ServiceError {
    /// True when a guarded write lost a revision race.
    pub fn is_revision_conflict(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_conflict())
    }
}

/// Result of a load, always usable.
#[derive(Debug, Clone)]
pub struct LoadedAvailability {
    /// The schedule to show, possibly rebuilt from partial data.
    pub schedule: WeeklySchedule,
    /// Revision of the stored row, `None` when no row exists yet.
    pub revision: Option<i64>,
    /// Where the schedule came from.
    pub source: LoadSource,
    /// Non-fatal problems encountered while loading.
    pub warnings: Vec<LoadWarning>,
}

impl LoadedAvailability {
    /// Guard that makes the next save fail if the stored row moved since
    /// this load.
    pub fn guard(&self) -> WriteGuard {
        WriteGuard::ExpectRevision(self.revision.unwrap_or(0))
    }
}

/// Result of a successful save.
#[derive(Debug, Clone)]
pub struct SaveReceipt {
    /// The stored row after the write.
    pub record: ScheduleRecord,
    /// Non-fatal problems during post-save sync.
    pub warnings: Vec<SaveWarning>,
}

/// Loads and saves weekly availability against any store backend.
#[derive(Clone)]
pub struct AvailabilityService {
    repo: Arc<dyn FullRepository>,
}

impl AvailabilityService {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self { repo }
    }

    /// Load the user's availability.
    ///
    /// Resolution order:
    /// 1. The stored schedule row.
    /// 2. No row: a fresh schedule in the profile's timezone.
    /// 3. Neither: a fresh schedule in the default timezone.
    ///
    /// Failures along the way degrade to the next step and are reported in
    /// [`LoadedAvailability::warnings`].
    pub async fn load(&self, ctx: &SessionContext) -> LoadedAvailability {
        let mut warnings = Vec::new();

        match self.repo.fetch_schedule(ctx).await {
            Ok(Some(record)) => return from_stored_row(ctx, record, warnings),
            Ok(None) => {
                log::debug!("No schedule row for {}; falling back to profile", ctx.user_id);
            }
            Err(e) => {
                log::warn!("Schedule fetch failed for {}: {}", ctx.user_id, e);
                warnings.push(LoadWarning::StoreUnavailable {
                    detail: e.to_string(),
                });
            }
        }

        // No usable schedule row. The profile's timezone is the next best
        // starting point.
        match self.repo.fetch_profile(ctx).await {
            Ok(Some(profile)) => {
                if let Some(name) = profile.timezone.as_deref() {
                    match name.parse::<Timezone>() {
                        Ok(timezone) => {
                            return LoadedAvailability {
                                schedule: WeeklySchedule::new(timezone),
                                revision: None,
                                source: LoadSource::ProfileFallback,
                                warnings,
                            };
                        }
                        Err(_) => {
                            log::warn!(
                                "Profile for {} names unknown timezone '{}'",
                                ctx.user_id,
                                name
                            );
                            warnings.push(LoadWarning::UnknownTimezone {
                                name: name.to_string(),
                            });
                        }
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("Profile fetch failed for {}: {}", ctx.user_id, e);
                warnings.push(LoadWarning::ProfileUnavailable {
                    detail: e.to_string(),
                });
            }
        }

        LoadedAvailability {
            schedule: WeeklySchedule::default(),
            revision: None,
            source: LoadSource::Default,
            warnings,
        }
    }

    /// Persist the schedule, then sync its timezone onto the profile row.
    ///
    /// The profile sync runs even when it has nothing to change, matching
    /// the write order pickers rely on; its failure does not undo the
    /// schedule write and is surfaced as a warning.
    pub async fn save(
        &self,
        ctx: &SessionContext,
        schedule: &WeeklySchedule,
        guard: WriteGuard,
    ) -> Result<SaveReceipt, ServiceError> {
        let timing = schedule.encode_timing()?;
        let draft = ScheduleDraft::new(schedule.timezone(), timing);

        let record = self.repo.save_schedule(ctx, &draft, guard).await?;
        log::info!(
            "Saved schedule for {} at revision {}",
            ctx.user_id,
            record.revision
        );

        let mut warnings = Vec::new();
        match self
            .repo
            .update_profile_timezone(ctx, &schedule.timezone())
            .await
        {
            Ok(true) => {
                log::debug!("Synced timezone to profile for {}", ctx.user_id);
            }
            Ok(false) => {
                // No profile row yet; nothing to sync.
            }
            Err(e) => {
                log::warn!("Profile timezone sync failed for {}: {}", ctx.user_id, e);
                warnings.push(SaveWarning::ProfileSyncFailed {
                    detail: e.to_string(),
                });
            }
        }

        Ok(SaveReceipt { record, warnings })
    }
}

fn from_stored_row(
    ctx: &SessionContext,
    record: ScheduleRecord,
    mut warnings: Vec<LoadWarning>,
) -> LoadedAvailability {
    let timezone = match record.timezone.parse::<Timezone>() {
        Ok(timezone) => timezone,
        Err(_) => {
            // Rows created by timezone-less writes have an empty column;
            // that is absence, not corruption.
            if !record.timezone.is_empty() {
                log::warn!(
                    "Stored timezone '{}' for {} is not recognized",
                    record.timezone,
                    ctx.user_id
                );
                warnings.push(LoadWarning::UnknownTimezone {
                    name: record.timezone.clone(),
                });
            }
            Timezone::default()
        }
    };

    let plan = if record.timing.is_empty() {
        WeekPlan::new()
    } else {
        match WeekPlan::from_timing(&record.timing) {
            Ok(plan) => plan,
            Err(e) => {
                log::warn!("Stored timing for {} is malformed: {}", ctx.user_id, e);
                warnings.push(LoadWarning::MalformedTiming {
                    detail: e.to_string(),
                });
                WeekPlan::new()
            }
        }
    };

    LoadedAvailability {
        schedule: WeeklySchedule::from_parts(timezone, plan),
        revision: Some(record.revision),
        source: LoadSource::Stored,
        warnings,
    }
}
