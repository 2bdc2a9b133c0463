//! In-memory store backend for unit tests and local development.
//!
//! Rows live in process-local maps keyed by user id. Behavior mirrors the
//! hosted backend: update-else-insert writes, revision bumps on every
//! schedule write, guard enforcement, and timezone syncs that no-op when the
//! target row is missing.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::Timezone;
use crate::session::SessionContext;
use crate::store::records::{
    ProfileDraft, ProfileRecord, ScheduleDraft, ScheduleRecord, WriteGuard,
};
use crate::store::repository::{
    ErrorContext, FullRepository, ProfileRepository, RepositoryError, RepositoryResult,
    ScheduleRepository,
};

#[derive(Default)]
struct Tables {
    schedules: HashMap<String, ScheduleRecord>,
    profiles: HashMap<String, ProfileRecord>,
    offline: bool,
}

impl Tables {
    fn ensure_online(&self, operation: &str) -> RepositoryResult<()> {
        if self.offline {
            return Err(RepositoryError::connection_with_context(
                "Store is offline",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

/// In-memory implementation of the store traits.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with a connection error.
    ///
    /// Test hook for exercising degraded read paths and failed saves.
    pub fn set_offline(&self, offline: bool) {
        self.inner.write().offline = offline;
    }

    /// Place a raw schedule row, bypassing draft validation.
    ///
    /// Test hook for seeding rows the typed write path cannot produce, such
    /// as a malformed `timing` payload or an unknown timezone name.
    pub fn put_schedule_row(&self, record: ScheduleRecord) {
        self.inner
            .write()
            .schedules
            .insert(record.user_id.value().to_string(), record);
    }

    /// Place a raw profile row, bypassing draft validation.
    pub fn put_profile_row(&self, record: ProfileRecord) {
        self.inner
            .write()
            .profiles
            .insert(record.id.value().to_string(), record);
    }

    /// Number of stored schedule rows, across all users.
    pub fn schedule_row_count(&self) -> usize {
        self.inner.read().schedules.len()
    }
}

#[async_trait]
impl ScheduleRepository for MemoryRepository {
    async fn fetch_schedule(
        &self,
        ctx: &SessionContext,
    ) -> RepositoryResult<Option<ScheduleRecord>> {
        let tables = self.inner.read();
        tables.ensure_online("fetch_schedule")?;
        Ok(tables.schedules.get(ctx.user_id.value()).cloned())
    }

    async fn save_schedule(
        &self,
        ctx: &SessionContext,
        draft: &ScheduleDraft,
        guard: WriteGuard,
    ) -> RepositoryResult<ScheduleRecord> {
        let mut tables = self.inner.write();
        tables.ensure_online("save_schedule")?;

        let user_key = ctx.user_id.value().to_string();
        match tables.schedules.get_mut(&user_key) {
            Some(existing) => {
                if let WriteGuard::ExpectRevision(expected) = guard {
                    if existing.revision != expected {
                        return Err(RepositoryError::conflict_with_context(
                            format!(
                                "Stored revision {} does not match expected {}",
                                existing.revision, expected
                            ),
                            ErrorContext::new("save_schedule")
                                .with_entity("schedule")
                                .with_entity_id(&ctx.user_id),
                        ));
                    }
                }

                existing.timezone = draft.timezone.name().to_string();
                existing.timing = draft.timing.clone();
                existing.revision += 1;
                existing.updated_at = Some(Utc::now());
                log::debug!(
                    "Updated schedule row for {} at revision {}",
                    ctx.user_id,
                    existing.revision
                );
                Ok(existing.clone())
            }
            None => {
                // Expecting a revision of an absent row means the caller's
                // loaded row has been deleted since.
                if let WriteGuard::ExpectRevision(expected) = guard {
                    if expected != 0 {
                        return Err(RepositoryError::conflict_with_context(
                            format!("Schedule row at revision {} no longer exists", expected),
                            ErrorContext::new("save_schedule")
                                .with_entity("schedule")
                                .with_entity_id(&ctx.user_id),
                        ));
                    }
                }

                let record = ScheduleRecord {
                    id: Some(Uuid::new_v4().to_string()),
                    user_id: ctx.user_id.clone(),
                    timezone: draft.timezone.name().to_string(),
                    timing: draft.timing.clone(),
                    revision: 1,
                    updated_at: Some(Utc::now()),
                };
                tables.schedules.insert(user_key, record.clone());
                log::debug!("Inserted schedule row for {}", ctx.user_id);
                Ok(record)
            }
        }
    }

    async fn update_schedule_timezone(
        &self,
        ctx: &SessionContext,
        timezone: &Timezone,
    ) -> RepositoryResult<bool> {
        let mut tables = self.inner.write();
        tables.ensure_online("update_schedule_timezone")?;

        match tables.schedules.get_mut(ctx.user_id.value()) {
            Some(existing) => {
                existing.timezone = timezone.name().to_string();
                // The row content changed, so guarded writers must re-load.
                existing.revision += 1;
                existing.updated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ProfileRepository for MemoryRepository {
    async fn fetch_profile(
        &self,
        ctx: &SessionContext,
    ) -> RepositoryResult<Option<ProfileRecord>> {
        let tables = self.inner.read();
        tables.ensure_online("fetch_profile")?;
        Ok(tables.profiles.get(ctx.user_id.value()).cloned())
    }

    async fn save_profile(
        &self,
        ctx: &SessionContext,
        draft: &ProfileDraft,
    ) -> RepositoryResult<ProfileRecord> {
        let mut tables = self.inner.write();
        tables.ensure_online("save_profile")?;

        let user_key = ctx.user_id.value().to_string();
        match tables.profiles.get_mut(&user_key) {
            Some(existing) => {
                existing.name = Some(draft.name.clone());
                if let Some(bio) = &draft.bio {
                    existing.bio = Some(bio.clone());
                }
                if let Some(instagram) = &draft.instagram {
                    existing.instagram = Some(instagram.clone());
                }
                if let Some(tiktok) = &draft.tiktok {
                    existing.tiktok = Some(tiktok.clone());
                }
                if let Some(snapchat) = &draft.snapchat {
                    existing.snapchat = Some(snapchat.clone());
                }
                existing.timezone = Some(draft.timezone.name().to_string());
                log::debug!("Updated profile row for {}", ctx.user_id);
                Ok(existing.clone())
            }
            None => {
                let record = ProfileRecord {
                    id: ctx.user_id.clone(),
                    name: Some(draft.name.clone()),
                    bio: draft.bio.clone(),
                    instagram: draft.instagram.clone(),
                    tiktok: draft.tiktok.clone(),
                    snapchat: draft.snapchat.clone(),
                    timezone: Some(draft.timezone.name().to_string()),
                    avatar: None,
                };
                tables.profiles.insert(user_key, record.clone());
                log::debug!("Inserted profile row for {}", ctx.user_id);
                Ok(record)
            }
        }
    }

    async fn update_profile_timezone(
        &self,
        ctx: &SessionContext,
        timezone: &Timezone,
    ) -> RepositoryResult<bool> {
        let mut tables = self.inner.write();
        tables.ensure_online("update_profile_timezone")?;

        match tables.profiles.get_mut(ctx.user_id.value()) {
            Some(existing) => {
                existing.timezone = Some(timezone.name().to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl FullRepository for MemoryRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.read().ensure_online("health_check")?;
        Ok(true)
    }
}
