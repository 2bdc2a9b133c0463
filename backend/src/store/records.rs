//! Wire records and write drafts for the hosted tables.
//!
//! Records mirror the stored rows field for field, so fetches never fail on
//! content the client would rather repair (an unparseable timezone, a
//! malformed timing payload). Typed interpretation happens in the service
//! layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::checksum::calculate_checksum;
use crate::models::Timezone;
use crate::session::UserId;

/// One row of the `schedule` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    /// Row primary key, generated by the store on insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owning user. The hosted column is camelCase.
    #[serde(rename = "userId")]
    pub user_id: UserId,
    /// IANA zone name as stored; may be absent or invalid in old rows.
    #[serde(default)]
    pub timezone: String,
    /// Day-to-intervals JSON produced by `WeekPlan::to_timing`. Kept opaque
    /// here; decoding failures are the service layer's concern.
    #[serde(default)]
    pub timing: String,
    /// Monotonic write counter consumed by revision-guarded saves.
    #[serde(default)]
    pub revision: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One row of the `profile` table, keyed by the auth user id.
///
/// Every content field is optional so partial rows read back cleanly and
/// writes can patch a subset of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapchat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Storage path of the avatar image; managed by the upload flow, only
    /// carried through here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ProfileRecord {
    /// An empty profile row for the given user.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            name: None,
            bio: None,
            instagram: None,
            tiktok: None,
            snapchat: None,
            timezone: None,
            avatar: None,
        }
    }
}

/// Content of a schedule write, minus identity and bookkeeping columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleDraft {
    pub timezone: Timezone,
    pub timing: String,
}

impl ScheduleDraft {
    pub fn new(timezone: Timezone, timing: impl Into<String>) -> Self {
        Self {
            timezone,
            timing: timing.into(),
        }
    }

    /// Checksum of the persisted content. Two drafts with equal checksums
    /// would write identical rows, which lets the autosaver skip the write.
    pub fn content_checksum(&self) -> String {
        calculate_checksum(&format!("{}\n{}", self.timezone.name(), self.timing))
    }
}

/// Content of a profile write.
///
/// Optional fields left `None` are omitted from the update and keep their
/// stored value. Send `Some("")` to clear a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapchat: Option<String>,
    pub timezone: Timezone,
}

impl ProfileDraft {
    pub fn new(name: impl Into<String>, timezone: Timezone) -> Self {
        Self {
            name: name.into(),
            bio: None,
            instagram: None,
            tiktok: None,
            snapchat: None,
            timezone,
        }
    }
}

/// Concurrency policy for a schedule write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteGuard {
    /// Overwrite whatever is stored. This is the original client's racy
    /// behavior, kept for compatibility.
    #[default]
    LastWriteWins,
    /// Write only if the stored revision still matches. A mismatch returns
    /// `RepositoryError::Conflict` and leaves the row untouched.
    ExpectRevision(i64),
}
