//! Hosted store backend speaking the Supabase REST (PostgREST) surface.
//!
//! Every operation is a stateless HTTP request against `/rest/v1/{table}`;
//! there is no connection pool to manage. Guarded schedule writes put the
//! expected revision into the request filter, so the compare-and-set happens
//! in the store rather than in this process.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `SUPABASE_URL`: Project base URL (required)
//! - `SUPABASE_API_KEY` or `SUPABASE_ANON_KEY`: API key (required)
//! - `SUPABASE_SCHEDULE_TABLE`: Schedule table name (default: "schedule")
//! - `SUPABASE_PROFILE_TABLE`: Profile table name (default: "profile")
//! - `SUPABASE_TIMEOUT_SEC`: Request timeout in seconds (default: 30)

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::models::Timezone;
use crate::session::SessionContext;
use crate::store::records::{
    ProfileDraft, ProfileRecord, ScheduleDraft, ScheduleRecord, WriteGuard,
};
use crate::store::repository::{
    ErrorContext, FullRepository, ProfileRepository, RepositoryError, RepositoryResult,
    ScheduleRepository,
};

/// Configuration for connecting to a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// API key sent as `apikey` and as the fallback bearer token
    pub api_key: String,
    /// Table holding schedule rows
    pub schedule_table: String,
    /// Table holding profile rows
    pub profile_table: String,
    /// Request timeout in seconds
    pub timeout_sec: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            schedule_table: "schedule".to_string(),
            profile_table: "profile".to_string(),
            timeout_sec: 30,
        }
    }
}

impl SupabaseConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `SUPABASE_URL`: Project base URL (required)
    /// - `SUPABASE_API_KEY` or `SUPABASE_ANON_KEY`: API key (required)
    /// - `SUPABASE_SCHEDULE_TABLE`: Schedule table name (default: "schedule")
    /// - `SUPABASE_PROFILE_TABLE`: Profile table name (default: "profile")
    /// - `SUPABASE_TIMEOUT_SEC`: Request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, String> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| "SUPABASE_URL must be set".to_string())?;

        let api_key = std::env::var("SUPABASE_API_KEY")
            .or_else(|_| std::env::var("SUPABASE_ANON_KEY"))
            .map_err(|_| "SUPABASE_API_KEY or SUPABASE_ANON_KEY must be set".to_string())?;

        let schedule_table = std::env::var("SUPABASE_SCHEDULE_TABLE")
            .unwrap_or_else(|_| "schedule".to_string());

        let profile_table =
            std::env::var("SUPABASE_PROFILE_TABLE").unwrap_or_else(|_| "profile".to_string());

        let timeout_sec = std::env::var("SUPABASE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        Ok(Self {
            url,
            api_key,
            schedule_table,
            profile_table,
            timeout_sec,
        })
    }

    /// Create a new configuration with a project URL and API key.
    pub fn with_credentials(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

/// Key columns of a stored schedule row, used by update-else-insert.
#[derive(Debug, Deserialize)]
struct RowKey {
    id: String,
    #[serde(default)]
    revision: i64,
}

/// REST-backed repository for a Supabase project.
#[derive(Clone, Debug)]
pub struct SupabaseRepository {
    client: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseRepository {
    /// Create a new repository.
    ///
    /// # Arguments
    /// * `config` - Project configuration
    ///
    /// # Returns
    /// * `Ok(SupabaseRepository)` on success
    /// * `Err(RepositoryError)` if the configuration is incomplete
    pub fn new(config: SupabaseConfig) -> RepositoryResult<Self> {
        if config.url.is_empty() {
            return Err(RepositoryError::configuration_with_context(
                "Supabase URL is empty",
                ErrorContext::new("create_repository"),
            ));
        }
        if config.api_key.is_empty() {
            return Err(RepositoryError::configuration_with_context(
                "Supabase API key is empty",
                ErrorContext::new("create_repository"),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| {
                RepositoryError::configuration_with_context(
                    e.to_string(),
                    ErrorContext::new("create_http_client"),
                )
            })?;

        Ok(Self { client, config })
    }

    /// Start a request against a table, with auth headers attached.
    ///
    /// The bearer token is the session's access token when present, so row
    /// level security sees the signed-in user; otherwise the API key.
    fn request(
        &self,
        method: Method,
        table: &str,
        ctx: Option<&SessionContext>,
    ) -> reqwest::RequestBuilder {
        let bearer = ctx
            .and_then(|c| c.access_token.as_deref())
            .unwrap_or(&self.config.api_key);

        self.client
            .request(method, join_table(&self.config.url, table))
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    /// Send a request and parse the JSON array PostgREST responds with.
    async fn read_rows<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: ErrorContext,
    ) -> RepositoryResult<Vec<T>> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, &context))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, &context))?;

        if !status.is_success() {
            return Err(response_error(status, &body, context));
        }

        serde_json::from_str(&body).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Unexpected response shape: {}", e),
                context.with_details(snippet(&body)),
            )
        })
    }

    async fn lookup_schedule_key(
        &self,
        ctx: &SessionContext,
        operation: &str,
    ) -> RepositoryResult<Option<RowKey>> {
        let filter = format!("eq.{}", ctx.user_id.value());
        let request = self
            .request(Method::GET, &self.config.schedule_table, Some(ctx))
            .query(&[("userId", filter.as_str()), ("select", "id,revision")]);

        let rows: Vec<RowKey> = self
            .read_rows(
                request,
                ErrorContext::new(operation)
                    .with_entity("schedule")
                    .with_entity_id(&ctx.user_id),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn update_schedule_row(
        &self,
        ctx: &SessionContext,
        draft: &ScheduleDraft,
        guard: WriteGuard,
        key: &RowKey,
    ) -> RepositoryResult<ScheduleRecord> {
        let context = ErrorContext::new("save_schedule")
            .with_entity("schedule")
            .with_entity_id(&ctx.user_id);

        // With a guard the write lands at expected+1 or not at all. Without
        // one, the lookup and the write are separate requests and the last
        // writer wins, which is the unguarded policy.
        let next_revision = match guard {
            WriteGuard::ExpectRevision(expected) => expected + 1,
            WriteGuard::LastWriteWins => key.revision + 1,
        };

        let id_filter = format!("eq.{}", key.id);
        let mut request = self
            .request(Method::PATCH, &self.config.schedule_table, Some(ctx))
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&json!({
                "timing": draft.timing,
                "timezone": draft.timezone,
                "revision": next_revision,
                "updated_at": Utc::now(),
            }));
        if let WriteGuard::ExpectRevision(expected) = guard {
            let revision_filter = format!("eq.{}", expected);
            request = request.query(&[("revision", revision_filter.as_str())]);
        }

        let rows: Vec<ScheduleRecord> = self.read_rows(request, context.clone()).await?;
        match rows.into_iter().next() {
            Some(record) => {
                log::debug!(
                    "Updated schedule row {} to revision {}",
                    key.id,
                    record.revision
                );
                Ok(record)
            }
            // Zero rows matched the filters.
            None => match guard {
                WriteGuard::ExpectRevision(expected) => {
                    Err(RepositoryError::conflict_with_context(
                        format!("Stored revision moved past expected {}", expected),
                        context,
                    ))
                }
                WriteGuard::LastWriteWins => Err(RepositoryError::not_found_with_context(
                    "Schedule row disappeared during save",
                    context,
                )),
            },
        }
    }

    async fn insert_schedule_row(
        &self,
        ctx: &SessionContext,
        draft: &ScheduleDraft,
    ) -> RepositoryResult<ScheduleRecord> {
        let context = ErrorContext::new("save_schedule")
            .with_entity("schedule")
            .with_entity_id(&ctx.user_id);

        let request = self
            .request(Method::POST, &self.config.schedule_table, Some(ctx))
            .header("Prefer", "return=representation")
            .json(&json!({
                "userId": ctx.user_id,
                "timing": draft.timing,
                "timezone": draft.timezone,
                "revision": 1,
                "updated_at": Utc::now(),
            }));

        let rows: Vec<ScheduleRecord> = self.read_rows(request, context.clone()).await?;
        let record = rows.into_iter().next().ok_or_else(|| {
            RepositoryError::internal_with_context("Insert returned no rows", context)
        })?;
        log::debug!("Inserted schedule row for {}", ctx.user_id);
        Ok(record)
    }
}

#[async_trait]
impl ScheduleRepository for SupabaseRepository {
    async fn fetch_schedule(
        &self,
        ctx: &SessionContext,
    ) -> RepositoryResult<Option<ScheduleRecord>> {
        let filter = format!("eq.{}", ctx.user_id.value());
        let request = self
            .request(Method::GET, &self.config.schedule_table, Some(ctx))
            .query(&[("userId", filter.as_str()), ("select", "*")]);

        let rows: Vec<ScheduleRecord> = self
            .read_rows(
                request,
                ErrorContext::new("fetch_schedule")
                    .with_entity("schedule")
                    .with_entity_id(&ctx.user_id),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn save_schedule(
        &self,
        ctx: &SessionContext,
        draft: &ScheduleDraft,
        guard: WriteGuard,
    ) -> RepositoryResult<ScheduleRecord> {
        match self.lookup_schedule_key(ctx, "save_schedule").await? {
            Some(key) => self.update_schedule_row(ctx, draft, guard, &key).await,
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
                self.insert_schedule_row(ctx, draft).await
            }
        }
    }

    async fn update_schedule_timezone(
        &self,
        ctx: &SessionContext,
        timezone: &Timezone,
    ) -> RepositoryResult<bool> {
        let key = match self
            .lookup_schedule_key(ctx, "update_schedule_timezone")
            .await?
        {
            Some(key) => key,
            None => return Ok(false),
        };

        let id_filter = format!("eq.{}", key.id);
        let request = self
            .request(Method::PATCH, &self.config.schedule_table, Some(ctx))
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&json!({
                "timezone": timezone,
                "revision": key.revision + 1,
                "updated_at": Utc::now(),
            }));

        let rows: Vec<ScheduleRecord> = self
            .read_rows(
                request,
                ErrorContext::new("update_schedule_timezone")
                    .with_entity("schedule")
                    .with_entity_id(&ctx.user_id),
            )
            .await?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl ProfileRepository for SupabaseRepository {
    async fn fetch_profile(
        &self,
        ctx: &SessionContext,
    ) -> RepositoryResult<Option<ProfileRecord>> {
        let filter = format!("eq.{}", ctx.user_id.value());
        let request = self
            .request(Method::GET, &self.config.profile_table, Some(ctx))
            .query(&[("id", filter.as_str()), ("select", "*")]);

        let rows: Vec<ProfileRecord> = self
            .read_rows(
                request,
                ErrorContext::new("fetch_profile")
                    .with_entity("profile")
                    .with_entity_id(&ctx.user_id),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn save_profile(
        &self,
        ctx: &SessionContext,
        draft: &ProfileDraft,
    ) -> RepositoryResult<ProfileRecord> {
        let context = ErrorContext::new("save_profile")
            .with_entity("profile")
            .with_entity_id(&ctx.user_id);
        let filter = format!("eq.{}", ctx.user_id.value());

        // Presence probe, mirroring update-else-insert on the schedule side.
        let probe = self
            .request(Method::GET, &self.config.profile_table, Some(ctx))
            .query(&[("id", filter.as_str()), ("select", "id")]);
        let existing: Vec<serde_json::Value> = self.read_rows(probe, context.clone()).await?;

        let request = if existing.is_empty() {
            let mut body = serde_json::to_value(draft).map_err(|e| {
                RepositoryError::internal_with_context(
                    format!("Failed to encode profile draft: {}", e),
                    context.clone(),
                )
            })?;
            body["id"] = json!(ctx.user_id);
            self.request(Method::POST, &self.config.profile_table, Some(ctx))
                .header("Prefer", "return=representation")
                .json(&body)
        } else {
            self.request(Method::PATCH, &self.config.profile_table, Some(ctx))
                .query(&[("id", filter.as_str())])
                .header("Prefer", "return=representation")
                .json(draft)
        };

        let rows: Vec<ProfileRecord> = self.read_rows(request, context.clone()).await?;
        rows.into_iter().next().ok_or_else(|| {
            RepositoryError::internal_with_context("Profile write returned no rows", context)
        })
    }

    async fn update_profile_timezone(
        &self,
        ctx: &SessionContext,
        timezone: &Timezone,
    ) -> RepositoryResult<bool> {
        let filter = format!("eq.{}", ctx.user_id.value());
        let request = self
            .request(Method::PATCH, &self.config.profile_table, Some(ctx))
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&json!({ "timezone": timezone }));

        let rows: Vec<ProfileRecord> = self
            .read_rows(
                request,
                ErrorContext::new("update_profile_timezone")
                    .with_entity("profile")
                    .with_entity_id(&ctx.user_id),
            )
            .await?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl FullRepository for SupabaseRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let request = self.request(Method::GET, "", None);
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, &ErrorContext::new("health_check")))?;
        Ok(response.status().is_success())
    }
}

fn join_table(url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", url.trim_end_matches('/'), table)
}

fn transport_error(err: reqwest::Error, context: &ErrorContext) -> RepositoryError {
    let mut mapped = RepositoryError::from(err);
    if let Some(operation) = &context.operation {
        mapped = mapped.with_operation(operation.clone());
    }
    mapped
}

fn response_error(
    status: reqwest::StatusCode,
    body: &str,
    context: ErrorContext,
) -> RepositoryError {
    let context = context.with_details(snippet(body));
    let message = format!("Store responded with {}", status);
    match status.as_u16() {
        401 | 403 => RepositoryError::configuration_with_context(
            format!("Store rejected the provided credentials ({})", status),
            context,
        ),
        404 => RepositoryError::not_found_with_context(message, context),
        408 | 504 => RepositoryError::timeout_with_context(message, context),
        // Constraint violation. On insert this is two sessions racing to
        // create the first row.
        409 => RepositoryError::conflict_with_context(message, context),
        500..=599 => RepositoryError::connection_with_context(message, context),
        _ => RepositoryError::query_with_context(message, context),
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SupabaseConfig::default();
        assert_eq!(config.schedule_table, "schedule");
        assert_eq!(config.profile_table, "profile");
        assert_eq!(config.timeout_sec, 30);
        assert!(config.url.is_empty());
    }

    #[test]
    fn test_with_credentials() {
        let config = SupabaseConfig::with_credentials("https://abc.supabase.co", "key");
        assert_eq!(config.url, "https://abc.supabase.co");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.schedule_table, "schedule");
    }

    #[test]
    fn test_new_rejects_incomplete_config() {
        let no_url = SupabaseConfig::default();
        assert!(SupabaseRepository::new(no_url).is_err());

        let no_key = SupabaseConfig {
            url: "https://abc.supabase.co".to_string(),
            ..Default::default()
        };
        assert!(SupabaseRepository::new(no_key).is_err());

        let complete = SupabaseConfig::with_credentials("https://abc.supabase.co", "key");
        assert!(SupabaseRepository::new(complete).is_ok());
    }

    #[test]
    fn test_join_table_trims_trailing_slash() {
        assert_eq!(
            join_table("https://abc.supabase.co/", "schedule"),
            "https://abc.supabase.co/rest/v1/schedule"
        );
        assert_eq!(
            join_table("https://abc.supabase.co", "profile"),
            "https://abc.supabase.co/rest/v1/profile"
        );
    }

    #[test]
    fn test_response_error_maps_status() {
        use reqwest::StatusCode;

        let ctx = || ErrorContext::new("save_schedule");
        assert!(matches!(
            response_error(StatusCode::UNAUTHORIZED, "", ctx()),
            RepositoryError::ConfigurationError { .. }
        ));
        assert!(matches!(
            response_error(StatusCode::NOT_FOUND, "", ctx()),
            RepositoryError::NotFound { .. }
        ));
        assert!(response_error(StatusCode::CONFLICT, "", ctx()).is_conflict());
        assert!(response_error(StatusCode::INTERNAL_SERVER_ERROR, "", ctx()).is_retryable());
        assert!(matches!(
            response_error(StatusCode::BAD_REQUEST, "", ctx()),
            RepositoryError::QueryError { .. }
        ));
    }

    #[test]
    fn test_snippet_truncates_long_bodies() {
        let long = "x".repeat(500);
        assert_eq!(snippet(&long).len(), 200);
        assert_eq!(snippet("short"), "short");
    }
}
