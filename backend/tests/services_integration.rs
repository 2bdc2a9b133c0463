use std::sync::Arc;
use std::time::Duration;

use meetly_rust::models::{TimeInterval, TimeOfDay, Timezone, Weekday, WeeklySchedule};
use meetly_rust::services::{
    AutosaveOptions, AvailabilityEditor, AvailabilityService, LoadSource, ProfileService,
    SaveState,
};
use meetly_rust::session::{SessionContext, UserId};
use meetly_rust::store::{
    MemoryRepository, ProfileDraft, ProfileRepository, ScheduleRecord, ScheduleRepository,
    WriteGuard,
};

fn ctx(user: &str) -> SessionContext {
    SessionContext::new(UserId::new(user))
}

fn service(repo: &MemoryRepository) -> AvailabilityService {
    AvailabilityService::new(Arc::new(repo.clone()))
}

fn interval(start_hour: u8, end_hour: u8) -> TimeInterval {
    TimeInterval::new(
        TimeOfDay::new(start_hour, 0).unwrap(),
        TimeOfDay::new(end_hour, 0).unwrap(),
    )
}

async fn open_editor(repo: &MemoryRepository, user: &str) -> AvailabilityEditor {
    AvailabilityEditor::open(service(repo), ctx(user), AutosaveOptions::default()).await
}

#[tokio::test]
async fn test_editor_session_survives_reopen() {
    let repo = MemoryRepository::new();

    let mut editor = open_editor(&repo, "user-1").await;
    assert_eq!(editor.source(), LoadSource::Default);
    editor.push_interval(Weekday::Monday, interval(9, 17));
    editor.push_interval(Weekday::Wednesday, interval(10, 12));
    editor.close().await;

    let reopened = open_editor(&repo, "user-1").await;
    assert_eq!(reopened.source(), LoadSource::Stored);
    assert_eq!(
        reopened.schedule().intervals(Weekday::Monday),
        &[interval(9, 17)]
    );
    assert_eq!(
        reopened.schedule().intervals(Weekday::Wednesday),
        &[interval(10, 12)]
    );
    assert!(reopened.schedule().intervals(Weekday::Friday).is_empty());
    reopened.close().await;
}

#[tokio::test]
async fn test_concurrent_sessions_conflict_and_recover() {
    let repo = MemoryRepository::new();

    // Two tabs open the same empty availability
    let mut alpha = open_editor(&repo, "user-1").await;
    let mut beta = open_editor(&repo, "user-1").await;

    alpha.push_interval(Weekday::Monday, interval(9, 17));
    alpha.flush().await;
    assert!(matches!(
        alpha.save_state(),
        SaveState::Saved { revision: 1, .. }
    ));

    // Beta still expects the pre-insert state and loses the race
    beta.push_interval(Weekday::Friday, interval(8, 12));
    beta.flush().await;
    assert!(matches!(
        beta.save_state(),
        SaveState::Failed { conflict: true, .. }
    ));

    // The store kept the winner untouched
    let stored = repo.fetch_schedule(&ctx("user-1")).await.unwrap().unwrap();
    assert_eq!(stored.revision, 1);

    alpha.close().await;
    beta.close().await;

    // Recovery path: reopen on the winning content and reapply the edit
    let mut retry = open_editor(&repo, "user-1").await;
    assert_eq!(
        retry.schedule().intervals(Weekday::Monday),
        &[interval(9, 17)]
    );
    retry.push_interval(Weekday::Friday, interval(8, 12));
    retry.flush().await;
    assert!(matches!(
        retry.save_state(),
        SaveState::Saved { revision: 2, .. }
    ));
    retry.close().await;
}

#[tokio::test]
async fn test_user_sessions_are_isolated() {
    let repo = MemoryRepository::new();

    let mut first = open_editor(&repo, "user-1").await;
    let mut second = open_editor(&repo, "user-2").await;

    first.push_interval(Weekday::Monday, interval(9, 17));
    second.push_interval(Weekday::Friday, interval(14, 18));
    first.close().await;
    second.close().await;

    let first_again = open_editor(&repo, "user-1").await;
    assert_eq!(
        first_again.schedule().intervals(Weekday::Monday),
        &[interval(9, 17)]
    );
    assert!(first_again.schedule().intervals(Weekday::Friday).is_empty());
    first_again.close().await;

    let second_again = open_editor(&repo, "user-2").await;
    assert!(second_again.schedule().intervals(Weekday::Monday).is_empty());
    assert_eq!(
        second_again.schedule().intervals(Weekday::Friday),
        &[interval(14, 18)]
    );
    second_again.close().await;
}

#[tokio::test]
async fn test_timezone_sync_round_trip() {
    let repo = MemoryRepository::new();
    let owner = ctx("user-1");
    let availability = service(&repo);
    let profiles = ProfileService::new(Arc::new(repo.clone()));

    // Profile first; there is no schedule row to sync onto yet
    let mut draft = ProfileDraft::new("Dana", Timezone::new("Asia/Tokyo").unwrap());
    let receipt = profiles.save(&owner, &draft).await.unwrap();
    assert!(receipt.warnings.is_empty());

    // Saving availability in Berlin pushes the timezone onto the profile
    let mut schedule = WeeklySchedule::default();
    schedule.set_timezone(Timezone::new("Europe/Berlin").unwrap());
    availability
        .save(&owner, &schedule, WriteGuard::LastWriteWins)
        .await
        .unwrap();
    let profile = repo.fetch_profile(&owner).await.unwrap().unwrap();
    assert_eq!(profile.timezone.as_deref(), Some("Europe/Berlin"));

    // Saving the profile in Tokyo pushes it back onto the schedule row
    draft.timezone = Timezone::new("Asia/Tokyo").unwrap();
    profiles.save(&owner, &draft).await.unwrap();

    let loaded = availability.load(&owner).await;
    assert_eq!(loaded.source, LoadSource::Stored);
    assert_eq!(loaded.schedule.timezone().name(), "Asia/Tokyo");
}

#[tokio::test]
async fn test_corrupt_row_recovers_through_editor() {
    let repo = MemoryRepository::new();
    repo.put_schedule_row(ScheduleRecord {
        id: Some("row-1".to_string()),
        user_id: UserId::new("user-1"),
        timezone: "Mars/Olympus".to_string(),
        timing: "not json".to_string(),
        revision: 7,
        updated_at: None,
    });

    // The editor opens on the best-effort decode of the stored row
    let mut editor = open_editor(&repo, "user-1").await;
    assert_eq!(editor.source(), LoadSource::Stored);
    assert_eq!(editor.load_warnings().len(), 2);
    assert!(editor.schedule().plan().is_empty());

    // One clean edit overwrites the garbage in place
    editor.push_interval(Weekday::Monday, interval(9, 17));
    editor.flush().await;
    assert!(matches!(
        editor.save_state(),
        SaveState::Saved { revision: 8, .. }
    ));
    editor.close().await;

    let loaded = service(&repo).load(&ctx("user-1")).await;
    assert!(loaded.warnings.is_empty());
    assert_eq!(loaded.revision, Some(8));
    assert_eq!(
        loaded.schedule.intervals(Weekday::Monday),
        &[interval(9, 17)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_debounced_autosave_end_to_end() {
    let repo = MemoryRepository::new();
    let options = AutosaveOptions {
        debounce: Duration::from_millis(200),
    };
    let mut editor = AvailabilityEditor::open(service(&repo), ctx("user-1"), options).await;

    // A quick burst of edits stays in memory
    editor.push_interval(Weekday::Monday, interval(9, 11));
    editor.push_interval(Weekday::Monday, interval(13, 17));
    editor.push_interval(Weekday::Friday, interval(8, 12));
    assert_eq!(repo.schedule_row_count(), 0);

    // One debounce window later the burst lands as a single write
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(matches!(
        editor.save_state(),
        SaveState::Saved { revision: 1, .. }
    ));
    assert_eq!(repo.schedule_row_count(), 1);
    editor.close().await;

    let reopened = open_editor(&repo, "user-1").await;
    assert_eq!(reopened.schedule().intervals(Weekday::Monday).len(), 2);
    assert_eq!(
        reopened.schedule().intervals(Weekday::Friday),
        &[interval(8, 12)]
    );
    reopened.close().await;
}
