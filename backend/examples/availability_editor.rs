//! Example demonstrating availability loading, editing, and persistence.
//!
//! This example shows how to use the repository pattern and the service layer
//! to work with weekly availability.

use std::sync::Arc;

use meetly_rust::models::{TimeInterval, TimeOfDay, Timezone, Weekday};
use meetly_rust::services::{
    AutosaveOptions, AvailabilityEditor, AvailabilityService, ProfileService, SaveState,
};
use meetly_rust::session::{SessionContext, UserId};
use meetly_rust::store::{
    FullRepository, ProfileDraft, RepositoryBuilder, RepositoryFactory, RepositoryType,
};

fn demo_context() -> SessionContext {
    SessionContext::new(UserId::new("demo-user"))
}

/// Example 1: Basic usage with automatic configuration
async fn example_basic_usage() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Example 1: Basic Usage ===");

    // Create repository from environment (memory unless SUPABASE_URL is set)
    let repo = RepositoryFactory::from_env().await?;

    // Check connection health
    let is_healthy = repo.health_check().await?;
    println!("Store connection healthy: {}", is_healthy);

    // Load availability for a user; a fresh store yields defaults
    let service = AvailabilityService::new(repo);
    let loaded = service.load(&demo_context()).await;
    println!("Loaded from: {:?}", loaded.source);
    println!("Warnings: {}", loaded.warnings.len());

    Ok(())
}

/// Example 2: Guarded save round trip
async fn example_guarded_save() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 2: Guarded Save ===");

    let repo = RepositoryBuilder::new()
        .repository_type(RepositoryType::Memory)
        .build()
        .await?;
    let service = AvailabilityService::new(repo);
    let ctx = demo_context();

    // The guard carries the loaded revision, so a concurrent write is
    // detected instead of silently overwritten.
    let loaded = service.load(&ctx).await;
    let mut schedule = loaded.schedule.clone();
    schedule.push_interval(
        Weekday::Monday,
        TimeInterval::new(TimeOfDay::new(9, 0)?, TimeOfDay::new(17, 0)?),
    );

    let receipt = service.save(&ctx, &schedule, loaded.guard()).await?;
    println!("Saved at revision {}", receipt.record.revision);

    Ok(())
}

/// Example 3: Editor session with debounced autosave
async fn example_editor_session() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 3: Editor Session ===");

    let repo = RepositoryFactory::create_memory();
    let service = AvailabilityService::new(repo);

    let mut editor =
        AvailabilityEditor::open(service, demo_context(), AutosaveOptions::default()).await;

    // Each mutation queues a snapshot; the autosaver writes the newest one
    // after the debounce window (or immediately on flush).
    editor.add_interval(Weekday::Tuesday);
    editor.set_interval_start(Weekday::Tuesday, 0, TimeOfDay::new(10, 0)?);
    editor.set_interval_end(Weekday::Tuesday, 0, TimeOfDay::new(15, 0)?);
    editor.set_timezone(Timezone::new("Europe/Berlin")?);

    editor.flush().await;
    match editor.save_state() {
        SaveState::Saved { revision, .. } => println!("Autosaved at revision {}", revision),
        state => println!("Save state: {:?}", state),
    }

    editor.close().await;
    Ok(())
}

/// Example 4: Handling a lost revision race
async fn example_conflict_handling() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 4: Conflict Handling ===");

    let repo = RepositoryFactory::create_memory();
    let service = AvailabilityService::new(repo);
    let ctx = demo_context();

    // Two sessions load the same (absent) row.
    let session_a = service.load(&ctx).await;
    let session_b = service.load(&ctx).await;

    let mut schedule_a = session_a.schedule.clone();
    schedule_a.push_interval(
        Weekday::Friday,
        TimeInterval::new(TimeOfDay::new(9, 0)?, TimeOfDay::new(12, 0)?),
    );
    service.save(&ctx, &schedule_a, session_a.guard()).await?;
    println!("Session A saved first");

    let mut schedule_b = session_b.schedule.clone();
    schedule_b.push_interval(
        Weekday::Friday,
        TimeInterval::new(TimeOfDay::new(14, 0)?, TimeOfDay::new(18, 0)?),
    );
    match service.save(&ctx, &schedule_b, session_b.guard()).await {
        Err(e) if e.is_revision_conflict() => {
            println!("Session B lost the race: {}", e);
            // Reload, reapply, and retry with the fresh revision.
            let fresh = service.load(&ctx).await;
            let mut merged = fresh.schedule.clone();
            merged.push_interval(
                Weekday::Friday,
                TimeInterval::new(TimeOfDay::new(14, 0)?, TimeOfDay::new(18, 0)?),
            );
            let receipt = service.save(&ctx, &merged, fresh.guard()).await?;
            println!("Session B retried at revision {}", receipt.record.revision);
        }
        Err(e) => println!("Unexpected error: {}", e),
        Ok(_) => println!("Unexpectedly won the race"),
    }

    Ok(())
}

/// Example 5: Timezone sync between profile and schedule
async fn example_timezone_sync() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 5: Timezone Sync ===");

    let repo = RepositoryFactory::create_memory();
    let availability = AvailabilityService::new(Arc::clone(&repo));
    let profiles = ProfileService::new(repo);
    let ctx = demo_context();

    availability
        .save(
            &ctx,
            &meetly_rust::models::WeeklySchedule::default(),
            Default::default(),
        )
        .await?;

    // Saving a profile pushes its timezone onto the schedule row too.
    let draft = ProfileDraft::new("Dana", Timezone::new("Asia/Tokyo")?);
    profiles.save(&ctx, &draft).await?;

    let loaded = availability.load(&ctx).await;
    println!("Schedule timezone now: {}", loaded.schedule.timezone().name());

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Availability Editor Examples\n");

    example_basic_usage().await?;
    example_guarded_save().await?;
    example_editor_session().await?;
    example_conflict_handling().await?;
    example_timezone_sync().await?;

    // Point these at a hosted store by exporting SUPABASE_URL and
    // SUPABASE_API_KEY before running.

    println!("\n✓ All examples completed successfully!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_editor_example_persists() {
        let repo = RepositoryFactory::create_memory();
        let service = AvailabilityService::new(Arc::clone(&repo));

        let mut editor =
            AvailabilityEditor::open(service.clone(), demo_context(), AutosaveOptions::default())
                .await;
        editor.add_interval(Weekday::Monday);
        editor.close().await;

        let loaded = service.load(&demo_context()).await;
        assert_eq!(loaded.revision, Some(1));
    }
}
