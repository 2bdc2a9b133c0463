//! Debounced background persistence for schedule edits.
//!
//! Every edit queues the full schedule snapshot; the background task writes
//! the newest one once the debounce window closes, so a burst of edits costs
//! one store round-trip. A checksum of the persisted content suppresses
//! writes that would store what is already stored.
//!
//! There is no automatic retry: a failed write flips the state to
//! [`SaveState::Failed`] and the content stays dirty until the next edit or
//! an explicit flush.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::models::WeeklySchedule;
use crate::session::SessionContext;
use crate::store::{ScheduleDraft, WriteGuard};

use super::availability::{AvailabilityService, LoadedAvailability};

/// Tuning for the autosave loop.
#[derive(Debug, Clone)]
pub struct AutosaveOptions {
    /// How long to wait after the last edit before writing.
    pub debounce: Duration,
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(400),
        }
    }
}

/// Observable state of the autosave loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveState {
    /// Nothing to write.
    Idle,
    /// An edit is waiting out the debounce window.
    Pending,
    /// A write is in flight.
    Saving,
    /// The last write succeeded.
    Saved { revision: i64, at: DateTime<Utc> },
    /// The last write failed. `conflict` means another session changed the
    /// stored row; retrying without reloading cannot succeed.
    Failed { detail: String, conflict: bool },
}

enum Command {
    Edit(WeeklySchedule),
    Flush(oneshot::Sender<()>),
    Close,
}

/// Handle to a background autosave task.
///
/// Dropping the handle stops the task after a final flush of any dirty
/// content; [`Autosaver::close`] does the same but waits for it.
pub struct Autosaver {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SaveState>,
    handle: JoinHandle<()>,
}

impl Autosaver {
    /// Start the autosave task for a loaded schedule.
    ///
    /// The loaded revision seeds the write guard and the loaded content
    /// seeds the checksum, so an untouched schedule is never re-written.
    pub fn spawn(
        service: AvailabilityService,
        ctx: SessionContext,
        loaded: &LoadedAvailability,
        options: AutosaveOptions,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SaveState::Idle);

        let last_saved_checksum = loaded.schedule.encode_timing().ok().map(|timing| {
            ScheduleDraft::new(loaded.schedule.timezone(), timing).content_checksum()
        });

        let worker = Worker {
            service,
            ctx,
            options,
            state: state_tx,
            revision: loaded.revision.unwrap_or(0),
            last_saved_checksum,
            dirty: None,
            deadline: None,
        };
        let handle = tokio::spawn(worker.run(command_rx));

        Self {
            commands: command_tx,
            state: state_rx,
            handle,
        }
    }

    /// Queue the latest schedule snapshot. Restarts the debounce window.
    pub fn push(&self, schedule: WeeklySchedule) {
        let _ = self.commands.send(Command::Edit(schedule));
    }

    /// Write any dirty content now, skipping the remaining debounce wait.
    ///
    /// Returns once the write (or the decision to skip it) has finished.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.commands.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Current save state.
    pub fn state(&self) -> SaveState {
        self.state.borrow().clone()
    }

    /// Watch channel receiving every save state change.
    pub fn subscribe(&self) -> watch::Receiver<SaveState> {
        self.state.clone()
    }

    /// Flush dirty content and stop the background task.
    pub async fn close(self) {
        let _ = self.commands.send(Command::Close);
        let _ = self.handle.await;
    }
}

struct Worker {
    service: AvailabilityService,
    ctx: SessionContext,
    options: AutosaveOptions,
    state: watch::Sender<SaveState>,
    revision: i64,
    last_saved_checksum: Option<String>,
    dirty: Option<WeeklySchedule>,
    deadline: Option<Instant>,
}

impl Worker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            let command = match self.deadline {
                Some(deadline) => {
                    tokio::select! {
                        command = commands.recv() => match command {
                            Some(command) => Some(command),
                            None => break,
                        },
                        _ = sleep_until(deadline) => None,
                    }
                }
                None => match commands.recv().await {
                    Some(command) => Some(command),
                    None => break,
                },
            };

            match command {
                Some(Command::Edit(schedule)) => {
                    self.dirty = Some(schedule);
                    self.deadline = Some(Instant::now() + self.options.debounce);
                    let _ = self.state.send(SaveState::Pending);
                }
                Some(Command::Flush(done)) => {
                    self.write_if_dirty().await;
                    let _ = done.send(());
                }
                Some(Command::Close) => {
                    self.write_if_dirty().await;
                    return;
                }
                // Debounce window expired.
                None => self.write_if_dirty().await,
            }
        }

        // Handle dropped without an explicit close.
        self.write_if_dirty().await;
    }

    async fn write_if_dirty(&mut self) {
        self.deadline = None;
        let schedule = match self.dirty.take() {
            Some(schedule) => schedule,
            None => return,
        };

        let timing = match schedule.encode_timing() {
            Ok(timing) => timing,
            Err(e) => {
                let _ = self.state.send(SaveState::Failed {
                    detail: e.to_string(),
                    conflict: false,
                });
                return;
            }
        };
        let checksum = ScheduleDraft::new(schedule.timezone(), timing).content_checksum();
        if self.last_saved_checksum.as_deref() == Some(checksum.as_str()) {
            // The store already holds this exact content.
            let _ = self.state.send(SaveState::Idle);
            return;
        }

        let _ = self.state.send(SaveState::Saving);
        let guard = WriteGuard::ExpectRevision(self.revision);
        match self.service.save(&self.ctx, &schedule, guard).await {
            Ok(receipt) => {
                self.revision = receipt.record.revision;
                self.last_saved_checksum = Some(checksum);
                for warning in &receipt.warnings {
                    log::warn!("Autosave warning for {}: {}", self.ctx.user_id, warning);
                }
                let _ = self.state.send(SaveState::Saved {
                    revision: receipt.record.revision,
                    at: receipt.record.updated_at.unwrap_or_else(Utc::now),
                });
            }
            Err(e) => {
                log::warn!("Autosave failed for {}: {}", self.ctx.user_id, e);
                // Keep the content dirty so the next edit or flush retries.
                self.dirty = Some(schedule);
                let _ = self.state.send(SaveState::Failed {
                    conflict: e.is_revision_conflict(),
                    detail: e.to_string(),
                });
            }
        }
    }
}
