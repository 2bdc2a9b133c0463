//! Stateful editing session for a user's weekly availability.
//!
//! The editor owns the working copy of the schedule. Every mutation updates
//! the copy and queues it for autosave, so callers never issue an explicit
//! save; they watch [`SaveState`] instead.

use tokio::sync::watch;

use crate::models::{Endpoint, TimeInterval, TimeOfDay, Timezone, Weekday, WeeklySchedule};
use crate::session::SessionContext;

use super::autosave::{AutosaveOptions, Autosaver, SaveState};
use super::availability::{AvailabilityService, LoadSource, LoadWarning, LoadedAvailability};

/// An open availability editing session.
pub struct AvailabilityEditor {
    schedule: WeeklySchedule,
    autosaver: Autosaver,
    source: LoadSource,
    warnings: Vec<LoadWarning>,
}

impl AvailabilityEditor {
    /// Load the user's availability and start the autosave loop.
    ///
    /// Open always succeeds; load problems appear in [`Self::load_warnings`]
    /// and the editor starts from the best schedule available.
    pub async fn open(
        service: AvailabilityService,
        ctx: SessionContext,
        options: AutosaveOptions,
    ) -> Self {
        let loaded = service.load(&ctx).await;
        let autosaver = Autosaver::spawn(service, ctx, &loaded, options);
        let LoadedAvailability {
            schedule,
            source,
            warnings,
            ..
        } = loaded;

        Self {
            schedule,
            autosaver,
            source,
            warnings,
        }
    }

    /// The current working copy.
    pub fn schedule(&self) -> &WeeklySchedule {
        &self.schedule
    }

    /// Where the working copy came from at open time.
    pub fn source(&self) -> LoadSource {
        self.source
    }

    /// Non-fatal problems from the open-time load.
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Append a fresh midnight-to-midnight interval to a day.
    pub fn add_interval(&mut self, day: Weekday) {
        self.schedule.add_interval(day);
        self.queue();
    }

    /// Append a specific interval to a day.
    pub fn push_interval(&mut self, day: Weekday, interval: TimeInterval) {
        self.schedule.push_interval(day, interval);
        self.queue();
    }

    /// Remove one interval from a day. Out-of-range indices are a no-op.
    pub fn remove_interval(&mut self, day: Weekday, index: usize) -> bool {
        let removed = self.schedule.remove_interval(day, index);
        if removed {
            self.queue();
        }
        removed
    }

    /// Change the start of one interval. Out-of-range indices are a no-op.
    pub fn set_interval_start(&mut self, day: Weekday, index: usize, value: TimeOfDay) -> bool {
        let changed = self
            .schedule
            .set_endpoint(day, index, Endpoint::Start, value);
        if changed {
            self.queue();
        }
        changed
    }

    /// Change the end of one interval. Out-of-range indices are a no-op.
    pub fn set_interval_end(&mut self, day: Weekday, index: usize, value: TimeOfDay) -> bool {
        let changed = self.schedule.set_endpoint(day, index, Endpoint::End, value);
        if changed {
            self.queue();
        }
        changed
    }

    /// Switch the schedule's timezone. Intervals keep their wall-clock times.
    pub fn set_timezone(&mut self, timezone: Timezone) {
        self.schedule.set_timezone(timezone);
        self.queue();
    }

    /// Positions of intervals that do not end after they start.
    ///
    /// Advisory only; nothing blocks saving a flagged interval.
    pub fn violations(&self) -> Vec<(Weekday, usize)> {
        self.schedule.violations()
    }

    /// Current state of the autosave loop.
    pub fn save_state(&self) -> SaveState {
        self.autosaver.state()
    }

    /// Watch channel receiving every save state change.
    pub fn subscribe(&self) -> watch::Receiver<SaveState> {
        self.autosaver.subscribe()
    }

    /// Persist any unsaved edits now.
    pub async fn flush(&self) {
        self.autosaver.flush().await;
    }

    /// Persist any unsaved edits and end the session.
    pub async fn close(self) {
        self.autosaver.close().await;
    }

    fn queue(&self) {
        self.autosaver.push(self.schedule.clone());
    }
}
