//! The weekly availability model.
//!
//! A [`WeeklySchedule`] is seven weekday buckets of [`TimeInterval`]s plus
//! the IANA timezone they are interpreted in. Buckets are edited in place by
//! discrete operations (add, remove, endpoint change); the persistence layer
//! stores the buckets as one JSON text column, decoded here in two stages
//! (raw serde shape first, then typed validation) so malformed stored data
//! produces a precise [`ScheduleParseError`] instead of a panic.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use super::time::{TimeOfDay, TimeParseError};
use super::timezone::Timezone;

/// Day-of-week key for availability buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All seven days in display order (Monday first). Serialization emits
    /// keys in this order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Bucket index in [`Weekday::ALL`] order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The capitalized English name used as the persisted JSON key.
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Look up a day by its persisted JSON key. Case-sensitive: stored data
    /// always uses the capitalized form.
    pub fn from_name(name: &str) -> Option<Weekday> {
        Weekday::ALL.into_iter().find(|day| day.name() == name)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which endpoint of an interval an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

/// A start/end pair within one day.
///
/// Endpoints are independent wall-clock values; nothing forces `start` to
/// precede `end`. [`TimeInterval::is_well_ordered`] reports the soft
/// invariant the UI surfaces to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeInterval {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// Whether the start hour falls strictly before the end hour.
    ///
    /// The comparison deliberately ignores minutes, matching the original
    /// form check, so `9:30`-`9:45` is flagged even though its wall-clock
    /// order is fine. Advisory only: ill-ordered intervals are kept and
    /// persisted.
    pub fn is_well_ordered(&self) -> bool {
        self.start.hour() < self.end.hour()
    }
}

impl Default for TimeInterval {
    /// The `0:00`-`0:00` placeholder appended for a newly added interval.
    fn default() -> Self {
        Self {
            start: TimeOfDay::MIDNIGHT,
            end: TimeOfDay::MIDNIGHT,
        }
    }
}

/// Error raised when persisted timing text cannot be encoded or decoded.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleParseError {
    /// The timing payload is not valid JSON of the expected shape.
    #[error("Invalid timing JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A top-level key does not name one of the seven weekdays.
    #[error("Unknown weekday key '{key}' in timing data")]
    UnknownDay { key: String },

    /// An interval endpoint is not a parseable `H:MM` value.
    #[error("Invalid {endpoint} time for {day} interval {index}: {source}")]
    Time {
        day: Weekday,
        index: usize,
        endpoint: &'static str,
        source: TimeParseError,
    },
}

/// Raw wire shape of one interval, before time values are validated.
#[derive(Deserialize)]
struct RawInterval {
    start: String,
    end: String,
}

/// Seven ordered weekday buckets of availability intervals.
///
/// This is exactly the structure the persisted `timing` column encodes; the
/// timezone lives in a separate column and therefore in [`WeeklySchedule`],
/// not here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeekPlan {
    buckets: [Vec<TimeInterval>; 7],
}

impl WeekPlan {
    /// An empty plan: every day unavailable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intervals for one day, in insertion order.
    pub fn intervals(&self, day: Weekday) -> &[TimeInterval] {
        &self.buckets[day.index()]
    }

    /// Iterate days in display order with their intervals.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[TimeInterval])> {
        Weekday::ALL
            .into_iter()
            .map(|day| (day, self.buckets[day.index()].as_slice()))
    }

    /// Total interval count across all days.
    pub fn total_intervals(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Append the `0:00`-`0:00` placeholder interval to a day.
    pub fn add_interval(&mut self, day: Weekday) {
        self.push_interval(day, TimeInterval::default());
    }

    /// Append a specific interval to a day.
    pub fn push_interval(&mut self, day: Weekday, interval: TimeInterval) {
        self.buckets[day.index()].push(interval);
    }

    /// Remove the interval at `index` from a day.
    ///
    /// Returns `false` when the index is out of range; that case is a benign
    /// no-op, never an error.
    pub fn remove_interval(&mut self, day: Weekday, index: usize) -> bool {
        let bucket = &mut self.buckets[day.index()];
        if index < bucket.len() {
            bucket.remove(index);
            true
        } else {
            false
        }
    }

    /// Replace one endpoint of the interval at `index`.
    ///
    /// Returns `false` when the index is out of range (benign no-op).
    pub fn set_endpoint(
        &mut self,
        day: Weekday,
        index: usize,
        endpoint: Endpoint,
        value: TimeOfDay,
    ) -> bool {
        let bucket = &mut self.buckets[day.index()];
        match bucket.get_mut(index) {
            Some(interval) => {
                match endpoint {
                    Endpoint::Start => interval.start = value,
                    Endpoint::End => interval.end = value,
                }
                true
            }
            None => false,
        }
    }

    /// Positions of intervals violating the start-before-end check, in
    /// display order.
    pub fn violations(&self) -> Vec<(Weekday, usize)> {
        let mut found = Vec::new();
        for (day, intervals) in self.iter() {
            for (index, interval) in intervals.iter().enumerate() {
                if !interval.is_well_ordered() {
                    found.push((day, index));
                }
            }
        }
        found
    }

    /// Decode the persisted timing JSON into a plan.
    ///
    /// Stage one parses the raw JSON shape (day name to interval list with
    /// string endpoints); stage two validates day names and time values.
    /// Days absent from the payload come back as empty buckets; unknown keys
    /// and unparseable times are typed errors so callers can fall back to a
    /// default plan and surface a warning.
    pub fn from_timing(timing: &str) -> Result<Self, ScheduleParseError> {
        let raw: HashMap<String, Vec<RawInterval>> = serde_json::from_str(timing)?;

        let mut plan = WeekPlan::new();
        for (key, raw_intervals) in raw {
            let day = Weekday::from_name(&key)
                .ok_or(ScheduleParseError::UnknownDay { key: key.clone() })?;

            for (index, raw_interval) in raw_intervals.into_iter().enumerate() {
                let start: TimeOfDay =
                    raw_interval
                        .start
                        .parse()
                        .map_err(|source| ScheduleParseError::Time {
                            day,
                            index,
                            endpoint: "start",
                            source,
                        })?;
                let end: TimeOfDay =
                    raw_interval
                        .end
                        .parse()
                        .map_err(|source| ScheduleParseError::Time {
                            day,
                            index,
                            endpoint: "end",
                            source,
                        })?;
                plan.push_interval(day, TimeInterval::new(start, end));
            }
        }

        Ok(plan)
    }

    /// Encode the plan as the persisted timing JSON text.
    ///
    /// All seven day keys are emitted, empty days included, in Monday-first
    /// display order.
    pub fn to_timing(&self) -> Result<String, ScheduleParseError> {
        serde_json::to_string(self).map_err(ScheduleParseError::Json)
    }
}

impl Serialize for WeekPlan {
    // Hand-rolled so keys come out in display order rather than the
    // alphabetical order a map type would impose.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Weekday::ALL.len()))?;
        for day in Weekday::ALL {
            map.serialize_entry(day.name(), &self.buckets[day.index()])?;
        }
        map.end()
    }
}

/// The weekly availability model: a [`WeekPlan`] interpreted in an IANA
/// timezone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeeklySchedule {
    timezone: Timezone,
    plan: WeekPlan,
}

impl WeeklySchedule {
    /// An empty schedule in the given timezone.
    pub fn new(timezone: Timezone) -> Self {
        Self {
            timezone,
            plan: WeekPlan::new(),
        }
    }

    /// Assemble a schedule from a decoded plan and its timezone.
    pub fn from_parts(timezone: Timezone, plan: WeekPlan) -> Self {
        Self { timezone, plan }
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    pub fn set_timezone(&mut self, timezone: Timezone) {
        self.timezone = timezone;
    }

    pub fn plan(&self) -> &WeekPlan {
        &self.plan
    }

    /// Append a `0:00`-`0:00` placeholder interval to a day.
    pub fn add_interval(&mut self, day: Weekday) {
        self.plan.add_interval(day);
    }

    /// Append a specific interval to a day.
    pub fn push_interval(&mut self, day: Weekday, interval: TimeInterval) {
        self.plan.push_interval(day, interval);
    }

    /// Remove the interval at `index`; out of range is a benign no-op.
    pub fn remove_interval(&mut self, day: Weekday, index: usize) -> bool {
        self.plan.remove_interval(day, index)
    }

    /// Replace one endpoint of an interval; out of range is a benign no-op.
    pub fn set_endpoint(
        &mut self,
        day: Weekday,
        index: usize,
        endpoint: Endpoint,
        value: TimeOfDay,
    ) -> bool {
        self.plan.set_endpoint(day, index, endpoint, value)
    }

    pub fn intervals(&self, day: Weekday) -> &[TimeInterval] {
        self.plan.intervals(day)
    }

    /// Positions of intervals violating the start-before-end check.
    pub fn violations(&self) -> Vec<(Weekday, usize)> {
        self.plan.violations()
    }

    /// Encode the day buckets as persisted timing text. The timezone is
    /// stored separately and is not part of this payload.
    pub fn encode_timing(&self) -> Result<String, ScheduleParseError> {
        self.plan.to_timing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(raw: &str) -> TimeOfDay {
        raw.parse().unwrap()
    }

    fn interval(start: &str, end: &str) -> TimeInterval {
        TimeInterval::new(time(start), time(end))
    }

    #[test]
    fn test_add_interval_appends_midnight_placeholder() {
        let mut plan = WeekPlan::new();
        plan.add_interval(Weekday::Monday);

        assert_eq!(plan.intervals(Weekday::Monday).len(), 1);
        assert_eq!(plan.intervals(Weekday::Monday)[0], TimeInterval::default());
        assert_eq!(plan.intervals(Weekday::Monday)[0].start.to_string(), "0:00");
    }

    #[test]
    fn test_remove_interval_decrements_only_that_day() {
        let mut plan = WeekPlan::new();
        plan.push_interval(Weekday::Monday, interval("9:00", "17:00"));
        plan.push_interval(Weekday::Monday, interval("18:00", "20:00"));
        plan.push_interval(Weekday::Friday, interval("10:00", "12:00"));
        let before = plan.total_intervals();

        assert!(plan.remove_interval(Weekday::Monday, 0));

        assert_eq!(plan.total_intervals(), before - 1);
        assert_eq!(plan.intervals(Weekday::Monday).len(), 1);
        assert_eq!(plan.intervals(Weekday::Monday)[0], interval("18:00", "20:00"));
        assert_eq!(plan.intervals(Weekday::Friday).len(), 1);
    }

    #[test]
    fn test_remove_interval_on_empty_day_is_noop() {
        let mut plan = WeekPlan::new();
        assert!(!plan.remove_interval(Weekday::Tuesday, 0));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_remove_interval_out_of_range_is_noop() {
        let mut plan = WeekPlan::new();
        plan.push_interval(Weekday::Monday, interval("9:00", "17:00"));

        assert!(!plan.remove_interval(Weekday::Monday, 5));
        assert_eq!(plan.intervals(Weekday::Monday).len(), 1);
    }

    #[test]
    fn test_add_then_remove_round_trips() {
        let mut plan = WeekPlan::new();
        plan.push_interval(Weekday::Wednesday, interval("8:00", "12:00"));
        let snapshot = plan.clone();

        plan.add_interval(Weekday::Wednesday);
        assert_ne!(plan, snapshot);

        assert!(plan.remove_interval(Weekday::Wednesday, 1));
        assert_eq!(plan, snapshot);
    }

    #[test]
    fn test_set_endpoint_updates_in_place() {
        let mut plan = WeekPlan::new();
        plan.add_interval(Weekday::Monday);

        assert!(plan.set_endpoint(Weekday::Monday, 0, Endpoint::Start, time("9:00")));
        assert!(plan.set_endpoint(Weekday::Monday, 0, Endpoint::End, time("17:00")));

        assert_eq!(plan.intervals(Weekday::Monday)[0], interval("9:00", "17:00"));
    }

    #[test]
    fn test_set_endpoint_out_of_range_is_noop() {
        let mut plan = WeekPlan::new();
        assert!(!plan.set_endpoint(Weekday::Sunday, 0, Endpoint::Start, time("9:00")));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_well_ordered_truth_table() {
        assert!(interval("9:00", "17:00").is_well_ordered());
        assert!(!interval("17:00", "9:00").is_well_ordered());
        assert!(!interval("9:00", "9:00").is_well_ordered());
    }

    #[test]
    fn test_well_ordered_ignores_minutes() {
        // Same hour, later minutes: still flagged, hour comparison only.
        assert!(!interval("9:30", "9:45").is_well_ordered());
    }

    #[test]
    fn test_violations_positions() {
        let mut plan = WeekPlan::new();
        plan.push_interval(Weekday::Monday, interval("9:00", "17:00"));
        plan.push_interval(Weekday::Monday, interval("20:00", "18:00"));
        plan.push_interval(Weekday::Sunday, interval("7:00", "7:00"));

        assert_eq!(
            plan.violations(),
            vec![(Weekday::Monday, 1), (Weekday::Sunday, 0)]
        );
    }

    #[test]
    fn test_timing_emits_all_days_in_display_order() {
        let timing = WeekPlan::new().to_timing().unwrap();
        assert_eq!(
            timing,
            r#"{"Monday":[],"Tuesday":[],"Wednesday":[],"Thursday":[],"Friday":[],"Saturday":[],"Sunday":[]}"#
        );
    }

    #[test]
    fn test_timing_interval_shape() {
        let mut plan = WeekPlan::new();
        plan.push_interval(Weekday::Monday, interval("9:00", "17:00"));

        let timing = plan.to_timing().unwrap();
        assert!(timing.starts_with(r#"{"Monday":[{"start":"9:00","end":"17:00"}]"#));
    }

    #[test]
    fn test_timing_round_trip() {
        let mut plan = WeekPlan::new();
        plan.push_interval(Weekday::Monday, interval("9:00", "17:00"));
        plan.push_interval(Weekday::Monday, interval("18:00", "20:00"));
        plan.push_interval(Weekday::Saturday, interval("10:00", "14:00"));

        let timing = plan.to_timing().unwrap();
        let decoded = WeekPlan::from_timing(&timing).unwrap();
        assert_eq!(decoded, plan);
    }

    #[test]
    fn test_from_timing_missing_days_default_empty() {
        let plan = WeekPlan::from_timing(r#"{"Monday":[{"start":"9:00","end":"17:00"}]}"#).unwrap();

        assert_eq!(plan.intervals(Weekday::Monday).len(), 1);
        for day in Weekday::ALL.into_iter().skip(1) {
            assert!(plan.intervals(day).is_empty(), "{} should be empty", day);
        }
    }

    #[test]
    fn test_from_timing_rejects_non_json() {
        let result = WeekPlan::from_timing("not valid data");
        assert!(matches!(result, Err(ScheduleParseError::Json(_))));
    }

    #[test]
    fn test_from_timing_rejects_wrong_shape() {
        let result = WeekPlan::from_timing(r#"["Monday"]"#);
        assert!(matches!(result, Err(ScheduleParseError::Json(_))));
    }

    #[test]
    fn test_from_timing_rejects_unknown_day() {
        let result = WeekPlan::from_timing(r#"{"Funday":[]}"#);
        match result {
            Err(ScheduleParseError::UnknownDay { key }) => assert_eq!(key, "Funday"),
            other => panic!("Expected UnknownDay, got {:?}", other),
        }
    }

    #[test]
    fn test_from_timing_day_keys_are_case_sensitive() {
        let result = WeekPlan::from_timing(r#"{"monday":[]}"#);
        assert!(matches!(
            result,
            Err(ScheduleParseError::UnknownDay { .. })
        ));
    }

    #[test]
    fn test_from_timing_rejects_bad_time_value() {
        let result =
            WeekPlan::from_timing(r#"{"Tuesday":[{"start":"9:00","end":"whenever"}]}"#);
        match result {
            Err(ScheduleParseError::Time {
                day,
                index,
                endpoint,
                ..
            }) => {
                assert_eq!(day, Weekday::Tuesday);
                assert_eq!(index, 0);
                assert_eq!(endpoint, "end");
            }
            other => panic!("Expected Time error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_timing_accepts_minute_precision() {
        let plan = WeekPlan::from_timing(r#"{"Friday":[{"start":"9:30","end":"17:15"}]}"#).unwrap();
        assert_eq!(plan.intervals(Weekday::Friday)[0], interval("9:30", "17:15"));
    }

    #[test]
    fn test_weekday_lookup() {
        assert_eq!(Weekday::from_name("Monday"), Some(Weekday::Monday));
        assert_eq!(Weekday::from_name("Sunday"), Some(Weekday::Sunday));
        assert_eq!(Weekday::from_name("monday"), None);
        assert_eq!(Weekday::from_name(""), None);
    }

    #[test]
    fn test_weekday_all_matches_indices() {
        for (position, day) in Weekday::ALL.into_iter().enumerate() {
            assert_eq!(day.index(), position);
        }
    }

    #[test]
    fn test_weekly_schedule_defaults() {
        let schedule = WeeklySchedule::default();
        assert_eq!(schedule.timezone().name(), "America/Los_Angeles");
        assert!(schedule.plan().is_empty());
    }

    #[test]
    fn test_weekly_schedule_edit_scenario() {
        // Add an interval to Monday, set 9:00-17:00, persist and reload.
        let mut schedule = WeeklySchedule::default();
        schedule.add_interval(Weekday::Monday);
        schedule.set_endpoint(Weekday::Monday, 0, Endpoint::Start, time("9:00"));
        schedule.set_endpoint(Weekday::Monday, 0, Endpoint::End, time("17:00"));

        let timing = schedule.encode_timing().unwrap();
        assert!(timing.contains(r#""Monday":[{"start":"9:00","end":"17:00"}]"#));

        let reloaded = WeeklySchedule::from_parts(
            schedule.timezone(),
            WeekPlan::from_timing(&timing).unwrap(),
        );
        assert_eq!(reloaded, schedule);
    }

    #[test]
    fn test_weekly_schedule_set_timezone() {
        let mut schedule = WeeklySchedule::default();
        let berlin = Timezone::new("Europe/Berlin").unwrap();

        schedule.set_timezone(berlin);
        assert_eq!(schedule.timezone(), berlin);
        // Timezone changes never touch the buckets.
        assert!(schedule.plan().is_empty());
    }
}
