//! Gym occupancy tracking.
//!
//! The tracker owns the live head count and a bounded FIFO log of updates.
//! It is mutated only through [`OccupancyTracker::record_event`]; use
//! [`SharedOccupancy`] when several request handlers update it concurrently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Maximum number of people in the gym
pub const MAX_CAPACITY: u32 = 50;

/// Number of events the log retains
pub const LOG_CAPACITY: usize = 50;

/// Live count after an update
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OccupancyState {
    pub current_count: u32,
}

/// One logged occupancy update
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OccupancyEvent {
    pub count: u32,
    pub timestamp: DateTime<Utc>,
    pub action: String,
}

/// Crowding level derived from the head count
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum OccupancyStatus {
    #[serde(rename = "Not Crowded")]
    NotCrowded,
    Moderate,
    Busy,
    #[serde(rename = "Very Crowded")]
    VeryCrowded,
}

impl OccupancyStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OccupancyStatus::NotCrowded => "Not Crowded",
            OccupancyStatus::Moderate => "Moderate",
            OccupancyStatus::Busy => "Busy",
            OccupancyStatus::VeryCrowded => "Very Crowded",
        }
    }
}

impl fmt::Display for OccupancyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rounded percentage of [`MAX_CAPACITY`]
pub fn occupancy_percentage(count: u32) -> u32 {
    (f64::from(count) / f64::from(MAX_CAPACITY) * 100.0).round() as u32
}

/// Crowding status for a head count
pub fn occupancy_status(count: u32) -> OccupancyStatus {
    match occupancy_percentage(count) {
        pct if pct < 30 => OccupancyStatus::NotCrowded,
        pct if pct < 60 => OccupancyStatus::Moderate,
        pct if pct < 85 => OccupancyStatus::Busy,
        _ => OccupancyStatus::VeryCrowded,
    }
}

/// Everything a member-facing occupancy view shows
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OccupancySnapshot {
    pub count: u32,
    pub max_capacity: u32,
    pub percentage: u32,
    pub status: OccupancyStatus,
    pub recent_log: Vec<OccupancyEvent>,
}

/// Live head count plus bounded event log
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "StoredTracker")]
pub struct OccupancyTracker {
    current_count: u32,
    log: VecDeque<OccupancyEvent>,
}

/// On-disk form; re-checked on load so a hand-edited file cannot break the
/// count range or the log bound
#[derive(Deserialize)]
struct StoredTracker {
    #[serde(default)]
    current_count: u32,
    #[serde(default)]
    log: VecDeque<OccupancyEvent>,
}

impl From<StoredTracker> for OccupancyTracker {
    fn from(stored: StoredTracker) -> Self {
        let mut log = stored.log;
        while log.len() > LOG_CAPACITY {
            log.pop_front();
        }
        Self {
            current_count: stored.current_count.min(MAX_CAPACITY),
            log,
        }
    }
}

impl OccupancyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the head count and log the update
    ///
    /// Counts outside `[0, MAX_CAPACITY]` are clamped, not rejected. When the
    /// log is full the oldest event is evicted first.
    pub fn record_event(
        &mut self,
        new_count: i64,
        action: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> OccupancyState {
        let count = new_count.clamp(0, i64::from(MAX_CAPACITY)) as u32;
        if i64::from(count) != new_count {
            tracing::debug!("Clamped occupancy count {} to {}", new_count, count);
        }

        if self.log.len() >= LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(OccupancyEvent {
            count,
            timestamp,
            action: action.into(),
        });
        self.current_count = count;

        tracing::info!("Gym occupancy set to {}/{}", count, MAX_CAPACITY);
        self.state()
    }

    pub fn state(&self) -> OccupancyState {
        OccupancyState {
            current_count: self.current_count,
        }
    }

    pub fn current_count(&self) -> u32 {
        self.current_count
    }

    pub fn status(&self) -> OccupancyStatus {
        occupancy_status(self.current_count)
    }

    /// Last `n` events, oldest first
    pub fn recent_events(&self, n: usize) -> Vec<OccupancyEvent> {
        let skip = self.log.len().saturating_sub(n);
        self.log.iter().skip(skip).cloned().collect()
    }

    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    /// Count, status and the last `recent` events
    pub fn snapshot(&self, recent: usize) -> OccupancySnapshot {
        OccupancySnapshot {
            count: self.current_count,
            max_capacity: MAX_CAPACITY,
            percentage: occupancy_percentage(self.current_count),
            status: self.status(),
            recent_log: self.recent_events(recent),
        }
    }
}

/// Cloneable handle that serialises access to one tracker
#[derive(Clone, Debug, Default)]
pub struct SharedOccupancy {
    inner: Arc<Mutex<OccupancyTracker>>,
}

impl SharedOccupancy {
    pub fn new(tracker: OccupancyTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, OccupancyTracker> {
        // A panic while holding the lock cannot leave the tracker half-updated
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_event(
        &self,
        new_count: i64,
        action: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> OccupancyState {
        self.lock().record_event(new_count, action, timestamp)
    }

    /// Consistent view taken under the lock
    pub fn snapshot(&self, recent: usize) -> OccupancySnapshot {
        self.lock().snapshot(recent)
    }

    /// Copy of the whole tracker, e.g. for persisting
    pub fn tracker(&self) -> OccupancyTracker {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::thread;

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_225_600, 0).unwrap() + Duration::minutes(minutes)
    }

    #[test]
    fn test_counts_are_clamped() {
        let mut tracker = OccupancyTracker::new();
        assert_eq!(tracker.record_event(75, "rush", at(0)).current_count, 50);
        assert_eq!(tracker.record_event(-5, "closing", at(1)).current_count, 0);
        assert_eq!(tracker.record_event(23, "manual update", at(2)).current_count, 23);

        let events = tracker.recent_events(3);
        assert_eq!(events.iter().map(|e| e.count).collect::<Vec<_>>(), vec![50, 0, 23]);
    }

    #[test]
    fn test_full_log_evicts_oldest() {
        let mut tracker = OccupancyTracker::new();
        for i in 0..50 {
            tracker.record_event(i % 40, format!("event {}", i), at(i));
        }
        assert_eq!(tracker.log_len(), 50);

        tracker.record_event(10, "event 50", at(50));
        assert_eq!(tracker.log_len(), 50);

        let events = tracker.recent_events(LOG_CAPACITY);
        assert_eq!(events.first().unwrap().action, "event 1");
        assert_eq!(events.last().unwrap().action, "event 50");

        for i in 51..120 {
            tracker.record_event(5, format!("event {}", i), at(i));
            assert!(tracker.log_len() <= LOG_CAPACITY);
        }
    }

    #[test]
    fn test_recent_events_oldest_first_and_bounded() {
        let mut tracker = OccupancyTracker::new();
        assert!(tracker.recent_events(10).is_empty());

        for i in 0..4 {
            tracker.record_event(i, format!("event {}", i), at(i));
        }

        let recent = tracker.recent_events(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, "event 2");
        assert_eq!(recent[1].action, "event 3");
        assert_eq!(tracker.recent_events(10).len(), 4);
        assert!(tracker.recent_events(0).is_empty());
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(occupancy_percentage(14), 28);
        assert_eq!(occupancy_status(14), OccupancyStatus::NotCrowded);
        assert_eq!(occupancy_status(15), OccupancyStatus::Moderate);
        assert_eq!(occupancy_percentage(30), 60);
        assert_eq!(occupancy_status(30), OccupancyStatus::Busy);
        assert_eq!(occupancy_status(42), OccupancyStatus::Busy);
        assert_eq!(occupancy_status(43), OccupancyStatus::VeryCrowded);
        assert_eq!(occupancy_status(0), OccupancyStatus::NotCrowded);
        assert_eq!(occupancy_status(50), OccupancyStatus::VeryCrowded);
        assert_eq!(OccupancyStatus::VeryCrowded.to_string(), "Very Crowded");
    }

    #[test]
    fn test_status_serialises_as_label() {
        for status in [
            OccupancyStatus::NotCrowded,
            OccupancyStatus::Moderate,
            OccupancyStatus::Busy,
            OccupancyStatus::VeryCrowded,
        ] {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.label());
            let back: OccupancyStatus = serde_json::from_value(json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_snapshot() {
        let mut tracker = OccupancyTracker::new();
        for i in 0..12 {
            tracker.record_event(20 + i, "check-in", at(i));
        }

        let snapshot = tracker.snapshot(10);
        assert_eq!(snapshot.count, 31);
        assert_eq!(snapshot.max_capacity, 50);
        assert_eq!(snapshot.percentage, 62);
        assert_eq!(snapshot.status, OccupancyStatus::Busy);
        assert_eq!(snapshot.recent_log.len(), 10);
        assert_eq!(snapshot.recent_log[0].count, 22);
    }

    #[test]
    fn test_stored_tracker_is_normalised() {
        let event = r#"{"count": 5, "timestamp": "2026-01-01T00:00:00Z", "action": "x"}"#;
        let events = vec![event; 60].join(",");
        let json = format!(r#"{{"current_count": 99, "log": [{}]}}"#, events);

        let tracker: OccupancyTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(tracker.current_count(), 50);
        assert_eq!(tracker.log_len(), 50);

        let empty: OccupancyTracker = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, OccupancyTracker::new());
    }

    #[test]
    fn test_shared_updates_are_not_lost() {
        let shared = SharedOccupancy::default();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..5 {
                        shared.record_event(t * 5 + i, format!("thread {}", t), at(i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let tracker = shared.tracker();
        assert_eq!(tracker.log_len(), 40);
        let snapshot = shared.snapshot(LOG_CAPACITY);
        assert_eq!(snapshot.recent_log.len(), 40);
        assert_eq!(snapshot.count, snapshot.recent_log.last().unwrap().count);
    }
}
