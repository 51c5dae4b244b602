//! Gaze detection: which item holds attention, for how long, and in what
//! pattern.
//!
//! The detector is fed one resolved target per frame and emits discrete
//! events. It never reads the clock; callers pass `now_ms` so the whole
//! state machine is deterministic under test.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DWELL_REPORT_INTERVAL_MS, DWELLING_PATTERN_MS, GAZE_HISTORY_LEN, SCANNING_WINDOW_MS,
};
use crate::gallery::Gallery;
use crate::pointing::{self, CameraPose, PointingSource};

/// Behavioral classification of recent gaze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazePattern {
    /// Rapid target changes without settling.
    Scanning,
    /// Sustained attention on one item.
    Dwelling,
    /// Reacquisition of a previously viewed item.
    Returning,
}

/// Discrete gaze event emitted by [`GazeDetector::observe`].
#[derive(Clone, Debug, PartialEq)]
pub enum GazeEvent {
    Start { id: String },
    /// Throttled progress report while gaze is held.
    Dwell { id: String, duration_ms: u64 },
    End { id: String, duration_ms: u64 },
    Pattern { pattern: GazePattern, id: String },
}

/// One entry in the bounded gaze history.
#[derive(Clone, Debug, PartialEq)]
pub struct GazeEntry {
    pub id: String,
    pub acquired_ms: u64,
}

#[derive(Clone, Debug)]
struct CurrentGaze {
    id: String,
    start_ms: u64,
    last_report_ms: u64,
}

#[derive(Default)]
pub struct GazeDetector {
    current: Option<CurrentGaze>,
    viewed: HashSet<String>,
    history: VecDeque<GazeEntry>,
    last_change_ms: Option<u64>,
}

impl GazeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the pointing source against the gallery and feed the result
    /// through [`observe`](Self::observe).
    pub fn detect(
        &mut self,
        now_ms: u64,
        source: &PointingSource,
        camera: &CameraPose,
        aspect: f64,
        gallery: &Gallery,
    ) -> Vec<GazeEvent> {
        let ray = source.ray(camera, aspect);
        let target = pointing::hit_test(&ray, gallery.items())
            .map(|i| gallery.items()[i].id.clone());
        self.observe(now_ms, target.as_deref())
    }

    /// Advance the state machine with this frame's target.
    pub fn observe(&mut self, now_ms: u64, target: Option<&str>) -> Vec<GazeEvent> {
        let mut events = Vec::new();

        if let Some(current) = &mut self.current {
            if target == Some(current.id.as_str()) {
                // Held gaze: throttled dwell reports
                if now_ms.saturating_sub(current.last_report_ms) >= DWELL_REPORT_INTERVAL_MS {
                    current.last_report_ms = now_ms;
                    let duration_ms = now_ms.saturating_sub(current.start_ms);
                    events.push(GazeEvent::Dwell {
                        id: current.id.clone(),
                        duration_ms,
                    });
                    if duration_ms >= DWELLING_PATTERN_MS {
                        events.push(GazeEvent::Pattern {
                            pattern: GazePattern::Dwelling,
                            id: current.id.clone(),
                        });
                    }
                }
                return events;
            }
            let ended = self.current.take();
            if let Some(ended) = ended {
                events.push(GazeEvent::End {
                    id: ended.id,
                    duration_ms: now_ms.saturating_sub(ended.start_ms),
                });
            }
        }

        if let Some(id) = target {
            events.push(GazeEvent::Start { id: id.to_string() });

            // Returning takes precedence over scanning: reacquiring a known
            // item is the stronger signal even when the switch was fast.
            if self.viewed.contains(id) {
                events.push(GazeEvent::Pattern {
                    pattern: GazePattern::Returning,
                    id: id.to_string(),
                });
            } else if let Some(last) = self.last_change_ms {
                if now_ms.saturating_sub(last) < SCANNING_WINDOW_MS {
                    events.push(GazeEvent::Pattern {
                        pattern: GazePattern::Scanning,
                        id: id.to_string(),
                    });
                }
            }

            self.viewed.insert(id.to_string());
            self.history.push_back(GazeEntry {
                id: id.to_string(),
                acquired_ms: now_ms,
            });
            while self.history.len() > GAZE_HISTORY_LEN {
                self.history.pop_front();
            }
            self.last_change_ms = Some(now_ms);
            self.current = Some(CurrentGaze {
                id: id.to_string(),
                start_ms: now_ms,
                last_report_ms: now_ms,
            });
        }

        events
    }

    /// Drop the active gaze, emitting its end event. Viewed items and
    /// history survive; only the in-flight gaze is abandoned.
    pub fn reset(&mut self, now_ms: u64) -> Vec<GazeEvent> {
        match self.current.take() {
            Some(current) => vec![GazeEvent::End {
                id: current.id,
                duration_ms: now_ms.saturating_sub(current.start_ms),
            }],
            None => Vec::new(),
        }
    }

    pub fn current_target(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.id.as_str())
    }

    pub fn current_dwell_ms(&self, now_ms: u64) -> u64 {
        self.current
            .as_ref()
            .map(|c| now_ms.saturating_sub(c.start_ms))
            .unwrap_or(0)
    }

    pub fn history(&self) -> impl Iterator<Item = &GazeEntry> {
        self.history.iter()
    }

    pub fn viewed_count(&self) -> usize {
        self.viewed.len()
    }

    pub fn has_viewed(&self, id: &str) -> bool {
        self.viewed.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(events: &[GazeEvent]) -> Vec<GazePattern> {
        events
            .iter()
            .filter_map(|e| match e {
                GazeEvent::Pattern { pattern, .. } => Some(*pattern),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_and_end() {
        let mut det = GazeDetector::new();
        let events = det.observe(1_000, Some("a"));
        assert_eq!(
            events[0],
            GazeEvent::Start {
                id: "a".to_string()
            }
        );
        let events = det.observe(2_500, None);
        assert_eq!(
            events,
            vec![GazeEvent::End {
                id: "a".to_string(),
                duration_ms: 1_500
            }]
        );
        assert!(det.current_target().is_none());
    }

    #[test]
    fn test_dwell_reports_are_throttled() {
        let mut det = GazeDetector::new();
        det.observe(0, Some("a"));
        assert!(det.observe(200, Some("a")).is_empty());
        let events = det.observe(600, Some("a"));
        assert_eq!(
            events,
            vec![GazeEvent::Dwell {
                id: "a".to_string(),
                duration_ms: 600
            }]
        );
        // Next report only after another full interval
        assert!(det.observe(900, Some("a")).is_empty());
        assert!(!det.observe(1_200, Some("a")).is_empty());
    }

    #[test]
    fn test_dwelling_pattern_repeats_past_threshold() {
        let mut det = GazeDetector::new();
        det.observe(0, Some("a"));
        assert_eq!(patterns(&det.observe(1_000, Some("a"))), vec![]);
        assert_eq!(
            patterns(&det.observe(2_000, Some("a"))),
            vec![GazePattern::Dwelling]
        );
        assert_eq!(
            patterns(&det.observe(2_500, Some("a"))),
            vec![GazePattern::Dwelling]
        );
    }

    #[test]
    fn test_scanning_on_fast_switches() {
        let mut det = GazeDetector::new();
        det.observe(0, Some("a"));
        let events = det.observe(300, Some("b"));
        assert_eq!(patterns(&events), vec![GazePattern::Scanning]);
        // Slow switch is not scanning
        let events = det.observe(2_000, Some("c"));
        assert_eq!(patterns(&events), vec![]);
    }

    #[test]
    fn test_returning_beats_scanning() {
        let mut det = GazeDetector::new();
        det.observe(0, Some("a"));
        det.observe(1_000, Some("b"));
        // Fast switch back to a previously viewed item: returning, not scanning
        let events = det.observe(1_200, Some("a"));
        assert_eq!(patterns(&events), vec![GazePattern::Returning]);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut det = GazeDetector::new();
        for i in 0..25u64 {
            det.observe(i * 1_000, Some(&format!("item-{i}")));
        }
        assert_eq!(det.history().count(), GAZE_HISTORY_LEN);
        assert_eq!(det.history().next().map(|e| e.id.as_str()), Some("item-15"));
    }

    #[test]
    fn test_reset_emits_end_and_keeps_viewed() {
        let mut det = GazeDetector::new();
        det.observe(0, Some("a"));
        let events = det.reset(2_000);
        assert_eq!(
            events,
            vec![GazeEvent::End {
                id: "a".to_string(),
                duration_ms: 2_000
            }]
        );
        assert!(det.reset(3_000).is_empty());
        assert!(det.has_viewed("a"));
    }

    #[test]
    fn test_switch_emits_end_then_start() {
        let mut det = GazeDetector::new();
        det.observe(0, Some("a"));
        let events = det.observe(3_000, Some("b"));
        assert!(matches!(events[0], GazeEvent::End { .. }));
        assert!(matches!(events[1], GazeEvent::Start { .. }));
    }
}
