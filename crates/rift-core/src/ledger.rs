//! Attention ledger: cross-visit memory of what a visitor looked at.
//!
//! Every mutation persists a full snapshot so an abrupt tab close loses at
//! most the in-flight event. Storage is treated as hostile: quota errors
//! trigger progressively harsher pruning, and a second failure resets to a
//! minimal state rather than growing unboundedly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AGGRESSIVE_VISIT_KEEP, MAX_TRACKED_ITEMS, MAX_VISIT_TIMESTAMPS, STATE_SIZE_LIMIT_BYTES,
};
use crate::gaze::GazePattern;
use crate::ports::Persistence;

/// Per-item attention record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionRecord {
    pub view_count: u32,
    pub total_dwell_ms: u64,
    pub first_viewed_ms: u64,
    pub last_viewed_ms: u64,
}

/// Counts of detected gaze patterns across all visits.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternCounts {
    pub scanning: u32,
    pub dwelling: u32,
    pub returning: u32,
}

impl PatternCounts {
    fn bump(&mut self, pattern: GazePattern) {
        match pattern {
            GazePattern::Scanning => self.scanning += 1,
            GazePattern::Dwelling => self.dwelling += 1,
            GazePattern::Returning => self.returning += 1,
        }
    }
}

/// Visit bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitStats {
    pub count: u32,
    pub first_ms: u64,
    pub last_ms: u64,
    pub timestamps: Vec<u64>,
}

/// Complete persisted state, serialized as one JSON document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    pub version: u32,
    pub visits: VisitStats,
    pub total_gaze_ms: u64,
    pub total_dwell_ms: u64,
    pub items: HashMap<String, AttentionRecord>,
    #[serde(default)]
    pub patterns: PatternCounts,
}

pub const LEDGER_VERSION: u32 = 1;

impl LedgerState {
    pub fn experience_level(&self) -> ExperienceLevel {
        match self.visits.count {
            0 | 1 => ExperienceLevel::FirstVisit,
            2..=5 => ExperienceLevel::Returning,
            6..=10 => ExperienceLevel::Familiar,
            _ => ExperienceLevel::Devoted,
        }
    }
}

/// Parameters derived from accumulated attention, consumed by the rupture
/// engine and the audio layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdaptiveParameters {
    pub dwell_threshold_ms: u64,
    pub rupture_intensity: f64,
    pub transition_speed_ms: u64,
    pub audio_volume: f64,
}

/// Coarse visitor familiarity, derived from visit count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    FirstVisit,
    Returning,
    Familiar,
    Devoted,
}

pub struct AttentionLedger {
    state: LedgerState,
    store: Box<dyn Persistence>,
}

impl AttentionLedger {
    /// Load persisted state (or start fresh), count this visit, and save.
    pub fn open(mut store: Box<dyn Persistence>, now_ms: u64) -> Self {
        let state = match store.load() {
            Ok(Some(state)) if state.version == LEDGER_VERSION => state,
            Ok(Some(state)) => {
                tracing::warn!(version = state.version, "unknown ledger version, resetting");
                LedgerState::default()
            }
            Ok(None) => LedgerState::default(),
            Err(err) => {
                tracing::warn!(%err, "ledger load failed, starting fresh");
                LedgerState::default()
            }
        };
        let mut ledger = Self { state, store };
        ledger.state.version = LEDGER_VERSION;
        ledger.track_visit(now_ms);
        ledger.persist();
        ledger
    }

    fn track_visit(&mut self, now_ms: u64) {
        let visits = &mut self.state.visits;
        visits.count += 1;
        if visits.first_ms == 0 {
            visits.first_ms = now_ms;
        }
        visits.last_ms = now_ms;
        visits.timestamps.push(now_ms);
        if visits.timestamps.len() > MAX_VISIT_TIMESTAMPS {
            let excess = visits.timestamps.len() - MAX_VISIT_TIMESTAMPS;
            visits.timestamps.drain(..excess);
        }
    }

    /// A gaze landed on an item.
    pub fn record_gaze_start(&mut self, id: &str, now_ms: u64) {
        let record = self.state.items.entry(id.to_string()).or_default();
        record.view_count += 1;
        if record.first_viewed_ms == 0 {
            record.first_viewed_ms = now_ms;
        }
        record.last_viewed_ms = now_ms;
        self.persist();
    }

    /// Additional dwell time accumulated on an item since the last report.
    pub fn record_gaze_dwell(&mut self, id: &str, delta_ms: u64) {
        self.state.total_dwell_ms += delta_ms;
        if let Some(record) = self.state.items.get_mut(id) {
            record.total_dwell_ms += delta_ms;
        }
        self.persist();
    }

    /// A gaze ended after `duration_ms` of continuous attention.
    pub fn record_gaze_end(&mut self, duration_ms: u64) {
        self.state.total_gaze_ms += duration_ms;
        self.persist();
    }

    pub fn record_pattern(&mut self, pattern: GazePattern) {
        self.state.patterns.bump(pattern);
        self.persist();
    }

    /// Thresholds tuned to this visitor's history. Pure over current state.
    pub fn adaptive_parameters(&self) -> AdaptiveParameters {
        let visits = self.state.visits.count;
        let dwell_threshold_ms = if visits > 10 {
            2000
        } else if visits > 5 {
            2500
        } else {
            3000
        };
        let gaze_hours = self.state.total_gaze_ms as f64 / 3_600_000.0;
        let rupture_intensity = if gaze_hours > 2.0 {
            0.8
        } else if gaze_hours > 0.5 {
            0.6
        } else {
            0.4
        };
        let transition_speed_ms = if visits > 1 { 1000 } else { 1200 };
        AdaptiveParameters {
            dwell_threshold_ms,
            rupture_intensity,
            transition_speed_ms,
            audio_volume: 0.7,
        }
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn tracked_item_count(&self) -> usize {
        self.state.items.len()
    }

    pub fn is_return_visit(&self) -> bool {
        self.state.visits.count > 1
    }

    pub fn experience_level(&self) -> ExperienceLevel {
        self.state.experience_level()
    }

    pub fn most_viewed(&self) -> Option<(&str, u32)> {
        self.state
            .items
            .iter()
            .max_by_key(|(_, r)| r.view_count)
            .map(|(id, r)| (id.as_str(), r.view_count))
    }

    pub fn most_dwelled(&self) -> Option<(&str, u64)> {
        self.state
            .items
            .iter()
            .max_by_key(|(_, r)| r.total_dwell_ms)
            .map(|(id, r)| (id.as_str(), r.total_dwell_ms))
    }

    /// Enforce caps, then write a snapshot. A failed save prunes harder and
    /// retries once; a second failure resets to a minimal state.
    fn persist(&mut self) {
        self.enforce_limits();
        if let Err(err) = self.store.save(&self.state) {
            tracing::warn!(%err, "ledger save failed, pruning aggressively");
            self.aggressive_prune();
            if let Err(err) = self.store.save(&self.state) {
                tracing::warn!(%err, "ledger save failed after prune, resetting state");
                let visits = self.state.visits.count;
                self.state = LedgerState {
                    version: LEDGER_VERSION,
                    ..LedgerState::default()
                };
                self.state.visits.count = visits;
                if let Err(err) = self.store.save(&self.state) {
                    tracing::warn!(%err, "ledger reset save failed, continuing in memory");
                }
            }
        }
    }

    fn enforce_limits(&mut self) {
        if self.state.items.len() > MAX_TRACKED_ITEMS {
            self.evict_items_down_to(MAX_TRACKED_ITEMS);
        }
        let size = serde_json::to_string(&self.state)
            .map(|s| s.len())
            .unwrap_or(0);
        if size > STATE_SIZE_LIMIT_BYTES {
            tracing::warn!(size, "ledger state over size limit");
            self.aggressive_prune();
        }
    }

    fn aggressive_prune(&mut self) {
        let keep = (self.state.items.len() / 2).max(1);
        self.evict_items_down_to(keep);
        let ts = &mut self.state.visits.timestamps;
        if ts.len() > AGGRESSIVE_VISIT_KEEP {
            let excess = ts.len() - AGGRESSIVE_VISIT_KEEP;
            ts.drain(..excess);
        }
    }

    /// Evict least-recently-viewed records until `keep` remain.
    fn evict_items_down_to(&mut self, keep: usize) {
        while self.state.items.len() > keep {
            let oldest = self
                .state
                .items
                .iter()
                .min_by_key(|(_, r)| r.last_viewed_ms)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    self.state.items.remove(&id);
                }
                None => break,
            }
        }
    }
}
