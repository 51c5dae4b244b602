//! Rupture engine: detects attention patterns and answers them with
//! involuntary camera transitions to distant items.
//!
//! A rupture runs as a staged transition: visual state is snapshotted and
//! the scene fades, a full-screen distortion pulse fires, the camera tweens
//! to a standoff in front of the destination, the destination is
//! highlighted and its neighborhood restored, then after a settle period
//! everything returns to the snapshot. At most one transition is active,
//! and triggers are gated by a cooldown measured from trigger time.

use std::collections::{HashMap, HashSet, VecDeque};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    AVOIDANCE_MS, CAMERA_STANDOFF, DWELL_RUPTURE_MS, EMOTIONAL_THRESHOLD, HIGHLIGHT_SCALE,
    MOVEMENT_HISTORY_LEN, MOVEMENT_SAMPLE_LEN, NEARBY_GLOW, NEARBY_RADIUS, PATTERN_REGION_SHARE,
    PATTERN_SEQUENCE_LEN, PULSE_MS, RAPID_SPEED, RETURNING_GAP_MS, RUPTURE_COOLDOWN_MS,
    SCANNING_DISTINCT, SCANNING_RUPTURE_WINDOW_MS, SETTLE_MS, TEMPORAL_SESSION_MS,
};
use crate::gallery::Gallery;
use crate::gaze::GazeEvent;
use crate::item::Item;
use crate::pointing::CameraPose;
use crate::ports::{AudioPort, HandleId, PostFxPort, RenderPort};
use crate::transition::{Easing, Tween};
use crate::vec3::Vec3;

/// The eight attention patterns a rupture can answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuptureType {
    Dwelling,
    Avoidance,
    Scanning,
    Returning,
    RapidMovement,
    PatternRecognition,
    EmotionalIntensity,
    TemporalDisplacement,
}

/// Visual parameters for one rupture type's transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionParams {
    pub speed_ms: u64,
    pub fade_intensity: f64,
    pub highlight_intensity: f64,
}

impl RuptureType {
    pub const ALL: [RuptureType; 8] = [
        RuptureType::Dwelling,
        RuptureType::Avoidance,
        RuptureType::Scanning,
        RuptureType::Returning,
        RuptureType::RapidMovement,
        RuptureType::PatternRecognition,
        RuptureType::EmotionalIntensity,
        RuptureType::TemporalDisplacement,
    ];

    pub fn params(self) -> TransitionParams {
        let (speed_ms, fade_intensity, highlight_intensity) = match self {
            RuptureType::Dwelling => (1200, 0.3, 0.8),
            RuptureType::Avoidance => (2000, 0.5, 0.6),
            RuptureType::Scanning => (800, 0.2, 1.0),
            RuptureType::Returning => (1500, 0.4, 0.7),
            RuptureType::RapidMovement => (600, 0.6, 0.9),
            RuptureType::PatternRecognition => (1800, 0.4, 0.5),
            RuptureType::EmotionalIntensity => (1000, 0.7, 1.2),
            RuptureType::TemporalDisplacement => (2200, 0.8, 0.4),
        };
        TransitionParams {
            speed_ms,
            fade_intensity,
            highlight_intensity,
        }
    }

    /// Rapid movement cuts hard then decelerates; temporal displacement
    /// drifts; everything else overshoots and settles.
    pub fn easing(self) -> Easing {
        match self {
            RuptureType::RapidMovement => Easing::FastStart,
            RuptureType::TemporalDisplacement => Easing::SlowEnd,
            _ => Easing::Overshoot,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuptureType::Dwelling => "dwelling",
            RuptureType::Avoidance => "avoidance",
            RuptureType::Scanning => "scanning",
            RuptureType::Returning => "returning",
            RuptureType::RapidMovement => "rapid_movement",
            RuptureType::PatternRecognition => "pattern_recognition",
            RuptureType::EmotionalIntensity => "emotional_intensity",
            RuptureType::TemporalDisplacement => "temporal_displacement",
        }
    }
}

/// Tunable thresholds. All fields default from the installation constants
/// so partial config files work.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RuptureConfig {
    pub cooldown_ms: u64,
    pub dwell_threshold_ms: u64,
    pub avoidance_ms: u64,
    pub returning_gap_ms: u64,
    pub rapid_speed: f64,
    pub emotional_threshold: f64,
    pub temporal_session_ms: u64,
    /// Multiplier on fade and highlight strength.
    pub intensity: f64,
    /// Multiplier on per-type camera durations.
    pub speed_scale: f64,
}

impl Default for RuptureConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: RUPTURE_COOLDOWN_MS,
            dwell_threshold_ms: DWELL_RUPTURE_MS,
            avoidance_ms: AVOIDANCE_MS,
            returning_gap_ms: RETURNING_GAP_MS,
            rapid_speed: RAPID_SPEED,
            emotional_threshold: EMOTIONAL_THRESHOLD,
            temporal_session_ms: TEMPORAL_SESSION_MS,
            intensity: 1.0,
            speed_scale: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct VisualSnapshot {
    opacity: f64,
    emissive: f64,
}

struct ActiveTransition {
    rupture: RuptureType,
    target_id: String,
    started_ms: u64,
    duration_ms: u64,
    position: Tween,
    look_at: Tween,
    fade: f64,
    highlight: f64,
    snapshot: HashMap<String, VisualSnapshot>,
    arrived: bool,
}

#[derive(Clone, Debug)]
struct Acquisition {
    id: String,
    at_ms: u64,
}

/// What one engine tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RuptureUpdate {
    pub triggered: Option<RuptureType>,
    pub completed: Option<RuptureType>,
}

pub struct RuptureEngine {
    config: RuptureConfig,
    transition: Option<ActiveTransition>,
    last_rupture_ms: Option<u64>,
    session_start_ms: Option<u64>,
    current_dwell: Option<(String, u64)>,
    last_seen: HashMap<String, u64>,
    acquisitions: VecDeque<Acquisition>,
    seen: HashSet<String>,
    total_dwell_ms: u64,
    returning_candidate: Option<String>,
    movement: VecDeque<f64>,
    last_camera: Option<(u64, Vec3)>,
}

impl RuptureEngine {
    pub fn new(config: RuptureConfig) -> Self {
        Self {
            config,
            transition: None,
            last_rupture_ms: None,
            session_start_ms: None,
            current_dwell: None,
            last_seen: HashMap::new(),
            acquisitions: VecDeque::new(),
            seen: HashSet::new(),
            total_dwell_ms: 0,
            returning_candidate: None,
            movement: VecDeque::new(),
            last_camera: None,
        }
    }

    pub fn is_rupturing(&self) -> bool {
        self.transition.is_some()
    }

    pub fn active_rupture(&self) -> Option<RuptureType> {
        self.transition.as_ref().map(|t| t.rupture)
    }

    pub fn config(&self) -> &RuptureConfig {
        &self.config
    }

    /// Adaptive hook: visitor-tuned dwell threshold.
    pub fn set_dwell_threshold_ms(&mut self, threshold_ms: u64) {
        self.config.dwell_threshold_ms = threshold_ms;
    }

    /// Adaptive hook: visitor-tuned intensity multiplier.
    pub fn set_intensity(&mut self, intensity: f64) {
        self.config.intensity = intensity.max(0.0);
    }

    /// Adaptive hook: visitor-tuned transition duration multiplier.
    pub fn set_speed_scale(&mut self, scale: f64) {
        self.config.speed_scale = scale.max(0.1);
    }

    /// Session-so-far engagement score in [0, 1].
    pub fn engagement(&self, now_ms: u64) -> f64 {
        let session_ms = self
            .session_start_ms
            .map(|s| now_ms.saturating_sub(s))
            .unwrap_or(0);
        let score = (session_ms as f64 / 300_000.0).min(1.0)
            + (self.total_dwell_ms as f64 / 60_000.0).min(0.5)
            + (self.seen.len() as f64 / 50.0).min(0.3);
        score.min(1.0)
    }

    /// Feed a gaze event into trigger bookkeeping. Events arriving during
    /// an active transition are dropped; attention accrued while the camera
    /// is being moved involuntarily is not the visitor's.
    pub fn note_gaze_event(&mut self, now_ms: u64, event: &GazeEvent) {
        if self.transition.is_some() {
            return;
        }
        match event {
            GazeEvent::Start { id } => {
                if let Some(&prev) = self.last_seen.get(id) {
                    if now_ms.saturating_sub(prev) > self.config.returning_gap_ms {
                        self.returning_candidate = Some(id.clone());
                    }
                }
                self.last_seen.insert(id.clone(), now_ms);
                self.seen.insert(id.clone());
                self.acquisitions.push_back(Acquisition {
                    id: id.clone(),
                    at_ms: now_ms,
                });
                while self.acquisitions.len() > PATTERN_SEQUENCE_LEN.max(SCANNING_DISTINCT) * 2 {
                    self.acquisitions.pop_front();
                }
            }
            GazeEvent::Dwell { id, duration_ms } => {
                let prev = match &self.current_dwell {
                    Some((cur, d)) if cur == id => *d,
                    _ => 0,
                };
                self.total_dwell_ms += duration_ms.saturating_sub(prev);
                self.current_dwell = Some((id.clone(), *duration_ms));
            }
            GazeEvent::End { id, .. } => {
                self.last_seen.insert(id.clone(), now_ms);
                self.current_dwell = None;
            }
            GazeEvent::Pattern { .. } => {}
        }
    }

    /// Per-frame tick: drive an active transition, or look for a trigger.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        now_ms: u64,
        gallery: &Gallery,
        handles: &HashMap<String, HandleId>,
        render: &mut dyn RenderPort,
        postfx: &mut dyn PostFxPort,
        audio: &mut dyn AudioPort,
        rng: &mut impl Rng,
    ) -> RuptureUpdate {
        if self.session_start_ms.is_none() {
            self.session_start_ms = Some(now_ms);
        }

        if self.transition.is_some() {
            let completed = self.drive_transition(now_ms, gallery, handles, render, postfx);
            return RuptureUpdate {
                triggered: None,
                completed,
            };
        }

        self.sample_camera_speed(now_ms, render.camera_pose().position);

        if gallery.len() < 2 {
            return RuptureUpdate::default();
        }
        if let Some(last) = self.last_rupture_ms {
            if now_ms.saturating_sub(last) < self.config.cooldown_ms {
                return RuptureUpdate::default();
            }
        }

        let Some(rupture) = self.detect_trigger(now_ms, gallery) else {
            return RuptureUpdate::default();
        };

        let source = self.source_item(gallery, &mut *rng);
        let Some(target) =
            self.pick_destination(rupture, gallery, render, source.as_deref(), &mut *rng)
        else {
            return RuptureUpdate::default();
        };

        self.begin_transition(now_ms, rupture, &target, gallery, handles, render, audio, rng);
        RuptureUpdate {
            triggered: Some(rupture),
            completed: None,
        }
    }

    fn sample_camera_speed(&mut self, now_ms: u64, position: Vec3) {
        if let Some((prev_ms, prev_pos)) = self.last_camera {
            let dt_ms = now_ms.saturating_sub(prev_ms);
            if dt_ms > 0 {
                let speed = prev_pos.distance_to(position) / (dt_ms as f64 / 1000.0);
                self.movement.push_back(speed);
                while self.movement.len() > MOVEMENT_HISTORY_LEN {
                    self.movement.pop_front();
                }
            }
        }
        self.last_camera = Some((now_ms, position));
    }

    fn average_recent_speed(&self) -> Option<f64> {
        if self.movement.len() < MOVEMENT_SAMPLE_LEN {
            return None;
        }
        let recent: Vec<f64> = self
            .movement
            .iter()
            .rev()
            .take(MOVEMENT_SAMPLE_LEN)
            .copied()
            .collect();
        Some(recent.iter().sum::<f64>() / recent.len() as f64)
    }

    /// Evaluate triggers in fixed priority order.
    fn detect_trigger(&mut self, now_ms: u64, gallery: &Gallery) -> Option<RuptureType> {
        // Dwelling
        if let Some((_, duration)) = &self.current_dwell {
            if *duration >= self.config.dwell_threshold_ms {
                return Some(RuptureType::Dwelling);
            }
        }

        // Avoidance: some previously-seen item has gone unwatched too long.
        // The item currently under gaze is by definition not avoided.
        let neglected = self.last_seen.iter().any(|(id, &at)| {
            if self.current_dwell.as_ref().is_some_and(|(cur, _)| cur == id) {
                return false;
            }
            now_ms.saturating_sub(at) >= self.config.avoidance_ms
        });
        if neglected {
            return Some(RuptureType::Avoidance);
        }

        // Scanning: many distinct items in a short window
        let window_start = now_ms.saturating_sub(SCANNING_RUPTURE_WINDOW_MS);
        let distinct: HashSet<&str> = self
            .acquisitions
            .iter()
            .filter(|a| a.at_ms >= window_start)
            .map(|a| a.id.as_str())
            .collect();
        if distinct.len() >= SCANNING_DISTINCT {
            return Some(RuptureType::Scanning);
        }

        // Returning
        if self.returning_candidate.is_some() {
            self.returning_candidate = None;
            return Some(RuptureType::Returning);
        }

        // Rapid camera movement
        if let Some(avg) = self.average_recent_speed() {
            if avg > self.config.rapid_speed {
                return Some(RuptureType::RapidMovement);
            }
        }

        // Pattern recognition: monotonic-era or single-region viewing run
        if self.viewing_pattern_detected(gallery) {
            return Some(RuptureType::PatternRecognition);
        }

        // Emotional intensity: a deeply engaged visitor meets charged content
        if self.engagement(now_ms) >= self.config.emotional_threshold {
            if let Some((id, _)) = &self.current_dwell {
                if gallery.get(id).is_some_and(|it| it.is_intense()) {
                    return Some(RuptureType::EmotionalIntensity);
                }
            }
        }

        // Temporal displacement: a long continuous session. The cooldown
        // alone paces how often it fires.
        let session_ms = self
            .session_start_ms
            .map(|s| now_ms.saturating_sub(s))
            .unwrap_or(0);
        if session_ms >= self.config.temporal_session_ms {
            return Some(RuptureType::TemporalDisplacement);
        }

        None
    }

    fn viewing_pattern_detected(&self, gallery: &Gallery) -> bool {
        if self.acquisitions.len() < PATTERN_SEQUENCE_LEN {
            return false;
        }
        let recent: Vec<&Item> = self
            .acquisitions
            .iter()
            .rev()
            .take(PATTERN_SEQUENCE_LEN)
            .filter_map(|a| gallery.get(&a.id))
            .collect();
        if recent.len() < PATTERN_SEQUENCE_LEN {
            return false;
        }
        // recent is newest-first; era monotonicity holds either way around
        let eras: Vec<i64> = recent.iter().map(|it| it.era).collect();
        let ascending = eras.windows(2).all(|w| w[0] <= w[1]);
        let descending = eras.windows(2).all(|w| w[0] >= w[1]);
        if ascending || descending {
            return true;
        }
        let mut region_counts: HashMap<&str, usize> = HashMap::new();
        for item in &recent {
            *region_counts.entry(item.region.as_str()).or_default() += 1;
        }
        let max_share = region_counts
            .values()
            .map(|&c| c as f64 / recent.len() as f64)
            .fold(0.0, f64::max);
        max_share >= PATTERN_REGION_SHARE
    }

    /// The item the rupture departs from: the dwelled item, else the most
    /// recent acquisition, else a random item.
    fn source_item(&self, gallery: &Gallery, rng: &mut impl Rng) -> Option<String> {
        if let Some((id, _)) = &self.current_dwell {
            return Some(id.clone());
        }
        if let Some(last) = self.acquisitions.back() {
            return Some(last.id.clone());
        }
        if gallery.is_empty() {
            return None;
        }
        let i = rng.random_range(0..gallery.len());
        Some(gallery.items()[i].id.clone())
    }

    /// Choose where the rupture lands. Destinations must be distant from
    /// the source (different era or region) whenever the gallery allows it.
    fn pick_destination(
        &self,
        rupture: RuptureType,
        gallery: &Gallery,
        render: &dyn RenderPort,
        source_id: Option<&str>,
        rng: &mut impl Rng,
    ) -> Option<Item> {
        let source = source_id.and_then(|id| gallery.get(id));
        let candidates: Vec<&Item> = gallery
            .items()
            .iter()
            .filter(|it| Some(it.id.as_str()) != source_id)
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let chosen = match rupture {
            RuptureType::RapidMovement => {
                let camera = render.camera_pose().position;
                candidates
                    .iter()
                    .max_by(|a, b| {
                        camera
                            .distance_to(a.position)
                            .total_cmp(&camera.distance_to(b.position))
                    })
                    .copied()
            }
            RuptureType::PatternRecognition => source.and_then(|src| {
                candidates
                    .iter()
                    .max_by(|a, b| {
                        pattern_difference(src, a).total_cmp(&pattern_difference(src, b))
                    })
                    .copied()
            }),
            RuptureType::TemporalDisplacement => source.and_then(|src| {
                candidates
                    .iter()
                    .max_by_key(|it| (it.era - src.era).abs())
                    .copied()
            }),
            RuptureType::EmotionalIntensity => {
                let intense: Vec<&Item> =
                    candidates.iter().filter(|it| it.is_intense()).copied().collect();
                if intense.is_empty() {
                    None
                } else {
                    Some(intense[rng.random_range(0..intense.len())])
                }
            }
            _ => source.and_then(|src| connection_scored(src, &candidates, &mut *rng)),
        };

        let chosen = chosen.or_else(|| {
            // Fallback ladder: any distant item, then anything at all
            let distant: Vec<&Item> = match source {
                Some(src) => candidates
                    .iter()
                    .filter(|it| it.is_distant_from(src))
                    .copied()
                    .collect(),
                None => Vec::new(),
            };
            if !distant.is_empty() {
                Some(distant[rng.random_range(0..distant.len())])
            } else {
                Some(candidates[rng.random_range(0..candidates.len())])
            }
        });

        chosen.cloned()
    }

    #[allow(clippy::too_many_arguments)]
    fn begin_transition(
        &mut self,
        now_ms: u64,
        rupture: RuptureType,
        target: &Item,
        gallery: &Gallery,
        handles: &HashMap<String, HandleId>,
        render: &mut dyn RenderPort,
        audio: &mut dyn AudioPort,
        rng: &mut impl Rng,
    ) {
        let params = rupture.params();
        // Rapid movement hits harder: the fade is amplified x1.5
        let mut fade = params.fade_intensity;
        if rupture == RuptureType::RapidMovement {
            fade *= 1.5;
        }
        let fade = (fade * self.config.intensity).clamp(0.0, 1.0);
        let highlight = params.highlight_intensity * self.config.intensity;
        let duration_ms = ((params.speed_ms as f64 * self.config.speed_scale) as u64).max(1);

        tracing::info!(
            rupture = rupture.as_str(),
            target = %target.id,
            duration_ms,
            "rupture triggered"
        );

        // Snapshot and fade everything except the destination
        let mut snapshot = HashMap::new();
        for item in gallery.items() {
            let Some(&handle) = handles.get(&item.id) else {
                continue;
            };
            let state = VisualSnapshot {
                opacity: render.opacity(handle),
                emissive: render.emissive(handle),
            };
            snapshot.insert(item.id.clone(), state);
            if item.id != target.id {
                render.set_opacity(handle, state.opacity * (1.0 - fade));
            }
        }

        audio.trigger_rupture_cue();
        audio.update_soundscape(target.era, &target.colors);

        let pose = render.camera_pose();
        let destination =
            target.position + Vec3::new(0.0, 0.0, CAMERA_STANDOFF) + jitter(&mut *rng, fade);
        let look_target = target.position + jitter(&mut *rng, fade * 0.5);

        self.last_rupture_ms = Some(now_ms);
        self.current_dwell = None;
        self.movement.clear();
        self.last_camera = None;
        self.transition = Some(ActiveTransition {
            rupture,
            target_id: target.id.clone(),
            started_ms: now_ms,
            duration_ms,
            position: Tween::new(pose.position, destination, duration_ms, rupture.easing()),
            look_at: Tween::new(pose.look_at, look_target, duration_ms, Easing::SlowEnd),
            fade,
            highlight,
            snapshot,
            arrived: false,
        });
    }

    fn drive_transition(
        &mut self,
        now_ms: u64,
        gallery: &Gallery,
        handles: &HashMap<String, HandleId>,
        render: &mut dyn RenderPort,
        postfx: &mut dyn PostFxPort,
    ) -> Option<RuptureType> {
        let Some(transition) = &mut self.transition else {
            return None;
        };
        let elapsed = now_ms.saturating_sub(transition.started_ms);

        postfx.set_rupture_intensity(pulse_intensity(elapsed, PULSE_MS));

        render.set_camera_pose(CameraPose {
            position: transition.position.sample(elapsed),
            look_at: transition.look_at.sample(elapsed),
        });

        if !transition.arrived && elapsed >= transition.duration_ms {
            transition.arrived = true;
            if let Some(&handle) = handles.get(&transition.target_id) {
                render.set_emissive(handle, transition.highlight);
                render.set_scale(handle, HIGHLIGHT_SCALE);
            }
            // Restore the destination's neighborhood with a faint glow
            if let Some(target) = gallery.get(&transition.target_id) {
                for item in gallery.items() {
                    if item.id == transition.target_id {
                        continue;
                    }
                    if item.position.distance_to(target.position) > NEARBY_RADIUS {
                        continue;
                    }
                    if let (Some(&handle), Some(state)) =
                        (handles.get(&item.id), transition.snapshot.get(&item.id))
                    {
                        render.set_opacity(handle, state.opacity);
                        render.set_emissive(handle, NEARBY_GLOW);
                    }
                }
            }
        }

        if elapsed >= transition.duration_ms + SETTLE_MS {
            let finished = self.transition.take();
            if let Some(finished) = finished {
                for (id, state) in &finished.snapshot {
                    if let Some(&handle) = handles.get(id) {
                        render.set_opacity(handle, state.opacity);
                        render.set_emissive(handle, state.emissive);
                    }
                }
                if let Some(&handle) = handles.get(&finished.target_id) {
                    render.set_scale(handle, 1.0);
                }
                postfx.set_rupture_intensity(0.0);
                tracing::info!(rupture = finished.rupture.as_str(), "rupture complete");
                return Some(finished.rupture);
            }
        }
        None
    }
}

/// Small positional noise proportional to the fade intensity, so arrival
/// framing differs between ruptures.
fn jitter(rng: &mut impl Rng, scale: f64) -> Vec3 {
    if scale <= 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(
        rng.random_range(-scale..=scale),
        rng.random_range(-scale..=scale),
        rng.random_range(-scale..=scale),
    )
}

/// Distortion pulse envelope: rise, hold, fall over the pulse duration,
/// zero afterwards.
pub fn pulse_intensity(elapsed_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 || elapsed_ms >= duration_ms {
        return 0.0;
    }
    let t = elapsed_ms as f64 / duration_ms as f64;
    if t < 0.3 {
        t / 0.3
    } else if t < 0.7 {
        1.0
    } else {
        (1.0 - t) / 0.3
    }
}

/// Thematic-connection score between distant items: shared kind counts
/// most, palette overlap adds the rest.
fn connection_score(a: &Item, b: &Item) -> f64 {
    let mut score = 0.0;
    if a.kind == b.kind {
        score += 0.5;
    }
    score + 0.3 * a.color_overlap(b)
}

/// Pick among the top-scored distant candidates so repeated ruptures from
/// the same item do not always land in the same place. Candidates with no
/// thematic connection at all are out; the caller falls back to a random
/// distant item when nothing scores.
fn connection_scored<'a>(
    source: &Item,
    candidates: &[&'a Item],
    rng: &mut impl Rng,
) -> Option<&'a Item> {
    let mut scored: Vec<(&Item, f64)> = candidates
        .iter()
        .filter(|it| it.is_distant_from(source))
        .map(|&it| (it, connection_score(source, it)))
        .filter(|(_, score)| *score > 0.0)
        .collect();
    if scored.is_empty() {
        return None;
    }
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(3);
    Some(scored[rng.random_range(0..scored.len())].0)
}

/// Weighted dissimilarity used to break viewing patterns.
fn pattern_difference(source: &Item, candidate: &Item) -> f64 {
    let mut diff = (candidate.era - source.era).abs() as f64 / 10_000.0;
    if candidate.region != source.region {
        diff += 1.0;
    }
    if candidate.kind != source.kind {
        diff += 0.5;
    }
    diff
}
