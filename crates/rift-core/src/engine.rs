//! Per-frame orchestration: gaze, ledger, rupture, in that order.
//!
//! The installation owns the gallery, the detectors, and the ledger, and
//! drives them once per frame. While a rupture transition is active the
//! gaze detector is not consulted at all: the camera is being moved
//! involuntarily, and the transition is the only writer of visual state.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::HOVER_GLOW;
use crate::gallery::Gallery;
use crate::gaze::{GazeDetector, GazeEvent};
use crate::item::Item;
use crate::ledger::AttentionLedger;
use crate::pointing::PointingSource;
use crate::ports::{AudioPort, HandleId, Persistence, PostFxPort, RenderPort};
use crate::projector::{ProjectorConfig, SimilarityProjector};
use crate::rupture::{RuptureConfig, RuptureEngine, RuptureType};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallationConfig {
    pub rupture: RuptureConfig,
    pub projector: ProjectorConfig,
    pub aspect: f64,
}

impl Default for InstallationConfig {
    fn default() -> Self {
        Self {
            rupture: RuptureConfig::default(),
            projector: ProjectorConfig::default(),
            aspect: 16.0 / 9.0,
        }
    }
}

/// What one frame produced, for logging and tests.
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    pub gaze_events: Vec<GazeEvent>,
    pub triggered: Option<RuptureType>,
    pub completed: Option<RuptureType>,
}

pub struct Installation {
    gallery: Gallery,
    handles: HashMap<String, HandleId>,
    gaze: GazeDetector,
    rupture: RuptureEngine,
    ledger: AttentionLedger,
    aspect: f64,
    hovered: Option<String>,
    /// Last reported dwell total per active gaze, for delta accounting.
    last_dwell: Option<(String, u64)>,
}

impl Installation {
    /// Lay out the items, create their display objects, open the ledger,
    /// and tune the rupture engine to this visitor's history.
    pub fn new(
        items: Vec<Item>,
        config: InstallationConfig,
        render: &mut dyn RenderPort,
        store: Box<dyn Persistence>,
        now_ms: u64,
    ) -> Self {
        let mut gallery = Gallery::new(items);
        let projector = SimilarityProjector::new(config.projector);
        if let Some(layout) = projector.project(gallery.items()) {
            gallery.apply_layout(&layout);
        }

        let mut handles = HashMap::with_capacity(gallery.len());
        for item in gallery.items() {
            handles.insert(item.id.clone(), render.create_display_object(item));
        }

        let ledger = AttentionLedger::open(store, now_ms);
        let adaptive = ledger.adaptive_parameters();
        let mut rupture = RuptureEngine::new(config.rupture);
        // Adaptive values are expressed against the first-visit baselines
        // (3000ms dwell, intensity 0.4, speed 1200ms), so configured
        // thresholds scale rather than being replaced
        rupture.set_dwell_threshold_ms(
            (config.rupture.dwell_threshold_ms as f64 * adaptive.dwell_threshold_ms as f64
                / 3000.0) as u64,
        );
        rupture.set_intensity(config.rupture.intensity * adaptive.rupture_intensity / 0.4);
        rupture.set_speed_scale(
            config.rupture.speed_scale * adaptive.transition_speed_ms as f64 / 1200.0,
        );
        tracing::info!(
            items = gallery.len(),
            visits = ledger.state().visits.count,
            dwell_threshold_ms = adaptive.dwell_threshold_ms,
            "installation ready"
        );

        Self {
            gallery,
            handles,
            gaze: GazeDetector::new(),
            rupture,
            ledger,
            aspect: config.aspect,
            hovered: None,
            last_dwell: None,
        }
    }

    /// Advance one frame.
    pub fn frame(
        &mut self,
        now_ms: u64,
        source: &PointingSource,
        render: &mut dyn RenderPort,
        postfx: &mut dyn PostFxPort,
        audio: &mut dyn AudioPort,
        rng: &mut impl Rng,
    ) -> FrameReport {
        let mut report = FrameReport::default();

        if !self.rupture.is_rupturing() {
            let camera = render.camera_pose();
            let events = self
                .gaze
                .detect(now_ms, source, &camera, self.aspect, &self.gallery);
            for event in &events {
                self.apply_to_ledger(event, now_ms);
                self.rupture.note_gaze_event(now_ms, event);
            }
            report.gaze_events = events;
            self.update_hover(render);
        }

        let update = self.rupture.update(
            now_ms,
            &self.gallery,
            &self.handles,
            render,
            postfx,
            audio,
            rng,
        );
        report.triggered = update.triggered;
        report.completed = update.completed;

        if update.completed.is_some() {
            // The visitor did not choose to look here; abandon the gaze
            for event in self.gaze.reset(now_ms) {
                self.apply_to_ledger(&event, now_ms);
            }
            self.last_dwell = None;
            if let Some(prev) = self.hovered.take() {
                if let Some(&handle) = self.handles.get(&prev) {
                    render.set_emissive(handle, 0.0);
                }
            }
        }

        report
    }

    fn apply_to_ledger(&mut self, event: &GazeEvent, now_ms: u64) {
        match event {
            GazeEvent::Start { id } => {
                self.ledger.record_gaze_start(id, now_ms);
                self.last_dwell = Some((id.clone(), 0));
            }
            GazeEvent::Dwell { id, duration_ms } => {
                let prev = match &self.last_dwell {
                    Some((cur, total)) if cur == id => *total,
                    _ => 0,
                };
                self.ledger
                    .record_gaze_dwell(id, duration_ms.saturating_sub(prev));
                self.last_dwell = Some((id.clone(), *duration_ms));
            }
            GazeEvent::End { duration_ms, .. } => {
                self.ledger.record_gaze_end(*duration_ms);
                self.last_dwell = None;
            }
            GazeEvent::Pattern { pattern, .. } => {
                self.ledger.record_pattern(*pattern);
            }
        }
    }

    /// Faint glow on the gazed item. Suppressed during ruptures; the
    /// transition owns every emissive value while it runs.
    fn update_hover(&mut self, render: &mut dyn RenderPort) {
        let target = self.gaze.current_target().map(str::to_string);
        if target == self.hovered {
            return;
        }
        if let Some(prev) = &self.hovered {
            if let Some(&handle) = self.handles.get(prev) {
                render.set_emissive(handle, 0.0);
            }
        }
        if let Some(id) = &target {
            if let Some(&handle) = self.handles.get(id) {
                render.set_emissive(handle, HOVER_GLOW);
            }
        }
        self.hovered = target;
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn ledger(&self) -> &AttentionLedger {
        &self.ledger
    }

    pub fn is_rupturing(&self) -> bool {
        self.rupture.is_rupturing()
    }

    pub fn active_rupture(&self) -> Option<RuptureType> {
        self.rupture.active_rupture()
    }

    pub fn current_gaze_target(&self) -> Option<&str> {
        self.gaze.current_target()
    }

    pub fn engagement(&self, now_ms: u64) -> f64 {
        self.rupture.engagement(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{HeadlessAudio, HeadlessPostFx, HeadlessRender, MemoryPersistence};
    use crate::vec3::Vec3;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn line_items(n: usize) -> Vec<Item> {
        // item-0 sits at the origin, straight ahead of the default camera
        (0..n)
            .map(|i| {
                let mut item = Item::new(&format!("item-{i}"));
                item.position = if i == 0 {
                    Vec3::ZERO
                } else {
                    Vec3::new(i as f64 * 6.0, 20.0, 0.0)
                };
                item.era = -20_000 + (i as i64) * 3_000;
                item.region = if i % 2 == 0 { "Europe" } else { "Africa" }.to_string();
                item
            })
            .collect()
    }

    struct Rig {
        installation: Installation,
        render: HeadlessRender,
        postfx: HeadlessPostFx,
        audio: HeadlessAudio,
    }

    fn rig() -> Rig {
        let mut render = HeadlessRender::new();
        let installation = Installation::new(
            line_items(10),
            InstallationConfig::default(),
            &mut render,
            Box::new(MemoryPersistence::new()),
            0,
        );
        Rig {
            installation,
            render,
            postfx: HeadlessPostFx::default(),
            audio: HeadlessAudio::default(),
        }
    }

    fn frame(r: &mut Rig, now_ms: u64, rngv: &mut SmallRng) -> FrameReport {
        r.installation.frame(
            now_ms,
            &PointingSource::ScreenCenter,
            &mut r.render,
            &mut r.postfx,
            &mut r.audio,
            rngv,
        )
    }

    #[test]
    fn test_small_gallery_keeps_authored_positions() {
        let r = rig();
        // 10 items is under the projection minimum
        assert_eq!(
            r.installation.gallery().get("item-0").unwrap().position,
            Vec3::ZERO
        );
    }

    #[test]
    fn test_gaze_hover_and_ledger_recording() {
        let mut r = rig();
        let mut rngv = rng();
        let report = frame(&mut r, 100, &mut rngv);
        assert!(matches!(&report.gaze_events[0], GazeEvent::Start { id } if id == "item-0"));
        assert_eq!(r.installation.current_gaze_target(), Some("item-0"));
        let handle = r.installation.handles["item-0"];
        assert_eq!(r.render.emissive(handle), HOVER_GLOW);
        assert_eq!(
            r.installation.ledger().state().items["item-0"].view_count,
            1
        );
    }

    #[test]
    fn test_dwell_deltas_accumulate_exactly() {
        let mut r = rig();
        let mut rngv = rng();
        frame(&mut r, 0, &mut rngv);
        frame(&mut r, 600, &mut rngv);
        frame(&mut r, 1_200, &mut rngv);
        frame(&mut r, 1_900, &mut rngv);
        // Total dwell equals the last reported duration, not the sum of reports
        assert_eq!(
            r.installation.ledger().state().items["item-0"].total_dwell_ms,
            1_900
        );
    }

    #[test]
    fn test_dwelling_rupture_end_to_end() {
        let mut r = rig();
        let mut rngv = rng();
        let mut triggered = None;
        let mut completed = None;
        for ms in (0..20_000u64).step_by(100) {
            let report = frame(&mut r, ms, &mut rngv);
            if report.triggered.is_some() {
                triggered = report.triggered;
            }
            if report.completed.is_some() {
                completed = report.completed;
                break;
            }
        }
        assert_eq!(triggered, Some(RuptureType::Dwelling));
        assert_eq!(completed, Some(RuptureType::Dwelling));
        // Gaze was force-reset and the camera moved away from its start
        assert_eq!(r.installation.current_gaze_target(), None);
        assert!(r.render.camera_pose().position.distance_to(Vec3::new(0.0, 0.0, 10.0)) > 1.0);
        assert_eq!(r.audio.cues, 1);
        assert_eq!(r.postfx.intensity, 0.0);
    }

    #[test]
    fn test_gaze_suppressed_while_rupturing() {
        let mut r = rig();
        let mut rngv = rng();
        let mut trigger_ms = None;
        for ms in (0..20_000u64).step_by(100) {
            if frame(&mut r, ms, &mut rngv).triggered.is_some() {
                trigger_ms = Some(ms);
                break;
            }
        }
        let trigger_ms = trigger_ms.unwrap();
        let report = frame(&mut r, trigger_ms + 100, &mut rngv);
        assert!(report.gaze_events.is_empty());
        assert!(r.installation.is_rupturing());
    }

    #[test]
    fn test_adaptive_threshold_applied_from_history() {
        // A well-worn ledger lowers the dwell threshold to 2000ms
        let mut store = MemoryPersistence::new();
        let mut state = crate::ledger::LedgerState::default();
        state.version = crate::ledger::LEDGER_VERSION;
        state.visits.count = 11;
        store.save(&state).unwrap();
        let mut render = HeadlessRender::new();
        let installation = Installation::new(
            line_items(10),
            InstallationConfig::default(),
            &mut render,
            Box::new(store),
            0,
        );
        assert_eq!(installation.rupture.config().dwell_threshold_ms, 2_000);
    }
}
