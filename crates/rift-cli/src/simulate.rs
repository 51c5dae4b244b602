//! Headless visitor simulation: a scripted gaze wanders the gallery
//! against in-memory collaborators, so rupture behavior can be inspected
//! without a renderer.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use rift_core::{
    HeadlessAudio, HeadlessPostFx, HeadlessRender, Installation, InstallationConfig, Item,
    Persistence, PointingSource, RenderPort, RuptureType, Vec3,
};

const FRAME_MS: u64 = 100;

pub struct SimulationSummary {
    pub frames: u64,
    pub ruptures: Vec<(u64, RuptureType)>,
    pub items_tracked: usize,
    pub total_dwell_ms: u64,
    pub engagement: f64,
}

/// What the scripted visitor is doing right now.
enum Behavior {
    Staring { at: Vec3 },
    Drifting,
}

/// Run a seeded visitor session of `seconds` simulated seconds.
pub fn run(
    items: Vec<Item>,
    config: InstallationConfig,
    seconds: u64,
    seed: u64,
    store: Box<dyn Persistence>,
) -> SimulationSummary {
    let mut render = HeadlessRender::new();
    let mut postfx = HeadlessPostFx::default();
    let mut audio = HeadlessAudio::default();
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut installation = Installation::new(items, config, &mut render, store, 0);
    let item_count = installation.gallery().len();

    let end_ms = seconds * 1_000;
    let mut ruptures = Vec::new();
    let mut frames = 0u64;
    let mut behavior = Behavior::Drifting;
    let mut behavior_until = 0u64;

    let mut now_ms = 0u64;
    while now_ms <= end_ms {
        if now_ms >= behavior_until {
            // Mostly stare at a random item long enough to matter,
            // occasionally gaze into space
            if item_count > 0 && rng.random::<f64>() < 0.7 {
                let idx = rng.random_range(0..item_count);
                behavior = Behavior::Staring {
                    at: installation.gallery().items()[idx].position,
                };
                behavior_until = now_ms + rng.random_range(1_000..6_000);
            } else {
                behavior = Behavior::Drifting;
                behavior_until = now_ms + rng.random_range(500..2_000);
            }
        }

        let origin = render.camera_pose().position;
        let direction = match &behavior {
            Behavior::Staring { at } => *at - origin,
            Behavior::Drifting => Vec3::new(0.0, 1.0, 0.0),
        };
        let source = PointingSource::HeadsetRay {
            origin,
            direction,
            confidence: 1.0,
        };

        let report = installation.frame(
            now_ms, &source, &mut render, &mut postfx, &mut audio, &mut rng,
        );
        if let Some(rupture) = report.triggered {
            tracing::info!(at_ms = now_ms, rupture = rupture.as_str(), "rupture");
            ruptures.push((now_ms, rupture));
        }

        frames += 1;
        now_ms += FRAME_MS;
    }

    let state = installation.ledger().state();
    SimulationSummary {
        frames,
        ruptures,
        items_tracked: state.items.len(),
        total_dwell_ms: state.total_dwell_ms,
        engagement: installation.engagement(end_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rift_core::MemoryPersistence;

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| {
                let mut item = Item::new(&format!("item-{i}"));
                item.position = Vec3::new((i as f64) * 5.0 - 20.0, 0.0, -10.0);
                item.era = -25_000 + (i as i64) * 2_500;
                item.region = if i % 2 == 0 { "Europe" } else { "Africa" }.to_string();
                item
            })
            .collect()
    }

    #[test]
    fn test_session_produces_ruptures_and_attention() {
        let summary = run(
            items(10),
            InstallationConfig::default(),
            120,
            42,
            Box::new(MemoryPersistence::new()),
        );
        assert_eq!(summary.frames, 1_201);
        assert!(!summary.ruptures.is_empty(), "no ruptures in two minutes");
        assert!(summary.items_tracked > 0);
        assert!(summary.total_dwell_ms > 0);
    }

    #[test]
    fn test_same_seed_same_session() {
        let a = run(
            items(10),
            InstallationConfig::default(),
            60,
            7,
            Box::new(MemoryPersistence::new()),
        );
        let b = run(
            items(10),
            InstallationConfig::default(),
            60,
            7,
            Box::new(MemoryPersistence::new()),
        );
        assert_eq!(a.ruptures, b.ruptures);
    }

    #[test]
    fn test_empty_gallery_survives() {
        let summary = run(
            Vec::new(),
            InstallationConfig::default(),
            10,
            1,
            Box::new(MemoryPersistence::new()),
        );
        assert!(summary.ruptures.is_empty());
        assert_eq!(summary.items_tracked, 0);
    }
}
