//! Boundary traits between the engine and its surroundings.
//!
//! The engine core never touches a renderer, an audio device, or a disk
//! directly. Each side effect goes through one of these traits; binaries
//! plug in real backends and tests plug in the in-memory ones below.

use std::collections::HashMap;
use std::fmt;

use crate::item::Item;
use crate::ledger::LedgerState;
use crate::pointing::CameraPose;

/// Opaque handle to a display object owned by the render side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandleId(pub u64);

/// Rendering surface: display objects plus the camera.
///
/// Opacity and emissive are read back when ruptures snapshot visual state,
/// so implementations must retain what was last set.
pub trait RenderPort {
    fn create_display_object(&mut self, item: &Item) -> HandleId;
    fn set_opacity(&mut self, handle: HandleId, opacity: f64);
    fn set_emissive(&mut self, handle: HandleId, intensity: f64);
    fn set_scale(&mut self, handle: HandleId, factor: f64);
    fn opacity(&self, handle: HandleId) -> f64;
    fn emissive(&self, handle: HandleId) -> f64;
    fn camera_pose(&self) -> CameraPose;
    fn set_camera_pose(&mut self, pose: CameraPose);
}

/// Full-screen post-processing layer (chromatic aberration etc).
pub trait PostFxPort {
    /// Drive the rupture distortion envelope; 0.0 means inactive.
    fn set_rupture_intensity(&mut self, intensity: f64);
}

/// Spatial audio layer.
pub trait AudioPort {
    fn trigger_rupture_cue(&mut self);
    fn update_soundscape(&mut self, era: i64, colors: &[String]);
}

/// Failure talking to the attention store.
#[derive(Debug)]
pub struct PersistError(pub String);

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "persistence error: {}", self.0)
    }
}

impl std::error::Error for PersistError {}

/// Durable storage for the attention ledger.
pub trait Persistence {
    /// Load the last saved state, or `None` for a first visit.
    fn load(&mut self) -> Result<Option<LedgerState>, PersistError>;
    /// Replace the saved state with a full snapshot.
    fn save(&mut self, state: &LedgerState) -> Result<(), PersistError>;
}

/// Volatile persistence for tests and the headless simulator.
#[derive(Default)]
pub struct MemoryPersistence {
    state: Option<LedgerState>,
    /// When set, the next `fail_saves` saves return an error.
    pub fail_saves: u32,
    pub save_count: u32,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Option<&LedgerState> {
        self.state.as_ref()
    }
}

impl Persistence for MemoryPersistence {
    fn load(&mut self) -> Result<Option<LedgerState>, PersistError> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &LedgerState) -> Result<(), PersistError> {
        self.save_count += 1;
        if self.fail_saves > 0 {
            self.fail_saves -= 1;
            return Err(PersistError("simulated quota exceeded".to_string()));
        }
        self.state = Some(state.clone());
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct ObjectState {
    opacity: f64,
    emissive: f64,
    scale: f64,
}

/// Render backend that only tracks state, for tests and the simulator.
#[derive(Default)]
pub struct HeadlessRender {
    objects: HashMap<HandleId, ObjectState>,
    camera: CameraPose,
    next_id: u64,
}

impl HeadlessRender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(&self, handle: HandleId) -> f64 {
        self.objects.get(&handle).map(|o| o.scale).unwrap_or(1.0)
    }
}

impl RenderPort for HeadlessRender {
    fn create_display_object(&mut self, _item: &Item) -> HandleId {
        let id = HandleId(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            ObjectState {
                opacity: 1.0,
                emissive: 0.0,
                scale: 1.0,
            },
        );
        id
    }

    fn set_opacity(&mut self, handle: HandleId, opacity: f64) {
        if let Some(o) = self.objects.get_mut(&handle) {
            o.opacity = opacity;
        }
    }

    fn set_emissive(&mut self, handle: HandleId, intensity: f64) {
        if let Some(o) = self.objects.get_mut(&handle) {
            o.emissive = intensity;
        }
    }

    fn set_scale(&mut self, handle: HandleId, factor: f64) {
        if let Some(o) = self.objects.get_mut(&handle) {
            o.scale = factor;
        }
    }

    fn opacity(&self, handle: HandleId) -> f64 {
        self.objects.get(&handle).map(|o| o.opacity).unwrap_or(1.0)
    }

    fn emissive(&self, handle: HandleId) -> f64 {
        self.objects.get(&handle).map(|o| o.emissive).unwrap_or(0.0)
    }

    fn camera_pose(&self) -> CameraPose {
        self.camera
    }

    fn set_camera_pose(&mut self, pose: CameraPose) {
        self.camera = pose;
    }
}

/// Post-effects sink that remembers the last intensity.
#[derive(Default)]
pub struct HeadlessPostFx {
    pub intensity: f64,
}

impl PostFxPort for HeadlessPostFx {
    fn set_rupture_intensity(&mut self, intensity: f64) {
        self.intensity = intensity;
    }
}

/// Audio sink that counts cues.
#[derive(Default)]
pub struct HeadlessAudio {
    pub cues: u32,
    pub last_era: Option<i64>,
}

impl AudioPort for HeadlessAudio {
    fn trigger_rupture_cue(&mut self) {
        self.cues += 1;
    }

    fn update_soundscape(&mut self, era: i64, _colors: &[String]) {
        self.last_era = Some(era);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_render_roundtrip() {
        let mut r = HeadlessRender::new();
        let h = r.create_display_object(&Item::new("a"));
        assert_eq!(r.opacity(h), 1.0);
        r.set_opacity(h, 0.3);
        r.set_emissive(h, 0.8);
        r.set_scale(h, 1.2);
        assert_eq!(r.opacity(h), 0.3);
        assert_eq!(r.emissive(h), 0.8);
        assert_eq!(r.scale(h), 1.2);
    }

    #[test]
    fn test_memory_persistence_failure_injection() {
        let mut p = MemoryPersistence::new();
        p.fail_saves = 1;
        let state = LedgerState::default();
        assert!(p.save(&state).is_err());
        assert!(p.save(&state).is_ok());
        assert_eq!(p.save_count, 2);
        assert!(p.load().unwrap().is_some());
    }
}
