//! Rift attention-rupture engine for a 3D gallery installation.
//!
//! Watches where a visitor's gaze lands, remembers it across visits, and
//! answers recognizable attention patterns with involuntary camera jumps
//! ("ruptures") to distant items. The layout itself comes from a seeded
//! similarity projection over item feature vectors.
//!
//! The core does no I/O: rendering, audio, post-effects, and persistence
//! all sit behind traits in [`ports`]; binaries plug in real backends.

pub mod constants;
pub mod engine;
pub mod gallery;
pub mod gaze;
pub mod item;
pub mod ledger;
pub mod pointing;
pub mod ports;
pub mod projector;
pub mod rupture;
pub mod time;
pub mod transition;
pub mod vec3;

pub use engine::{FrameReport, Installation, InstallationConfig};
pub use gallery::Gallery;
pub use gaze::{GazeDetector, GazeEvent, GazePattern};
pub use item::Item;
pub use ledger::{
    AdaptiveParameters, AttentionLedger, AttentionRecord, ExperienceLevel, LEDGER_VERSION,
    LedgerState,
};
pub use pointing::{CameraPose, PointingSource, Ray};
pub use ports::{
    AudioPort, HandleId, HeadlessAudio, HeadlessPostFx, HeadlessRender, MemoryPersistence,
    PersistError, Persistence, PostFxPort, RenderPort,
};
pub use projector::{ProjectorConfig, SimilarityProjector};
pub use rupture::{RuptureConfig, RuptureEngine, RuptureType, RuptureUpdate, TransitionParams};
pub use transition::{Easing, Tween};
pub use vec3::Vec3;
