/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f64 = 1e-10;

/// Half-extent used for hit testing an item's display plane
pub const ITEM_RADIUS: f64 = 1.0;

/// Target changes closer together than this classify as scanning (ms)
pub const SCANNING_WINDOW_MS: u64 = 500;

/// Throttle interval for dwell event reporting (ms)
pub const DWELL_REPORT_INTERVAL_MS: u64 = 500;

/// Continuous gaze beyond this classifies as dwelling (ms)
pub const DWELLING_PATTERN_MS: u64 = 2000;

/// Bounded gaze history capacity (entries)
pub const GAZE_HISTORY_LEN: usize = 10;

/// Dwell time on one item that triggers a dwelling rupture (ms)
pub const DWELL_RUPTURE_MS: u64 = 3000;

/// Time without gazing at a previously-seen item that triggers avoidance (ms)
pub const AVOIDANCE_MS: u64 = 15_000;

/// Distinct items within the scanning window that trigger a scanning rupture
pub const SCANNING_DISTINCT: usize = 5;

/// Window for counting distinct scanned items (ms)
pub const SCANNING_RUPTURE_WINDOW_MS: u64 = 3000;

/// Gap since last gaze that makes a reacquisition a returning trigger (ms)
pub const RETURNING_GAP_MS: u64 = 10_000;

/// Rolling-average camera speed that triggers a rapid-movement rupture (units/s)
pub const RAPID_SPEED: f64 = 5.0;

/// Camera movement speed samples retained
pub const MOVEMENT_HISTORY_LEN: usize = 20;

/// Speed samples averaged for the rapid-movement check
pub const MOVEMENT_SAMPLE_LEN: usize = 5;

/// Gaze acquisitions examined for era/region patterns
pub const PATTERN_SEQUENCE_LEN: usize = 8;

/// Fraction of one region in the recent sequence that counts as a pattern
pub const PATTERN_REGION_SHARE: f64 = 0.7;

/// Engagement score that triggers an emotional-intensity rupture
pub const EMOTIONAL_THRESHOLD: f64 = 0.8;

/// Continuous session length that triggers temporal displacement (ms)
pub const TEMPORAL_SESSION_MS: u64 = 300_000;

/// Minimum gap between rupture triggers (ms)
pub const RUPTURE_COOLDOWN_MS: u64 = 10_000;

/// Settle time appended after the camera arrives, before restore (ms)
pub const SETTLE_MS: u64 = 500;

/// Duration of the full-screen distortion pulse (ms)
pub const PULSE_MS: u64 = 800;

/// Camera standoff from the destination item along +Z
pub const CAMERA_STANDOFF: f64 = 5.0;

/// Items within this distance of the destination get restored early
pub const NEARBY_RADIUS: f64 = 8.0;

/// Scale factor applied to the destination during highlight
pub const HIGHLIGHT_SCALE: f64 = 1.2;

/// Faint emissive glow on restored nearby items
pub const NEARBY_GLOW: f64 = 0.15;

/// Emissive glow applied on plain gaze hover (outside transitions)
pub const HOVER_GLOW: f64 = 0.2;

/// Edge length of the viewing volume the projection fits into
pub const CUBE_SIZE: f64 = 40.0;

/// Below this item count the projection is skipped entirely
pub const MIN_PROJECTION_ITEMS: usize = 15;

/// Dimensionality of fallback feature vectors
pub const FALLBACK_DIM: usize = 16;

/// Weight of the feature vector in the composite embedding input
pub const FEATURE_WEIGHT: f64 = 0.7;

/// Weight of each metadata scalar in the composite embedding input
pub const METADATA_WEIGHT: f64 = 0.1;

/// Ledger: tracked-item cap before oldest-first eviction
pub const MAX_TRACKED_ITEMS: usize = 100;

/// Ledger: visit timestamps retained
pub const MAX_VISIT_TIMESTAMPS: usize = 50;

/// Ledger: serialized-state safety ceiling (4MB)
pub const STATE_SIZE_LIMIT_BYTES: usize = 4 * 1024 * 1024;

/// Ledger: visit timestamps kept after an aggressive prune
pub const AGGRESSIVE_VISIT_KEEP: usize = 10;
