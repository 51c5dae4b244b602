use serde::{Deserialize, Serialize};

use crate::vec3::Vec3;

/// One exhibited artifact, loaded from the dataset at startup.
///
/// Immutable after load except for `position`, which the projector writes
/// once at layout time (and personalization may nudge later).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub position: Vec3,
    /// Signed year; negative = BCE.
    #[serde(default)]
    pub era: i64,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_vector: Option<Vec<f64>>,
}

fn default_region() -> String {
    "Unknown".to_string()
}

fn default_kind() -> String {
    "unknown".to_string()
}

impl Item {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            position: Vec3::ZERO,
            era: 0,
            region: default_region(),
            kind: default_kind(),
            colors: Vec::new(),
            feature_vector: None,
        }
    }

    /// Whether this item differs from `other` in era or region, the
    /// "distance" requirement for rupture destinations.
    pub fn is_distant_from(&self, other: &Item) -> bool {
        self.era != other.era || self.region != other.region
    }

    /// Emotionally charged items: extreme eras, the red tag, or handprints.
    pub fn is_intense(&self) -> bool {
        self.era < -20_000
            || self.era > 1900
            || self.colors.iter().any(|c| c == "red")
            || self.kind == "handprint"
    }

    /// Fraction of this item's colors shared with `other`, normalized by
    /// the larger palette.
    pub fn color_overlap(&self, other: &Item) -> f64 {
        if self.colors.is_empty() || other.colors.is_empty() {
            return 0.0;
        }
        let matching = self
            .colors
            .iter()
            .filter(|c| other.colors.contains(c))
            .count();
        matching as f64 / self.colors.len().max(other.colors.len()) as f64
    }
}
