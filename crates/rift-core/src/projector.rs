//! Similarity projection: embed items in 3D so that visually and
//! historically similar items sit near each other.
//!
//! A small seeded neighbor-embedding pass runs over composite vectors
//! (feature vector plus weighted metadata scalars). Determinism matters
//! more than embedding quality here: the same dataset and seed must yield
//! the same layout on every machine, so all randomness flows through one
//! seeded generator.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CUBE_SIZE, EPSILON, FALLBACK_DIM, FEATURE_WEIGHT, METADATA_WEIGHT, MIN_PROJECTION_ITEMS,
};
use crate::item::Item;
use crate::vec3::Vec3;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorConfig {
    /// Edge length of the target cube; output fits in ±cube_size/2.
    pub cube_size: f64,
    /// Below this item count projection is skipped.
    pub min_items: usize,
    pub seed: u64,
    pub iterations: usize,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            cube_size: CUBE_SIZE,
            min_items: MIN_PROJECTION_ITEMS,
            seed: 7,
            iterations: 200,
        }
    }
}

pub struct SimilarityProjector {
    config: ProjectorConfig,
}

impl SimilarityProjector {
    pub fn new(config: ProjectorConfig) -> Self {
        Self { config }
    }

    /// Project items into the viewing cube. Returns `None` when the dataset
    /// is too small to embed meaningfully; callers keep dataset positions.
    pub fn project(&self, items: &[Item]) -> Option<Vec<Vec3>> {
        let n = items.len();
        if n < self.config.min_items {
            tracing::info!(
                count = n,
                min = self.config.min_items,
                "dataset too small, keeping authored positions"
            );
            return None;
        }

        let composites = self.composite_vectors(items);
        let k = (n / 2).min(15).max(1);
        let neighbors = nearest_neighbors(&composites, k);

        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let mut positions: Vec<Vec3> = (0..n)
            .map(|_| {
                Vec3::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                )
            })
            .collect();

        for iter in 0..self.config.iterations {
            let rate = 0.12 * (1.0 - iter as f64 / self.config.iterations as f64);
            for i in 0..n {
                let mut delta = Vec3::ZERO;
                for &j in &neighbors[i] {
                    delta = delta + (positions[j] - positions[i]) * 0.5;
                }
                // A few random repulsion samples keep the cloud from collapsing
                for _ in 0..3 {
                    let j = rng.random_range(0..n);
                    if j == i {
                        continue;
                    }
                    let away = positions[i] - positions[j];
                    let dist_sq = away.dot(away).max(1e-4);
                    delta = delta + away * (0.05 / dist_sq);
                }
                positions[i] = positions[i] + delta * rate;
            }
        }

        rescale_to_cube(&mut positions, self.config.cube_size);
        Some(positions)
    }

    /// Weighted concatenation of feature vector and metadata scalars.
    ///
    /// The feature dimensionality is taken from the first well-formed
    /// vector; items with missing, mismatched, or non-finite vectors get a
    /// deterministic metadata-derived stand-in of the same dimension.
    fn composite_vectors(&self, items: &[Item]) -> Vec<Vec<f64>> {
        let dim = items
            .iter()
            .filter_map(|it| it.feature_vector.as_ref())
            .find(|v| !v.is_empty() && v.iter().all(|x| x.is_finite()))
            .map(|v| v.len())
            .unwrap_or(FALLBACK_DIM);

        let (era_min, era_max) = items
            .iter()
            .fold((i64::MAX, i64::MIN), |(lo, hi), it| {
                (lo.min(it.era), hi.max(it.era))
            });
        let era_span = (era_max - era_min) as f64;

        items
            .iter()
            .map(|item| {
                let features = match &item.feature_vector {
                    Some(v) if v.len() == dim && v.iter().all(|x| x.is_finite()) => v.clone(),
                    _ => fallback_vector(item, dim),
                };
                let era_norm = if era_span < EPSILON {
                    0.5
                } else {
                    (item.era - era_min) as f64 / era_span
                };
                let mut composite: Vec<f64> =
                    features.iter().map(|x| x * FEATURE_WEIGHT).collect();
                composite.push(era_norm * METADATA_WEIGHT);
                composite.push(hash_unit(&item.region) * METADATA_WEIGHT);
                composite.push(hash_unit(&item.kind) * METADATA_WEIGHT);
                composite
            })
            .collect()
    }
}

/// Deterministic stand-in feature vector derived from item metadata.
fn fallback_vector(item: &Item, dim: usize) -> Vec<f64> {
    let mut hash = fnv1a(item.id.as_bytes());
    hash = fnv1a_continue(hash, item.region.as_bytes());
    hash = fnv1a_continue(hash, item.kind.as_bytes());
    hash = fnv1a_continue(hash, &item.era.to_le_bytes());
    for color in &item.colors {
        hash = fnv1a_continue(hash, color.as_bytes());
    }
    let mut rng = SmallRng::seed_from_u64(hash);
    (0..dim).map(|_| rng.random::<f64>()).collect()
}

/// FNV-1a over a byte slice. The std hasher is not stable across releases,
/// and layouts must reproduce across builds.
fn fnv1a(bytes: &[u8]) -> u64 {
    fnv1a_continue(0xcbf2_9ce4_8422_2325, bytes)
}

fn fnv1a_continue(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn hash_unit(s: &str) -> f64 {
    fnv1a(s.as_bytes()) as f64 / u64::MAX as f64
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Indices of the `k` nearest vectors to each vector. O(n^2), fine at
/// gallery scale.
fn nearest_neighbors(vectors: &[Vec<f64>], k: usize) -> Vec<Vec<usize>> {
    let n = vectors.len();
    (0..n)
        .map(|i| {
            let mut dists: Vec<(usize, f64)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (j, squared_distance(&vectors[i], &vectors[j])))
                .collect();
            dists.sort_by(|a, b| a.1.total_cmp(&b.1));
            dists.truncate(k);
            dists.into_iter().map(|(j, _)| j).collect()
        })
        .collect()
}

/// Center per axis and apply one uniform scale so the largest axis spans
/// the cube edge. Uniform scaling preserves relative distances.
fn rescale_to_cube(positions: &mut [Vec3], cube_size: f64) {
    let mut min = Vec3::new(f64::MAX, f64::MAX, f64::MAX);
    let mut max = Vec3::new(f64::MIN, f64::MIN, f64::MIN);
    for p in positions.iter() {
        min = Vec3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
        max = Vec3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
    }
    let range = (max.x - min.x).max(max.y - min.y).max(max.z - min.z);
    let center = (min + max) * 0.5;
    if range < EPSILON {
        for p in positions.iter_mut() {
            *p = Vec3::ZERO;
        }
        return;
    }
    let scale = cube_size / range;
    for p in positions.iter_mut() {
        *p = (*p - center) * scale;
    }
}
