//! Normalized k-means with k-means++ seeding.
//!
//! Vectors are L2-normalized before clustering, so squared Euclidean distance
//! ranks neighbours exactly as cosine distance would. The random source is a
//! parameter: production passes an entropy-seeded generator, tests pass a
//! seeded one and get reproducible labels.

use nt_core::{Error, Result};
use rand::Rng;

#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Upper bound on Lloyd passes
    pub max_iterations: usize,
    /// Upper bound for [`KMeans::suggested_k`]
    pub max_clusters: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            max_clusters: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clustering {
    /// Cluster index per input vector, in input order
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f32>>,
    pub iterations: usize,
}

impl Clustering {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Number of clusters that ended up with at least one member.
    pub fn non_empty_clusters(&self) -> usize {
        let mut seen = vec![false; self.k()];
        for &label in &self.labels {
            seen[label] = true;
        }
        seen.into_iter().filter(|s| *s).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct KMeans {
    config: KMeansConfig,
}

impl KMeans {
    pub fn new(config: KMeansConfig) -> Self {
        Self { config }
    }

    /// `floor(sqrt(n))`, kept within `1..=max_clusters`.
    pub fn suggested_k(&self, n: usize) -> usize {
        ((n as f64).sqrt().floor() as usize).clamp(1, self.config.max_clusters.max(1))
    }

    /// Partition `vectors` into at most `k_requested` clusters.
    ///
    /// `k` is clamped to `1..=n`. An empty input yields an empty clustering.
    /// All vectors must share one dimensionality.
    pub fn fit<R: Rng + ?Sized>(
        &self,
        vectors: &[Vec<f32>],
        k_requested: usize,
        rng: &mut R,
    ) -> Result<Clustering> {
        if vectors.is_empty() {
            return Ok(Clustering::default());
        }

        let n = vectors.len();
        let k = k_requested.min(n).max(1);
        let dim = vectors[0].len();
        if let Some(pos) = vectors.iter().position(|v| v.len() != dim) {
            return Err(Error::Clustering(format!(
                "vector {} has {} dimensions, expected {}",
                pos,
                vectors[pos].len(),
                dim
            )));
        }

        let data: Vec<Vec<f32>> = vectors.iter().map(|v| normalize(v)).collect();
        let mut centroids = seed_centroids(&data, k, rng);
        let mut labels = vec![0usize; n];
        let mut iterations = 0;

        for _ in 0..self.config.max_iterations {
            iterations += 1;

            let mut changed = false;
            for (label, point) in labels.iter_mut().zip(&data) {
                let (best, _) = nearest(point, &centroids);
                if *label != best {
                    *label = best;
                    changed = true;
                }
            }

            let mut sums = vec![vec![0.0f32; dim]; k];
            let mut counts = vec![0usize; k];
            for (&label, point) in labels.iter().zip(&data) {
                counts[label] += 1;
                for (acc, x) in sums[label].iter_mut().zip(point) {
                    *acc += x;
                }
            }
            // Empty clusters keep their previous centroid
            for ((centroid, sum), &count) in centroids.iter_mut().zip(sums).zip(&counts) {
                if count == 0 {
                    continue;
                }
                for (c, s) in centroid.iter_mut().zip(sum) {
                    *c = s / count as f32;
                }
            }

            if !changed {
                break;
            }
        }

        Ok(Clustering {
            labels,
            centroids,
            iterations,
        })
    }
}

/// Divide by the Euclidean norm. Zero vectors are returned unchanged.
pub fn normalize(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm = if norm == 0.0 { 1.0 } else { norm };
    vector.iter().map(|v| v / norm).collect()
}

fn squared_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = (x - y) as f64;
            diff * diff
        })
        .sum()
}

/// Index of and squared distance to the closest centroid. Ties go to the
/// lowest index.
fn nearest(point: &[f32], centroids: &[Vec<f32>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (j, centroid) in centroids.iter().enumerate() {
        let dist = squared_distance(point, centroid);
        if dist < best.1 {
            best = (j, dist);
        }
    }
    best
}

/// k-means++: first centroid uniform, each next one drawn with probability
/// proportional to the squared distance to the nearest chosen centroid.
fn seed_centroids<R: Rng + ?Sized>(data: &[Vec<f32>], k: usize, rng: &mut R) -> Vec<Vec<f32>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(data[rng.gen_range(0..data.len())].clone());

    while centroids.len() < k {
        let weights: Vec<f64> = data.iter().map(|x| nearest(x, &centroids).1).collect();
        let total: f64 = weights.iter().sum();
        let idx = if total > 0.0 {
            weighted_index(&weights, rng.gen::<f64>() * total)
        } else {
            0
        };
        centroids.push(data[idx].clone());
    }

    centroids
}

/// Walk the cumulative sum until `target` is used up.
fn weighted_index(weights: &[f64], mut target: f64) -> usize {
    for (i, w) in weights.iter().enumerate() {
        target -= w;
        if target <= 0.0 {
            return i;
        }
    }
    // Rounding left a sliver of target; take the last point that had weight
    weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn blobs() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 0.01, 0.0],
            vec![0.95, 0.0, 0.01],
            vec![2.0, 0.02, 0.0],
            vec![0.0, 1.0, 0.01],
            vec![0.01, 0.9, 0.0],
            vec![0.0, 3.0, 0.03],
            vec![0.0, 0.01, 1.0],
            vec![0.01, 0.0, 0.8],
            vec![0.0, 0.05, 5.0],
        ]
    }

    #[test]
    fn test_empty_input() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = KMeans::default().fit(&[], 5, &mut rng).unwrap();
        assert!(result.labels.is_empty());
        assert!(result.centroids.is_empty());
    }

    #[test]
    fn test_k_is_clamped_to_point_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0]];

        let result = KMeans::default().fit(&vectors, 10, &mut rng).unwrap();
        assert_eq!(result.k(), 2);
        assert!(result.labels.iter().all(|&l| l < 2));

        let result = KMeans::default().fit(&vectors, 0, &mut rng).unwrap();
        assert_eq!(result.k(), 1);
        assert_eq!(result.labels, vec![0, 0]);
    }

    #[test]
    fn test_every_point_gets_one_label_in_range() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            for k in 1..=9 {
                let result = KMeans::default().fit(&blobs(), k, &mut rng).unwrap();
                assert_eq!(result.labels.len(), 9);
                assert_eq!(result.k(), k);
                assert!(result.labels.iter().all(|&l| l < k));
                assert!(result.non_empty_clusters() >= 1);
            }
        }
    }

    #[test]
    fn test_same_seed_same_labels() {
        let a = KMeans::default().fit(&blobs(), 3, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = KMeans::default().fit(&blobs(), 3, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn test_separates_directions_not_magnitudes() {
        // Points differ in length within a blob; normalization makes that irrelevant
        for seed in 0..10 {
            let result = KMeans::default()
                .fit(&blobs(), 3, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            let labels = &result.labels;
            assert_eq!(labels[0], labels[1]);
            assert_eq!(labels[1], labels[2]);
            assert_eq!(labels[3], labels[4]);
            assert_eq!(labels[4], labels[5]);
            assert_eq!(labels[6], labels[7]);
            assert_eq!(labels[7], labels[8]);
            assert_ne!(labels[0], labels[3]);
            assert_ne!(labels[0], labels[6]);
            assert_ne!(labels[3], labels[6]);
        }
    }

    #[test]
    fn test_identical_points_collapse_to_first_cluster() {
        let vectors = vec![vec![0.5, 0.5]; 4];
        let result = KMeans::default()
            .fit(&vectors, 3, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(result.k(), 3);
        assert_eq!(result.labels, vec![0, 0, 0, 0]);
        assert_eq!(result.non_empty_clusters(), 1);
    }

    #[test]
    fn test_zero_vectors_are_tolerated() {
        let vectors = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 0.0]];
        let result = KMeans::default()
            .fit(&vectors, 2, &mut StdRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(result.labels.len(), 3);
        assert_eq!(result.labels[0], result.labels[2]);
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let vectors = vec![vec![1.0, 0.0], vec![1.0]];
        let result = KMeans::default().fit(&vectors, 2, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(Error::Clustering(_))));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(&[3.0, 4.0]), vec![0.6, 0.8]);
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_weighted_index() {
        let weights = [0.0, 1.0, 0.0, 3.0];
        assert_eq!(weighted_index(&weights, 0.5), 1);
        assert_eq!(weighted_index(&weights, 1.0), 1);
        assert_eq!(weighted_index(&weights, 2.5), 3);
        assert_eq!(weighted_index(&weights, 4.0000001), 3);
    }

    #[test]
    fn test_suggested_k() {
        let kmeans = KMeans::default();
        assert_eq!(kmeans.suggested_k(0), 1);
        assert_eq!(kmeans.suggested_k(3), 1);
        assert_eq!(kmeans.suggested_k(9), 3);
        assert_eq!(kmeans.suggested_k(120), 10);
    }
}
