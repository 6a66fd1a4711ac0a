use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use rayon::prelude::*;

use super::Quantizer;
use crate::color::RgbColor;
use crate::decoder::SampledImage;
use crate::error::Result;

/// Largest centroid move (in RGB units) still counted as "not converged".
pub const CONVERGENCE_THRESHOLD: f64 = 10.0;
pub const MAX_ITERATIONS: usize = 100;

type Point = [f64; 3];

#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub center: Point,
    /// Members assigned in the final round
    pub size: usize,
}

impl Cluster {
    pub fn color(&self) -> RgbColor {
        let [r, g, b] = self.center;
        RgbColor(r as u8, g as u8, b as u8)
    }
}

/// Lloyd-style K-means with random initial centroids.
///
/// Without a seed every run draws fresh initial centroids, so two runs over
/// the same image may return different palettes.
pub struct KMeansQuantizer {
    pub seed: Option<u64>,
    pub threshold: f64,
    pub max_iterations: usize,
}

impl KMeansQuantizer {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed, threshold: CONVERGENCE_THRESHOLD, max_iterations: MAX_ITERATIONS }
    }

    /// Cluster `points` into at most `k` groups, largest cluster first.
    pub fn fit(&self, points: &[Point], k: usize) -> Vec<Cluster> {
        self.fit_rounds(points, k).0
    }

    /// Clusters plus the number of assignment rounds it took.
    fn fit_rounds(&self, points: &[Point], k: usize) -> (Vec<Cluster>, usize) {
        if points.is_empty() || k == 0 {
            return (Vec::new(), 0);
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        // 1. Seed centroids: uniform sample without replacement
        let k = k.min(points.len());
        let mut centers: Vec<Point> = index::sample(&mut rng, points.len(), k).iter().map(|i| points[i]).collect();
        let mut sizes = vec![0usize; k];
        let mut rounds = 0;

        for _ in 0..self.max_iterations {
            rounds += 1;

            // 2. Full reassignment of every point
            let assignments: Vec<usize> = points.par_iter().map(|p| nearest(p, &centers)).collect();

            // 3. Move each non-empty cluster to the mean of its members
            let mut sums = vec![[0.0f64; 3]; k];
            sizes = vec![0; k];
            for (point, &cluster) in points.iter().zip(&assignments) {
                for axis in 0..3 {
                    sums[cluster][axis] += point[axis];
                }
                sizes[cluster] += 1;
            }

            let mut shift = 0.0f64;
            for cluster in 0..k {
                if sizes[cluster] == 0 {
                    continue;
                }
                let n = sizes[cluster] as f64;
                let center = [sums[cluster][0] / n, sums[cluster][1] / n, sums[cluster][2] / n];
                shift = shift.max(distance(&centers[cluster], &center));
                centers[cluster] = center;
            }

            if shift < self.threshold {
                break;
            }
        }

        let mut clusters: Vec<Cluster> = centers
            .into_iter()
            .zip(sizes)
            .map(|(center, size)| Cluster { center, size })
            .collect();
        clusters.sort_by(|a, b| b.size.cmp(&a.size));
        (clusters, rounds)
    }
}

impl Quantizer for KMeansQuantizer {
    fn name(&self) -> &'static str {
        "kmeans"
    }

    fn quantize(&self, image: &SampledImage, count: usize) -> Result<Vec<RgbColor>> {
        let mut points: Vec<Point> = Vec::with_capacity(image.pixel_count());
        points.extend(image.pixels().map(|c| [c.0 as f64, c.1 as f64, c.2 as f64]));
        Ok(self.fit(&points, count).iter().map(Cluster::color).collect())
    }
}

fn distance(p: &Point, q: &Point) -> f64 {
    ((p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2) + (p[2] - q[2]).powi(2)).sqrt()
}

fn nearest(point: &Point, centers: &[Point]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, center) in centers.iter().enumerate() {
        let d = distance(point, center);
        if d < best_distance {
            best_distance = d;
            best = i;
        }
    }
    best
}
