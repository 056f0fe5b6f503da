//! Stage 3: project the embeddings to 2D and 3D with t-SNE.
//!
//! Exact t-SNE over cosine distances, run twice (once per target
//! dimensionality) from the same seed so both projections are
//! reproducible from the same vector table.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::io::table::{read_vectors, write_vectors};
use crate::model::vectors::VectorTable;

use super::config::ReduceConfig;
use super::error::Error;
use super::files;

/// Minimum number of vectors for a meaningful projection.
const MIN_VECTORS: usize = 4;

const MOMENTUM_INITIAL: f64 = 0.5;
const MOMENTUM_FINAL: f64 = 0.8;
const MIN_GAIN: f64 = 0.01;
const MIN_PROBABILITY: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
pub struct ReduceSummary {
    pub records: usize,
    /// Perplexity actually used after the small-input cap.
    pub perplexity: f64,
}

/// Runs the reduction stage: reads the record embeddings, projects them to
/// 2D and 3D, and writes both projection tables.
pub fn run(work_dir: &Path, config: &ReduceConfig) -> Result<ReduceSummary, Error> {
    let vectors_path = work_dir.join(files::VECTORS);
    if !vectors_path.exists() {
        return Err(Error::MissingArtifact(vectors_path));
    }

    let file = File::open(&vectors_path).map_err(|e| Error::file(&vectors_path, e))?;
    let vectors = read_vectors(BufReader::new(file))?;
    if vectors.len() < MIN_VECTORS {
        return Err(Error::TooFewVectors {
            needed: MIN_VECTORS,
            got: vectors.len(),
        });
    }

    let perplexity = capped_perplexity(config.perplexity, vectors.len());
    info!(
        "Project {} vectors (perplexity {})",
        vectors.len(),
        perplexity
    );

    for (out_dim, file_name, columns) in [
        (2, files::VECTORS_2D, axis_columns(2)),
        (3, files::VECTORS_3D, axis_columns(3)),
    ] {
        let projected = project(&vectors, out_dim, config);
        let path = work_dir.join(file_name);
        let out = File::create(&path).map_err(|e| Error::file(&path, e))?;
        write_vectors(BufWriter::new(out), &projected, &columns)?;
        info!("Wrote {}", path.display());
    }

    Ok(ReduceSummary {
        records: vectors.len(),
        perplexity,
    })
}

/// Axis column names, e.g. `TSNE1_2D, TSNE2_2D` for the 2D table.
fn axis_columns(out_dim: usize) -> Vec<String> {
    (1..=out_dim)
        .map(|i| format!("TSNE{}_{}D", i, out_dim))
        .collect()
}

fn capped_perplexity(perplexity: f64, n: usize) -> f64 {
    perplexity.min((n - 1) as f64 / 3.0)
}

/// Exact t-SNE of `vectors` into `out_dim` dimensions. Each call starts
/// from the configured seed, so the 2D and 3D passes are independently
/// reproducible.
pub fn project(vectors: &VectorTable, out_dim: usize, config: &ReduceConfig) -> VectorTable {
    let n = vectors.len();
    let distances = cosine_distances(vectors);
    let p = joint_probabilities(&distances, capped_perplexity(config.perplexity, n));

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1e-4).expect("valid distribution");
    let mut y: Vec<f64> = (0..n * out_dim).map(|_| normal.sample(&mut rng)).collect();

    let mut velocity = vec![0.0f64; n * out_dim];
    let mut gains = vec![1.0f64; n * out_dim];
    let mut gradient = vec![0.0f64; n * out_dim];

    for iteration in 0..config.iterations {
        let exaggeration = if iteration < config.exaggeration_iterations {
            config.early_exaggeration
        } else {
            1.0
        };
        let momentum = if iteration < config.exaggeration_iterations {
            MOMENTUM_INITIAL
        } else {
            MOMENTUM_FINAL
        };

        compute_gradient(&p, &y, n, out_dim, exaggeration, &mut gradient);

        for i in 0..n * out_dim {
            // Adaptive per-coordinate gains, as in the reference t-SNE.
            let same_sign = gradient[i].signum() == velocity[i].signum();
            gains[i] = if same_sign {
                (gains[i] * 0.8).max(MIN_GAIN)
            } else {
                gains[i] + 0.2
            };
            velocity[i] =
                momentum * velocity[i] - config.learning_rate * gains[i] * gradient[i];
            y[i] += velocity[i];
        }

        center(&mut y, n, out_dim);
    }

    let mut projected = VectorTable::new(out_dim);
    for (i, key) in vectors.keys().iter().enumerate() {
        let row = y[i * out_dim..(i + 1) * out_dim]
            .iter()
            .map(|&v| v as f32)
            .collect();
        projected.push(key.clone(), row);
    }
    projected
}

/// Pairwise cosine distances, `n x n` row-major. A zero-norm vector is
/// treated as maximally distant from everything.
fn cosine_distances(vectors: &VectorTable) -> Vec<f64> {
    let n = vectors.len();
    let norms: Vec<f64> = (0..n)
        .map(|i| {
            vectors
                .row(i)
                .iter()
                .map(|&v| (v as f64) * (v as f64))
                .sum::<f64>()
                .sqrt()
        })
        .collect();

    let mut distances = vec![0.0f64; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let dot: f64 = vectors
                .row(i)
                .iter()
                .zip(vectors.row(j))
                .map(|(&a, &b)| (a as f64) * (b as f64))
                .sum();
            let distance = if norms[i] > 0.0 && norms[j] > 0.0 {
                (1.0 - dot / (norms[i] * norms[j])).max(0.0)
            } else {
                1.0
            };
            distances[i * n + j] = distance;
            distances[j * n + i] = distance;
        }
    }
    distances
}

/// Symmetrized joint probabilities from the distance matrix, with each
/// row's bandwidth tuned to the target perplexity by binary search.
fn joint_probabilities(distances: &[f64], perplexity: f64) -> Vec<f64> {
    let n = (distances.len() as f64).sqrt() as usize;
    let target_entropy = perplexity.ln();

    let mut conditional = vec![0.0f64; n * n];
    for i in 0..n {
        let row = &distances[i * n..(i + 1) * n];
        let beta = bandwidth_for(row, i, target_entropy);
        fill_row(row, i, beta, &mut conditional[i * n..(i + 1) * n]);
    }

    // P = (P + P^T) / 2n, floored so that log terms stay finite.
    let mut joint = vec![0.0f64; n * n];
    for i in 0..n {
        for j in 0..n {
            joint[i * n + j] = ((conditional[i * n + j] + conditional[j * n + i])
                / (2.0 * n as f64))
                .max(MIN_PROBABILITY);
        }
        joint[i * n + i] = MIN_PROBABILITY;
    }
    joint
}

/// Binary-searches the precision `beta` whose conditional distribution over
/// `row` has the target entropy.
fn bandwidth_for(row: &[f64], skip: usize, target_entropy: f64) -> f64 {
    let mut beta = 1.0f64;
    let mut beta_min = f64::NEG_INFINITY;
    let mut beta_max = f64::INFINITY;

    for _ in 0..50 {
        let entropy = row_entropy(row, skip, beta);
        let diff = entropy - target_entropy;
        if diff.abs() < 1e-5 {
            break;
        }
        if diff > 0.0 {
            beta_min = beta;
            beta = if beta_max.is_finite() {
                (beta + beta_max) / 2.0
            } else {
                beta * 2.0
            };
        } else {
            beta_max = beta;
            beta = if beta_min.is_finite() {
                (beta + beta_min) / 2.0
            } else {
                beta / 2.0
            };
        }
    }
    beta
}

fn row_entropy(row: &[f64], skip: usize, beta: f64) -> f64 {
    let mut sum = 0.0f64;
    let mut weighted = 0.0f64;
    for (j, &d) in row.iter().enumerate() {
        if j == skip {
            continue;
        }
        let p = (-beta * d).exp();
        sum += p;
        weighted += beta * d * p;
    }
    if sum <= 0.0 {
        return 0.0;
    }
    sum.ln() + weighted / sum
}

fn fill_row(row: &[f64], skip: usize, beta: f64, out: &mut [f64]) {
    let mut sum = 0.0f64;
    for (j, &d) in row.iter().enumerate() {
        out[j] = if j == skip { 0.0 } else { (-beta * d).exp() };
        sum += out[j];
    }
    if sum > 0.0 {
        for p in out.iter_mut() {
            *p /= sum;
        }
    }
}

/// Gradient of the KL divergence with the Student-t kernel in the embedding.
fn compute_gradient(
    p: &[f64],
    y: &[f64],
    n: usize,
    out_dim: usize,
    exaggeration: f64,
    gradient: &mut [f64],
) {
    // Unnormalized low-dimensional affinities.
    let mut q_num = vec![0.0f64; n * n];
    let mut q_sum = 0.0f64;
    for i in 0..n {
        for j in (i + 1)..n {
            let mut squared = 0.0f64;
            for d in 0..out_dim {
                let diff = y[i * out_dim + d] - y[j * out_dim + d];
                squared += diff * diff;
            }
            let num = 1.0 / (1.0 + squared);
            q_num[i * n + j] = num;
            q_num[j * n + i] = num;
            q_sum += 2.0 * num;
        }
    }
    let q_sum = q_sum.max(MIN_PROBABILITY);

    gradient.fill(0.0);
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let num = q_num[i * n + j];
            let q = (num / q_sum).max(MIN_PROBABILITY);
            let factor = 4.0 * (exaggeration * p[i * n + j] - q) * num;
            for d in 0..out_dim {
                gradient[i * out_dim + d] +=
                    factor * (y[i * out_dim + d] - y[j * out_dim + d]);
            }
        }
    }
}

fn center(y: &mut [f64], n: usize, out_dim: usize) {
    for d in 0..out_dim {
        let mean: f64 = (0..n).map(|i| y[i * out_dim + d]).sum::<f64>() / n as f64;
        for i in 0..n {
            y[i * out_dim + d] -= mean;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clustered_vectors() -> VectorTable {
        // Two tight clusters along orthogonal directions.
        let mut table = VectorTable::new(4);
        for i in 0..8 {
            let jitter = i as f32 * 0.01;
            table.push(format!("a{}", i), vec![1.0, jitter, 0.0, 0.0]);
            table.push(format!("b{}", i), vec![0.0, 0.0, 1.0, jitter]);
        }
        table
    }

    fn test_config() -> ReduceConfig {
        ReduceConfig {
            iterations: 300,
            exaggeration_iterations: 100,
            ..ReduceConfig::default()
        }
    }

    #[test]
    fn perplexity_is_capped_for_small_inputs() {
        assert_eq!(capped_perplexity(30.0, 1000), 30.0);
        assert_eq!(capped_perplexity(30.0, 16), 5.0);
    }

    #[test]
    fn bandwidth_search_hits_the_target_entropy() {
        let row = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
        let target = 3.0f64.ln();
        let beta = bandwidth_for(&row, 0, target);
        assert!((row_entropy(&row, 0, beta) - target).abs() < 1e-4);
    }

    #[test]
    fn joint_probabilities_are_symmetric_and_normalized() {
        let table = clustered_vectors();
        let p = joint_probabilities(&cosine_distances(&table), 4.0);
        let n = table.len();

        let total: f64 = p.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        for i in 0..n {
            for j in 0..n {
                assert!((p[i * n + j] - p[j * n + i]).abs() < 1e-12);
                assert!(p[i * n + j] >= MIN_PROBABILITY);
            }
        }
    }

    #[test]
    fn projection_keeps_keys_and_order() {
        let table = clustered_vectors();
        let projected = project(&table, 2, &test_config());
        assert_eq!(projected.dim(), 2);
        assert_eq!(projected.keys(), table.keys());
    }

    #[test]
    fn projection_is_deterministic_for_a_seed() {
        let table = clustered_vectors();
        let config = test_config();
        assert_eq!(project(&table, 3, &config), project(&table, 3, &config));
    }

    #[test]
    fn clusters_stay_separated_in_the_projection() {
        let table = clustered_vectors();
        let projected = project(&table, 2, &test_config());

        let distance = |a: &str, b: &str| {
            let (a, b) = (projected.get(a).unwrap(), projected.get(b).unwrap());
            a.iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt()
        };

        let intra = distance("a0", "a7").max(distance("b0", "b7"));
        let inter = distance("a0", "b0").min(distance("a7", "b7"));
        assert!(intra < inter, "intra {} inter {}", intra, inter);
    }

    #[test]
    fn axis_columns_carry_the_dimensionality() {
        assert_eq!(axis_columns(2), ["TSNE1_2D", "TSNE2_2D"]);
        assert_eq!(
            axis_columns(3),
            ["TSNE1_3D", "TSNE2_3D", "TSNE3_3D"]
        );
    }
}
