//! Stage 2: train token embeddings on the nomenclature corpus.
//!
//! Skip-gram with negative sampling over the token sequences produced by
//! preprocessing. A record vector is the sum of its token vectors, so
//! records sharing class or chain tokens land near each other.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::io::table::{read_table, vector_columns, write_vectors};
use crate::model::vectors::VectorTable;

use super::config::TrainConfig;
use super::error::Error;
use super::files;

#[derive(Debug, Clone, Copy)]
pub struct TrainSummary {
    /// Records embedded.
    pub records: usize,
    /// Records dropped because a token fell below `min_count`.
    pub skipped: usize,
    /// Vocabulary size after the `min_count` cut.
    pub vocabulary: usize,
}

/// A trained skip-gram model over the nomenclature vocabulary.
pub struct Word2Vec {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
    /// Input embeddings, `vocabulary x dim`, row-major.
    syn0: Vec<f32>,
    dim: usize,
}

impl Word2Vec {
    /// Trains embeddings on `corpus`, one token sequence per record.
    pub fn train(corpus: &[Vec<String>], config: &TrainConfig) -> Result<Self, Error> {
        let (tokens, counts, index) = build_vocabulary(corpus, config.min_count);
        if tokens.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let dim = config.vector_size;
        let mut rng = StdRng::seed_from_u64(config.seed);

        // Input vectors start small and random, output vectors at zero.
        let mut syn0: Vec<f32> = (0..tokens.len() * dim)
            .map(|_| (rng.gen::<f32>() - 0.5) / dim as f32)
            .collect();
        let mut syn1neg = vec![0.0f32; tokens.len() * dim];

        let noise = NoiseTable::new(&counts);

        // Sentences as vocabulary indices; out-of-vocabulary tokens are
        // removed from the context, matching the min_count cut.
        let mut sentences: Vec<Vec<usize>> = corpus
            .iter()
            .map(|tokens| {
                tokens
                    .iter()
                    .filter_map(|t| index.get(t.as_str()).copied())
                    .collect()
            })
            .filter(|s: &Vec<usize>| s.len() > 1)
            .collect();

        let total_words: usize = sentences.iter().map(Vec::len).sum::<usize>() * config.epochs;
        let mut processed = 0usize;
        let mut grad = vec![0.0f32; dim];

        for _ in 0..config.epochs {
            sentences.shuffle(&mut rng);

            for sentence in &sentences {
                for (pos, &center) in sentence.iter().enumerate() {
                    let alpha = decayed_rate(config, processed, total_words);
                    processed += 1;

                    // Dynamic window, as in the reference implementations.
                    let window = rng.gen_range(1..=config.window);
                    let start = pos.saturating_sub(window);
                    let end = (pos + window + 1).min(sentence.len());

                    for &context in &sentence[start..end] {
                        if context == center {
                            continue;
                        }
                        train_pair(
                            &mut syn0,
                            &mut syn1neg,
                            &mut grad,
                            dim,
                            center,
                            context,
                            config.negative,
                            alpha,
                            &noise,
                            &mut rng,
                        );
                    }
                }
            }
        }

        Ok(Self {
            tokens,
            index,
            syn0,
            dim,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn vocabulary(&self) -> usize {
        self.tokens.len()
    }

    pub fn vector(&self, token: &str) -> Option<&[f32]> {
        let i = *self.index.get(token)?;
        Some(&self.syn0[i * self.dim..(i + 1) * self.dim])
    }

    /// Sum of the token vectors; `None` when any token is out of vocabulary.
    pub fn embed(&self, tokens: &[String]) -> Option<Vec<f32>> {
        let mut sum = vec![0.0f32; self.dim];
        for token in tokens {
            let vector = self.vector(token)?;
            for (s, v) in sum.iter_mut().zip(vector) {
                *s += v;
            }
        }
        Some(sum)
    }

    /// All token vectors in vocabulary order (frequency-descending).
    pub fn token_vectors(&self) -> VectorTable {
        let mut table = VectorTable::new(self.dim);
        for (i, token) in self.tokens.iter().enumerate() {
            table.push(
                token.clone(),
                self.syn0[i * self.dim..(i + 1) * self.dim].to_vec(),
            );
        }
        table
    }
}

/// Vocabulary tokens sorted by descending count, ties broken by token,
/// so the model layout is independent of corpus order.
fn build_vocabulary(
    corpus: &[Vec<String>],
    min_count: usize,
) -> (Vec<String>, Vec<usize>, HashMap<String, usize>) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for sentence in corpus {
        for token in sentence {
            *counts.entry(token.as_str()).or_default() += 1;
        }
    }

    let mut entries: Vec<(&str, usize)> = counts
        .into_iter()
        .filter(|&(_, count)| count >= min_count.max(1))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let tokens: Vec<String> = entries.iter().map(|(t, _)| t.to_string()).collect();
    let counts: Vec<usize> = entries.iter().map(|&(_, c)| c).collect();
    let index = tokens
        .iter()
        .enumerate()
        .map(|(i, t)| (t.clone(), i))
        .collect();
    (tokens, counts, index)
}

fn decayed_rate(config: &TrainConfig, processed: usize, total: usize) -> f32 {
    let fraction = processed as f32 / total.max(1) as f32;
    (config.learning_rate * (1.0 - fraction)).max(config.min_learning_rate)
}

/// Unigram noise distribution raised to the 3/4 power, sampled by binary
/// search over the cumulative weights.
struct NoiseTable {
    cumulative: Vec<f64>,
    total: f64,
}

impl NoiseTable {
    fn new(counts: &[usize]) -> Self {
        let mut cumulative = Vec::with_capacity(counts.len());
        let mut total = 0.0f64;
        for &count in counts {
            total += (count as f64).powf(0.75);
            cumulative.push(total);
        }
        Self { cumulative, total }
    }

    fn sample(&self, rng: &mut StdRng) -> usize {
        let r = rng.gen::<f64>() * self.total;
        self.cumulative.partition_point(|&c| c <= r)
    }
}

fn sigmoid(x: f32) -> f32 {
    if x > 6.0 {
        1.0
    } else if x < -6.0 {
        0.0
    } else {
        1.0 / (1.0 + (-x).exp())
    }
}

#[allow(clippy::too_many_arguments)]
fn train_pair(
    syn0: &mut [f32],
    syn1neg: &mut [f32],
    grad: &mut [f32],
    dim: usize,
    center: usize,
    context: usize,
    negative: usize,
    alpha: f32,
    noise: &NoiseTable,
    rng: &mut StdRng,
) {
    grad.fill(0.0);
    let input = center * dim..(center + 1) * dim;

    for sample in 0..=negative {
        let (target, label) = if sample == 0 {
            (context, 1.0f32)
        } else {
            let target = noise.sample(rng);
            if target == context {
                continue;
            }
            (target, 0.0f32)
        };

        let output = target * dim..(target + 1) * dim;
        let dot: f32 = syn0[input.clone()]
            .iter()
            .zip(&syn1neg[output.clone()])
            .map(|(a, b)| a * b)
            .sum();
        let g = (label - sigmoid(dot)) * alpha;

        for ((grad_i, in_i), out_i) in grad
            .iter_mut()
            .zip(&syn0[input.clone()])
            .zip(&mut syn1neg[output])
        {
            *grad_i += g * *out_i;
            *out_i += g * *in_i;
        }
    }

    for (in_i, grad_i) in syn0[input].iter_mut().zip(grad.iter()) {
        *in_i += grad_i;
    }
}

/// Runs the training stage: reads the token table, trains the model, and
/// writes the record and token vector tables.
pub fn run(work_dir: &Path, config: &TrainConfig) -> Result<TrainSummary, Error> {
    let tokens_path = work_dir.join(files::TOKENS);
    if !tokens_path.exists() {
        return Err(Error::MissingArtifact(tokens_path));
    }

    let file = File::open(&tokens_path).map_err(|e| Error::file(&tokens_path, e))?;
    let table = read_table(BufReader::new(file))?;
    let tokens_col = table
        .columns()
        .iter()
        .position(|c| c == "TOKENS")
        .ok_or_else(|| crate::io::Error::missing_column(crate::io::Format::Csv, "TOKENS"))?;

    let corpus: Vec<(String, Vec<String>)> = table
        .rows()
        .iter()
        .map(|(key, cells)| {
            let tokens = cells[tokens_col]
                .split_whitespace()
                .map(String::from)
                .collect();
            (key.clone(), tokens)
        })
        .collect();
    if corpus.is_empty() {
        return Err(Error::EmptyCorpus);
    }

    info!(
        "Train {}-dimensional embeddings on {} records",
        config.vector_size,
        corpus.len()
    );
    let sentences: Vec<Vec<String>> = corpus.iter().map(|(_, t)| t.clone()).collect();
    let model = Word2Vec::train(&sentences, config)?;
    info!("Vocabulary holds {} tokens", model.vocabulary());

    let mut vectors = VectorTable::new(model.dim());
    let mut skipped = 0usize;
    for (key, tokens) in &corpus {
        match model.embed(tokens) {
            Some(vector) => {
                vectors.push(key.clone(), vector);
            }
            None => {
                skipped += 1;
                warn!("{}: token below the count threshold, record dropped", key);
            }
        }
    }
    if vectors.is_empty() {
        return Err(Error::EmptyCorpus);
    }

    let columns = vector_columns(model.dim());
    for (file_name, table) in [
        (files::VECTORS, &vectors),
        (files::TOKEN_VECTORS, &model.token_vectors()),
    ] {
        let path = work_dir.join(file_name);
        let file = File::create(&path).map_err(|e| Error::file(&path, e))?;
        write_vectors(BufWriter::new(file), table, &columns)?;
        info!("Wrote {}", path.display());
    }

    Ok(TrainSummary {
        records: vectors.len(),
        skipped,
        vocabulary: model.vocabulary(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn small_config() -> TrainConfig {
        TrainConfig {
            vector_size: 10,
            window: 2,
            epochs: 40,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn vocabulary_is_count_ordered_with_stable_ties() {
        let corpus = vec![
            sentence(&["PC", "16:0", "18:1"]),
            sentence(&["PC", "16:0", "20:4"]),
            sentence(&["PE", "18:1", "16:0"]),
        ];
        let (tokens, counts, index) = build_vocabulary(&corpus, 1);
        assert_eq!(tokens[0], "16:0");
        assert_eq!(counts[0], 3);
        assert_eq!(tokens[1..3], ["18:1".to_string(), "PC".to_string()]);
        assert_eq!(index["PE"], tokens.iter().position(|t| t == "PE").unwrap());
    }

    #[test]
    fn min_count_drops_rare_tokens() {
        let corpus = vec![
            sentence(&["PC", "16:0"]),
            sentence(&["PC", "16:0"]),
            sentence(&["PC", "22:6"]),
        ];
        let (tokens, _, _) = build_vocabulary(&corpus, 2);
        assert!(tokens.contains(&"PC".to_string()));
        assert!(!tokens.contains(&"22:6".to_string()));
    }

    #[test]
    fn noise_samples_stay_in_range() {
        let noise = NoiseTable::new(&[10, 5, 1]);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert!(noise.sample(&mut rng) < 3);
        }
    }

    #[test]
    fn training_is_deterministic_for_a_seed() {
        let corpus = vec![
            sentence(&["PC", "16:0", "18:1"]),
            sentence(&["PE", "16:0", "22:6"]),
            sentence(&["TG", "16:0", "18:1", "18:2"]),
        ];
        let config = small_config();
        let a = Word2Vec::train(&corpus, &config).unwrap();
        let b = Word2Vec::train(&corpus, &config).unwrap();
        assert_eq!(a.token_vectors(), b.token_vectors());
    }

    #[test]
    fn cooccurring_tokens_end_up_closer() {
        let mut corpus = Vec::new();
        for _ in 0..50 {
            corpus.push(sentence(&["PC", "16:0", "18:1"]));
            corpus.push(sentence(&["PE", "16:0", "18:1"]));
            corpus.push(sentence(&["Cer", "d18:1", "24:0"]));
            corpus.push(sentence(&["SM", "d18:1", "24:1"]));
        }
        let model = Word2Vec::train(&corpus, &small_config()).unwrap();

        let cosine = |a: &str, b: &str| {
            let (a, b) = (model.vector(a).unwrap(), model.vector(b).unwrap());
            let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
            let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            dot / (na * nb)
        };

        assert!(cosine("PC", "16:0") > cosine("PC", "24:0"));
        assert!(cosine("Cer", "d18:1") > cosine("Cer", "18:1"));
    }

    #[test]
    fn embedding_is_the_token_sum() {
        let corpus = vec![
            sentence(&["PC", "16:0", "18:1"]),
            sentence(&["PE", "16:0", "18:1"]),
        ];
        let model = Word2Vec::train(&corpus, &small_config()).unwrap();

        let embedded = model.embed(&sentence(&["PC", "16:0"])).unwrap();
        let expected: Vec<f32> = model
            .vector("PC")
            .unwrap()
            .iter()
            .zip(model.vector("16:0").unwrap())
            .map(|(a, b)| a + b)
            .collect();
        assert_eq!(embedded, expected);

        assert!(model.embed(&sentence(&["PC", "99:9"])).is_none());
    }
}
