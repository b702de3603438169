// ============================================================
// Layer 4 - Skip-gram Sampling
// ============================================================
// Everything random about skip-gram training data:
//
//   Subsampler       drops frequent words per occurrence with
//                    p = max(0, 1 - sqrt(threshold / freq))
//   window_pairs     (center, context) pairs for one sequence,
//                    radius drawn uniformly from [1, window]
//   WindowSampler    infinite, restartable stream of pairs over
//                    a whole corpus (re-subsampled every pass),
//                    produced one center word at a time
//   NegativeSampler  noise words from unigram^0.75
//   sample_eval_words  query words for nearest-neighbour reports
//
// All of it is driven by a seeded StdRng so runs are repeatable.
//
// Reference: Mikolov et al. (2013) Distributed Representations
//            of Words and Phrases and their Compositionality
//            rand crate documentation

use std::collections::VecDeque;

use anyhow::{anyhow, Result};
use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::StdRng,
    seq::SliceRandom,
    Rng, SeedableRng,
};

/// Exponent applied to unigram counts for the noise distribution
const NOISE_POWER: f64 = 0.75;

/// First index that can hold a corpus word (after <pad>, <unk>)
const FIRST_WORD_INDEX: u32 = 2;

/// Offset of the "less frequent" half of the evaluation words
const RARE_EVAL_OFFSET: u32 = 1000;

/// One positive training example.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipGramPair {
    pub center:  u32,
    pub context: u32,
}

// ─── Subsampler ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct Subsampler {
    /// Drop probability per vocabulary index
    drop_probs: Vec<f64>,
}

impl Subsampler {
    /// Compute drop probabilities from corpus counts (indexed by
    /// vocabulary index). Done once per corpus.
    pub fn new(counts: &[u64], threshold: f64) -> Self {
        let total: u64 = counts.iter().sum();
        let drop_probs = counts
            .iter()
            .map(|&count| {
                if count == 0 || total == 0 {
                    return 0.0;
                }
                let freq = count as f64 / total as f64;
                (1.0 - (threshold / freq).sqrt()).max(0.0)
            })
            .collect();
        Self { drop_probs }
    }

    /// Count occurrences in already-encoded documents and build from those.
    pub fn from_corpus(documents: &[Vec<u32>], vocab_size: usize, threshold: f64) -> Self {
        let mut counts = vec![0u64; vocab_size];
        for &index in documents.iter().flatten() {
            if let Some(c) = counts.get_mut(index as usize) {
                *c += 1;
            }
        }
        Self::new(&counts, threshold)
    }

    pub fn drop_probability(&self, index: u32) -> f64 {
        self.drop_probs.get(index as usize).copied().unwrap_or(0.0)
    }

    /// Independent keep/drop decision for a single occurrence.
    pub fn keep<R: Rng>(&self, index: u32, rng: &mut R) -> bool {
        let p = self.drop_probability(index);
        p <= 0.0 || rng.gen::<f64>() >= p
    }

    pub fn apply<R: Rng>(&self, sequence: &[u32], rng: &mut R) -> Vec<u32> {
        sequence.iter().copied().filter(|&i| self.keep(i, rng)).collect()
    }
}

// ─── Window pairs ─────────────────────────────────────────────────────────────
/// Contexts of position `i`: a radius R is drawn from [1, window] and
/// the tokens at [i-R, i+R] without i are taken, clipped to the
/// sequence. A token repeated inside one window appears only once.
fn center_contexts<R: Rng>(sequence: &[u32], i: usize, window: usize, rng: &mut R) -> Vec<u32> {
    let radius = rng.gen_range(1..=window.max(1));
    let start  = i.saturating_sub(radius);
    let stop   = (i + radius).min(sequence.len().saturating_sub(1));

    let mut contexts: Vec<u32> = Vec::with_capacity(2 * radius);
    for (j, &context) in sequence.iter().enumerate().take(stop + 1).skip(start) {
        if j != i && !contexts.contains(&context) {
            contexts.push(context);
        }
    }
    contexts
}

/// All (center, context) pairs of one sequence, centers in order.
pub fn window_pairs<R: Rng>(sequence: &[u32], window: usize, rng: &mut R) -> Vec<SkipGramPair> {
    let mut pairs = Vec::new();
    for (i, &center) in sequence.iter().enumerate() {
        pairs.extend(
            center_contexts(sequence, i, window, rng)
                .into_iter()
                .map(|context| SkipGramPair { center, context }),
        );
    }
    pairs
}

// ─── WindowSampler ────────────────────────────────────────────────────────────
/// Lazy, endless stream of skip-gram pairs over a corpus.
///
/// Walks the documents in order, one center word at a time; when the
/// last one is done it starts over with fresh subsampling decisions
/// and bumps `epoch()`. Only the current subsampled document and the
/// contexts of the current center are held in memory.
///
/// A pass may come up empty by chance; the stream then keeps going.
/// It returns `None` only when no document can ever yield a pair,
/// i.e. none holds two tokens the subsampler can keep.
pub struct WindowSampler {
    documents:   Vec<Vec<u32>>,
    subsampler:  Subsampler,
    window_size: usize,
    rng:         StdRng,
    productive:  bool,
    cursor:      usize,
    epoch:       usize,
    current:     Vec<u32>,
    center:      usize,
    contexts:    VecDeque<u32>,
}

impl WindowSampler {
    pub fn new(documents: Vec<Vec<u32>>, subsampler: Subsampler, window_size: usize, seed: u64) -> Self {
        let productive = documents.iter().any(|doc| {
            doc.iter().filter(|&&i| subsampler.drop_probability(i) < 1.0).take(2).count() == 2
        });
        if !productive {
            tracing::warn!("No document can produce a (center, context) pair");
        }
        Self {
            documents,
            subsampler,
            window_size,
            rng: StdRng::seed_from_u64(seed),
            productive,
            cursor: 0,
            epoch: 0,
            current: Vec::new(),
            center: 0,
            contexts: VecDeque::new(),
        }
    }

    /// Completed passes over the corpus
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Subsample the next document into `current`, wrapping around at
    /// the end of the corpus.
    fn load_next_document(&mut self) {
        if self.cursor == self.documents.len() {
            self.cursor = 0;
            self.epoch += 1;
            tracing::debug!("Skip-gram sampler starting pass {}", self.epoch + 1);
        }
        self.current = self.subsampler.apply(&self.documents[self.cursor], &mut self.rng);
        self.center = 0;
        self.cursor += 1;
    }
}

impl Iterator for WindowSampler {
    type Item = SkipGramPair;

    fn next(&mut self) -> Option<SkipGramPair> {
        if !self.productive {
            return None;
        }
        loop {
            if let Some(context) = self.contexts.pop_front() {
                // `center` already points past the word being paired
                let center = self.current[self.center - 1];
                return Some(SkipGramPair { center, context });
            }
            if self.center < self.current.len() {
                let found = center_contexts(&self.current, self.center, self.window_size, &mut self.rng);
                self.contexts = found.into();
                self.center += 1;
            } else {
                self.load_next_document();
            }
        }
    }
}

// ─── NegativeSampler ──────────────────────────────────────────────────────────
/// Draws noise context words proportionally to count^0.75.
pub struct NegativeSampler {
    distribution: WeightedIndex<f64>,
    /// Number of indices with non-zero weight
    support:      usize,
}

impl NegativeSampler {
    /// `counts` is indexed by vocabulary index; zero-count entries
    /// (padding, <unk>) are never drawn.
    pub fn new(counts: &[u64]) -> Result<Self> {
        let weights: Vec<f64> = counts.iter().map(|&c| (c as f64).powf(NOISE_POWER)).collect();
        let support = weights.iter().filter(|&&w| w > 0.0).count();
        let distribution = WeightedIndex::new(&weights)
            .map_err(|e| anyhow!("cannot build noise distribution: {e}"))?;
        Ok(Self { distribution, support })
    }

    /// Draw `n` noise words for one positive pair. Draws equal to the
    /// true context are redrawn whenever another word is available.
    pub fn sample<R: Rng>(&self, true_context: u32, n: usize, rng: &mut R) -> Vec<u32> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            let index = self.distribution.sample(rng) as u32;
            if index != true_context || self.support <= 1 {
                out.push(index);
            }
        }
        out
    }
}

// ─── Evaluation words ─────────────────────────────────────────────────────────
/// Pick `valid_size` distinct query words: half among the `valid_window`
/// most frequent words, half from `[1000, 1000 + valid_window)`. When
/// the vocabulary is too small for the second range both halves come
/// from the first.
pub fn sample_eval_words<R: Rng>(vocab_size: usize, valid_size: usize, valid_window: usize, rng: &mut R) -> Vec<u32> {
    let vocab_size = vocab_size as u32;
    let window     = valid_window as u32;

    let frequent: Vec<u32> = (FIRST_WORD_INDEX..(FIRST_WORD_INDEX + window).min(vocab_size)).collect();
    let rare: Vec<u32>     = (RARE_EVAL_OFFSET..(RARE_EVAL_OFFSET + window).min(vocab_size)).collect();

    let half = valid_size / 2;
    let mut words: Vec<u32> = frequent.choose_multiple(rng, half).copied().collect();

    let pool = if rare.is_empty() { &frequent } else { &rare };
    let mut rest: Vec<u32> = pool.iter().copied().filter(|w| !words.contains(w)).collect();
    rest.shuffle(rng);
    words.extend(rest.into_iter().take(valid_size - half));

    words
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_one_pairs_only_neighbours() {
        let seq = [5u32, 2, 3, 9, 1];
        let mut rng = StdRng::seed_from_u64(7);
        let pairs = window_pairs(&seq, 1, &mut rng);

        for p in &pairs {
            let ci = seq.iter().position(|&x| x == p.center).unwrap();
            let xi = seq.iter().position(|&x| x == p.context).unwrap();
            assert_eq!(ci.abs_diff(xi), 1, "{p:?} is not a ±1 neighbour pair");
        }

        let around_three: Vec<u32> = pairs.iter().filter(|p| p.center == 3).map(|p| p.context).collect();
        assert_eq!(around_three, vec![2, 9]);
    }

    #[test]
    fn test_window_radius_stays_within_bounds() {
        let seq: Vec<u32> = (10..30).collect();
        let mut rng = StdRng::seed_from_u64(1);
        for p in window_pairs(&seq, 3, &mut rng) {
            assert!((p.center as i64 - p.context as i64).abs() <= 3);
            assert_ne!(p.center, p.context);
        }
    }

    #[test]
    fn test_window_is_deterministic_for_a_seed() {
        let seq: Vec<u32> = (2..40).collect();
        let a = window_pairs(&seq, 5, &mut StdRng::seed_from_u64(3));
        let b = window_pairs(&seq, 5, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_threshold_one_drops_nothing() {
        // "a b c a b c a b c": every word has relative frequency 1/3
        let docs = vec![vec![2u32, 3, 4, 2, 3, 4, 2, 3, 4]];
        let s = Subsampler::from_corpus(&docs, 5, 1.0);
        for i in 2..5 {
            assert_eq!(s.drop_probability(i), 0.0);
        }
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(s.apply(&docs[0], &mut rng), docs[0]);
    }

    #[test]
    fn test_drop_probability_only_above_threshold() {
        let docs = vec![vec![2u32, 3, 4, 2, 3, 4, 2, 3, 4]];
        // 1/3 > 0.1 → 1 - sqrt(0.3)
        let s = Subsampler::from_corpus(&docs, 5, 0.1);
        let expected = 1.0 - (0.3f64).sqrt();
        for i in 2..5 {
            assert!((s.drop_probability(i) - expected).abs() < 1e-12);
        }
        // 1/3 < 0.5 → never dropped
        let s = Subsampler::from_corpus(&docs, 5, 0.5);
        assert_eq!(s.drop_probability(2), 0.0);
    }

    #[test]
    fn test_window_sampler_restarts_forever() {
        let docs = vec![vec![2u32, 3], vec![4, 5]];
        let sub  = Subsampler::new(&[0, 0, 1, 1, 1, 1], 1.0);
        let mut sampler = WindowSampler::new(docs, sub, 1, 11);

        let first: Vec<SkipGramPair> = sampler.by_ref().take(4).collect();
        assert_eq!(first.len(), 4);
        let again: Vec<SkipGramPair> = sampler.by_ref().take(4).collect();
        assert_eq!(again, first);
        assert!(sampler.epoch() >= 1);
    }

    #[test]
    fn test_window_sampler_survives_empty_passes() {
        // "a b c a b c a b c" keeps each token with p ≈ 0.0055 at 1e-5,
        // so most passes drop the whole document
        let docs = vec![vec![2u32, 3, 4, 2, 3, 4, 2, 3, 4]];
        for seed in 0..5 {
            let sub = Subsampler::from_corpus(&docs, 5, 1e-5);
            let mut sampler = WindowSampler::new(docs.clone(), sub, 1, seed);
            let pair = sampler.next().unwrap();
            assert!((2..5).contains(&pair.center) && (2..5).contains(&pair.context));
        }
    }

    #[test]
    fn test_window_sampler_buffers_one_center_at_a_time() {
        let doc: Vec<u32> = (0..50_000).map(|i| 2 + i % 500).collect();
        let sub = Subsampler::new(&vec![1; 502], 1.0);
        let mut sampler = WindowSampler::new(vec![doc.clone()], sub, 10, 4);

        let first: Vec<SkipGramPair> = sampler.by_ref().take(30).collect();
        assert!(sampler.contexts.len() <= 20);
        assert_eq!(sampler.current.len(), doc.len());
        assert!(sampler.center <= 30);
        assert!(first.iter().all(|p| p.center < 2 + 30));
    }

    #[test]
    fn test_window_sampler_matches_window_pairs() {
        let docs = vec![vec![2u32, 3, 4, 5, 6, 7]];
        let sub  = Subsampler::new(&[0, 0, 1, 1, 1, 1, 1, 1], 1.0);
        let expected = window_pairs(&docs[0], 3, &mut StdRng::seed_from_u64(8));
        let streamed: Vec<SkipGramPair> =
            WindowSampler::new(docs, sub, 3, 8).take(expected.len()).collect();
        assert_eq!(streamed, expected);
    }

    #[test]
    fn test_window_sampler_without_pairs_ends() {
        let docs = vec![vec![2u32], vec![3]];
        let sub  = Subsampler::new(&[0, 0, 1, 1], 1.0);
        let mut sampler = WindowSampler::new(docs, sub, 2, 0);
        assert_eq!(sampler.next(), None);
    }

    #[test]
    fn test_negatives_skip_reserved_and_true_context() {
        let sampler = NegativeSampler::new(&[0, 0, 10, 10, 10]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let negatives = sampler.sample(3, 200, &mut rng);
        assert_eq!(negatives.len(), 200);
        assert!(negatives.iter().all(|&n| n == 2 || n == 4));
    }

    #[test]
    fn test_negatives_with_single_word_support() {
        let sampler = NegativeSampler::new(&[0, 0, 4]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(sampler.sample(2, 3, &mut rng), vec![2, 2, 2]);
    }

    #[test]
    fn test_all_zero_counts_rejected() {
        assert!(NegativeSampler::new(&[0, 0]).is_err());
    }

    #[test]
    fn test_eval_words_are_distinct_and_in_range() {
        let mut rng = StdRng::seed_from_u64(9);
        let words = sample_eval_words(1200, 16, 100, &mut rng);
        assert_eq!(words.len(), 16);
        assert_eq!(words.iter().filter(|&&w| w >= 1000).count(), 8);
        let mut dedup = words.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), 16);

        let small = sample_eval_words(12, 16, 100, &mut rng);
        assert_eq!(small.len(), 10);
        assert!(small.iter().all(|&w| (2..12).contains(&w)));
    }
}
