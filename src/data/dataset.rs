use anyhow::{Context, Result};
use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::normalizer::TextNormalizer;
use crate::data::sampling::SkipGramPair;
use crate::domain::sentence_pair::SentencePair;
use crate::domain::vocabulary::{split_tokens, OovPolicy, Vocabulary, END_TOKEN, START_TOKEN};

/// One tokenised, unpadded translation example.
/// `target_in` is `<start> target`, `target_out` is `target <end>`,
/// so the two always have the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSample {
    pub source:     Vec<u32>,
    pub target_in:  Vec<u32>,
    pub target_out: Vec<u32>,
}

/// A pair after normalisation, before indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPair {
    pub source:     String,
    pub target_in:  String,
    pub target_out: String,
}

impl NormalizedPair {
    pub fn from_pair(pair: &SentencePair, normalizer: &TextNormalizer) -> Self {
        let target = normalizer.normalize(&pair.target);
        Self {
            source:     normalizer.normalize(&pair.source),
            target_in:  format!("{START_TOKEN} {target}"),
            target_out: format!("{target} {END_TOKEN}"),
        }
    }
}

impl TranslationSample {
    pub fn encode(
        pair:   &NormalizedPair,
        source: &Vocabulary,
        target: &Vocabulary,
        policy: OovPolicy,
    ) -> Result<Self> {
        Ok(Self {
            source:     source.encode(&split_tokens(&pair.source), policy)?,
            target_in:  target.encode(&split_tokens(&pair.target_in), policy)?,
            target_out: target.encode(&split_tokens(&pair.target_out), policy)?,
        })
    }
}

/// Encode every normalised pair, naming the failing pair on error.
pub fn encode_pairs(
    pairs:  &[NormalizedPair],
    source: &Vocabulary,
    target: &Vocabulary,
    policy: OovPolicy,
) -> Result<Vec<TranslationSample>> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, p)| {
            TranslationSample::encode(p, source, target, policy)
                .with_context(|| format!("cannot encode pair #{i} ({:?})", p.source))
        })
        .collect()
}

pub struct TranslationDataset {
    samples: Vec<TranslationSample>,
}

impl TranslationDataset {
    pub fn new(samples: Vec<TranslationSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<TranslationSample> for TranslationDataset {
    fn get(&self, index: usize) -> Option<TranslationSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// One skip-gram training row: a positive pair plus its noise words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipGramSample {
    pub center:    u32,
    pub context:   u32,
    pub negatives: Vec<u32>,
}

impl SkipGramSample {
    pub fn new(pair: SkipGramPair, negatives: Vec<u32>) -> Self {
        Self { center: pair.center, context: pair.context, negatives }
    }
}
