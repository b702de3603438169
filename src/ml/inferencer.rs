// ============================================================
// Layer 5 - Inferencer
// ============================================================
// Two read-only predictors over trained models:
//
//   Translator       sentence → normalize → source indices
//                    → encoder once → greedy decoder loop
//                    → target words (without <end>)
//
//   NeighbourFinder  word → cosine similarity against every
//                    embedding → top-k other words
//
// Both borrow the model and vocabularies; nothing is mutated.
use anyhow::{anyhow, bail, Result};
use burn::prelude::*;
use std::cmp::Ordering;

use crate::application::{skipgram_use_case::SkipGramConfig, translate_use_case::TranslateConfig};
use crate::data::normalizer::TextNormalizer;
use crate::domain::traits::Predictor;
use crate::domain::vocabulary::{
    split_tokens, OovPolicy, Vocabulary, END_TOKEN, PAD_INDEX, START_TOKEN, UNK_INDEX,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::{default_device, ComputeBackend, Device};
use crate::ml::seq2seq::{Seq2Seq, Seq2SeqConfig, MAX_DECODE_STEPS};
use crate::ml::skipgram::{SkipGramModel, SkipGramModelConfig};

/// Neighbours reported per query word.
pub const TOP_K: usize = 10;

// ─── Restoring trained models ─────────────────────────────────────────────────
// Prediction rebuilds the architecture from the saved config, then
// loads the newest weights into it. Without weights the freshly
// initialised model is used, with a warning.

pub fn restore_skipgram(
    saved:      &SkipGramConfig,
    vocab_size: usize,
    checkpoint: &CheckpointManager,
) -> Result<(SkipGramModel<ComputeBackend>, Device)> {
    let device = default_device();
    let model  = SkipGramModelConfig::new(vocab_size, saved.embedding_size, saved.hidden_size)
        .init::<ComputeBackend>(&device);
    let (model, tag) = checkpoint.load_latest(model, &device)?;
    if tag.is_none() {
        tracing::warn!("No skip-gram weights found, predicting with an untrained model");
    }
    Ok((model, device))
}

pub fn restore_seq2seq(
    saved:       &TranslateConfig,
    source_size: usize,
    target_size: usize,
    checkpoint:  &CheckpointManager,
) -> Result<(Seq2Seq<ComputeBackend>, Device)> {
    let device = default_device();
    let model  = Seq2SeqConfig::new(source_size, target_size, saved.embedding_size, saved.hidden_size)
        .init::<ComputeBackend>(&device);
    let (model, tag) = checkpoint.load_latest(model, &device)?;
    if tag.is_none() {
        tracing::warn!("No translation weights found, predicting with an untrained model");
    }
    Ok((model, device))
}

// ─── Translator ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// The sentence as the model saw it, after normalisation
    pub input:  String,
    pub output: String,
}

pub struct Translator<'a, B: Backend> {
    model:      &'a Seq2Seq<B>,
    source:     &'a Vocabulary,
    target:     &'a Vocabulary,
    normalizer: TextNormalizer,
    oov:        OovPolicy,
    device:     B::Device,
}

impl<'a, B: Backend> Translator<'a, B> {
    pub fn new(
        model:  &'a Seq2Seq<B>,
        source: &'a Vocabulary,
        target: &'a Vocabulary,
        oov:    OovPolicy,
        device: B::Device,
    ) -> Self {
        Self { model, source, target, normalizer: TextNormalizer::new(), oov, device }
    }

    pub fn translate(&self, sentence: &str) -> Result<Translation> {
        let input  = self.normalizer.normalize(sentence);
        let tokens = split_tokens(&input);
        if tokens.is_empty() {
            bail!("nothing to translate in {sentence:?}");
        }
        let indices = self.source.encode(&tokens, self.oov)?;

        let start = self.target.lookup(START_TOKEN)?;
        let end   = self.target.lookup(END_TOKEN)?;

        let flat: Vec<i32> = indices.iter().map(|&i| i as i32).collect();
        let source = Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([1, flat.len()]);

        let produced = self.model.greedy_decode(source, start, end, MAX_DECODE_STEPS);
        let output = self.target.decode(&produced)?.join(" ");

        tracing::debug!("{} source tokens → {} target tokens", indices.len(), produced.len());
        Ok(Translation { input, output })
    }
}

impl<B: Backend> Predictor for Translator<'_, B> {
    fn predict(&self, input: &str) -> Result<String> {
        Ok(self.translate(input)?.output)
    }
}

// ─── NeighbourFinder ──────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbours {
    pub word:    String,
    pub nearest: Vec<String>,
}

impl Neighbours {
    pub fn render(&self) -> String {
        format!("Nearest to {}: {}", self.word, self.nearest.join(", "))
    }
}

pub struct NeighbourFinder<'a, B: Backend> {
    model:  &'a SkipGramModel<B>,
    vocab:  &'a Vocabulary,
    top_k:  usize,
    device: B::Device,
}

impl<'a, B: Backend> NeighbourFinder<'a, B> {
    pub fn new(model: &'a SkipGramModel<B>, vocab: &'a Vocabulary, device: B::Device) -> Self {
        Self { model, vocab, top_k: TOP_K, device }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn neighbours(&self, queries: &[u32]) -> Result<Vec<Neighbours>> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }
        let flat: Vec<i32> = queries.iter().map(|&q| q as i32).collect();
        let scores = self
            .model
            .similarity(Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device))
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("cannot read similarity scores: {e:?}"))?;

        let width = self.vocab.len();
        queries
            .iter()
            .zip(scores.chunks(width))
            .map(|(&query, row)| {
                let word = self
                    .vocab
                    .token_of(query)
                    .ok_or_else(|| anyhow!("index {query} is outside the vocabulary"))?;
                let nearest = top_k(row, query, self.top_k)
                    .into_iter()
                    .filter_map(|i| self.vocab.token_of(i).map(str::to_string))
                    .collect();
                Ok(Neighbours { word: word.to_string(), nearest })
            })
            .collect()
    }
}

impl<B: Backend> Predictor for NeighbourFinder<'_, B> {
    fn predict(&self, input: &str) -> Result<String> {
        let word  = input.trim().to_lowercase();
        let index = self.vocab.lookup(&word)?;
        let found = self.neighbours(&[index])?;
        found
            .first()
            .map(Neighbours::render)
            .ok_or_else(|| anyhow!("no neighbours for {word:?}"))
    }
}

/// Indices of the `k` highest scores, best first, skipping the query
/// itself and the reserved padding/unknown entries.
pub fn top_k(scores: &[f32], query: u32, k: usize) -> Vec<u32> {
    let mut ranked: Vec<(u32, f32)> = scores
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as u32, s))
        .filter(|&(i, _)| i != query && i != PAD_INDEX && i != UNK_INDEX)
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.into_iter().take(k).map(|(i, _)| i).collect()
}
