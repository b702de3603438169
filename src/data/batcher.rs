// ============================================================
// Layer 4 - Batchers
// ============================================================
// Implements Burn's Batcher trait for both pipelines.
//
// TranslationBatcher
//   Input:  Vec of N TranslationSamples of varying lengths
//   Output: three [N, len] Int tensors. Each one is padded with
//           0 to its own longest row in this batch:
//             source      [N, S]
//             target_in   [N, T]
//             target_out  [N, T]   (same T: both carry one marker)
//
// SkipGramBatcher
//   Input:  Vec of N SkipGramSamples, each with k negatives
//   Output: centers [N], contexts [N, 1], negatives [N, k]
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::{SkipGramSample, TranslationSample};
use crate::domain::vocabulary::PAD_INDEX;

/// Right-pad every sequence with PAD_INDEX to the longest one and
/// flatten row-major. Returns the flat buffer and the padded length.
pub fn pad_sequences(sequences: &[&[u32]]) -> (Vec<i32>, usize) {
    let max_len = sequences.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut flat = Vec::with_capacity(sequences.len() * max_len);
    for seq in sequences {
        flat.extend(seq.iter().map(|&x| x as i32));
        flat.extend(std::iter::repeat(PAD_INDEX as i32).take(max_len - seq.len()));
    }
    (flat, max_len)
}

fn int_matrix<B: Backend>(sequences: &[&[u32]], device: &B::Device) -> Tensor<B, 2, Int> {
    let (flat, len) = pad_sequences(sequences);
    Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device).reshape([sequences.len(), len])
}

// ─── TranslationBatch ─────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct TranslationBatch<B: Backend> {
    /// Encoder input (shape [batch_size, source_len])
    pub source: Tensor<B, 2, Int>,

    /// Decoder input, starts with <start> (shape [batch_size, target_len])
    pub target_in: Tensor<B, 2, Int>,

    /// Decoder target, ends with <end> (shape [batch_size, target_len])
    pub target_out: Tensor<B, 2, Int>,
}

impl<B: Backend> TranslationBatch<B> {
    pub fn size(&self) -> usize {
        self.source.dims()[0]
    }
}

#[derive(Clone, Debug)]
pub struct TranslationBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TranslationBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<TranslationSample, TranslationBatch<B>> for TranslationBatcher<B> {
    fn batch(&self, items: Vec<TranslationSample>) -> TranslationBatch<B> {
        let source: Vec<&[u32]>     = items.iter().map(|s| s.source.as_slice()).collect();
        let target_in: Vec<&[u32]>  = items.iter().map(|s| s.target_in.as_slice()).collect();
        let target_out: Vec<&[u32]> = items.iter().map(|s| s.target_out.as_slice()).collect();

        TranslationBatch {
            source:     int_matrix::<B>(&source, &self.device),
            target_in:  int_matrix::<B>(&target_in, &self.device),
            target_out: int_matrix::<B>(&target_out, &self.device),
        }
    }
}

// ─── SkipGramBatch ────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct SkipGramBatch<B: Backend> {
    /// Center words (shape [batch_size])
    pub centers: Tensor<B, 1, Int>,

    /// True context words (shape [batch_size, 1])
    pub contexts: Tensor<B, 2, Int>,

    /// Noise words (shape [batch_size, n_sampled])
    pub negatives: Tensor<B, 2, Int>,
}

#[derive(Clone, Debug)]
pub struct SkipGramBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SkipGramBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SkipGramSample, SkipGramBatch<B>> for SkipGramBatcher<B> {
    fn batch(&self, items: Vec<SkipGramSample>) -> SkipGramBatch<B> {
        let batch_size = items.len();

        let centers: Vec<i32>  = items.iter().map(|s| s.center as i32).collect();
        let contexts: Vec<i32> = items.iter().map(|s| s.context as i32).collect();
        let negatives: Vec<&[u32]> = items.iter().map(|s| s.negatives.as_slice()).collect();

        SkipGramBatch {
            centers:   Tensor::<B, 1, Int>::from_ints(centers.as_slice(), &self.device),
            contexts:  Tensor::<B, 1, Int>::from_ints(contexts.as_slice(), &self.device)
                .reshape([batch_size, 1]),
            negatives: int_matrix::<B>(&negatives, &self.device),
        }
    }
}
