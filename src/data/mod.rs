// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything between a corpus file and a tensor batch.
//
// Translation:
//
//   corpus.tsv
//       │
//       ▼
//   CorpusLoader       → SentencePairs
//       │
//       ▼
//   TextNormalizer     → accents folded, punctuation spaced
//       │
//       ▼
//   Vocabulary         → source / <start> target / target <end>
//       │
//       ▼
//   TranslationDataset → Burn Dataset, shuffled per epoch
//       │
//       ▼
//   TranslationBatcher → padded [batch, len] tensors
//
// Skip-gram:
//
//   corpus.txt → CorpusLoader → TextNormalizer → Vocabulary
//       │
//       ▼
//   WindowSampler (+ Subsampler) → endless (center, context) pairs
//       │
//       ▼
//   NegativeSampler    → noise words per pair
//       │
//       ▼
//   SkipGramBatcher    → centers / contexts / negatives tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads document and sentence-pair corpora
pub mod loader;

/// Unicode folding and punctuation spacing
pub mod normalizer;

/// Subsampling, context windows, noise words
pub mod sampling;

/// Translation samples and Burn's Dataset trait
pub mod dataset;

/// Burn Batcher implementations for both pipelines
pub mod batcher;
