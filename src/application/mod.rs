// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Orchestrates the other layers for one pipeline at a time.
//
// Rules for this layer:
//   - No model math here (Layer 5)
//   - No printing here (Layer 1)
//   - No direct file formats here (Layers 4 and 6)
//
// Each use case owns a serde config that is saved next to the
// checkpoints, so `predict` can rebuild the trained model.

/// Word embeddings: train, nearest neighbours
pub mod skipgram_use_case;

/// Sentence translation: train, translate
pub mod translate_use_case;
