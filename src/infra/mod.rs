// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Everything that touches the checkpoint directory:
//
//   checkpoint.rs  - model weights (CompactRecorder), the
//                    latest-tag pointer and the hyperparameters
//                    needed to rebuild a model for prediction
//
//   vocab_store.rs - vocabulary JSON files, reused on resume
//                    and required for prediction
//
//   metrics.rs     - per-report loss rows in a CSV file
//
// Reference: Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Vocabulary persistence
pub mod vocab_store;

/// Loss CSV logger
pub mod metrics;
