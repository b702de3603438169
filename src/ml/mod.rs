// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All model code lives here. Tensor kernels, autodiff and Adam
// come from Burn; this layer wires them together.
//
//   backend.rs             - NdArray (default) or Wgpu, plus the
//                            Autodiff wrapper used for training
//   loss.rs                - cross-entropy that ignores padding
//   skipgram.rs            - embedding + projection with a
//                            sampled-softmax loss, cosine lookup
//   seq2seq.rs             - LSTM encoder/decoder, greedy decode
//   skipgram_trainer.rs    - step loop, periodic neighbours
//   translation_trainer.rs - epoch loop, per-epoch sample output
//   inferencer.rs          - Translator and NeighbourFinder
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Mikolov et al. (2013), Sutskever et al. (2014)

pub mod backend;

pub mod loss;

/// Skip-gram embedding model
pub mod skipgram;

/// LSTM encoder/decoder translation model
pub mod seq2seq;

pub mod skipgram_trainer;

pub mod translation_trainer;

/// Predictors over trained models
pub mod inferencer;
