// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The application layer talks to corpora, predictors and
// persisted artefacts through these traits only.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::path::Path;

use anyhow::Result;

use crate::domain::sentence_pair::SentencePair;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// A monolingual corpus, one document per line.
///
/// Implementations:
///   - CorpusLoader → plain-text file
pub trait CorpusSource {
    fn documents(&self) -> Result<Vec<String>>;
}

// ─── PairSource ───────────────────────────────────────────────────────────────
/// A bilingual corpus of aligned sentence pairs.
///
/// Implementations:
///   - CorpusLoader → tab-separated file
pub trait PairSource {
    fn pairs(&self) -> Result<Vec<SentencePair>>;
}

// ─── Predictor ────────────────────────────────────────────────────────────────
/// Turns one human-readable query into one human-readable answer.
///
/// Implementations:
///   - Translator      → source sentence in, translation out
///   - NeighbourFinder → word in, its nearest neighbours out
pub trait Predictor {
    fn predict(&self, input: &str) -> Result<String>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Any artefact whose state can be saved and restored from disk.
///
/// Implementations:
///   - Vocabulary → JSON file
pub trait Persistable: Sized {
    fn save(&self, path: &Path) -> Result<()>;

    fn load(path: &Path) -> Result<Self>;
}
