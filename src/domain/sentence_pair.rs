// ============================================================
// Layer 3 - SentencePair Domain Type
// ============================================================
// One line of a bilingual corpus: a source sentence and its
// translation, exactly as read from disk (not yet normalised).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentencePair {
    /// Sentence in the language we translate from
    pub source: String,

    /// Reference translation
    pub target: String,
}

impl SentencePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
