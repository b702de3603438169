// ============================================================
// Layer 4 - Text Normalizer
// ============================================================
// Turns raw corpus text into the restricted alphabet the
// vocabularies are built on.
//
// Steps (applied in order):
//   1. Unicode canonical decomposition (NFD), then drop the
//      combining marks it produced: "élève" → "eleve"
//   2. Put a space on both sides of . ! ?
//   3. Collapse every run of other non-letter characters
//      (digits, commas, quotes, leftover non-ASCII letters)
//      into a single space
//   4. Trim the ends
//
// Case is left alone; tokenisation lower-cases.
// normalize(normalize(s)) == normalize(s) for every s.
//
// Reference: Unicode Standard Annex #15 (Normalization Forms)

use tokenizers::normalizers::{StripAccents, NFD};
use tokenizers::{NormalizedString, Normalizer};

/// Sentence-terminal punctuation kept as standalone tokens
const TERMINALS: [char; 3] = ['.', '!', '?'];

pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalise one sentence or document.
    pub fn normalize(&self, text: &str) -> String {
        let folded = fold_accents(text);

        let mut out           = String::with_capacity(folded.len());
        let mut pending_space = false;

        for c in folded.chars() {
            if c.is_ascii_alphabetic() || TERMINALS.contains(&c) {
                let standalone = TERMINALS.contains(&c);
                if !out.is_empty() && (pending_space || standalone) {
                    out.push(' ');
                }
                out.push(c);
                pending_space = standalone;
            } else {
                pending_space = true;
            }
        }

        out
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// NFD + combining-mark removal via the `tokenizers` normalizers.
fn fold_accents(text: &str) -> String {
    let mut normalized = NormalizedString::from(text);
    let folded = NFD
        .normalize(&mut normalized)
        .and_then(|_| StripAccents.normalize(&mut normalized));

    match folded {
        Ok(()) => normalized.get().to_string(),
        Err(e) => {
            tracing::warn!("Unicode folding failed, keeping raw text: {e}");
            text.to_string()
        }
    }
}
