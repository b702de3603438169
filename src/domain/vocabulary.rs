// ============================================================
// Layer 3 - Vocabulary
// ============================================================
// A bidirectional mapping between token strings and integer
// indices, built once from corpus frequencies.
//
// Index layout:
//   0      <pad>    padding, excluded from every loss
//   1      <unk>    only produced under OovPolicy::Unknown
//   2..    extra reserved tokens (e.g. <start>, <end>)
//   ..     corpus tokens, most frequent first; ties keep the
//          order in which the tokens were first seen
//
// The vocabulary never changes after `build()`.
//
// Reference: Rust Book §8 (Hash Maps)

use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

pub const PAD_TOKEN:   &str = "<pad>";
pub const UNK_TOKEN:   &str = "<unk>";
pub const START_TOKEN: &str = "<start>";
pub const END_TOKEN:   &str = "<end>";

pub const PAD_INDEX: u32 = 0;
pub const UNK_INDEX: u32 = 1;

/// What `encode` does with a token the vocabulary has never seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OovPolicy {
    /// Fail with the offending token in the error message
    #[default]
    Error,
    /// Map the token to `<unk>`
    Unknown,
}

/// Split a normalised sentence into lower-cased whitespace tokens.
pub fn split_tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}

// ─── Vocabulary ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "VocabularyFile", into = "VocabularyFile")]
pub struct Vocabulary {
    tokens: Vec<String>,
    counts: Vec<u64>,
    index:  HashMap<String, u32>,
}

/// On-disk form: the lookup table is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct VocabularyFile {
    tokens: Vec<String>,
    counts: Vec<u64>,
}

impl From<VocabularyFile> for Vocabulary {
    fn from(file: VocabularyFile) -> Self {
        Vocabulary::from_parts(file.tokens, file.counts)
    }
}

impl From<Vocabulary> for VocabularyFile {
    fn from(vocab: Vocabulary) -> Self {
        VocabularyFile { tokens: vocab.tokens, counts: vocab.counts }
    }
}

impl Vocabulary {
    fn from_parts(tokens: Vec<String>, mut counts: Vec<u64>) -> Self {
        counts.resize(tokens.len(), 0);
        let index = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as u32))
            .collect();
        Self { tokens, counts, index }
    }

    /// Number of entries, reserved tokens included
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn index_of(&self, token: &str) -> Option<u32> {
        self.index.get(token).copied()
    }

    pub fn token_of(&self, index: u32) -> Option<&str> {
        self.tokens.get(index as usize).map(String::as_str)
    }

    /// Like `index_of` but fails loudly for unknown tokens.
    pub fn lookup(&self, token: &str) -> Result<u32> {
        match self.index_of(token) {
            Some(i) => Ok(i),
            None    => bail!("token '{token}' is not in the vocabulary ({} entries)", self.len()),
        }
    }

    /// Corpus counts by index (0 for reserved tokens that never
    /// occurred in the corpus).
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Map tokens to indices under the given out-of-vocabulary policy.
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S], policy: OovPolicy) -> Result<Vec<u32>> {
        tokens
            .iter()
            .map(|t| match (self.index_of(t.as_ref()), policy) {
                (Some(i), _)                 => Ok(i),
                (None, OovPolicy::Unknown)   => Ok(UNK_INDEX),
                (None, OovPolicy::Error)     => self.lookup(t.as_ref()),
            })
            .collect()
    }

    /// Map tokens to indices, silently dropping the ones below the
    /// vocabulary's admission threshold. Used to trim training corpora.
    pub fn encode_known<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<u32> {
        tokens.iter().filter_map(|t| self.index_of(t.as_ref())).collect()
    }

    /// Map indices back to tokens. Padding positions are skipped.
    pub fn decode(&self, indices: &[u32]) -> Result<Vec<String>> {
        indices
            .iter()
            .filter(|&&i| i != PAD_INDEX)
            .map(|&i| match self.token_of(i) {
                Some(t) => Ok(t.to_string()),
                None    => bail!("index {i} is outside the vocabulary (size {})", self.len()),
            })
            .collect()
    }
}

// ─── VocabularyBuilder ────────────────────────────────────────────────────────
/// Counts tokens and fixes the index assignment.
#[derive(Debug, Clone)]
pub struct VocabularyBuilder {
    /// token → (count, first-seen order)
    seen:      HashMap<String, (u64, usize)>,
    reserved:  Vec<String>,
    min_count: u64,
    max_size:  Option<usize>,
}

impl Default for VocabularyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VocabularyBuilder {
    pub fn new() -> Self {
        Self {
            seen:      HashMap::new(),
            reserved:  vec![PAD_TOKEN.to_string(), UNK_TOKEN.to_string()],
            min_count: 1,
            max_size:  None,
        }
    }

    /// Reserve extra tokens right after `<pad>` and `<unk>`.
    pub fn with_reserved(mut self, tokens: &[&str]) -> Self {
        for t in tokens {
            if !self.reserved.iter().any(|r| r == t) {
                self.reserved.push(t.to_string());
            }
        }
        self
    }

    /// Tokens seen fewer than `min_count` times are left out.
    pub fn with_min_count(mut self, min_count: u64) -> Self {
        self.min_count = min_count.max(1);
        self
    }

    /// Cap the total size, reserved tokens included.
    pub fn with_max_size(mut self, max_size: Option<usize>) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn add_tokens<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            let order = self.seen.len();
            self.seen
                .entry(token.as_ref().to_string())
                .or_insert((0, order))
                .0 += 1;
        }
    }

    pub fn build(self) -> Vocabulary {
        let mut tokens: Vec<String> = self.reserved.clone();
        let mut counts: Vec<u64> = self
            .reserved
            .iter()
            .map(|r| self.seen.get(r).map(|&(c, _)| c).unwrap_or(0))
            .collect();

        let mut ranked: Vec<(&String, u64, usize)> = self
            .seen
            .iter()
            .map(|(t, &(c, order))| (t, c, order))
            .filter(|(t, c, _)| *c >= self.min_count && !self.reserved.contains(*t))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let room = self
            .max_size
            .map(|m| m.saturating_sub(tokens.len()))
            .unwrap_or(usize::MAX);

        for (token, count, _) in ranked.into_iter().take(room) {
            tokens.push(token.clone());
            counts.push(count);
        }

        Vocabulary::from_parts(tokens, counts)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn build(texts: &[&str]) -> Vocabulary {
        let mut b = VocabularyBuilder::new();
        for t in texts {
            b.add_tokens(split_tokens(t));
        }
        b.build()
    }

    #[test]
    fn test_reserved_indices_come_first() {
        let v = VocabularyBuilder::new()
            .with_reserved(&[START_TOKEN, END_TOKEN])
            .build();
        assert_eq!(v.index_of(PAD_TOKEN), Some(PAD_INDEX));
        assert_eq!(v.index_of(UNK_TOKEN), Some(UNK_INDEX));
        assert_eq!(v.index_of(START_TOKEN), Some(2));
        assert_eq!(v.index_of(END_TOKEN), Some(3));
    }

    #[test]
    fn test_most_frequent_first_ties_by_first_seen() {
        let v = build(&["b a c a", "c d"]);
        // a=2, c=2 (a seen first), then b, d
        assert_eq!(v.token_of(2), Some("a"));
        assert_eq!(v.token_of(3), Some("c"));
        assert_eq!(v.token_of(4), Some("b"));
        assert_eq!(v.token_of(5), Some("d"));
        assert_eq!(v.counts()[2], 2);
    }

    #[test]
    fn test_tokens_are_lowercased() {
        let v = build(&["He is OLD ."]);
        assert!(v.index_of("he").is_some());
        assert!(v.index_of("old").is_some());
        assert!(v.index_of("OLD").is_none());
    }

    #[test]
    fn test_min_count_and_max_size() {
        let mut b = VocabularyBuilder::new().with_min_count(2).with_max_size(Some(3));
        b.add_tokens(split_tokens("x x x y y z"));
        let v = b.build();
        // <pad>, <unk>, x; y is frequent enough but there is no room
        assert_eq!(v.len(), 3);
        assert_eq!(v.token_of(2), Some("x"));
        assert!(v.index_of("z").is_none());
    }

    #[test]
    fn test_unknown_token_fails_loudly() {
        let v = build(&["he is old"]);
        let err = v.encode(&["he", "is", "young"], OovPolicy::Error).unwrap_err();
        assert!(err.to_string().contains("young"));
    }

    #[test]
    fn test_unknown_token_maps_to_unk_when_configured() {
        let v = build(&["he is old"]);
        let ids = v.encode(&["he", "is", "young"], OovPolicy::Unknown).unwrap();
        assert_eq!(ids[2], UNK_INDEX);
    }

    #[test]
    fn test_encoded_indices_are_in_range() {
        let v = build(&["il est vieux", "elle est jeune ."]);
        let ids = v
            .encode(&split_tokens("elle est vieux ."), OovPolicy::Error)
            .unwrap();
        assert!(ids.iter().all(|&i| (i as usize) < v.len()));
    }

    #[test]
    fn test_padding_round_trip() {
        let v = build(&["il est vieux"]);
        let tokens = split_tokens("il est vieux");
        let mut ids = v.encode(&tokens, OovPolicy::Error).unwrap();
        ids.extend([PAD_INDEX; 4]);
        assert_eq!(v.decode(&ids).unwrap(), tokens);
    }

    #[test]
    fn test_decode_rejects_out_of_range_index() {
        let v = build(&["a"]);
        assert!(v.decode(&[99]).is_err());
    }

    #[test]
    fn test_json_keeps_lookup_table() {
        let v = build(&["a b b"]);
        let json = serde_json::to_string(&v).unwrap();
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.index_of("b"), v.index_of("b"));
        assert_eq!(back, v);
    }
}
