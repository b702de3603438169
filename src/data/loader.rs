// ============================================================
// Layer 4 - Corpus Loader
// ============================================================
// Reads the two corpus formats from disk:
//
//   documents:  one document per line (skip-gram)
//   pairs:      source<TAB>target[<TAB>anything else]
//               one pair per line (translation)
//
// Blank lines (including the usual trailing one) are skipped.
// A non-blank pair line without a tab is an error that names
// the offending line number.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (Reading a File)

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};

use crate::domain::sentence_pair::SentencePair;
use crate::domain::traits::{CorpusSource, PairSource};

/// Loads a corpus file. Implements both corpus traits from Layer 3.
pub struct CorpusLoader {
    path:         PathBuf,
    /// Upper bound on the number of pairs returned by `pairs()`
    max_examples: Option<usize>,
}

impl CorpusLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), max_examples: None }
    }

    pub fn with_max_examples(mut self, max_examples: Option<usize>) -> Self {
        self.max_examples = max_examples;
        self
    }

    fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read corpus '{}'", self.path.display()))
    }
}

impl CorpusSource for CorpusLoader {
    fn documents(&self) -> Result<Vec<String>> {
        let docs = parse_documents(&self.read()?);
        tracing::info!("Loaded {} documents from '{}'", docs.len(), self.path.display());
        Ok(docs)
    }
}

impl PairSource for CorpusLoader {
    fn pairs(&self) -> Result<Vec<SentencePair>> {
        let pairs = parse_pairs(&self.read()?, self.max_examples)
            .with_context(|| format!("Malformed pair corpus '{}'", self.path.display()))?;
        tracing::info!("Loaded {} sentence pairs from '{}'", pairs.len(), self.path.display());
        Ok(pairs)
    }
}

/// Split raw text into non-blank lines.
pub fn parse_documents(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse tab-separated sentence pairs, keeping the first two columns.
pub fn parse_pairs(text: &str, max_examples: Option<usize>) -> Result<Vec<SentencePair>> {
    let mut pairs = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        if max_examples.is_some_and(|max| pairs.len() >= max) {
            break;
        }

        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let mut columns = line.split('\t');
        match (columns.next(), columns.next()) {
            (Some(source), Some(target)) => pairs.push(SentencePair::new(source, target)),
            _ => bail!("line {} has no tab-separated target: {:?}", line_no + 1, line),
        }
    }

    Ok(pairs)
}
