// ============================================================
// Layer 6 - Vocabulary Store
// ============================================================
// Keeps vocabularies next to the checkpoints so prediction uses
// exactly the indices the weights were trained with.
//
//   checkpoints/
//     skipgram_vocab.json
//     source_vocab.json
//     target_vocab.json
//
// A vocabulary already on disk wins over a freshly built one:
// resuming training must not renumber tokens under saved weights.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::traits::Persistable;
use crate::domain::vocabulary::Vocabulary;

impl Persistable for Vocabulary {
    fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write vocabulary to '{}'", path.display()))
    }

    fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read vocabulary from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed vocabulary '{}'", path.display()))
    }
}

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}_vocab.json"))
    }

    /// Load `<name>_vocab.json` if present, otherwise run `build` and
    /// save its result.
    pub fn load_or_build<F>(&self, name: &str, build: F) -> Result<Vocabulary>
    where
        F: FnOnce() -> Result<Vocabulary>,
    {
        let path = self.path(name);
        if path.exists() {
            let vocab = Vocabulary::load(&path)?;
            tracing::info!("Loaded {} vocabulary ({} entries)", name, vocab.len());
            return Ok(vocab);
        }

        let vocab = build()?;
        self.save(name, &vocab)?;
        tracing::info!("Built {} vocabulary ({} entries)", name, vocab.len());
        Ok(vocab)
    }

    pub fn save(&self, name: &str, vocab: &Vocabulary) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        vocab.save(&self.path(name))
    }

    /// Fails when the vocabulary was never saved, since predicting
    /// without the training indices is meaningless.
    pub fn load(&self, name: &str) -> Result<Vocabulary> {
        let path = self.path(name);
        Vocabulary::load(&path).with_context(|| {
            format!("No {name} vocabulary in '{}'. Train first.", self.dir.display())
        })
    }
}
