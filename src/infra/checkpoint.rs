// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// One manager per model name; several can share a directory:
//
//   checkpoints/
//     skipgram_1000.mpk.gz     ← weights at step 1000
//     skipgram_latest.json     ← tag of the newest weights
//     skipgram_config.json     ← hyperparameters for rebuilding
//     seq2seq_3.mpk.gz         ← weights after epoch 3
//     seq2seq_latest.json
//     seq2seq_config.json
//
// A checkpoint is written once and never modified. Loading the
// weights requires a model of the same architecture, which is why
// the config is stored next to them.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{anyhow, Context, Result};
use burn::{
    module::Module,
    record::{CompactRecorder, Recorder},
    tensor::backend::Backend,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct CheckpointManager {
    dir:  PathBuf,
    name: String,
}

impl CheckpointManager {
    /// Creates the directory if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir, name: name.into() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn weights_path(&self, tag: usize) -> PathBuf {
        // The recorder appends .mpk.gz
        self.dir.join(format!("{}_{tag}", self.name))
    }

    fn latest_path(&self) -> PathBuf {
        self.dir.join(format!("{}_latest.json", self.name))
    }

    fn config_path(&self) -> PathBuf {
        self.dir.join(format!("{}_config.json", self.name))
    }

    /// Write the weights under `tag` (epoch or step) and point
    /// `<name>_latest.json` at them.
    pub fn save_model<B: Backend, M: Module<B>>(&self, model: &M, tag: usize) -> Result<()> {
        let path = self.weights_path(tag);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .map_err(|e| anyhow!("Failed to save checkpoint to '{}': {e:?}", path.display()))?;

        fs::write(self.latest_path(), serde_json::to_string(&tag)?)
            .with_context(|| format!("Failed to write '{}'", self.latest_path().display()))?;

        tracing::debug!("Saved {} checkpoint {}", self.name, tag);
        Ok(())
    }

    /// Tag of the newest checkpoint, or `None` when nothing was saved.
    pub fn latest_tag(&self) -> Result<Option<usize>> {
        let path = self.latest_path();
        if !path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        let tag = serde_json::from_str::<usize>(&s)
            .with_context(|| format!("'{}' is not a checkpoint tag", path.display()))?;
        Ok(Some(tag))
    }

    /// Restore the newest weights into `model`. The model comes back
    /// untouched, with `None`, when nothing has been saved yet.
    pub fn load_latest<B: Backend, M: Module<B>>(
        &self,
        model:  M,
        device: &B::Device,
    ) -> Result<(M, Option<usize>)> {
        let Some(tag) = self.latest_tag()? else {
            return Ok((model, None));
        };
        let path = self.weights_path(tag);

        tracing::info!("Loading {} checkpoint {}", self.name, tag);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .map_err(|e| anyhow!("Cannot load checkpoint '{}': {e:?}", path.display()))?;

        Ok((model.load_record(record), Some(tag)))
    }

    /// Store the hyperparameters the weights were trained with.
    pub fn save_config<T: Serialize>(&self, cfg: &T) -> Result<()> {
        let path = self.config_path();
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config<T: DeserializeOwned>(&self) -> Result<T> {
        let path = self.config_path();
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Has this model been trained?",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", path.display()))
    }
}
