// ============================================================
// Layer 2 - Translation Use Case
// ============================================================
// train:
//   Step 1: Read sentence pairs           (Layer 4 - data)
//   Step 2: Normalise, add <start>/<end>  (Layer 4 - data)
//   Step 3: Build / reuse vocabularies    (Layer 6 - infra)
//   Step 4: Encode into a Burn dataset    (Layer 4 - data)
//   Step 5: Save config                   (Layer 6 - infra)
//   Step 6: Run the epoch loop            (Layer 5 - ml)
//
// predict:
//   saved config + both vocabularies + latest weights → greedy
//   translation of --sentence, or of the demo sentences

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::{encode_pairs, NormalizedPair, TranslationDataset},
    loader::CorpusLoader,
    normalizer::TextNormalizer,
};
use crate::domain::{
    traits::PairSource,
    vocabulary::{split_tokens, OovPolicy, VocabularyBuilder, END_TOKEN, START_TOKEN},
};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger, vocab_store::VocabStore};
use crate::ml::{
    inferencer::{restore_seq2seq, Translation, Translator},
    translation_trainer::{run_translation_training, TranslationTask},
};

const MODEL_NAME:   &str = "seq2seq";
const SOURCE_VOCAB: &str = "source";
const TARGET_VOCAB: &str = "target";

/// Translated in predict mode when no sentence is given.
pub const DEMO_SENTENCES: [&str; 20] = [
    "What a ridiculous concept!",
    "Your idea is not entirely crazy.",
    "A man's worth lies in what he is.",
    "What he did is very wrong.",
    "All three of you need to do that.",
    "Are you giving me another chance?",
    "Both Tom and Mary work as models.",
    "Can I have a few minutes, please?",
    "Could you close the door, please?",
    "Did you plant pumpkins this year?",
    "Do you ever study in the library?",
    "Don't be deceived by appearances.",
    "Excuse me. Can you speak English?",
    "Few people know the true meaning.",
    "Germany produced many scientists.",
    "Guess whose birthday it is today.",
    "He acted like he owned the place.",
    "Honesty will pay in the long run.",
    "How do we know this isn't a trap?",
    "I can't believe you're giving up.",
];

// ─── Configuration ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    pub corpus:         String,
    pub checkpoint_dir: String,
    pub embedding_size: usize,
    pub hidden_size:    usize,
    pub batch_size:     usize,
    pub num_epochs:     usize,
    pub print_every:    usize,
    pub learning_rate:  f64,
    pub seed:           u64,
    pub min_count:      u64,
    /// Cap per vocabulary, reserved tokens included
    pub max_vocab:      Option<usize>,
    pub max_examples:   Option<usize>,
    pub oov:            OovPolicy,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            corpus:         "data/fra.txt".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            embedding_size: 256,
            hidden_size:    512,
            batch_size:     64,
            num_epochs:     15,
            print_every:    100,
            learning_rate:  1e-3,
            seed:           42,
            min_count:      1,
            max_vocab:      None,
            max_examples:   None,
            oov:            OovPolicy::Error,
        }
    }
}

// ─── TranslateUseCase ─────────────────────────────────────────────────────────
pub struct TranslateUseCase {
    config: TranslateConfig,
}

impl TranslateUseCase {
    pub fn new(config: TranslateConfig) -> Self {
        Self { config }
    }

    pub fn train(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1 ────────────────────────────────────────────────────────────
        tracing::info!("Reading sentence pairs from '{}'", cfg.corpus);
        let pairs = CorpusLoader::new(&cfg.corpus)
            .with_max_examples(cfg.max_examples)
            .pairs()?;
        tracing::info!("Read {} pairs", pairs.len());

        // ── Step 2 ────────────────────────────────────────────────────────────
        let normalizer = TextNormalizer::new();
        let normalized: Vec<NormalizedPair> = pairs
            .iter()
            .map(|p| NormalizedPair::from_pair(p, &normalizer))
            .collect();

        // ── Step 3: independent vocabularies per language ─────────────────────
        let store = VocabStore::new(&cfg.checkpoint_dir);
        let source_vocab = store.load_or_build(SOURCE_VOCAB, || {
            let mut builder = VocabularyBuilder::new()
                .with_min_count(cfg.min_count)
                .with_max_size(cfg.max_vocab);
            for p in &normalized {
                builder.add_tokens(split_tokens(&p.source));
            }
            Ok(builder.build())
        })?;
        let target_vocab = store.load_or_build(TARGET_VOCAB, || {
            let mut builder = VocabularyBuilder::new()
                .with_reserved(&[START_TOKEN, END_TOKEN])
                .with_min_count(cfg.min_count)
                .with_max_size(cfg.max_vocab);
            for p in &normalized {
                builder.add_tokens(split_tokens(&p.target_out));
                builder.add_tokens([START_TOKEN]);
            }
            Ok(builder.build())
        })?;

        // ── Step 4: words trimmed from the vocabularies train as <unk> ───────
        let samples = encode_pairs(&normalized, &source_vocab, &target_vocab, OovPolicy::Unknown)
            .context("Cannot encode the training corpus with its vocabularies")?;
        let dataset = TranslationDataset::new(samples);

        // ── Step 5-6 ──────────────────────────────────────────────────────────
        let checkpoint = CheckpointManager::new(&cfg.checkpoint_dir, MODEL_NAME)?;
        checkpoint.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir, MODEL_NAME)?;

        let eval_sources: Vec<String> = pairs.into_iter().map(|p| p.source).collect();

        run_translation_training(cfg, TranslationTask {
            dataset,
            source_vocab: &source_vocab,
            target_vocab: &target_vocab,
            eval_sources: &eval_sources,
            checkpoint:   &checkpoint,
            metrics:      &metrics,
        })
    }

    /// Translate `sentence`, or every demo sentence when none is given.
    /// The first sentence that cannot be translated aborts the run.
    pub fn predict(&self, sentence: Option<&str>) -> Result<Vec<Translation>> {
        let checkpoint = CheckpointManager::new(&self.config.checkpoint_dir, MODEL_NAME)?;
        let saved: TranslateConfig = checkpoint.load_config()?;

        let store = VocabStore::new(&self.config.checkpoint_dir);
        let source_vocab = store.load(SOURCE_VOCAB)?;
        let target_vocab = store.load(TARGET_VOCAB)?;

        let (model, device) =
            restore_seq2seq(&saved, source_vocab.len(), target_vocab.len(), &checkpoint)?;
        let translator = Translator::new(&model, &source_vocab, &target_vocab, self.config.oov, device);

        let inputs: Vec<&str> = match sentence {
            Some(s) => vec![s],
            None    => DEMO_SENTENCES.to_vec(),
        };
        inputs
            .into_iter()
            .map(|s| translator.translate(s).with_context(|| format!("Cannot translate {s:?}")))
            .collect()
    }
}
