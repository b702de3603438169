// ============================================================
// Layer 2 - Skip-gram Use Case
// ============================================================
// train:
//   Step 1: Read documents             (Layer 4 - data)
//   Step 2: Normalise and tokenise     (Layer 4 - data)
//   Step 3: Build / reuse vocabulary   (Layer 6 - infra)
//   Step 4: Trim rare words            (Layer 3 - domain)
//   Step 5: Pick evaluation words      (Layer 4 - data)
//   Step 6: Save config                (Layer 6 - infra)
//   Step 7: Run the step loop          (Layer 5 - ml)
//
// predict:
//   saved config + vocabulary + latest weights → neighbours of
//   --test-word, or of freshly sampled evaluation words

use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::{loader::CorpusLoader, normalizer::TextNormalizer, sampling::sample_eval_words};
use crate::domain::{
    traits::CorpusSource,
    vocabulary::{split_tokens, Vocabulary, VocabularyBuilder},
};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger, vocab_store::VocabStore};
use crate::ml::{
    inferencer::{restore_skipgram, NeighbourFinder, TOP_K},
    skipgram_trainer::{run_skipgram_training, SkipGramTask},
};

const MODEL_NAME: &str = "skipgram";

// ─── Configuration ────────────────────────────────────────────────────────────
// Saved next to the checkpoints so `predict` rebuilds the same model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipGramConfig {
    pub corpus:              String,
    pub checkpoint_dir:      String,
    pub embedding_size:      usize,
    pub hidden_size:         usize,
    pub batch_size:          usize,
    pub window_size:         usize,
    pub n_sampled:           usize,
    pub total_iterations:    usize,
    pub evaluate_every:      usize,
    pub print_every:         usize,
    pub learning_rate:       f64,
    pub seed:                u64,
    pub drop_word_threshold: f64,
    pub min_count:           u64,
    pub max_vocab:           Option<usize>,
    pub valid_size:          usize,
    pub valid_window:        usize,
    /// Neighbours listed per evaluation word
    pub top_k:               usize,
}

impl Default for SkipGramConfig {
    fn default() -> Self {
        Self {
            corpus:              "data/text8".to_string(),
            checkpoint_dir:      "checkpoint".to_string(),
            embedding_size:      512,
            hidden_size:         256,
            batch_size:          1000,
            window_size:         10,
            n_sampled:           100,
            total_iterations:    70_000,
            evaluate_every:      1000,
            print_every:         100,
            learning_rate:       1e-3,
            seed:                42,
            drop_word_threshold: 1e-5,
            min_count:           5,
            max_vocab:           None,
            valid_size:          16,
            valid_window:        100,
            top_k:               TOP_K,
        }
    }
}

// ─── SkipGramUseCase ──────────────────────────────────────────────────────────
pub struct SkipGramUseCase {
    config: SkipGramConfig,
}

impl SkipGramUseCase {
    pub fn new(config: SkipGramConfig) -> Self {
        Self { config }
    }

    pub fn train(&self, test_word: Option<&str>) -> Result<()> {
        let cfg = &self.config;

        // ── Steps 1-2: documents → lower-cased tokens ─────────────────────────
        tracing::info!("Reading corpus '{}'", cfg.corpus);
        let documents  = CorpusLoader::new(&cfg.corpus).documents()?;
        let normalizer = TextNormalizer::new();
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|d| split_tokens(&normalizer.normalize(d)))
            .collect();
        tracing::info!(
            "Read {} documents, {} tokens",
            tokenized.len(),
            tokenized.iter().map(Vec::len).sum::<usize>(),
        );

        // ── Step 3: vocabulary (reused when resuming) ─────────────────────────
        let store = VocabStore::new(&cfg.checkpoint_dir);
        let vocab = store.load_or_build(MODEL_NAME, || {
            let mut builder = VocabularyBuilder::new()
                .with_min_count(cfg.min_count)
                .with_max_size(cfg.max_vocab);
            for doc in &tokenized {
                builder.add_tokens(doc);
            }
            Ok(builder.build())
        })?;

        // ── Step 4: rare words are dropped, never mapped to <unk> ─────────────
        let encoded: Vec<Vec<u32>> = tokenized
            .iter()
            .map(|doc| vocab.encode_known(doc))
            .filter(|doc| !doc.is_empty())
            .collect();

        // ── Step 5: words whose neighbours are reported ───────────────────────
        let eval_words = self.eval_words(&vocab, test_word)?;

        // ── Step 6-7 ──────────────────────────────────────────────────────────
        let checkpoint = CheckpointManager::new(&cfg.checkpoint_dir, MODEL_NAME)?;
        checkpoint.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir, MODEL_NAME)?;

        run_skipgram_training(cfg, SkipGramTask {
            vocab:      &vocab,
            documents:  encoded,
            eval_words: &eval_words,
            checkpoint: &checkpoint,
            metrics:    &metrics,
        })
    }

    /// One "Nearest to ..." line per query word.
    pub fn predict(&self, test_word: Option<&str>) -> Result<Vec<String>> {
        let checkpoint = CheckpointManager::new(&self.config.checkpoint_dir, MODEL_NAME)?;
        let saved: SkipGramConfig = checkpoint.load_config()?;
        let vocab = VocabStore::new(&self.config.checkpoint_dir).load(MODEL_NAME)?;

        let (model, device) = restore_skipgram(&saved, vocab.len(), &checkpoint)?;
        let queries = self.eval_words(&vocab, test_word)?;

        let finder = NeighbourFinder::new(&model, &vocab, device).with_top_k(self.config.top_k);
        Ok(finder.neighbours(&queries)?.iter().map(|n| n.render()).collect())
    }

    fn eval_words(&self, vocab: &Vocabulary, test_word: Option<&str>) -> Result<Vec<u32>> {
        match test_word {
            Some(word) => Ok(vec![vocab.lookup(&word.to_lowercase())?]),
            None => {
                let mut rng = StdRng::seed_from_u64(self.config.seed);
                Ok(sample_eval_words(
                    vocab.len(),
                    self.config.valid_size,
                    self.config.valid_window,
                    &mut rng,
                ))
            }
        }
    }
}
