// ============================================================
// Layer 5 - Skip-gram Training Loop
// ============================================================
// Step-based loop over an endless stream of (center, context)
// pairs:
//
//   WindowSampler → batch_size pairs
//   NegativeSampler → n_sampled noise words per pair
//   SkipGramBatcher → tensors
//   sampled-softmax loss → backward → Adam step
//
// Every `print_every` steps the raw batch loss is printed and
// logged; every `evaluate_every` steps (and after the last one)
// the weights are checkpointed and the nearest neighbours of the
// evaluation words are reported.
//
// Steps continue from the restored checkpoint tag, so a resumed
// run never overwrites earlier checkpoints.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::dataloader::batcher::Batcher,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use rand::{rngs::StdRng, SeedableRng};

use crate::application::skipgram_use_case::SkipGramConfig;
use crate::data::{
    batcher::{SkipGramBatch, SkipGramBatcher},
    dataset::SkipGramSample,
    sampling::{NegativeSampler, Subsampler, WindowSampler},
};
use crate::domain::vocabulary::Vocabulary;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{LossRecord, MetricsLogger},
};
use crate::ml::backend::{default_device, TrainingBackend};
use crate::ml::inferencer::NeighbourFinder;
use crate::ml::skipgram::{SkipGramModel, SkipGramModelConfig};

/// Everything the loop needs besides the hyperparameters.
pub struct SkipGramTask<'a> {
    pub vocab:      &'a Vocabulary,
    /// Corpus as index sequences, rare words already trimmed
    pub documents:  Vec<Vec<u32>>,
    pub eval_words: &'a [u32],
    pub checkpoint: &'a CheckpointManager,
    pub metrics:    &'a MetricsLogger,
}

pub fn run_skipgram_training(cfg: &SkipGramConfig, task: SkipGramTask<'_>) -> Result<()> {
    let device = default_device();
    tracing::info!("Using device: {:?}", device);
    train_loop::<TrainingBackend>(cfg, task, device).map(|_| ())
}

/// One forward/backward/update on a batch. Returns the updated model
/// and the batch loss.
pub fn train_step<B, O>(
    model: SkipGramModel<B>,
    optim: &mut O,
    batch: SkipGramBatch<B>,
    lr:    f64,
) -> (SkipGramModel<B>, f64)
where
    B: AutodiffBackend,
    O: Optimizer<SkipGramModel<B>, B>,
{
    let loss = model.forward_loss(batch.centers, batch.contexts, batch.negatives);
    let value = loss.clone().into_scalar().elem::<f64>();

    let grads = GradientsParams::from_grads(loss.backward(), &model);
    (optim.step(lr, model, grads), value)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:    &SkipGramConfig,
    task:   SkipGramTask<'_>,
    device: B::Device,
) -> Result<SkipGramModel<B>> {
    let SkipGramTask { vocab, documents, eval_words, checkpoint, metrics } = task;
    if cfg.batch_size == 0 || cfg.print_every == 0 || cfg.evaluate_every == 0 {
        bail!("batch size, print interval and evaluation interval must be positive");
    }

    B::seed(cfg.seed);

    // ── Model, possibly restored ──────────────────────────────────────────────
    let model_cfg = SkipGramModelConfig::new(vocab.len(), cfg.embedding_size, cfg.hidden_size);
    let (mut model, restored) = checkpoint.load_latest(model_cfg.init::<B>(&device), &device)?;
    let first_step = match restored {
        Some(tag) => tag,
        None => {
            tracing::warn!(
                "No skip-gram checkpoint in '{}', starting from scratch",
                checkpoint.dir().display()
            );
            0
        }
    };

    let mut optim = AdamConfig::new().init();

    // ── Samplers ──────────────────────────────────────────────────────────────
    let subsampler = Subsampler::from_corpus(&documents, vocab.len(), cfg.drop_word_threshold);
    let mut pairs  = WindowSampler::new(documents, subsampler, cfg.window_size, cfg.seed);
    let noise      = NegativeSampler::new(vocab.counts())?;
    let mut rng    = StdRng::seed_from_u64(cfg.seed.wrapping_add(1));
    let batcher    = SkipGramBatcher::<B>::new(device.clone());

    tracing::info!(
        "Training skip-gram for {} steps from step {} (vocab={}, batch={})",
        cfg.total_iterations, first_step, vocab.len(), cfg.batch_size,
    );

    for i in 1..=cfg.total_iterations {
        let step = first_step + i;

        let samples: Vec<SkipGramSample> = pairs
            .by_ref()
            .take(cfg.batch_size)
            .map(|pair| SkipGramSample::new(pair, noise.sample(pair.context, cfg.n_sampled, &mut rng)))
            .collect();
        if samples.is_empty() {
            bail!("the corpus yields no (center, context) pairs");
        }

        let (updated, loss) = train_step(model, &mut optim, batcher.batch(samples), cfg.learning_rate);
        model = updated;

        if i % cfg.print_every == 0 {
            println!("Step {} Loss {:.4}", step, loss);
            metrics.log(&LossRecord::new(step, pairs.epoch(), loss))?;
        }

        if i % cfg.evaluate_every == 0 || i == cfg.total_iterations {
            checkpoint.save_model(&model, step)?;
            tracing::info!("Checkpoint saved at step {}", step);

            let snapshot = model.valid();
            let finder = NeighbourFinder::new(&snapshot, vocab, device.clone()).with_top_k(cfg.top_k);
            for found in finder.neighbours(eval_words)? {
                println!("{}", found.render());
            }
        }
    }

    tracing::info!("Skip-gram training complete");
    Ok(model)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vocabulary::{split_tokens, VocabularyBuilder};
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    fn tiny_config(dir: &std::path::Path) -> SkipGramConfig {
        SkipGramConfig {
            checkpoint_dir:      dir.display().to_string(),
            embedding_size:      8,
            hidden_size:         4,
            batch_size:          6,
            window_size:         2,
            n_sampled:           3,
            total_iterations:    5,
            evaluate_every:      2,
            print_every:         1,
            drop_word_threshold: 1.0,
            min_count:           1,
            ..SkipGramConfig::default()
        }
    }

    #[test]
    fn test_loop_checkpoints_every_interval_and_at_the_end() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());

        let text = "the quick brown fox jumps over the lazy dog";
        let mut builder = VocabularyBuilder::new();
        builder.add_tokens(split_tokens(text));
        let vocab = builder.build();
        let documents = vec![vocab.encode_known(&split_tokens(text))];

        let checkpoint = CheckpointManager::new(dir.path(), "skipgram").unwrap();
        let metrics = MetricsLogger::new(dir.path(), "skipgram").unwrap();
        let eval_words = [2u32, 3];

        let task = SkipGramTask {
            vocab: &vocab, documents, eval_words: &eval_words,
            checkpoint: &checkpoint, metrics: &metrics,
        };
        train_loop::<TestBackend>(&cfg, task, Default::default()).unwrap();

        assert_eq!(checkpoint.latest_tag().unwrap(), Some(5));
        assert!(dir.path().join("skipgram_2.mpk.gz").exists());
        assert!(dir.path().join("skipgram_4.mpk.gz").exists());

        let rows = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(rows.lines().count(), 1 + 5);

        // A second run resumes from step 5.
        let task = SkipGramTask {
            vocab: &vocab,
            documents: vec![vocab.encode_known(&split_tokens(text))],
            eval_words: &eval_words,
            checkpoint: &checkpoint,
            metrics: &metrics,
        };
        train_loop::<TestBackend>(&SkipGramConfig { total_iterations: 2, ..cfg }, task, Default::default())
            .unwrap();
        assert_eq!(checkpoint.latest_tag().unwrap(), Some(7));
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());

        let mut builder = VocabularyBuilder::new();
        builder.add_tokens(split_tokens("a b c"));
        let vocab = builder.build();

        let checkpoint = CheckpointManager::new(dir.path(), "skipgram").unwrap();
        let metrics = MetricsLogger::new(dir.path(), "skipgram").unwrap();
        let task = SkipGramTask {
            vocab: &vocab, documents: vec![vec![2]], eval_words: &[],
            checkpoint: &checkpoint, metrics: &metrics,
        };
        assert!(train_loop::<TestBackend>(&cfg, task, Default::default()).is_err());
    }
}
