// ============================================================
// Layer 5 - Translation Training Loop
// ============================================================
// Epoch loop over a shuffled Burn DataLoader:
//
//   source      → Encoder → final (cell, hidden)
//   target_in   → Decoder (teacher forcing) → logits
//   target_out  → masked cross-entropy (padding ignored)
//   backward → Adam step with per-parameter norm clipping (5.0)
//
// A trailing batch smaller than batch_size is skipped so every
// update sees the same number of examples.
//
// After each epoch the weights are checkpointed (tag = epoch,
// continuing from a restored tag) and two sentences are
// translated: a random training source and a fixed sentence. That
// evaluation is best-effort; a failure is logged and training
// moves on.
//
// Reference: Burn Book §5, Sutskever et al. (2014)

use anyhow::{anyhow, bail, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    grad_clipping::GradientClippingConfig,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::application::translate_use_case::TranslateConfig;
use crate::data::{
    batcher::{TranslationBatch, TranslationBatcher},
    dataset::TranslationDataset,
};
use crate::domain::vocabulary::{Vocabulary, PAD_INDEX};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{LossRecord, MetricsLogger},
};
use crate::ml::backend::{default_device, TrainingBackend};
use crate::ml::inferencer::Translator;
use crate::ml::seq2seq::{Seq2Seq, Seq2SeqConfig};

/// Fixed sentence translated after every epoch.
pub const FIXED_SENTENCE: &str = "How are you today ?";

const CLIP_NORM: f32 = 5.0;

/// Everything the loop needs besides the hyperparameters.
pub struct TranslationTask<'a> {
    pub dataset:      TranslationDataset,
    pub source_vocab: &'a Vocabulary,
    pub target_vocab: &'a Vocabulary,
    /// Raw training sources, for the per-epoch sample translation
    pub eval_sources: &'a [String],
    pub checkpoint:   &'a CheckpointManager,
    pub metrics:      &'a MetricsLogger,
}

pub fn run_translation_training(cfg: &TranslateConfig, task: TranslationTask<'_>) -> Result<()> {
    let device = default_device();
    tracing::info!("Using device: {:?}", device);
    train_loop::<TrainingBackend>(cfg, task, device).map(|_| ())
}

/// One teacher-forced forward/backward/update. Returns the updated
/// model and the batch loss.
pub fn train_step<B, O>(
    model: Seq2Seq<B>,
    optim: &mut O,
    batch: TranslationBatch<B>,
    lr:    f64,
) -> (Seq2Seq<B>, f64)
where
    B: AutodiffBackend,
    O: Optimizer<Seq2Seq<B>, B>,
{
    let loss = model.forward_loss(batch.source, batch.target_in, batch.target_out, PAD_INDEX);
    let value = loss.clone().into_scalar().elem::<f64>();

    let grads = GradientsParams::from_grads(loss.backward(), &model);
    (optim.step(lr, model, grads), value)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:    &TranslateConfig,
    task:   TranslationTask<'_>,
    device: B::Device,
) -> Result<Seq2Seq<B>> {
    let TranslationTask { dataset, source_vocab, target_vocab, eval_sources, checkpoint, metrics } = task;
    if cfg.batch_size == 0 || cfg.print_every == 0 {
        bail!("batch size and print interval must be positive");
    }
    if dataset.sample_count() < cfg.batch_size {
        bail!(
            "{} sentence pairs cannot fill a single batch of {}",
            dataset.sample_count(), cfg.batch_size,
        );
    }

    B::seed(cfg.seed);

    // ── Model, possibly restored ──────────────────────────────────────────────
    let model_cfg = Seq2SeqConfig::new(
        source_vocab.len(), target_vocab.len(), cfg.embedding_size, cfg.hidden_size,
    );
    let (mut model, restored) = checkpoint.load_latest(model_cfg.init::<B>(&device), &device)?;
    let first_epoch = match restored {
        Some(tag) => tag,
        None => {
            tracing::warn!(
                "No translation checkpoint in '{}', starting from scratch",
                checkpoint.dir().display()
            );
            0
        }
    };

    // ── Adam with gradient clipping ───────────────────────────────────────────
    let mut optim = AdamConfig::new()
        .with_grad_clipping(Some(GradientClippingConfig::Norm(CLIP_NORM)))
        .init();

    let total_pairs = dataset.sample_count();
    let loader = DataLoaderBuilder::new(TranslationBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .build(dataset);

    let mut rng = StdRng::seed_from_u64(cfg.seed);

    tracing::info!(
        "Training translation for {} epochs from epoch {} ({} pairs, batch={})",
        cfg.num_epochs, first_epoch, total_pairs, cfg.batch_size,
    );

    for e in 1..=cfg.num_epochs {
        let epoch = first_epoch + e;

        for (batch_index, batch) in loader.iter().enumerate() {
            if batch.size() < cfg.batch_size {
                tracing::debug!("Skipping partial batch of {}", batch.size());
                continue;
            }

            let (updated, loss) = train_step(model, &mut optim, batch, cfg.learning_rate);
            model = updated;

            if batch_index % cfg.print_every == 0 {
                println!("Epoch {} Batch {} Loss {:.4}", epoch, batch_index, loss);
                metrics.log(&LossRecord::new(batch_index, epoch, loss))?;
            }
        }

        checkpoint.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);

        let snapshot = model.valid();
        let translator = Translator::new(&snapshot, source_vocab, target_vocab, cfg.oov, device.clone());
        if let Err(e) = evaluate_best_effort(&translator, eval_sources, &mut rng) {
            tracing::warn!("Evaluation after epoch {} failed: {:#}", epoch, e);
        }
    }

    tracing::info!("Translation training complete");
    Ok(model)
}

/// Translate one random training source and the fixed sentence.
/// Stops at the first sentence that cannot be translated.
pub fn evaluate_best_effort<B: Backend>(
    translator:   &Translator<'_, B>,
    eval_sources: &[String],
    rng:          &mut StdRng,
) -> Result<()> {
    let sample = eval_sources
        .choose(rng)
        .ok_or_else(|| anyhow!("no training sentences to sample from"))?;

    for sentence in [sample.as_str(), FIXED_SENTENCE] {
        let translation = translator.translate(sentence)?;
        println!("{}", translation.input);
        println!("{}", translation.output);
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::data::dataloader::batcher::Batcher;

    use crate::data::dataset::{encode_pairs, NormalizedPair, TranslationSample};
    use crate::data::normalizer::TextNormalizer;
    use crate::domain::sentence_pair::SentencePair;
    use crate::domain::vocabulary::{split_tokens, OovPolicy, VocabularyBuilder, END_TOKEN, START_TOKEN};

    type TestBackend = Autodiff<NdArray>;

    struct Fixture {
        source:  Vocabulary,
        target:  Vocabulary,
        samples: Vec<TranslationSample>,
    }

    fn fixture(pairs: &[(&str, &str)]) -> Fixture {
        let normalizer = TextNormalizer::new();
        let normalized: Vec<NormalizedPair> = pairs
            .iter()
            .map(|(s, t)| NormalizedPair::from_pair(&SentencePair::new(*s, *t), &normalizer))
            .collect();

        let mut source = VocabularyBuilder::new();
        let mut target = VocabularyBuilder::new().with_reserved(&[START_TOKEN, END_TOKEN]);
        for p in &normalized {
            source.add_tokens(split_tokens(&p.source));
            target.add_tokens(split_tokens(&p.target_in));
            target.add_tokens(split_tokens(&p.target_out));
        }
        let (source, target) = (source.build(), target.build());
        let samples = encode_pairs(&normalized, &source, &target, OovPolicy::Error).unwrap();
        Fixture { source, target, samples }
    }

    fn tiny_config(dir: &std::path::Path) -> TranslateConfig {
        TranslateConfig {
            checkpoint_dir: dir.display().to_string(),
            embedding_size: 8,
            hidden_size:    12,
            batch_size:     2,
            num_epochs:     2,
            print_every:    1,
            learning_rate:  1e-2,
            ..TranslateConfig::default()
        }
    }

    #[test]
    fn test_single_pair_loss_decreases() {
        let fx = fixture(&[("he is old", "il est vieux")]);
        let device = Default::default();

        let model_cfg = Seq2SeqConfig::new(fx.source.len(), fx.target.len(), 8, 16);
        let mut model = model_cfg.init::<TestBackend>(&device);
        let mut optim = AdamConfig::new()
            .with_grad_clipping(Some(GradientClippingConfig::Norm(CLIP_NORM)))
            .init();
        let batcher = TranslationBatcher::<TestBackend>::new(device);

        let mut losses = Vec::new();
        for _ in 0..30 {
            let batch = batcher.batch(fx.samples.clone());
            let (updated, loss) = train_step(model, &mut optim, batch, 1e-2);
            model = updated;
            losses.push(loss);
        }

        assert!(losses.iter().all(|l| l.is_finite()));
        assert!(losses[losses.len() - 1] < losses[0]);
    }

    #[test]
    fn test_loop_checkpoints_each_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());
        let fx = fixture(&[
            ("Go.", "Va !"),
            ("Run!", "Cours !"),
            ("Who?", "Qui ?"),
        ]);
        let eval_sources: Vec<String> = vec!["Go.".into(), "Run!".into()];

        let checkpoint = CheckpointManager::new(dir.path(), "seq2seq").unwrap();
        let metrics = MetricsLogger::new(dir.path(), "seq2seq").unwrap();
        let task = TranslationTask {
            dataset:      TranslationDataset::new(fx.samples.clone()),
            source_vocab: &fx.source,
            target_vocab: &fx.target,
            eval_sources: &eval_sources,
            checkpoint:   &checkpoint,
            metrics:      &metrics,
        };

        // The fixed sentence is out of vocabulary: evaluation fails,
        // training does not.
        train_loop::<TestBackend>(&cfg, task, Default::default()).unwrap();
        assert_eq!(checkpoint.latest_tag().unwrap(), Some(2));

        // One full batch per epoch; the leftover pair is skipped.
        let rows = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(rows.lines().count(), 1 + 2);
    }

    #[test]
    fn test_too_few_pairs_for_a_batch() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TranslateConfig { batch_size: 4, ..tiny_config(dir.path()) };
        let fx = fixture(&[("he is old", "il est vieux")]);

        let checkpoint = CheckpointManager::new(dir.path(), "seq2seq").unwrap();
        let metrics = MetricsLogger::new(dir.path(), "seq2seq").unwrap();
        let task = TranslationTask {
            dataset:      TranslationDataset::new(fx.samples),
            source_vocab: &fx.source,
            target_vocab: &fx.target,
            eval_sources: &[],
            checkpoint:   &checkpoint,
            metrics:      &metrics,
        };
        assert!(train_loop::<TestBackend>(&cfg, task, Default::default()).is_err());
    }
}
