// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Two subcommands, `skipgram` and `translate`, each with a
// `--mode train|predict` switch and the hyperparameters of its
// pipeline. Defaults match the application configs.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::{skipgram_use_case::SkipGramConfig, translate_use_case::TranslateConfig};
use crate::domain::vocabulary::OovPolicy;
use crate::ml::inferencer::TOP_K;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train skip-gram word embeddings, or list nearest neighbours
    Skipgram(SkipGramArgs),

    /// Train the LSTM translator, or translate sentences
    Translate(TranslateArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Train,
    /// Skip training and only use the saved checkpoint
    #[value(alias = "infer")]
    Predict,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OovArg {
    /// Unknown words are an error
    Error,
    /// Unknown words become <unk>
    Unknown,
}

impl From<OovArg> for OovPolicy {
    fn from(a: OovArg) -> Self {
        match a {
            OovArg::Error   => OovPolicy::Error,
            OovArg::Unknown => OovPolicy::Unknown,
        }
    }
}

// ─── skipgram ─────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct SkipGramArgs {
    #[arg(long, value_enum, default_value_t = Mode::Train)]
    pub mode: Mode,

    /// Plain-text corpus, one document per line
    #[arg(long, default_value = "data/text8")]
    pub corpus: String,

    #[arg(long, default_value = "checkpoint")]
    pub checkpoint_dir: String,

    #[arg(long, default_value_t = 512)]
    pub embedding_size: usize,

    #[arg(long, default_value_t = 256)]
    pub hidden_size: usize,

    #[arg(long, default_value_t = 1000)]
    pub batch_size: usize,

    /// Largest context radius around a center word
    #[arg(long, default_value_t = 10)]
    pub window_size: usize,

    /// Noise words per positive pair
    #[arg(long, default_value_t = 100)]
    pub n_sampled: usize,

    #[arg(long, default_value_t = 70_000)]
    pub total_iterations: usize,

    /// Steps between checkpoint + nearest-neighbour reports
    #[arg(long, default_value_t = 1000)]
    pub evaluate_every: usize,

    #[arg(long, default_value_t = 100)]
    pub print_every: usize,

    /// Report neighbours of this word instead of sampled ones
    #[arg(long)]
    pub test_word: Option<String>,

    #[arg(long, default_value_t = 1e-3)]
    pub learning_rate: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Subsampling threshold t in p_drop = 1 - sqrt(t / freq)
    #[arg(long, default_value_t = 1e-5)]
    pub drop_word_threshold: f64,

    /// Words seen fewer times are removed from the corpus
    #[arg(long, default_value_t = 5)]
    pub min_count: u64,

    /// Keep only this many vocabulary entries (most frequent first)
    #[arg(long)]
    pub max_vocab: Option<usize>,

    /// Number of evaluation words
    #[arg(long, default_value_t = 16)]
    pub valid_size: usize,

    /// Evaluation words are drawn from this many frequent words
    #[arg(long, default_value_t = 100)]
    pub valid_window: usize,

    /// Neighbours listed per word
    #[arg(long, default_value_t = TOP_K)]
    pub top_k: usize,
}

impl From<&SkipGramArgs> for SkipGramConfig {
    fn from(a: &SkipGramArgs) -> Self {
        SkipGramConfig {
            corpus:              a.corpus.clone(),
            checkpoint_dir:      a.checkpoint_dir.clone(),
            embedding_size:      a.embedding_size,
            hidden_size:         a.hidden_size,
            batch_size:          a.batch_size,
            window_size:         a.window_size,
            n_sampled:           a.n_sampled,
            total_iterations:    a.total_iterations,
            evaluate_every:      a.evaluate_every,
            print_every:         a.print_every,
            learning_rate:       a.learning_rate,
            seed:                a.seed,
            drop_word_threshold: a.drop_word_threshold,
            min_count:           a.min_count,
            max_vocab:           a.max_vocab,
            valid_size:          a.valid_size,
            valid_window:        a.valid_window,
            top_k:               a.top_k,
        }
    }
}

// ─── translate ────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct TranslateArgs {
    #[arg(long, value_enum, default_value_t = Mode::Train)]
    pub mode: Mode,

    /// Tab-separated file: source<TAB>target[<TAB>...]
    #[arg(long, default_value = "data/fra.txt")]
    pub corpus: String,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, default_value_t = 256)]
    pub embedding_size: usize,

    /// LSTM state size
    #[arg(long, default_value_t = 512)]
    pub hidden_size: usize,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 15)]
    pub num_epochs: usize,

    /// Batches between loss lines
    #[arg(long, default_value_t = 100)]
    pub print_every: usize,

    /// Sentence to translate in predict mode
    #[arg(long)]
    pub sentence: Option<String>,

    #[arg(long, default_value_t = 1e-3)]
    pub learning_rate: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 1)]
    pub min_count: u64,

    /// Cap on each vocabulary, reserved tokens included
    #[arg(long)]
    pub max_vocab: Option<usize>,

    /// Read at most this many pairs
    #[arg(long)]
    pub max_examples: Option<usize>,

    #[arg(long, value_enum, default_value_t = OovArg::Error)]
    pub oov: OovArg,
}

impl From<&TranslateArgs> for TranslateConfig {
    fn from(a: &TranslateArgs) -> Self {
        TranslateConfig {
            corpus:         a.corpus.clone(),
            checkpoint_dir: a.checkpoint_dir.clone(),
            embedding_size: a.embedding_size,
            hidden_size:    a.hidden_size,
            batch_size:     a.batch_size,
            num_epochs:     a.num_epochs,
            print_every:    a.print_every,
            learning_rate:  a.learning_rate,
            seed:           a.seed,
            min_count:      a.min_count,
            max_vocab:      a.max_vocab,
            max_examples:   a.max_examples,
            oov:            a.oov.into(),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_infer_is_an_alias_for_predict() {
        let cli = Cli::try_parse_from([
            "seq2seq-lab", "translate", "--mode", "infer", "--sentence", "Go.", "--oov", "unknown",
        ])
        .unwrap();
        let Commands::Translate(args) = cli.command else { panic!("wrong subcommand") };
        assert_eq!(args.mode, Mode::Predict);
        assert_eq!(args.sentence.as_deref(), Some("Go."));
        assert_eq!(TranslateConfig::from(&args).oov, OovPolicy::Unknown);
    }

    #[test]
    fn test_skipgram_defaults_match_config() {
        let cli = Cli::try_parse_from(["seq2seq-lab", "skipgram"]).unwrap();
        let Commands::Skipgram(args) = cli.command else { panic!("wrong subcommand") };
        let from_cli = SkipGramConfig::from(&args);
        let default = SkipGramConfig::default();

        assert_eq!(args.mode, Mode::Train);
        assert_eq!(from_cli.window_size, default.window_size);
        assert_eq!(from_cli.n_sampled, default.n_sampled);
        assert_eq!(from_cli.min_count, default.min_count);
        assert_eq!(from_cli.drop_word_threshold, default.drop_word_threshold);
        assert_eq!(from_cli.top_k, default.top_k);
        assert_eq!(from_cli.max_vocab, None);
    }

    #[test]
    fn test_max_vocab_reaches_both_configs() {
        let cli = Cli::try_parse_from(["seq2seq-lab", "skipgram", "--max-vocab", "5000", "--top-k", "4"])
            .unwrap();
        let Commands::Skipgram(args) = cli.command else { panic!("wrong subcommand") };
        let cfg = SkipGramConfig::from(&args);
        assert_eq!((cfg.max_vocab, cfg.top_k), (Some(5000), 4));

        let cli = Cli::try_parse_from(["seq2seq-lab", "translate", "--max-vocab", "300"]).unwrap();
        let Commands::Translate(args) = cli.command else { panic!("wrong subcommand") };
        assert_eq!(TranslateConfig::from(&args).max_vocab, Some(300));
    }
}
