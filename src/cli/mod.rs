// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes to a use case. All
// human-facing output of prediction is printed here.
//
//   seq2seq-lab skipgram  --mode train|predict ...
//   seq2seq-lab translate --mode train|predict ...
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, Mode, SkipGramArgs, TranslateArgs};

use crate::application::{skipgram_use_case::SkipGramUseCase, translate_use_case::TranslateUseCase};

#[derive(Parser, Debug)]
#[command(
    name = "seq2seq-lab",
    version,
    about = "Train skip-gram embeddings or an LSTM translator with Burn, then query them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Skipgram(args)  => run_skipgram(&args),
            Commands::Translate(args) => run_translate(&args),
        }
    }
}

fn run_skipgram(args: &SkipGramArgs) -> Result<()> {
    let use_case = SkipGramUseCase::new(args.into());
    match args.mode {
        Mode::Train => {
            use_case.train(args.test_word.as_deref())?;
            println!("Training complete. Checkpoints in '{}'.", args.checkpoint_dir);
        }
        Mode::Predict => {
            for line in use_case.predict(args.test_word.as_deref())? {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn run_translate(args: &TranslateArgs) -> Result<()> {
    let use_case = TranslateUseCase::new(args.into());
    match args.mode {
        Mode::Train => {
            use_case.train()?;
            println!("Training complete. Checkpoints in '{}'.", args.checkpoint_dir);
        }
        Mode::Predict => {
            for translation in use_case.predict(args.sentence.as_deref())? {
                println!("{}", translation.input);
                println!("{}", translation.output);
            }
        }
    }
    Ok(())
}
