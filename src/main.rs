use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use predictext::{Config, Engine};

#[derive(Parser, Debug)]
#[command(name = "predictext")]
#[command(about = "Next-word prediction and spelling correction")]
#[command(version)]
struct Args {
    /// Directory holding the trained models
    #[arg(short, long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train both models from a text corpus, one sentence per line
    Train {
        #[arg(short, long)]
        corpus: PathBuf,
        /// Write the models here instead of the model directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Suggest the next word after a phrase
    Suggest {
        text: String,
        /// Only suggest words starting with this prefix
        #[arg(short, long)]
        prefix: Option<String>,
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Suggest spelling corrections for a word
    Correct {
        word: String,
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Score a phrase under the n-gram model
    Perplexity {
        text: String,
        #[arg(short, long)]
        order: Option<usize>,
    },
}

fn train(corpus: &Path, config: &Config, model_dir: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(corpus)
        .with_context(|| format!("reading corpus {}", corpus.display()))?;
    let engine = Engine::train(&text, config)?;
    engine
        .save(model_dir)
        .with_context(|| format!("saving models to {}", model_dir.display()))?;
    println!("Models saved to {}", model_dir.display());
    Ok(())
}

fn serve(command: Command, config: &Config, model_dir: &Path) -> anyhow::Result<()> {
    let engine = Engine::load(model_dir, config)?;
    match command {
        Command::Train { .. } => {}
        Command::Suggest {
            text,
            prefix,
            count,
        } => {
            let count = count.unwrap_or(config.suggestion_count);
            let suggestions = engine.suggest_n(&text, prefix.as_deref(), count);
            if suggestions.is_empty() {
                println!("No suggestions found.");
            }
            for s in suggestions {
                println!("{}\t{:.10}", s.word, s.probability);
            }
        }
        Command::Correct { word, count } => {
            let count = count.unwrap_or(config.correction_count);
            let corrections = engine.correct_n(&word, count);
            if corrections.is_empty() {
                println!("No corrections found.");
            }
            for word in corrections {
                println!("{word}");
            }
        }
        Command::Perplexity { text, order } => {
            let order = order.unwrap_or(config.perplexity_order);
            match engine.perplexity_with_order(&text, order) {
                Some(p) => println!("{p:.4}"),
                None => println!("Input is empty."),
            }
        }
    }
    Ok(())
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if args.model_dir.is_some() {
        config.model_dir = args.model_dir;
    }
    config.validate()?;
    let model_dir = config.model_dir();

    match args.command {
        Command::Train { corpus, output } => {
            train(&corpus, &config, output.as_deref().unwrap_or(&model_dir))
        }
        command => serve(command, &config, &model_dir),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("predictext=info")),
        )
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_train_accepts_output_dir() {
        let args = Args::try_parse_from([
            "predictext",
            "train",
            "--corpus",
            "corpus.txt",
            "--output",
            "out",
        ])
        .unwrap();
        match args.command {
            Command::Train { corpus, output } => {
                assert_eq!(corpus, PathBuf::from("corpus.txt"));
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_train_output_defaults_to_model_dir() {
        let args =
            Args::try_parse_from(["predictext", "train", "-c", "corpus.txt", "-m", "models"]).unwrap();
        assert_eq!(args.model_dir, Some(PathBuf::from("models")));
        assert!(matches!(args.command, Command::Train { output: None, .. }));
    }

    #[test]
    fn test_train_writes_to_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("corpus.txt");
        std::fs::write(&corpus, "i like a cat\ni like a dog\n").unwrap();
        let output = dir.path().join("out");
        let config = Config {
            max_order: 3,
            count_threshold: 1,
            ..Config::default()
        };

        train(&corpus, &config, &output).unwrap();
        assert!(output.join(predictext::persistence::LANGUAGE_MODEL_FILE).exists());
        assert!(output.join(predictext::persistence::CORRECTION_MODEL_FILE).exists());
    }
}
