use std::path::PathBuf;

use clap::{Parser, Subcommand};
use intent_core::{IntentConfig, IntentEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "intent-cli")]
#[command(about = "Offline intent extraction from short utterances", long_about = None)]
struct Cli {
    /// Intent configuration file (JSON); the built-in config is used when absent
    #[arg(short, long, env = "INTENT_CONFIG_PATH", global = true)]
    config: Option<PathBuf>,

    /// Log classification details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract intent and variables as JSON
    Extract {
        text: String,

        /// Pretty-print the JSON result
        #[arg(short, long)]
        pretty: bool,
    },
    /// Show every intent's score breakdown
    Explain { text: String },
    /// Validate and compile a configuration file
    Validate { path: PathBuf },
    /// Print the built-in configuration
    DefaultConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract { text, pretty } => {
            let engine = IntentEngine::from_path_or_default(cli.config.as_deref())?;
            let result = engine.extract_intent(&text);
            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{json}");
        }
        Commands::Explain { text } => {
            let engine = IntentEngine::from_path_or_default(cli.config.as_deref())?;
            println!(
                "{:<24} {:>6} {:>6} {:>7} {:>7} {:>6} {:>8} {:>6}",
                "intent", "regex", "phrase", "keyword", "overlap", "length", "priority", "total"
            );
            for score in engine.explain(&text) {
                println!(
                    "{:<24} {:>6.3} {:>6.3} {:>7.3} {:>7.3} {:>6.3} {:>8.3} {:>6.3}",
                    score.intent,
                    score.regex,
                    score.phrase,
                    score.keyword,
                    score.overlap,
                    score.length,
                    score.priority,
                    score.total()
                );
            }
            let classification = engine.classify(&text);
            println!("=> {} ({:.3})", classification.intent, classification.confidence);
        }
        Commands::Validate { path } => {
            let engine = IntentEngine::from_path(&path)?;
            info!("Validated {}", path.display());
            let config = engine.config();
            println!(
                "{} v{}: {} intents, {} entities",
                config.domain,
                config.version,
                config.intents.len(),
                config.entities.len()
            );
        }
        Commands::DefaultConfig => {
            println!("{}", IntentConfig::default_config().to_json_pretty()?);
        }
    }

    Ok(())
}
