use anyhow::Context;
use clap::Parser;
use disaster_response::{
    args::{parse_args, ArgsOutcome},
    config::Config,
    ml::train,
    telemetry::init_tracing,
};
use std::path::PathBuf;

const GUIDANCE: &str = "Please provide the filepath of the disaster messages database \
as the first argument and the filepath of the model file to save the model to as the \
second argument. \n\nExample: train-classifier ../data/DisasterResponse.db classifier.bin";

/// Train, evaluate and save the message classifier
#[derive(Parser, Debug)]
#[command(name = "train-classifier", version, about, long_about = None)]
struct Cli {
    /// SQLite database written by process-data
    database: PathBuf,

    /// Output model file
    model: PathBuf,

    /// Table name (default from configuration)
    #[arg(long)]
    table: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = match parse_args::<Cli, _, _>(std::env::args_os(), GUIDANCE) {
        ArgsOutcome::Parsed(cli) => cli,
        ArgsOutcome::Usage(text) => {
            println!("{}", text);
            return Ok(());
        }
        ArgsOutcome::Exit(e) => e.exit(),
    };

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(table) = cli.table {
        config.storage.table_name = table;
    }
    config.storage.database_path = cli.database.clone();
    config.model.model_path = cli.model.clone();

    init_tracing(&config.logging);

    let summary = train(&cli.database, &cli.model, &config).context("Training failed")?;

    print!("{}", summary.report);
    println!(
        "best n_estimators: {} ({} train / {} test rows, {} features, {} ms)",
        summary.grid.best_n_trees,
        summary.n_train,
        summary.n_test,
        summary.n_features,
        summary.elapsed_ms
    );

    let hyperparameters: Vec<String> = summary
        .metadata
        .hyperparameters
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    println!(
        "model: {} trained at {} ({})",
        summary.metadata.name,
        summary.metadata.trained_at.to_rfc3339(),
        hyperparameters.join(", ")
    );
    Ok(())
}
