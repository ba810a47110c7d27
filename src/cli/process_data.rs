use anyhow::Context;
use clap::Parser;
use disaster_response::{
    args::{parse_args, ArgsOutcome},
    config::Config,
    etl,
    telemetry::init_tracing,
};
use std::path::PathBuf;

const GUIDANCE: &str = "Please provide the filepaths of the messages and categories \
datasets as the first and second argument respectively, as well as the filepath of \
the database to save the cleaned data to as the third argument. \n\nExample: \
process-data disaster_messages.csv disaster_categories.csv DisasterResponse.db";

/// Clean the messages and categories CSVs into a SQLite table
#[derive(Parser, Debug)]
#[command(name = "process-data", version, about, long_about = None)]
struct Cli {
    /// Messages CSV (id, message, original, genre)
    messages: PathBuf,

    /// Categories CSV (id, categories)
    categories: PathBuf,

    /// SQLite database to write
    database: PathBuf,

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

    init_tracing(&config.logging);

    let summary = etl::run(&cli.messages, &cli.categories, &cli.database, &config.storage)
        .context("ETL failed")?;

    println!(
        "{} messages, {} category rows, {} rows written to {} ({} categories)",
        summary.messages_loaded,
        summary.categories_loaded,
        summary.rows_written,
        cli.database.display(),
        summary.categories.len()
    );
    Ok(())
}
