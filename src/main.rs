//! Glucose Log CLI
//!
//! Command-line front-end for the reading store:
//! - Show the dashboard (default)
//! - Add a reading
//! - Browse and delete from the history
//! - Print daily statistics

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use glucose_log::config::{generate_default_config, Config, ConfigSource, LoggingConfig};
use glucose_log::stats::{aggregate_by_day_in, summarize};
use glucose_log::storage::{ChangeKind, FileStore, MealContext, Reading, ReadingStore, StoreEvent};
use glucose_log::views::{self, add, dashboard, history, View};
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

#[derive(Parser)]
#[command(name = "glucose-log")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Personal blood-glucose log")]
#[command(long_about = "Glucose Log records blood-glucose readings locally.\nAdd readings, browse the history and follow daily averages.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: searched in standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the latest reading, trend and daily statistics
    Dashboard,

    /// Add a reading (without a value, shows the form)
    Add {
        /// Value in mg/dL
        #[arg(allow_negative_numbers = true)]
        value: Option<f64>,
        /// Meal context (fasting, before_meal, after_meal, bedtime, other)
        #[arg(short, long, default_value = "fasting", value_parser = parse_meal_context)]
        meal: MealContext,
        /// Optional note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List readings, newest first
    History {
        /// Show at most this many readings
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete a reading by id (a unique prefix is enough)
    Delete {
        /// Reading id or prefix, as shown in the history
        id: String,
    },

    /// Daily statistics
    Stats {
        /// Only the most recent N days
        #[arg(short, long)]
        days: Option<usize>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_meal_context(s: &str) -> Result<MealContext, String> {
    s.parse().map_err(|e: glucose_log::storage::UnknownMealContext| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, source) = match &cli.config {
        Some(path) => (
            Config::load_with_env(path)?,
            ConfigSource {
                loaded: Some(path.clone()),
                ..Default::default()
            },
        ),
        None => Config::load_default(),
    };

    init_logging(&config.logging)?;
    source.log();

    let command = match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Config { output } => return write_default_config(output),
        other => other,
    };

    let data_path = config.storage.data_path();
    let backend = FileStore::open(&data_path)
        .with_context(|| format!("cannot open data directory {:?}", data_path))?;
    let mut store = ReadingStore::open_with_key(backend, config.storage.key.clone());

    if let Some(error) = store.load_error() {
        let file = data_path.join(format!("{}.json", store.key()));
        tracing::warn!(file = %file.display(), error, "Stored readings could not be read");
        eprintln!(
            "Warning: {} could not be read ({}); it will be replaced on the next change",
            file.display(),
            error
        );
    }

    // Registered before seeding so every write, the seed included, is covered
    store.subscribe(|event: &StoreEvent, _: &[Reading]| {
        if let Some(warning) = views::durability_warning(event) {
            eprintln!("{}", warning);
        }
    });

    if config.storage.seed_on_first_run {
        store.seed_if_empty();
    }

    // Re-render the navigation target after each mutation, like the app's views do
    if cli.format == OutputFormat::Table {
        let display = config.display.clone();
        store.subscribe(move |event: &StoreEvent, readings: &[Reading]| {
            if let (ChangeKind::Added(_), Some(reading)) = (&event.kind, readings.first()) {
                print!("{}", add::render_saved(reading, &display.thresholds(), &Local));
            }
            println!();
            print!("{}", views::render(View::after(&event.kind), readings, &display));
        });
    }

    let display = &config.display;

    match command {
        Commands::Dashboard => match cli.format {
            OutputFormat::Table => print!("{}", dashboard::render(store.list(), display, &Local)),
            OutputFormat::Json => {
                let readings = store.list();
                let body = serde_json::json!({
                    "latest": readings.first(),
                    "summary": summarize(readings),
                    "daily": aggregate_by_day_in(readings, &Local),
                    "range": display.thresholds().breakdown(readings),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
        },

        Commands::Add { value: None, .. } => print!("{}", add::render_form()),

        Commands::Add {
            value: Some(value),
            meal,
            note,
        } => {
            let reading = store
                .add(value, meal, note)
                .context("reading not saved")?
                .first()
                .cloned()
                .context("store is empty after add")?;

            // Table output comes from the store listener
            if cli.format == OutputFormat::Json {
                let body = add::saved_json(&reading, store.persist_status());
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
        }

        Commands::History { limit } => match cli.format {
            OutputFormat::Table => {
                print!("{}", history::render(store.list(), display, &Local, limit))
            }
            OutputFormat::Json => {
                let readings = store.list();
                let shown = &readings[..limit.unwrap_or(readings.len()).min(readings.len())];
                println!("{}", serde_json::to_string_pretty(shown)?);
            }
        },

        Commands::Delete { id } => {
            let id = history::resolve_id(store.list(), &id)?;
            store.delete(&id);

            if cli.format == OutputFormat::Json {
                println!("{}", history::deleted_json(&id, store.persist_status()));
            }
        }

        Commands::Stats { days } => {
            let stats = aggregate_by_day_in(store.list(), &Local);
            let start = days.map_or(0, |n| stats.len().saturating_sub(n));
            let stats = &stats[start..];

            match cli.format {
                OutputFormat::Table => print!("{}", dashboard::render_daily_table(stats)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(stats)?),
            }
        }

        Commands::Config { .. } => unreachable!("handled before opening the store"),
    }

    Ok(())
}

fn write_default_config(output: Option<PathBuf>) -> anyhow::Result<()> {
    let content = generate_default_config();
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &content)?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Initialize tracing from the logging config. RUST_LOG takes precedence.
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("glucose_log={}", config.level)),
    );

    let writer = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(config.file.is_none());

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format.as_str() {
        "json" => fmt_layer.json().boxed(),
        _ => fmt_layer.boxed(),
    };

    tracing_subscriber::registry().with(layer).with(filter).init();
    Ok(())
}
