//! QGraph CLI entry point

use clap::{Parser, Subcommand};
use qgraph_collection::{DEFAULT_CONFIG_FILE, Settings};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "qgraph")]
#[command(about = "Grow, summarize and plot collections of walker-grown graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (defaults to $QGRAPH_CONFIG, then ./qgraph.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow one graph per spec record and save them to a collection file
    Generate {
        /// JSON or YAML array of {walkers, exploration, nodes} records
        #[arg(short, long)]
        specs: PathBuf,

        /// Collection file to write (.qgl)
        #[arg(short, long)]
        out: PathBuf,

        /// Add to the graphs already stored in the output file
        #[arg(short, long)]
        append: bool,

        /// Worker threads (overrides the settings file)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Base seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List the growth parameters of every graph
    List {
        file: PathBuf,
    },
    /// Print the summary table, computing any missing properties
    Summary {
        file: PathBuf,

        /// Print rows as JSON instead of a text table
        #[arg(long)]
        json: bool,
    },
    /// Keep or drop graphs by property value
    Filter {
        file: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        /// Keep graphs matching PROPERTY=V1,V2 (repeatable)
        #[arg(long, value_name = "PROPERTY=VALUES")]
        select: Vec<String>,

        /// Drop graphs matching PROPERTY=V1,V2 (repeatable)
        #[arg(long, value_name = "PROPERTY=VALUES")]
        exclude: Vec<String>,
    },
    /// Concatenate two collections
    Merge {
        first: PathBuf,
        second: PathBuf,

        #[arg(short, long)]
        out: PathBuf,
    },
    /// Line chart of one summary column against another
    Plot {
        file: PathBuf,

        #[arg(short, long)]
        x: String,

        #[arg(short, long)]
        y: String,

        /// Column splitting lines by colour
        #[arg(long)]
        hue: Option<String>,

        /// Column splitting lines by dash pattern
        #[arg(long)]
        style: Option<String>,

        /// Output file (.html or .json)
        #[arg(short, long)]
        out: PathBuf,

        /// Open the chart once written
        #[arg(long)]
        open: bool,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "qgraph={0},qgraph_collection={0},qgraph_core={0}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli
        .config
        .or_else(|| std::env::var_os("QGRAPH_CONFIG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let settings = Settings::load(&config_path)?;

    match cli.command {
        Commands::Generate {
            specs,
            out,
            append,
            threads,
            seed,
        } => {
            let mut settings = settings;
            if threads.is_some() {
                settings.generation.threads = threads;
            }
            if seed.is_some() {
                settings.generation.seed = seed;
            }
            commands::generate(settings, specs, out, append).await
        }
        Commands::List { file } => commands::list(&file),
        Commands::Summary { file, json } => commands::summary(&file, json),
        Commands::Filter {
            file,
            out,
            select,
            exclude,
        } => commands::filter(&file, &out, &select, &exclude),
        Commands::Merge { first, second, out } => commands::merge(&first, &second, &out),
        Commands::Plot {
            file,
            x,
            y,
            hue,
            style,
            out,
            open,
        } => commands::plot(&settings, &file, x, y, hue, style, &out, open),
        Commands::Version => {
            println!("qgraph v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
