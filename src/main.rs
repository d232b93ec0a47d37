//! # Paper Harness CLI (`papers`)
//!
//! ## Usage
//!
//! ```bash
//! papers --config ./config/papers.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `papers search "<topic>"` | Search arXiv and store the hits under the topic |
//! | `papers info <id>` | Print the stored metadata of a paper |
//! | `papers extract <path>` | Convert a PDF into a sibling `.txt` file |
//! | `papers topics` | List topic stores and their record counts |
//! | `papers serve mcp` | Start the HTTP/MCP tool server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use paper_harness::arxiv::ArxivClient;
use paper_harness::search::DEFAULT_MAX_RESULTS;
use paper_harness::{config, extract, resolve, search, server, topics};

/// Paper Harness: search arXiv by topic, keep per-topic metadata stores
/// and extract text from PDFs.
#[derive(Parser)]
#[command(
    name = "papers",
    about = "Paper Harness: topic-scoped arXiv metadata stores and PDF text extraction",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/papers.toml`. Built-in defaults are used when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/papers.toml")]
    config: PathBuf,

    /// Corpus root directory. Overrides `[storage].root`.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search arXiv for a topic and store the results.
    ///
    /// Prints the id of every hit, most relevant first.
    Search {
        /// The topic to search for.
        topic: String,

        /// Maximum number of results to retrieve.
        #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: usize,
    },

    /// Print the stored metadata of a paper, searching every topic.
    Info {
        /// Paper id (e.g. `2301.07041v1`).
        id: String,
    },

    /// Extract the text of a PDF into a sibling `.txt` file.
    Extract {
        /// Path to the PDF file.
        path: PathBuf,
    },

    /// List topic stores under the corpus root.
    Topics,

    /// Start the tool server.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },
}

#[derive(Subcommand)]
enum ServeService {
    /// Start the HTTP tool API with the MCP endpoint at `/mcp`.
    ///
    /// Binds to the address configured in `[server].bind`.
    Mcp,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("paper_harness=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Extraction does not touch the corpus or the network.
    if let Commands::Extract { path } = &cli.command {
        return extract::run_extract(path);
    }

    let mut cfg = config::load_config_or_default(&cli.config)?;
    if let Some(root) = cli.root {
        cfg.storage.root = root;
    }
    let store = cfg.paper_store();

    match cli.command {
        Commands::Search { topic, max_results } => {
            let source = ArxivClient::new(&cfg.arxiv)?;
            search::run_search(&store, &source, &topic, max_results).await?;
        }
        Commands::Info { id } => {
            resolve::run_info(&store, &id)?;
        }
        Commands::Topics => {
            topics::run_topics(&store)?;
        }
        Commands::Serve { service } => match service {
            ServeService::Mcp => {
                server::run_server(&cfg).await?;
            }
        },
        Commands::Extract { .. } => {
            // handled before config loading
            unreachable!()
        }
    }

    Ok(())
}
