//! # Refrain CLI (`refrain`)
//!
//! Command-line interface for the song search relevance service.
//!
//! ## Usage
//!
//! ```bash
//! refrain --config ./config/refrain.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `refrain init` | Create the song index with the bilingual mapping |
//! | `refrain load <file>` | Bulk-load an NDJSON song dataset |
//! | `refrain search "<query>"` | Run a one-shot search from the CLI |
//! | `refrain serve` | Start the HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! # Provision the index (idempotent)
//! refrain init --config ./config/refrain.toml
//!
//! # Load the scraped song corpus
//! refrain load songdb.ndjson --config ./config/refrain.toml
//!
//! # Title/artist lookup
//! refrain search "Taylor Swift"
//!
//! # Lyric-phrase lookup
//! refrain search "i wanna be with you"
//!
//! # Explicit artist search
//! refrain search "Queen" --artist
//!
//! # Serve the HTTP API for the front-end
//! refrain serve --config ./config/refrain.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use refrain::backend::ElasticBackend;
use refrain::{config, load, search, server};

/// Refrain — song search with query-intent classification and hybrid
/// popularity scoring over Elasticsearch.
#[derive(Parser)]
#[command(
    name = "refrain",
    about = "Song search relevance service over Elasticsearch",
    version,
    long_about = "Refrain classifies free-text queries as title/artist lookups or lyric \
    phrases, picks a matching relevance configuration, and combines text relevance with \
    a view-count popularity signal into one ranked result list."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/refrain.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Create the song index.
    ///
    /// Provisions the index mapping (standard-analyzed text fields with
    /// Thai `.th` sub-fields, integer views/year). Idempotent — running
    /// it against an existing index is a no-op.
    Init,

    /// Bulk-load an NDJSON song dataset into the index.
    ///
    /// Each line is one song document. The `year` field is normalized
    /// and scraper junk columns are dropped before upload.
    Load {
        /// Path to the NDJSON dataset file.
        file: PathBuf,

        /// Maximum number of documents to load.
        #[arg(long)]
        limit: Option<usize>,

        /// Parse and count documents without uploading.
        #[arg(long)]
        dry_run: bool,
    },

    /// Search for songs.
    ///
    /// Classifies the query, runs it through the hybrid scoring policy,
    /// and prints ranked results.
    Search {
        /// The search query string.
        query: String,

        /// Weight the artist field heavily (explicit artist lookup).
        #[arg(long)]
        artist: bool,
    },

    /// Start the HTTP API server.
    ///
    /// Exposes `GET /search` and `GET /health` on the configured bind
    /// address, with permissive CORS for browser front-ends.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            load::run_init(&cfg).await?;
        }
        Commands::Load {
            file,
            limit,
            dry_run,
        } => {
            load::run_load(&cfg, &file, limit, dry_run).await?;
        }
        Commands::Search { query, artist } => {
            let backend = Arc::new(ElasticBackend::new(&cfg.backend)?);
            let searcher = search::SongSearcher::new(
                backend,
                cfg.backend.index.clone(),
                cfg.search.clone(),
            );
            search::run_search(&searcher, &query, artist).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
