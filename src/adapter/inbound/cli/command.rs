//! Command-line interface definitions.
//!
//! `grabapis serve` runs the backend proxy. Every other command is a
//! dashboard session: it reads through the query cache, by default via the
//! proxy, and persists favorites locally.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Browse free public APIs from the terminal, or serve the backend proxy
#[derive(Parser, Debug)]
#[command(name = "grabapis")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Call the upstream APIs directly instead of going through the proxy
    #[arg(long, global = true)]
    pub direct: bool,

    /// Backend proxy URL (overrides GRABAPIS_BACKEND_URL)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the backend proxy
    Serve(ServeArgs),

    /// NASA Astronomy Picture of the Day
    Apod(ApodArgs),

    /// List Rick and Morty characters
    Characters(CharacterArgs),

    /// Look up characters by id (e.g. `1` or `1,2,3`)
    Character {
        /// One id or a comma-separated list
        ids: String,
    },

    /// List Rick and Morty locations
    Locations(LocationArgs),

    /// List Rick and Morty episodes
    Episodes(EpisodeArgs),

    /// Browse GIPHY
    #[command(subcommand)]
    Gifs(GifCommand),

    /// Manage saved favorites and dashboard preferences
    #[command(subcommand)]
    Favorites(FavoritesCommand),

    /// Browse the catalog of integrated APIs
    Catalog(CatalogArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Interface to bind (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty-printed logs
    #[arg(long)]
    pub json_logs: bool,
}

#[derive(Args, Debug, Default)]
pub struct ApodArgs {
    /// A single date (YYYY-MM-DD); today if nothing else is given
    #[arg(long)]
    pub date: Option<String>,

    /// Range start (YYYY-MM-DD), requires --end
    #[arg(long)]
    pub start: Option<String>,

    /// Range end (YYYY-MM-DD), requires --start
    #[arg(long)]
    pub end: Option<String>,

    /// Random pictures (1-100)
    #[arg(long)]
    pub count: Option<String>,

    /// Skip video thumbnails
    #[arg(long)]
    pub no_thumbs: bool,

    /// Also warm the cache for the previous and next day
    #[arg(long)]
    pub prefetch: bool,
}

#[derive(Args, Debug, Default)]
pub struct CharacterArgs {
    #[arg(long)]
    pub name: Option<String>,

    /// alive, dead or unknown
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub species: Option<String>,

    #[arg(long = "type")]
    pub kind: Option<String>,

    /// female, male, genderless or unknown
    #[arg(long)]
    pub gender: Option<String>,

    /// Single page to show
    #[arg(long, conflicts_with = "pages")]
    pub page: Option<u32>,

    /// Load this many pages, following the next links
    #[arg(long)]
    pub pages: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct LocationArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long = "type")]
    pub kind: Option<String>,

    #[arg(long)]
    pub dimension: Option<String>,

    #[arg(long)]
    pub page: Option<u32>,
}

#[derive(Args, Debug, Default)]
pub struct EpisodeArgs {
    #[arg(long)]
    pub name: Option<String>,

    /// Episode code, e.g. S01E01
    #[arg(long)]
    pub episode: Option<String>,

    #[arg(long)]
    pub page: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum GifCommand {
    /// Trending GIFs
    Trending(GifListArgs),
    /// Search GIFs
    Search {
        /// Search terms
        query: String,

        /// Language code (e.g. en)
        #[arg(long)]
        lang: Option<String>,

        #[command(flatten)]
        list: GifListArgs,
    },
    /// One random GIF
    Random {
        /// Restrict to a tag
        #[arg(long)]
        tag: Option<String>,

        /// g, pg, pg-13 or r
        #[arg(long)]
        rating: Option<String>,
    },
    /// Show one GIF by id
    Show { id: String },
}

#[derive(Args, Debug, Default)]
pub struct GifListArgs {
    /// Results per page (1-50)
    #[arg(long)]
    pub limit: Option<u32>,

    /// g, pg, pg-13 or r
    #[arg(long)]
    pub rating: Option<String>,

    /// Pages to load
    #[arg(long, default_value = "1")]
    pub pages: usize,
}

#[derive(Subcommand, Debug)]
pub enum FavoritesCommand {
    /// Show favorites and preferences
    List,
    /// Add or remove an APOD date
    ToggleDate { date: String },
    /// Add or remove a character id
    ToggleCharacter { id: u32 },
    /// Add or remove a GIF id
    ToggleGif { id: String },
    /// Set the active dashboard tab (apod, characters, gifs)
    Tab { tab: String },
    /// Set the view mode (grid, list)
    View { view: String },
}

#[derive(Args, Debug, Default)]
pub struct CatalogArgs {
    /// Show one API by id
    pub id: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub per_page: Option<u32>,

    /// List the categories instead
    #[arg(long, conflicts_with_all = ["id", "category", "search"])]
    pub categories: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write an annotated configuration template
    Init {
        /// Output path (defaults to the per-user config file)
        path: Option<PathBuf>,

        /// Overwrite the file if it already exists
        #[arg(long)]
        force: bool,
    },
    /// Display the effective configuration with defaults and environment applied
    Show,
}

#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration
    Config,
}
