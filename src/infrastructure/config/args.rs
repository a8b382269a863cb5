use super::app_config::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "petshelf",
    version,
    about = "Browse adoptable shelter pets with locally cached photos",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Pet list endpoint.
    #[arg(long, value_name = "URL", env = "PETSHELF_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Photo store directory.
    #[arg(long, value_name = "PATH", env = "PETSHELF_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print one page of adoptable pets.
    List {
        /// Zero-based page index.
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Load a photo, from the local store when fresh, and write it to a file.
    Photo {
        /// Photo URL.
        url: String,

        /// Output file.
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,
    },
    /// Remove a photo from the local store.
    Forget {
        /// Photo URL.
        url: String,
    },
}
