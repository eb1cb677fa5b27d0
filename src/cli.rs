use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catalogue-index")]
#[command(about = "Index a directory and rank its files against queries read from stdin", long_about = None)]
pub struct Cli {
    /// Directory to index; a leading `~` is expanded
    #[arg(default_value = ".")]
    pub root: PathBuf,
    /// Settings file (TOML) with `[match]` and `[index]` tables
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Fall back to subsequence matching when no prefix rule applies
    #[arg(short, long)]
    pub fuzzy: bool,
    /// Compare case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,
    /// Maximum directory depth to walk
    #[arg(short = 'd', long)]
    pub max_depth: Option<usize>,
    /// Include hidden files
    #[arg(long)]
    pub hidden: bool,
}
