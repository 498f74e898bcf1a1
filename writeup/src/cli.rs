//! Command-line interface definitions for writeup

use clap::Parser;
use std::path::PathBuf;

/// CLI structure for the writeup converter
#[derive(Parser, Debug)]
#[command(name = "writeup")]
#[command(version)]
#[command(about = "Convert .wu files to HTML", long_about = None)]
pub struct Cli {
    /// Input .wu source path (defaults to stdin)
    #[arg(value_name = "SRC")]
    pub src: Option<PathBuf>,

    /// Output path (defaults to stdout)
    #[arg(value_name = "DST")]
    pub dst: Option<PathBuf>,

    /// Print the files the source references instead of converting it
    #[arg(long)]
    pub print_dependencies: bool,

    /// Emit the document body only, without the page wrapper
    #[arg(long)]
    pub fragment: bool,

    /// Configuration file (defaults to writeup.toml next to the source)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Page title (defaults to the configured title, then the source path)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
