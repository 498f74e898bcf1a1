//! writeup - convert .wu files to HTML
//!
//! Reads one source file (or stdin) and writes an HTML page, an HTML
//! fragment, or the list of files the source depends on.

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use writeup::cli::Cli;
use writeup::document_config::{DocumentConfig, CONFIG_FILE_NAME};
use writeup::pipeline::{self, RenderOptions};

/// Path shown in diagnostics when reading from stdin
const STDIN_PATH: &str = "(stdin)";

/// Main entry point for the writeup CLI application
fn main() {
    let cli = Cli::parse();

    // Warnings are always shown; --verbose adds progress and parse tracing
    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    if let Err(e) = run(cli) {
        log::error!("{:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run(cli: Cli) -> Result<()> {
    if cli.src.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
        anyhow::bail!("SRC cannot be an empty path");
    }
    if cli.dst.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
        anyhow::bail!("DST cannot be an empty path");
    }

    let src_path = cli
        .src
        .clone()
        .unwrap_or_else(|| PathBuf::from(STDIN_PATH));
    let text = read_source(cli.src.as_deref())?;

    let lines: Vec<String> = if cli.print_dependencies {
        pipeline::list_dependencies(&src_path, &text)?
            .iter()
            .map(|p| p.display().to_string())
            .collect()
    } else {
        let options = render_options(&cli, &src_path)?;
        pipeline::render_html(&src_path, &text, &options)?
    };

    write_output(cli.dst.as_deref(), &lines)
}

/// Build render options from the config file and CLI overrides
fn render_options(cli: &Cli, src_path: &Path) -> Result<RenderOptions> {
    let config = match &cli.config {
        Some(path) => DocumentConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => {
            let dir = match &cli.src {
                Some(src) => src.parent().unwrap_or(Path::new("")).to_path_buf(),
                None => PathBuf::new(),
            };
            DocumentConfig::load_or_default(dir.join(CONFIG_FILE_NAME))
                .context("Failed to load configuration")?
        }
    };

    let mut page = config
        .page_metadata(&src_path.display().to_string())
        .context("Failed to read page assets")?;
    if let Some(title) = &cli.title {
        page.title = title.clone();
    }

    Ok(RenderOptions {
        fragment: cli.fragment || config.fragment,
        page,
    })
}

fn read_source(src: Option<&Path>) -> Result<String> {
    match src {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn write_output(dst: Option<&Path>, lines: &[String]) -> Result<()> {
    let mut output = String::new();
    for line in lines {
        output.push_str(line);
        output.push('\n');
    }

    match dst {
        Some(path) => {
            // Create parent directories if they don't exist
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create directory {}", parent.display())
                    })?;
                }
            }
            std::fs::write(path, output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            std::io::stdout()
                .write_all(output.as_bytes())
                .context("Failed to write stdout")?;
        }
    }
    Ok(())
}
