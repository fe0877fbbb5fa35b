//! CLI for the mdl downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mdl_core::config;
use std::path::PathBuf;

use commands::{run_get, run_hf, run_llama, run_model, run_models};

/// Top-level CLI for the mdl downloader.
#[derive(Debug, Parser)]
#[command(name = "mdl")]
#[command(about = "mdl: concurrent downloader for models and files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download one or more URLs in parallel.
    Get {
        /// Direct HTTP/HTTPS URLs to download.
        urls: Vec<String>,
        /// Read additional URLs from a file (one per line, `#` for comments).
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
        /// Directory to download into (default: download_root from config).
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// Parallel downloads, up to 100.
        #[arg(short, long, default_value = "4", value_name = "N")]
        concurrency: usize,
    },

    /// Download the files of a Hugging Face repository.
    Hf {
        /// Repository id, e.g. `Qwen/Qwen3-8B-GGUF`.
        repo: String,
        /// Interactively pick GGUF files/shard series instead of everything.
        #[arg(long)]
        gguf: bool,
        /// Directory to download into (default: download_root from config).
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// Parallel downloads, up to 4 for repository downloads.
        #[arg(short, long, default_value = "4", value_name = "N")]
        concurrency: usize,
    },

    /// Download a model by its catalog alias (see `mdl models`).
    Model {
        /// Alias, e.g. `qwen3-8b`.
        alias: String,
        /// Directory to download into (default: download_root from config).
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Download the latest llama.cpp release build for this machine.
    Llama {
        /// Build flavor: cpu, cuda or vulkan.
        #[arg(long, default_value = "cpu")]
        variant: String,
        /// Directory to download into (default: download_root from config).
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// List the built-in model alias catalog.
    Models,
}

impl CliCommand {
    /// Parses the CLI and runs the selected command. Returns the process
    /// exit code (0 success, 1 operational failure).
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                urls,
                file,
                output,
                concurrency,
            } => run_get(&cfg, urls, file.as_deref(), output, concurrency).await,
            CliCommand::Hf {
                repo,
                gguf,
                output,
                concurrency,
            } => run_hf(&cfg, &repo, gguf, output, concurrency).await,
            CliCommand::Model { alias, output } => run_model(&cfg, &alias, output).await,
            CliCommand::Llama { variant, output } => run_llama(&cfg, &variant, output).await,
            CliCommand::Models => run_models(),
        }
    }
}

#[cfg(test)]
mod tests;
