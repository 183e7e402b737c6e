use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use console::style;
use hott_util_core::callback::Callback;
use hott_util_core::stream::CallbackReader;
use hott_util_core::version::{LatestVersions, source_version};
use hott_util_core::config::{DEFAULT_VERSIONS_URL, ENV_DEBUG, ENV_OFFLINE, ENV_VERSIONS_URL};
use hott_util_core::{Settings, dump, logging, program_dir};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod copy;
mod terminal;

use copy::CopyOutcome;
use terminal::TerminalCallback;

#[derive(Parser)]
#[command(name = "hott-util")]
#[command(about = "Diagnostics and helpers for the HoTT transmitter tools", version)]
struct Cli {
    /// Never access the network
    #[arg(long, global = true, env = ENV_OFFLINE, value_parser = BoolishValueParser::new())]
    offline: bool,

    /// Enable debug logging
    #[arg(long, global = true, env = ENV_DEBUG, value_parser = BoolishValueParser::new())]
    debug: bool,

    /// URL of the latest versions document
    #[arg(
        long,
        global = true,
        value_name = "URL",
        env = ENV_VERSIONS_URL,
        default_value = DEFAULT_VERSIONS_URL
    )]
    versions_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a hex dump of a file
    Dump {
        /// File to dump
        #[arg(required = true)]
        file: PathBuf,

        /// Address of the first byte
        #[arg(short, long, default_value_t = 0, value_parser = parse_address)]
        base: usize,

        /// Dump 16-bit big-endian words instead of bytes
        #[arg(short, long)]
        words: bool,
    },
    /// Copy a file with progress, decompressing .gz/.xz/.zst sources
    Copy {
        /// Source file
        #[arg(required = true)]
        source: PathBuf,

        /// Destination file
        #[arg(required = true)]
        destination: PathBuf,

        /// Skip copy verification
        #[arg(short = 'n', long = "no-verify")]
        no_verify: bool,
    },
    /// Look up the latest published version of a tool
    Version {
        /// Tool name as listed in the versions document
        #[arg(required = true)]
        key: String,
    },
    /// Show the program version and install directory
    Info,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            offline: self.offline,
            debug: self.debug,
            versions_url: self.versions_url.clone(),
        }
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal address.
fn parse_address(value: &str) -> Result<usize, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{value}': {e}"))
}

/// Reads `path` through the decorator so large files show progress.
fn read_with_progress(path: &Path, callback: &dyn Callback) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();

    let mut reader = CallbackReader::new(Some(callback), BufReader::new(file), Some(len));
    let mut data = Vec::with_capacity(len as usize);
    reader
        .read_to_end(&mut data)
        .map_err(hott_util_core::Error::from)?;
    callback.update_progress(data.len() as u64, len);
    Ok(data)
}

fn to_words(data: &[u8]) -> Vec<u16> {
    data.chunks(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
        .collect()
}

fn run(cli: Cli, settings: &Settings, callback: &TerminalCallback) -> Result<()> {
    match cli.command {
        Commands::Dump { file, base, words } => {
            let data = read_with_progress(&file, callback)?;
            callback.abandon();

            let dump = if words {
                dump::dump_words(&to_words(&data), base)
            } else {
                dump::dump_bytes(&data, base)
            };
            print!("{dump}");
        }
        Commands::Copy {
            source,
            destination,
            no_verify,
        } => {
            println!("  Source:      {}", style(source.display()).cyan());
            println!("  Destination: {}", style(destination.display()).cyan());
            println!();

            match copy::run(&source, &destination, !no_verify, callback)? {
                CopyOutcome::Skipped => {
                    println!("Copy skipped, '{}' was kept.", destination.display());
                }
                CopyOutcome::Copied { bytes, verified } => {
                    callback.finish(if verified {
                        "Verification successful."
                    } else {
                        "Copy complete (verification skipped)."
                    });
                    println!(
                        "\n✨ Successfully copied {} bytes to {}.",
                        bytes,
                        style(destination.display()).cyan()
                    );
                }
            }
        }
        Commands::Version { key } => {
            let versions = LatestVersions::from_settings(settings)?;
            match versions.get(&key) {
                Some(version) => println!("{key}: {}", style(version).green()),
                None if versions.is_offline() => {
                    println!("{key}: unknown ({})", style("offline").yellow())
                }
                None => println!("{key}: no version published"),
            }
        }
        Commands::Info => {
            println!("Version:           {}", source_version());
            println!("Program directory: {}", program_dir::program_dir()?.display());
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = cli.settings();
    logging::enable_logging(settings.debug);

    // Ctrl+C only raises the flag; the running operation stops before its next byte.
    let callback = Arc::new(TerminalCallback::new());
    let c = callback.clone();
    ctrlc::set_handler(move || {
        c.cancel();
    })?;

    match run(cli, &settings, &callback) {
        Ok(()) => Ok(()),
        Err(e)
            if e.downcast_ref::<hott_util_core::Error>()
                .is_some_and(hott_util_core::Error::is_cancelled) =>
        {
            callback.abandon();
            println!("{}", style("Operation cancelled.").yellow());
            Ok(())
        }
        Err(e) => {
            callback.abandon();
            Err(e)
        }
    }
}
