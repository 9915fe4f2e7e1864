use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rollog::config::{self, Config};
use rollog::console::{ConsoleColor, ConsoleSink, TerminalSink};
use rollog::logging::{self, RollingLogWriter, WriteOptions, WriteOutcome};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file (default: ~/.rollog/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Append one line to a log file, rolling it over if it is too large
    Write {
        /// Log file path, relative to the working directory or absolute
        path: String,

        /// Text of the entry
        #[arg(default_value = "")]
        text: String,

        /// Also print the line to the console
        #[arg(short, long)]
        echo: bool,

        /// Console color for --echo
        #[arg(short, long)]
        color: Option<ConsoleColor>,
    },

    /// List the console color names accepted by --color
    Colors,

    /// Write a config file with the default settings
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(e) = logging::init_diagnostics(args.verbose) {
        eprintln!("warning: {:#}", e);
    }

    if let Err(e) = run(args) {
        eprintln!("error: {:#}", e);
        if let Some(hint) = e.downcast_ref::<rollog::LogError>().and_then(|e| e.hint()) {
            eprintln!("hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config_path = args.config.unwrap_or_else(config::config_file_path);

    match args.command {
        Command::Write {
            path,
            text,
            echo,
            color,
        } => {
            let config = Config::load_from(&config_path)?;
            let options = WriteOptions {
                echo,
                color: color.unwrap_or(config.default_color),
            };
            let writer = RollingLogWriter::new(config.writer_settings());
            let report = writer.write_line(&path, &text, &options)?;
            if let WriteOutcome::RolledOver(record) = &report.outcome {
                tracing::info!("Previous log archived as {}", record.archive_path.display());
            }
            Ok(())
        }
        Command::Colors => {
            for color in ConsoleColor::ALL {
                TerminalSink
                    .echo(color.as_str(), color)
                    .context("Failed to write to console")?;
            }
            Ok(())
        }
        Command::InitConfig { force } => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "Config file {} already exists (use --force to overwrite)",
                    config_path.display()
                );
            }
            Config::default().save_to(&config_path)?;
            println!("Wrote {}", config_path.display());
            Ok(())
        }
    }
}
