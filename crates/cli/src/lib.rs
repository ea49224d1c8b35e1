pub mod commands;
pub mod logging;
pub mod screen;

use bookworm_core::config::{ConfigOverrides, LoadOptions};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::commands::OutputStream;

#[derive(Debug, Parser)]
#[command(
    name = "bookworm",
    about = "Bestseller storefront in the terminal",
    long_about = "Browse the current bestseller list, fill a cart and toggle the flat discount.",
    after_help = "Examples:\n  bookworm shop\n  bookworm --list paperback-nonfiction catalog --json\n  bookworm --config ./bookworm.toml doctor --json"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Default, Args)]
pub struct GlobalArgs {
    #[arg(long, global = true, help = "Config file to load; it must exist when given")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Bestseller list slug, e.g. `hardcover-fiction`")]
    pub list: Option<String>,
    #[arg(long, global = true, help = "Log level: trace|debug|info|warn|error")]
    pub log_level: Option<String>,
}

impl GlobalArgs {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                feed_list_name: self.list.clone(),
                log_level: self.log_level.clone(),
            },
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Open the interactive storefront on this terminal")]
    Shop {
        #[arg(long, help = "Read the bestseller list from a local JSON file instead of the API")]
        feed_file: Option<PathBuf>,
    },
    #[command(about = "Fetch the bestseller list once and print the priced catalog")]
    Catalog {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
        #[arg(long, help = "Read the bestseller list from a local JSON file instead of the API")]
        feed_file: Option<PathBuf>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, api key presence and feed reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
        #[arg(long, help = "Check a local JSON feed file instead of the API")]
        feed_file: Option<PathBuf>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.global.load_options();
    logging::init_from_config(&options);

    let result = match cli.command {
        Command::Shop { feed_file } => commands::shop::run(&options, feed_file.as_deref()),
        Command::Catalog { json, feed_file } => {
            commands::catalog::run(&options, json, feed_file.as_deref())
        }
        Command::Config => commands::config::run(&options),
        Command::Doctor { json, feed_file } => {
            commands::doctor::run(&options, json, feed_file.as_deref())
        }
    };

    match result.stream {
        OutputStream::Stdout => println!("{}", result.output),
        OutputStream::Stderr => eprintln!("{}", result.output),
    }
    ExitCode::from(result.exit_code)
}
