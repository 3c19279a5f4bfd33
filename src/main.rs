use clap::Parser;
use log::{info, warn};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::{self, File};
use std::process::ExitCode;

use salam::api::auth::CredentialStore;
use salam::cli::{self, Command};
use salam::core::config::{ResolvedConfig, load_config, resolve};

#[derive(Parser)]
#[command(name = "salam", about = "Terminal client for the Islamic AI Assistant")]
struct Args {
    /// Backend origin (overrides SALAM_API_URL and the config file)
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// File logger: the terminal belongs to the TUI.
fn init_logging(config: &ResolvedConfig) {
    let Some(path) = &config.log_file else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(path) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring config file: {e}");
            Default::default()
        }
    };
    let config = resolve(&file_config, args.base_url.as_deref());
    init_logging(&config);
    info!("Salam starting up against {}", config.base_url);
    for warning in &config.warnings {
        warn!("{}", warning);
        eprintln!("Config: {warning}");
    }

    let store = match CredentialStore::default_location() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Cannot locate the credentials file: {e}");
            return ExitCode::FAILURE;
        }
    };

    let command = args.command.unwrap_or(Command::Chat);
    match cli::execute(command, &config, &store).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            warn!("Command failed: {}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
