// src/main.rs
use clap::Parser;
use junk_journal::cli;
use junk_journal::error::AppError;

fn main() -> Result<(), AppError> {
    env_logger::init();
    log::info!("Starting junk-journal");

    let cli_args = cli::Cli::parse();

    if let Err(e) = cli::handle_cli_command(cli_args) {
        log::error!("Command failed: {:#?}", e);
        eprintln!("Error: {}", e);
        return Err(e);
    }

    log::info!("junk-journal finished successfully.");
    Ok(())
}
