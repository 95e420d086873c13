//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the catalog selected by `DATABASE_URL` and print its statistics.
//! - Keep output deterministic for quick local sanity checks.
//!
//! # Invariants
//! - Failures before the logger is installed go to stderr only.

use bookshelf_core::{core_version, init_logging, open_catalog, CatalogConfig};
use log::error;
use std::process::ExitCode;

#[derive(Debug)]
enum CliError {
    /// Config or logger setup failed; no logger is available yet.
    Setup(String),
    /// Catalog access failed after logging started.
    Run(String),
}

fn main() -> ExitCode {
    // A missing .env file is the common case.
    let _ = dotenvy::dotenv();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Setup(message)) => {
            eprintln!("bookshelf: {message}");
            ExitCode::FAILURE
        }
        Err(CliError::Run(message)) => {
            error!("event=cli_run module=cli status=error error={message}");
            eprintln!("bookshelf: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), CliError> {
    let config = CatalogConfig::from_env().map_err(|err| CliError::Setup(err.to_string()))?;
    start_logging(&config)?;
    print_summary(&config).map_err(CliError::Run)
}

fn start_logging(config: &CatalogConfig) -> Result<(), CliError> {
    init_logging(&config.log_level, config.log_dir.as_deref()).map_err(CliError::Setup)
}

fn print_summary(config: &CatalogConfig) -> Result<(), String> {
    let catalog = open_catalog(&config.storage).map_err(|err| err.to_string())?;
    let stats = catalog.get_statistics().map_err(|err| err.to_string())?;

    println!("bookshelf_core version={}", core_version());
    println!("backend={}", config.storage.backend_name());
    println!("total={}", stats.total);
    println!("oldest={}", format_year(stats.oldest));
    println!("newest={}", format_year(stats.newest));
    Ok(())
}

fn format_year(year: Option<i32>) -> String {
    year.map_or_else(|| "-".to_string(), |year| year.to_string())
}

#[cfg(test)]
mod tests {
    use super::{format_year, start_logging, CliError};
    use bookshelf_core::{logging_status, CatalogConfig};
    use std::path::PathBuf;

    #[test]
    fn logging_setup_failure_is_reported_as_setup_error() {
        let config = CatalogConfig {
            log_dir: Some(PathBuf::from("relative/logs")),
            ..CatalogConfig::default()
        };

        let err = start_logging(&config).unwrap_err();
        assert!(matches!(&err, CliError::Setup(message) if message.contains("absolute")));
        assert!(logging_status().is_none());
    }

    #[test]
    fn format_year_uses_dash_for_empty_catalog() {
        assert_eq!(format_year(None), "-");
        assert_eq!(format_year(Some(1949)), "1949");
    }
}
