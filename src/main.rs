#[macro_use]
extern crate clap;

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod scene;
pub mod window;

use std::process;

use crate::config::{Config, ConfigError};
use crate::error::AppResult;
use crate::logging::{init_logging, LoggingConfig};

fn run(config: &Config) -> AppResult<()> {
    if config.headless {
        app::run_headless(config)
    } else {
        window::run(config)
    }
}

fn main() {
    let config = match Config::parse(std::env::args_os()) {
        Ok(config) => config,
        // Help and version requests end up here too; clap prints and exits with the right status
        Err(ConfigError::Cli(e)) => e.exit(),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    init_logging(LoggingConfig {
        env_filter: config.log_filter.clone(),
        ..LoggingConfig::default()
    });
    log::debug!("{:?}", config);

    if let Err(e) = run(&config) {
        e.log();
        process::exit(1);
    }
}
