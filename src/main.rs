// src/main.rs
mod cli;
mod config;
mod duty;
mod error;
mod fan;
mod hardware;
mod lifecycle;
mod logging;
mod sensor;

use std::process;

use clap::Parser;
use log::{error, info};

use crate::{
    cli::CliArgs,
    config::{Config, load_config_file},
    error::Result,
    fan::{Actuator, Fan},
    hardware::GpioFan,
    lifecycle::Shutdown,
    sensor::TemperatureSensor,
};

// --- Main Function ---

fn main() {
    let cli_args = CliArgs::parse();

    if let Err(e) = logging::setup(cli_args.debug) {
        eprintln!("Error: Failed to set up logging: {}", e);
    }

    info!("Starting fan control");
    match run(cli_args) {
        Ok(()) => info!("Stop fan control"),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

/// Resolves the configuration and hands the real sensor and GPIO pin to [`control`].
fn run(cli_args: CliArgs) -> Result<()> {
    // Installed before touching hardware so an early signal still ends in cleanup.
    let shutdown = Shutdown::install()?;

    let file_config = load_config_file(cli_args.config.clone())?;
    let config = Config::resolve(file_config, &cli_args)?;
    info!(
        "Config: GPIO {}, {:?} mode, threshold {:.1}'C, interval {}s",
        config.gpio_port, config.mode, config.threshold, config.interval
    );

    control(&config, &shutdown, TemperatureSensor::cpu(), GpioFan::claim)
}

/// Takes the fan pin and controls it until a stop is requested. The fan is switched
/// off and released before this returns, whatever the outcome.
fn control<A, F>(config: &Config, shutdown: &Shutdown, sensor: TemperatureSensor, claim: F) -> Result<()>
where
    A: Actuator,
    F: FnOnce(u8) -> Result<A>,
{
    let mut fan = Fan::new(config, sensor, claim)?;
    let result = fan.run(shutdown);
    if shutdown.is_requested() {
        info!("Termination requested, shutting down fan");
    }
    fan.cleanup();
    result
}
