// src/cli.rs
use std::path::PathBuf;

use clap::Parser;

// --- Command Line Arguments ---
#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about = "Raspberry Pi fan controller driven by CPU temperature.",
    long_about = None,
    after_help = "Config files are TOML (see pifan.toml.example); YAML is not read. \
                  Unknown arguments are rejected rather than ignored."
)]
pub struct CliArgs {
    /// Optional path to a TOML configuration file overriding the defaults.
    #[arg(long, short = 'c', value_name = "FILE_PATH")]
    pub config: Option<PathBuf>,

    /// Log raw temperature readings and other debug output.
    #[arg(long, short = 'd', action = clap::ArgAction::SetTrue)]
    pub debug: bool,

    // --- Control Parameters (override config file) ---
    /// BCM GPIO number the fan is wired to.
    #[arg(long, value_name = "GPIO")]
    pub port: Option<u8>,

    /// On/off mode switching temperature.
    #[arg(long, value_name = "TEMP_C")]
    pub threshold: Option<f64>,

    #[arg(long, short = 'i', value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Use PWM control even when the config file does not ask for it.
    #[arg(long)]
    pub pwm: bool,
}
