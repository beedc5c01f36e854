// src/config.rs
use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::{
    cli::CliArgs,
    error::{FanError, Result},
};

pub const DEFAULT_PORT: u8 = 12;
pub const DEFAULT_THRESHOLD: f64 = 70.0;
pub const DEFAULT_INTERVAL: u64 = 30;
pub const DEFAULT_PWM_FREQ: f64 = 50.0;
pub const DEFAULT_DUTY_MIN: f64 = 70.0;
pub const DEFAULT_TEMP_MIN: f64 = 65.0;
pub const DEFAULT_TEMP_MAX: f64 = 85.0;

const LOCAL_CONFIG_FILE: &str = "./pifan.toml";

// --- Resolved Configuration ---

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[serde(alias = "on-off", alias = "onoff")]
    OnOff,
    Pwm,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmSettings {
    pub freq: f64,
    pub duty_min: f64,
    pub temp_min: f64,
    pub temp_max: f64,
}

impl Default for PwmSettings {
    fn default() -> Self {
        PwmSettings {
            freq: DEFAULT_PWM_FREQ,
            duty_min: DEFAULT_DUTY_MIN,
            temp_min: DEFAULT_TEMP_MIN,
            temp_max: DEFAULT_TEMP_MAX,
        }
    }
}

/// Settings for one controller run. Built once at startup and never changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub gpio_port: u8,
    pub threshold: f64,
    pub mode: Mode,
    /// `None` when a config file gave an incomplete `pwm` table.
    pub pwm: Option<PwmSettings>,
    /// Seconds between samples.
    pub interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gpio_port: DEFAULT_PORT,
            threshold: DEFAULT_THRESHOLD,
            mode: Mode::OnOff,
            pwm: Some(PwmSettings::default()),
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl Config {
    /// Merges CLI overrides, the config file and the defaults (in that order of precedence).
    pub fn resolve(file: FileConfig, cli: &CliArgs) -> Result<Config> {
        let pwm_given = file.pwm.is_some();
        let pwm = match file.pwm {
            Some(table) => table.into_settings(),
            None => Some(PwmSettings::default()),
        };

        // A pwm table implies PWM mode unless the file says otherwise.
        let mode = if cli.pwm {
            Mode::Pwm
        } else {
            file.mode.unwrap_or(if pwm_given { Mode::Pwm } else { Mode::OnOff })
        };

        let config = Config {
            gpio_port: cli.port.or(file.gpio_port).unwrap_or(DEFAULT_PORT),
            threshold: cli.threshold.or(file.threshold).unwrap_or(DEFAULT_THRESHOLD),
            mode,
            pwm,
            interval: cli.interval.or(file.interval).unwrap_or(DEFAULT_INTERVAL),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the controller relies on.
    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(FanError::Config("Interval must be greater than 0 seconds".to_string()));
        }
        if self.interval > 3600 {
            warn!("Interval of {} seconds is very long (> 1 hour)", self.interval);
        }
        check_temperature("threshold", self.threshold)?;

        if self.mode == Mode::Pwm {
            let pwm = self.pwm.as_ref().ok_or_else(|| {
                FanError::Config("PWM mode requires both pwm.temp_min and pwm.temp_max".to_string())
            })?;
            validate_pwm(pwm)?;
        }
        Ok(())
    }
}

/// NaN and infinities fall outside the range too.
fn check_temperature(name: &str, temp: f64) -> Result<()> {
    if !(-50.0..=150.0).contains(&temp) {
        return Err(FanError::Config(format!(
            "{} ({:.1}°C) is outside reasonable range (-50 to 150°C)",
            name, temp
        )));
    }
    Ok(())
}

fn validate_pwm(pwm: &PwmSettings) -> Result<()> {
    if pwm.temp_min >= pwm.temp_max {
        return Err(FanError::Config(format!(
            "Invalid temperature range: temp_min ({:.1}°C) must be less than temp_max ({:.1}°C)",
            pwm.temp_min, pwm.temp_max
        )));
    }
    check_temperature("temp_min", pwm.temp_min)?;
    check_temperature("temp_max", pwm.temp_max)?;
    if !(0.0..=100.0).contains(&pwm.duty_min) {
        return Err(FanError::Config(format!(
            "duty_min ({}) must be between 0 and 100 percent",
            pwm.duty_min
        )));
    }
    if pwm.freq.is_nan() || pwm.freq <= 0.0 {
        return Err(FanError::Config(format!("PWM frequency ({} Hz) must be positive", pwm.freq)));
    }
    Ok(())
}

// --- Config File Structs ---

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(rename = "gpioPort", alias = "port")]
    gpio_port: Option<u8>,
    threshold: Option<f64>,
    mode: Option<Mode>,
    pwm: Option<PwmTable>,
    interval: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PwmTable {
    freq: Option<f64>,
    duty_min: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
}

impl PwmTable {
    /// The bounds have no sensible default once the user starts a table; frequency
    /// and floor duty do.
    fn into_settings(self) -> Option<PwmSettings> {
        Some(PwmSettings {
            freq: self.freq.unwrap_or(DEFAULT_PWM_FREQ),
            duty_min: self.duty_min.unwrap_or(DEFAULT_DUTY_MIN),
            temp_min: self.temp_min?,
            temp_max: self.temp_max?,
        })
    }
}

impl FileConfig {
    pub fn parse(contents: &str) -> std::result::Result<FileConfig, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn read(path: &Path) -> Result<FileConfig> {
        let contents = fs::read_to_string(path).map_err(|e| {
            FanError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let cfg = Self::parse(&contents).map_err(|e| {
            FanError::Config(format!("Failed to parse config file '{}': {}", path.display(), e))
        })?;
        debug!("{:?}", cfg);
        Ok(cfg)
    }
}

// --- Initialization Helper Functions ---

/// Finds and loads the configuration file.
///
/// Without an explicit path the user config dir and then the current directory
/// are tried. Finding nothing is fine; a file that is there but broken is not.
pub fn load_config_file(config_path: Option<PathBuf>) -> Result<FileConfig> {
    let path = config_path.or_else(find_default_config);

    match path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            FileConfig::read(&path)
        }
        None => {
            info!("No config file specified or found in default locations, using defaults.");
            Ok(FileConfig::default())
        }
    }
}

fn find_default_config() -> Option<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "pifan") {
        let user_config_path = proj_dirs.config_dir().join("config.toml");
        if user_config_path.exists() {
            return Some(user_config_path);
        }
    }

    let current_dir_path = PathBuf::from(LOCAL_CONFIG_FILE);
    current_dir_path.exists().then_some(current_dir_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn resolve(toml: &str) -> Result<Config> {
        Config::resolve(FileConfig::parse(toml).unwrap(), &CliArgs::default())
    }

    #[test]
    fn test_defaults() {
        let config = resolve("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.gpio_port, 12);
        assert_eq!(config.threshold, 70.0);
        assert_eq!(config.mode, Mode::OnOff);
        assert_eq!(config.interval, 30);
        assert_eq!(
            config.pwm,
            Some(PwmSettings { freq: 50.0, duty_min: 70.0, temp_min: 65.0, temp_max: 85.0 })
        );
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = resolve("gpioPort = 18\nthreshold = 60\ninterval = 10\n").unwrap();
        assert_eq!(config.gpio_port, 18);
        assert_eq!(config.threshold, 60.0);
        assert_eq!(config.interval, 10);
        assert_eq!(config.mode, Mode::OnOff);
    }

    #[test]
    fn test_port_alias() {
        assert_eq!(resolve("port = 23").unwrap().gpio_port, 23);
    }

    #[test]
    fn test_pwm_table_implies_pwm_mode() {
        let config = resolve("[pwm]\ntemp_min = 50.0\ntemp_max = 75.0\n").unwrap();
        assert_eq!(config.mode, Mode::Pwm);
        assert_eq!(
            config.pwm,
            Some(PwmSettings { freq: 50.0, duty_min: 70.0, temp_min: 50.0, temp_max: 75.0 })
        );
    }

    #[test]
    fn test_explicit_mode_wins_over_pwm_table() {
        let config = resolve("mode = \"on_off\"\n[pwm]\ntemp_min = 50.0\ntemp_max = 75.0\n").unwrap();
        assert_eq!(config.mode, Mode::OnOff);
    }

    #[test]
    fn test_pwm_mode_without_table_uses_default_bounds() {
        let config = resolve("mode = \"pwm\"").unwrap();
        assert_eq!(config.mode, Mode::Pwm);
        assert_eq!(config.pwm, Some(PwmSettings::default()));
    }

    #[test]
    fn test_incomplete_pwm_bounds_rejected() {
        let err = resolve("[pwm]\nfreq = 100.0\ntemp_max = 80.0\n").unwrap_err();
        assert!(matches!(err, FanError::Config(_)));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = resolve("[pwm]\ntemp_min = 85.0\ntemp_max = 65.0\n").unwrap_err();
        assert!(err.to_string().contains("temp_min"));
        assert!(resolve("[pwm]\ntemp_min = 70.0\ntemp_max = 70.0\n").is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(resolve("interval = 0").is_err());
        assert!(resolve("[pwm]\nduty_min = 120.0\ntemp_min = 60.0\ntemp_max = 80.0\n").is_err());
        assert!(resolve("[pwm]\nfreq = 0.0\ntemp_min = 60.0\ntemp_max = 80.0\n").is_err());
        assert!(resolve("[pwm]\ntemp_min = 60.0\ntemp_max = 400.0\n").is_err());
        assert!(resolve("[pwm]\ntemp_min = nan\ntemp_max = 80.0\n").is_err());
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        for value in ["nan", "inf", "-inf", "200.0", "-60.0"] {
            let err = resolve(&format!("threshold = {}", value)).unwrap_err();
            assert!(err.to_string().contains("threshold"), "accepted threshold {}", value);
        }

        let cli = CliArgs { threshold: Some(f64::NAN), ..Default::default() };
        assert!(Config::resolve(FileConfig::default(), &cli).is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(FileConfig::parse("treshold = 70.0").is_err());
        assert!(FileConfig::parse("mode = \"pid\"").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig::parse("gpioPort = 18\ninterval = 10\n").unwrap();
        let cli = CliArgs {
            port: Some(4),
            interval: Some(2),
            pwm: true,
            ..Default::default()
        };
        let config = Config::resolve(file, &cli).unwrap();
        assert_eq!(config.gpio_port, 4);
        assert_eq!(config.interval, 2);
        assert_eq!(config.mode, Mode::Pwm);
    }

    #[test]
    fn test_load_config_file_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "threshold = 55.5").unwrap();
        let cfg = load_config_file(Some(file.path().to_path_buf())).unwrap();
        let config = Config::resolve(cfg, &CliArgs::default()).unwrap();
        assert_eq!(config.threshold, 55.5);
    }

    #[test]
    fn test_load_config_file_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_file(Some(dir.path().join("nope.toml")));
        assert!(matches!(result, Err(FanError::Config(_))));
    }
}
