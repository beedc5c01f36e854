// src/sensor.rs
use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::error::{FanError, Result};

/// Thermal zone exposed by the kernel for the SoC.
pub const CPU_TEMP_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Reads the CPU temperature from a millidegree text file.
#[derive(Debug, Clone)]
pub struct TemperatureSensor {
    path: PathBuf,
}

impl TemperatureSensor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TemperatureSensor { path: path.into() }
    }

    pub fn cpu() -> Self {
        Self::new(CPU_TEMP_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the source and returns the temperature in °C.
    ///
    /// Blank lines are skipped and the last reading wins. Any other line that does not
    /// parse fails the whole read.
    pub fn read(&self) -> Result<f64> {
        let contents = fs::read_to_string(&self.path).map_err(|source| FanError::SensorRead {
            path: self.path.clone(),
            source,
        })?;

        let mut reading = None;
        for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let temp = parse_millidegrees(line).map_err(|reason| FanError::SensorParse {
                path: self.path.clone(),
                reason,
            })?;
            reading = Some(temp);
        }

        let temp = reading.ok_or_else(|| FanError::SensorParse {
            path: self.path.clone(),
            reason: "source is empty".to_string(),
        })?;
        debug!("T={}'C", temp);
        Ok(temp)
    }
}

/// Turns a raw millidegree value into °C with one decimal.
///
/// The decimal is rebuilt as `whole.(r / 100 % whole)`. For readings of 10 °C and
/// above that is the truncated tenths digit; below that it is not (5900 gives 5.4).
/// Readings under 1 °C have no whole part to take the modulo of and are rejected.
fn parse_millidegrees(line: &str) -> std::result::Result<f64, String> {
    let raw: i64 = line
        .parse()
        .map_err(|e| format!("invalid value '{}': {}", line, e))?;

    let whole = raw / 1000;
    let hundredths = raw / 100;
    if whole == 0 {
        return Err(format!("value '{}' is below one degree", raw));
    }
    let fractional = hundredths % whole;

    format!("{}.{}", whole, fractional)
        .parse::<f64>()
        .map_err(|e| format!("value '{}' does not form a temperature: {}", raw, e))
}
