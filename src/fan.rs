// src/fan.rs
use std::time::Duration;

use log::{debug, error, info};
#[cfg(test)]
use mockall::automock;

use crate::{
    config::{Config, Mode, PwmSettings},
    duty::duty_ratio,
    error::{FanError, Result},
    lifecycle::Shutdown,
    sensor::TemperatureSensor,
};

/// What the controller needs from the pin the fan hangs off.
///
/// Implementations claim the pin as an output when they are created.
/// `start_pwm` starts the channel at 0% duty.
#[cfg_attr(test, automock)]
pub trait Actuator {
    fn set_output(&mut self, on: bool) -> Result<()>;
    fn start_pwm(&mut self, freq: f64) -> Result<()>;
    fn set_duty_cycle(&mut self, percent: u8) -> Result<()>;
    fn stop_pwm(&mut self) -> Result<()>;
    fn release(&mut self) -> Result<()>;
}

// --- Control Strategies ---

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    /// Full on above the threshold, off otherwise. No hysteresis.
    OnOff { threshold: f64 },
    Pwm(PwmSettings),
}

impl Control {
    pub fn from_config(config: &Config) -> Result<Control> {
        config.validate()?;
        match config.mode {
            Mode::OnOff => Ok(Control::OnOff { threshold: config.threshold }),
            Mode::Pwm => config
                .pwm
                .map(Control::Pwm)
                .ok_or_else(|| FanError::Config("PWM mode selected without PWM settings".to_string())),
        }
    }

    pub fn apply<A: Actuator + ?Sized>(&self, actuator: &mut A, temp: f64) -> Result<()> {
        match self {
            Control::OnOff { threshold } => {
                if temp > *threshold {
                    actuator.set_output(true)?;
                    info!("Turned fan on as T={}'C", temp);
                } else {
                    actuator.set_output(false)?;
                    debug!("off");
                }
            }
            Control::Pwm(pwm) => {
                let duty = duty_ratio(temp, pwm.temp_min, pwm.temp_max, pwm.duty_min);
                if duty > 0 {
                    info!("duty: {} for T={}'C", duty, temp);
                }
                actuator.set_duty_cycle(duty)?;
            }
        }
        Ok(())
    }
}

// --- Controller ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanState {
    Ready,
    Running,
    Stopped,
}

/// Owns the fan pin for the life of the process and runs the control loop.
///
/// The pin is switched off and released exactly once, by [`Fan::cleanup`] or on drop.
pub struct Fan<A: Actuator> {
    actuator: A,
    control: Control,
    sensor: TemperatureSensor,
    interval: Duration,
    state: FanState,
    pwm_active: bool,
}

impl<A: Actuator> Fan<A> {
    /// Validates `config`, then claims the pin through `claim`.
    ///
    /// A bad config is rejected before `claim` is called, so no hardware is touched.
    pub fn new<F>(config: &Config, sensor: TemperatureSensor, claim: F) -> Result<Self>
    where
        F: FnOnce(u8) -> Result<A>,
    {
        let control = Control::from_config(config)?;
        let actuator = claim(config.gpio_port)?;

        let mut fan = Fan {
            actuator,
            control,
            sensor,
            interval: Duration::from_secs(config.interval),
            state: FanState::Ready,
            pwm_active: false,
        };

        match control {
            Control::Pwm(pwm) => {
                info!("PWM fan control on GPIO {} at {} Hz", config.gpio_port, pwm.freq);
                fan.actuator.start_pwm(pwm.freq)?;
                fan.pwm_active = true;
            }
            Control::OnOff { threshold } => {
                info!("On/off fan control on GPIO {}, threshold {:.1}'C", config.gpio_port, threshold);
            }
        }
        Ok(fan)
    }

    /// Samples and actuates every interval until `shutdown` is requested.
    ///
    /// Only returns `Ok` once shutdown has been requested. The caller still owns the
    /// cleanup.
    pub fn run(&mut self, shutdown: &Shutdown) -> Result<()> {
        if self.state == FanState::Stopped {
            return Err(FanError::Stopped);
        }
        self.state = FanState::Running;
        info!(
            "Monitoring {} every {}s",
            self.sensor.path().display(),
            self.interval.as_secs()
        );

        while !shutdown.is_requested() {
            let temp = self.sensor.read()?;
            self.control.apply(&mut self.actuator, temp)?;
            shutdown.wait(self.interval);
        }

        info!("Exit signal received, terminating loop...");
        Ok(())
    }

    /// Stops PWM, drives the pin low and releases the GPIO.
    ///
    /// Safe to call any number of times. Failures are logged, never returned.
    pub fn cleanup(&mut self) {
        if self.state == FanState::Stopped {
            return;
        }
        self.state = FanState::Stopped;

        if self.pwm_active {
            self.pwm_active = false;
            if let Err(e) = self.actuator.stop_pwm() {
                error!("Failed to stop PWM: {}", e);
            }
        }
        if let Err(e) = self.actuator.set_output(false) {
            error!("Failed to switch fan off: {}", e);
        }
        if let Err(e) = self.actuator.release() {
            error!("Failed to release GPIO: {}", e);
        }
        info!("Fan off, GPIO released");
    }
}

impl<A: Actuator> Drop for Fan<A> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
