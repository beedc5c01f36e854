// src/hardware.rs
//! Raspberry Pi GPIO backend for [`Actuator`](crate::fan::Actuator), using software PWM on the fan pin.

#[cfg(target_os = "linux")]
pub use self::rpi::GpioFan;

#[cfg(not(target_os = "linux"))]
pub use self::unsupported::GpioFan;

#[cfg(target_os = "linux")]
mod rpi {
    use log::{debug, info};
    use rppal::gpio::{Gpio, OutputPin};

    use crate::{
        error::{FanError, Result},
        fan::Actuator,
    };

    pub struct GpioFan {
        port: u8,
        pin: Option<OutputPin>,
        freq: f64,
    }

    impl GpioFan {
        /// Claims `port` (BCM numbering) as an output, driven low.
        pub fn claim(port: u8) -> Result<Self> {
            let init_err = |e: rppal::gpio::Error| FanError::HardwareInit {
                port,
                reason: e.to_string(),
            };

            let gpio = Gpio::new().map_err(init_err)?;
            let mut pin = gpio.get(port).map_err(init_err)?.into_output_low();
            // Dropping the pin hands it back in the mode we found it in.
            pin.set_reset_on_drop(true);

            info!("Claimed GPIO {} as output", port);
            Ok(GpioFan { port, pin: Some(pin), freq: 0.0 })
        }

        fn pin(&mut self) -> Result<&mut OutputPin> {
            let port = self.port;
            self.pin
                .as_mut()
                .ok_or_else(|| FanError::Actuation(format!("GPIO {} already released", port)))
        }
    }

    impl Actuator for GpioFan {
        fn set_output(&mut self, on: bool) -> Result<()> {
            let pin = self.pin()?;
            if on {
                pin.set_high();
            } else {
                pin.set_low();
            }
            debug!("GPIO {} {}", self.port, if on { "high" } else { "low" });
            Ok(())
        }

        fn start_pwm(&mut self, freq: f64) -> Result<()> {
            let port = self.port;
            self.pin()?
                .set_pwm_frequency(freq, 0.0)
                .map_err(|e| FanError::HardwareInit { port, reason: e.to_string() })?;
            self.freq = freq;
            Ok(())
        }

        fn set_duty_cycle(&mut self, percent: u8) -> Result<()> {
            let freq = self.freq;
            self.pin()?
                .set_pwm_frequency(freq, f64::from(percent.min(100)) / 100.0)
                .map_err(|e| FanError::Actuation(e.to_string()))
        }

        fn stop_pwm(&mut self) -> Result<()> {
            self.pin()?
                .clear_pwm()
                .map_err(|e| FanError::Actuation(e.to_string()))
        }

        fn release(&mut self) -> Result<()> {
            if self.pin.take().is_some() {
                debug!("Released GPIO {}", self.port);
            }
            Ok(())
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod unsupported {
    use crate::{
        error::{FanError, Result},
        fan::Actuator,
    };

    /// GPIO is only reachable on Linux; this type can never be constructed.
    pub enum GpioFan {}

    impl GpioFan {
        pub fn claim(port: u8) -> Result<Self> {
            Err(FanError::HardwareInit {
                port,
                reason: "GPIO access is only supported on Linux".to_string(),
            })
        }
    }

    impl Actuator for GpioFan {
        fn set_output(&mut self, _on: bool) -> Result<()> {
            match *self {}
        }
        fn start_pwm(&mut self, _freq: f64) -> Result<()> {
            match *self {}
        }
        fn set_duty_cycle(&mut self, _percent: u8) -> Result<()> {
            match *self {}
        }
        fn stop_pwm(&mut self) -> Result<()> {
            match *self {}
        }
        fn release(&mut self) -> Result<()> {
            match *self {}
        }
    }
}
