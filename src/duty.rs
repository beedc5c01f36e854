// src/duty.rs

/// Maps a temperature onto a PWM duty ratio in percent.
///
/// Below `low` the fan is off, above `high` it runs flat out. In between the
/// ratio rises linearly from `duty_min` to 100, so once the fan is driven at all
/// it gets at least `duty_min` percent (some motors stall at very low duty).
pub fn duty_ratio(temp: f64, low: f64, high: f64, duty_min: f64) -> u8 {
    if temp > high {
        return 100;
    }
    if temp < low {
        return 0;
    }

    let dr = (temp - low) / (high - low) * (100.0 - duty_min) + duty_min;
    if dr < 100.0 { dr as u8 } else { 100 }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOW: f64 = 65.0;
    const HIGH: f64 = 85.0;
    const MIN: f64 = 70.0;

    #[test]
    fn saturates_above_high() {
        for temp in [85.01, 86.0, 100.0, 250.0] {
            assert_eq!(duty_ratio(temp, LOW, HIGH, MIN), 100);
        }
    }

    #[test]
    fn off_below_low() {
        for temp in [64.99, 40.0, 0.0, -20.0] {
            assert_eq!(duty_ratio(temp, LOW, HIGH, MIN), 0);
        }
    }

    #[test]
    fn floor_at_low_bound() {
        assert_eq!(duty_ratio(LOW, LOW, HIGH, MIN), 70);
        assert_eq!(duty_ratio(LOW, LOW, HIGH, 0.0), 0);
        assert_eq!(duty_ratio(LOW, LOW, HIGH, 33.7), 33);
    }

    #[test]
    fn high_bound_is_full_duty() {
        assert_eq!(duty_ratio(HIGH, LOW, HIGH, MIN), 100);
        assert_eq!(duty_ratio(HIGH, LOW, HIGH, 0.0), 100);
    }

    #[test]
    fn midpoint_scenario() {
        // (75-65)/(85-65) * (100-70) + 70 = 85
        assert_eq!(duty_ratio(75.0, LOW, HIGH, MIN), 85);
    }

    #[test]
    fn truncates_fractional_duty() {
        // 0.3 / 20 * 30 + 70 = 70.45
        assert_eq!(duty_ratio(65.3, LOW, HIGH, MIN), 70);
        // 9.9 / 20 * 100 = 49.5
        assert_eq!(duty_ratio(74.9, LOW, HIGH, 0.0), 49);
    }

    #[test]
    fn monotonic_across_range() {
        let mut last = 0;
        let mut temp = 50.0;
        while temp < 100.0 {
            let dr = duty_ratio(temp, LOW, HIGH, MIN);
            assert!(dr >= last, "duty dropped from {} to {} at {:.1}C", last, dr, temp);
            assert!(dr <= 100);
            last = dr;
            temp += 0.1;
        }
        assert_eq!(last, 100);
    }
}
