//! Diode and sense-resistor fixture model
//!
//! The DAC output drives a diode in series with a sense resistor. Given the
//! applied voltage, the loop current satisfies
//! `U_out = n·V_T·ln(I/I_s + 1) + I·R`, which is solved by bisection.

use serde::{Deserialize, Serialize};

/// Thermal voltage at room temperature, in volts
const THERMAL_VOLTAGE: f64 = 0.025_85;

/// Bisection steps; 64 halvings exhaust f64 precision
const SOLVER_STEPS: usize = 64;

/// Electrical parameters of the test fixture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiodeFixture {
    /// Sense resistor in ohms
    pub resistor_ohm: f64,
    /// Diode saturation current in amperes
    pub saturation_current_a: f64,
    /// Diode ideality factor
    pub ideality: f64,
}

impl Default for DiodeFixture {
    /// A red LED behind the 220 Ω resistor of the reference fixture
    fn default() -> Self {
        Self {
            resistor_ohm: 220.0,
            saturation_current_a: 4e-18,
            ideality: 2.0,
        }
    }
}

impl DiodeFixture {
    /// Voltage across the diode at a given current
    pub fn diode_voltage(&self, current: f64) -> f64 {
        self.ideality * THERMAL_VOLTAGE * (current / self.saturation_current_a).ln_1p()
    }

    /// Loop current for an applied voltage
    pub fn current(&self, applied: f64) -> f64 {
        if applied <= 0.0 {
            return 0.0;
        }

        let mut low = 0.0;
        let mut high = applied / self.resistor_ohm;
        for _ in 0..SOLVER_STEPS {
            let mid = 0.5 * (low + high);
            if self.diode_voltage(mid) + mid * self.resistor_ohm > applied {
                high = mid;
            } else {
                low = mid;
            }
        }
        0.5 * (low + high)
    }

    /// Voltages seen by (input 1, input 2) for an applied voltage
    ///
    /// Input 1 sits above the diode and resistor in series, input 2 above the
    /// resistor alone.
    pub fn probe_voltages(&self, applied: f64) -> (f64, f64) {
        let current = self.current(applied);
        (applied, current * self.resistor_ohm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_bias() {
        let fixture = DiodeFixture::default();
        assert_eq!(fixture.current(0.0), 0.0);
        assert_eq!(fixture.probe_voltages(0.0), (0.0, 0.0));
    }

    #[test]
    fn test_loop_equation_holds() {
        let fixture = DiodeFixture::default();
        let applied = 3.0;
        let current = fixture.current(applied);
        let sum = fixture.diode_voltage(current) + current * fixture.resistor_ohm;
        assert!((sum - applied).abs() < 1e-9);
    }

    #[test]
    fn test_led_threshold() {
        let fixture = DiodeFixture::default();
        // Below ~1.5 V a red LED barely conducts
        assert!(fixture.current(1.0) < 1e-6);
        // At full scale several milliamps flow
        let current = fixture.current(3.3);
        assert!(current > 1e-3 && current < 15e-3, "current = {}", current);
    }

    proptest! {
        #[test]
        fn current_is_monotonic(a in 0.0f64..3.3, b in 0.0f64..3.3) {
            let fixture = DiodeFixture::default();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(fixture.current(low) <= fixture.current(high) + 1e-15);
        }
    }
}
