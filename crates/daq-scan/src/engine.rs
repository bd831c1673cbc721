//! Sweep engine
//!
//! Steps the DAC output through `start..=stop` one raw unit at a time. At
//! every step it takes `repeats` sample pairs and reduces them to a
//! [`SweepPoint`]:
//!
//! ```text
//!   DAC ──┬── diode ──┬── R = 220 Ω ── GND
//!         │           │
//!       MEAS:CH1    MEAS:CH2
//! ```
//!
//! - current through the loop: `U(CH2) / R`
//! - voltage across the diode: `U(CH1) - U(CH2)`
//!
//! Whatever happens, the output is driven back to 0 afterwards so the device
//! under test is left de-energized. A failed scan returns only the error;
//! points measured before the failure are dropped.

use daq_protocol::{raw_to_volt, volt_to_raw, Transport, MAX_RAW};
use tracing::{debug, info, warn};

use crate::channel::InstrumentChannel;
use crate::error::ScanError;
use crate::progress::{NoProgress, ProgressReporter};
use crate::result::{ScanResult, SweepPoint};
use crate::stats::Summary;

/// Current-sense resistor of the test fixture, in ohms
pub const SENSE_RESISTOR_OHM: f64 = 220.0;

/// Input above diode and resistor in series
pub const SERIES_INPUT: u8 = 1;

/// Input above the sense resistor
pub const RESISTOR_INPUT: u8 = 2;

/// Bounds and repeat count of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanParams {
    /// First raw output value
    pub start: i32,
    /// Last raw output value, inclusive
    pub stop: i32,
    /// Sample pairs per output value
    pub repeats: usize,
}

impl ScanParams {
    /// Parameters from raw bounds
    pub fn new(start: i32, stop: i32, repeats: usize) -> Self {
        Self {
            start,
            stop,
            repeats,
        }
    }

    /// Parameters from bounds in volts, rounded to the nearest raw value
    ///
    /// Finite bounds always convert; [`validate`](Self::validate) decides
    /// whether they are in range.
    pub fn from_volts(start: f64, stop: f64, repeats: usize) -> Result<Self, ScanError> {
        if let Some(bad) = [start, stop].into_iter().find(|v| !v.is_finite()) {
            return Err(ScanError::NonFiniteVoltage(bad));
        }
        Ok(Self::new(volt_to_raw(start), volt_to_raw(stop), repeats))
    }

    /// Check bounds and repeat count
    pub fn validate(&self) -> Result<(), ScanError> {
        let max = i32::from(MAX_RAW);
        if self.start < 0 || self.stop > max || self.start > self.stop {
            return Err(ScanError::InvalidScanRange {
                start: self.start,
                stop: self.stop,
            });
        }
        if self.repeats < 1 {
            return Err(ScanError::InvalidRepeatCount(self.repeats));
        }
        Ok(())
    }

    /// Number of output values visited, for valid parameters
    pub fn step_count(&self) -> usize {
        (self.stop - self.start + 1).max(0) as usize
    }
}

/// Sweep `start..=stop` taking `repeats` samples per step
pub fn scan<T: Transport>(
    channel: &mut InstrumentChannel<T>,
    start: i32,
    stop: i32,
    repeats: usize,
) -> Result<ScanResult, ScanError> {
    scan_with_progress(channel, ScanParams::new(start, stop, repeats), &mut NoProgress)
}

/// Sweep as [`scan`], notifying `progress` after each step
pub fn scan_with_progress<T, P>(
    channel: &mut InstrumentChannel<T>,
    params: ScanParams,
    progress: &mut P,
) -> Result<ScanResult, ScanError>
where
    T: Transport,
    P: ProgressReporter + ?Sized,
{
    // Nothing is sent for invalid parameters, not even the cleanup
    params.validate()?;

    let start = params.start as u16;
    let stop = params.stop as u16;

    info!(
        "Scanning {} from {} to {} ({:.3} V to {:.3} V), {} repeat(s)",
        channel.address(),
        start,
        stop,
        raw_to_volt(start),
        raw_to_volt(stop),
        params.repeats
    );

    let swept = sweep(channel, start, stop, params.repeats, progress);
    let cleanup = channel.set_output(0);

    match (swept, cleanup) {
        (Ok(points), Ok(())) => {
            info!(
                "Scan of {} complete: {} point(s)",
                channel.address(),
                points.len()
            );
            Ok(ScanResult::new(start, stop, params.repeats, points))
        }
        (Ok(_), Err(e)) => {
            warn!("Scan finished but output could not be zeroed: {}", e);
            Err(e.into())
        }
        (Err(e), Ok(())) => {
            warn!("Scan of {} aborted: {}", channel.address(), e);
            Err(e)
        }
        (Err(e), Err(cleanup_err)) => {
            warn!(
                "Scan of {} aborted: {}; zeroing output also failed: {}",
                channel.address(),
                e,
                cleanup_err
            );
            Err(e)
        }
    }
}

fn sweep<T, P>(
    channel: &mut InstrumentChannel<T>,
    start: u16,
    stop: u16,
    repeats: usize,
    progress: &mut P,
) -> Result<Vec<SweepPoint>, ScanError>
where
    T: Transport,
    P: ProgressReporter + ?Sized,
{
    let total = usize::from(stop - start) + 1;
    let mut points = Vec::with_capacity(total);
    let mut voltages = Vec::with_capacity(repeats);
    let mut currents = Vec::with_capacity(repeats);

    for (index, output) in (start..=stop).enumerate() {
        channel.set_output(i32::from(output))?;

        voltages.clear();
        currents.clear();
        for _ in 0..repeats {
            let resistor = channel.read_voltage(RESISTOR_INPUT)?;
            let series = channel.read_voltage(SERIES_INPUT)?;
            currents.push(resistor / SENSE_RESISTOR_OHM);
            voltages.push(series - resistor);
        }

        let voltage =
            Summary::from_samples(&voltages).ok_or(ScanError::InvalidRepeatCount(repeats))?;
        let current =
            Summary::from_samples(&currents).ok_or(ScanError::InvalidRepeatCount(repeats))?;

        let point = SweepPoint {
            output,
            voltage: voltage.mean,
            current: current.mean,
            voltage_sem: voltage.sem,
            current_sem: current.sem,
        };
        debug!(
            "Step {}/{}: output {} -> U = {:.4} V, I = {:.6} A",
            index + 1,
            total,
            output,
            point.voltage,
            point.current
        );
        points.push(point);
        progress.step(index + 1, total);
    }

    Ok(points)
}
