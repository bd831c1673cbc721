//! Scan output types
//!
//! These are the data product handed to presentation and export code. They
//! are built once by the sweep engine and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Reduced measurement at one output setting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Raw DAC value this point was taken at
    pub output: u16,
    /// Mean voltage across the diode, in volts
    pub voltage: f64,
    /// Mean current through the diode, in amperes
    pub current: f64,
    /// Standard error of `voltage`
    pub voltage_sem: f64,
    /// Standard error of `current`
    pub current_sem: f64,
}

/// Complete result of one sweep, in ascending output order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    start: u16,
    stop: u16,
    repeats: usize,
    points: Vec<SweepPoint>,
}

impl ScanResult {
    pub(crate) fn new(start: u16, stop: u16, repeats: usize, points: Vec<SweepPoint>) -> Self {
        debug_assert_eq!(points.len(), usize::from(stop - start) + 1);
        Self {
            start,
            stop,
            repeats,
            points,
        }
    }

    /// First output value of the sweep
    pub fn start(&self) -> u16 {
        self.start
    }

    /// Last output value of the sweep
    pub fn stop(&self) -> u16 {
        self.stop
    }

    /// Samples taken per point
    pub fn repeats(&self) -> usize {
        self.repeats
    }

    /// The points, one per output value
    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a result produced by a scan
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the points
    pub fn iter(&self) -> std::slice::Iter<'_, SweepPoint> {
        self.points.iter()
    }

    /// Mean diode voltages, in sweep order
    pub fn voltages(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.voltage).collect()
    }

    /// Mean diode currents, in sweep order
    pub fn currents(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.current).collect()
    }

    /// Take ownership of the points
    pub fn into_points(self) -> Vec<SweepPoint> {
        self.points
    }
}

impl<'a> IntoIterator for &'a ScanResult {
    type Item = &'a SweepPoint;
    type IntoIter = std::slice::Iter<'a, SweepPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
