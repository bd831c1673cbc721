//! Reduction of repeated samples

/// Mean and spread of a set of repeated samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Number of samples
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation (divisor `count`)
    pub std_dev: f64,
    /// Standard error of the mean, `std_dev / sqrt(count)`
    pub sem: f64,
}

impl Summary {
    /// Summarize samples; `None` when there are none
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let count = samples.len();
        let n = count as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        Some(Self {
            count,
            mean,
            std_dev,
            sem: std_dev / n.sqrt(),
        })
    }
}
