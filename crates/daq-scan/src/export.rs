//! CSV export of scan results

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ExportError;
use crate::result::ScanResult;

/// Column headers, in column order
pub const CSV_HEADER: [&str; 4] = ["I (A)", "U (V)", "SEM_I (A)", "SEM_U (V)"];

/// Stem of automatically numbered export files
const AUTO_NAME_STEM: &str = "measurements";

/// Write a result as CSV: current, voltage, SEM current, SEM voltage
pub fn write_csv<W: Write>(result: &ScanResult, writer: W) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for point in result {
        csv.write_record(&[
            point.current.to_string(),
            point.voltage.to_string(),
            point.current_sem.to_string(),
            point.voltage_sem.to_string(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Save a result to `path`, adding a `.csv` extension if it has none
pub fn save_csv(result: &ScanResult, path: &Path) -> Result<PathBuf, ExportError> {
    let path = if path.extension().is_none() {
        path.with_extension("csv")
    } else {
        path.to_path_buf()
    };

    let file = File::create(&path)?;
    write_csv(result, file)?;
    info!("Saved {} point(s) to {}", result.len(), path.display());
    Ok(path)
}

/// First `measurements_<n>.csv` in `dir` that does not exist yet
pub fn next_free_path(dir: &Path) -> PathBuf {
    (0..)
        .map(|n| dir.join(format!("{}_{}.csv", AUTO_NAME_STEM, n)))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| dir.join(format!("{}.csv", AUTO_NAME_STEM)))
}

/// Save a result under an automatically numbered name in `dir`
pub fn save_in_dir(result: &ScanResult, dir: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    save_csv(result, &next_free_path(dir))
}
