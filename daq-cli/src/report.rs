//! Plain-text presentation of scan results

use daq_scan::ScanResult;

/// Render a result as a table of U, I and their standard errors
pub fn format_table(result: &ScanResult) -> String {
    let mut out = format!(
        "{:>10} {:>12} {:>12} {:>12}\n",
        "U (V)", "I (A)", "SEM_U (V)", "SEM_I (A)"
    );
    for point in result {
        out.push_str(&format!(
            "{:>10.4} {:>12.4e} {:>12.4e} {:>12.4e}\n",
            point.voltage, point.current, point.voltage_sem, point.current_sem
        ));
    }
    out
}

/// One-line description of a finished scan
pub fn summary_line(result: &ScanResult) -> String {
    match result.points().last() {
        Some(last) => format!(
            "{} points, output {}..={}, {} samples each; at {} raw: U = {:.4} V, I = {:.3} mA",
            result.len(),
            result.start(),
            result.stop(),
            result.repeats(),
            last.output,
            last.voltage,
            last.current * 1e3
        ),
        None => "no points".to_string(),
    }
}
