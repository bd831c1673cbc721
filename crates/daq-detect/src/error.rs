//! Error types for instrument detection

use thiserror::Error;

/// Errors that can occur during detection
#[derive(Debug, Error)]
pub enum DetectError {
    /// Failed to enumerate serial ports
    #[error("failed to enumerate ports: {0}")]
    EnumerationFailed(String),

    /// Search string did not select exactly one device
    ///
    /// Zero and multiple matches share this variant since both need a more
    /// specific search string; `matches` tells them apart.
    #[error("{}", ambiguous_message(search, *matches))]
    AmbiguousDevice { search: String, matches: usize },

    /// Failed to open serial port
    #[error("failed to open port {port}: {reason}")]
    OpenFailed { port: String, reason: String },

    /// I/O error during probe
    #[error("I/O error on {port}: {reason}")]
    IoError { port: String, reason: String },
}

impl DetectError {
    /// Number of devices matched, for ambiguous searches
    pub fn match_count(&self) -> Option<usize> {
        match self {
            DetectError::AmbiguousDevice { matches, .. } => Some(*matches),
            _ => None,
        }
    }
}

fn ambiguous_message(search: &str, matches: usize) -> String {
    match matches {
        0 => format!("no device matches {:?}", search),
        n => format!(
            "{} devices match {:?}; use a more specific search string",
            n, search
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_messages() {
        let none = DetectError::AmbiguousDevice {
            search: "X".into(),
            matches: 0,
        };
        assert_eq!(none.to_string(), "no device matches \"X\"");
        assert_eq!(none.match_count(), Some(0));

        let many = DetectError::AmbiguousDevice {
            search: "ASRL".into(),
            matches: 2,
        };
        assert!(many.to_string().starts_with("2 devices match"));
        assert_eq!(many.match_count(), Some(2));
    }
}
