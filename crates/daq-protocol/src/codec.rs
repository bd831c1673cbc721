//! Streaming line codec
//!
//! Serial reads hand back arbitrary fragments; the codec buffers them and
//! yields complete lines. Lines end in `\n` and an optional preceding `\r`
//! is stripped, so both `\n` and `\r\n` terminated peers are accepted.

/// Maximum line length (reasonable limit to prevent unbounded buffering)
const MAX_LINE_LEN: usize = 256;

/// Streaming newline-delimited codec
#[derive(Debug)]
pub struct LineCodec {
    buffer: Vec<u8>,
}

impl LineCodec {
    /// Create a new line codec
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64),
        }
    }

    /// Push raw bytes into the codec's buffer
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);

        // Prevent buffer overflow
        if self.buffer.len() > MAX_LINE_LEN * 4 {
            tracing::warn!(
                "Discarding {} buffered bytes without terminator",
                self.buffer.len() - MAX_LINE_LEN
            );
            let start = self.buffer.len() - MAX_LINE_LEN;
            self.buffer = self.buffer[start..].to_vec();
        }
    }

    /// Try to extract the next complete line, without its terminator
    pub fn next_line(&mut self) -> Option<String> {
        let term_pos = self.buffer.iter().position(|&b| b == b'\n')?;

        let line_bytes: Vec<u8> = self.buffer.drain(..=term_pos).collect();
        let mut end = line_bytes.len() - 1;
        if end > 0 && line_bytes[end - 1] == b'\r' {
            end -= 1;
        }

        Some(String::from_utf8_lossy(&line_bytes[..end]).into_owned())
    }

    /// Clear the internal buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminate an encoded command for the wire
pub fn frame(command: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(command.len() + 1);
    bytes.extend_from_slice(command.as_bytes());
    bytes.push(b'\n');
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let mut codec = LineCodec::new();
        codec.push_bytes(b"512\r\n");
        assert_eq!(codec.next_line().as_deref(), Some("512"));
        assert!(codec.next_line().is_none());
    }

    #[test]
    fn test_streaming_parse() {
        let mut codec = LineCodec::new();

        codec.push_bytes(b"Arduino VISA firm");
        assert!(codec.next_line().is_none());

        codec.push_bytes(b"ware v1.0.0\r\n");
        assert_eq!(
            codec.next_line().as_deref(),
            Some("Arduino VISA firmware v1.0.0")
        );
    }

    #[test]
    fn test_multiple_lines() {
        let mut codec = LineCodec::new();
        codec.push_bytes(b"1\r\n2\n\r\n");

        assert_eq!(codec.next_line().as_deref(), Some("1"));
        assert_eq!(codec.next_line().as_deref(), Some("2"));
        assert_eq!(codec.next_line().as_deref(), Some(""));
        assert!(codec.next_line().is_none());
    }

    #[test]
    fn test_overflow_keeps_tail() {
        let mut codec = LineCodec::new();
        codec.push_bytes(&[b'x'; MAX_LINE_LEN * 4 + 1]);
        codec.push_bytes(b"\n");
        let line = codec.next_line().unwrap();
        assert!(line.len() <= MAX_LINE_LEN + 1);
    }

    #[test]
    fn test_frame() {
        assert_eq!(frame("*IDN?"), b"*IDN?\n");
    }
}
