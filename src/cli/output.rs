//! CLI output utilities
//!
//! Byte formatting for command output and the writer that mirrors log lines
//! to a file.

use std::fs::File;
use std::io::{self, Stderr, Write};

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

// ============================================================================
// Dual writer for file + console logging
// ============================================================================

/// A writer that writes to both stderr and a file
///
/// stdout is never used so it stays free for channel responses.
pub struct DualWriter {
    pub console: Stderr,
    pub file: File,
}

impl DualWriter {
    pub fn new(file: File) -> Self {
        Self {
            console: io::stderr(),
            file,
        }
    }
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = self.console.write(buf);
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = self.console.flush();
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 bytes");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
    }

    #[test]
    fn test_dual_writer_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");

        let mut writer = DualWriter::new(File::create(&path).unwrap());
        writer.write_all(b"hello log\n").unwrap();
        writer.flush().unwrap();
        drop(writer);

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello log\n");
    }
}
