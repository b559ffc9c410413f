//! Human-readable byte counts.

use std::fmt;

const KB: u64 = 1_000;
const MB: u64 = KB * 1_000;
const GB: u64 = MB * 1_000;
const TB: u64 = GB * 1_000;
const PB: u64 = TB * 1_000;

/// A byte count that displays with decimal (SI) units.
///
/// ```
/// use keel_types::ByteSize;
///
/// assert_eq!(ByteSize(512).to_string(), "512 bytes");
/// assert_eq!(ByteSize(102_510_000).to_string(), "102.51 MB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByteSize(pub u64);

impl ByteSize {
    /// The raw number of bytes.
    pub fn bytes(self) -> u64 {
        self.0
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (unit, name) = match self.0 {
            n if n < KB => return write!(f, "{n} bytes"),
            n if n < MB => (KB, "kB"),
            n if n < GB => (MB, "MB"),
            n if n < TB => (GB, "GB"),
            n if n < PB => (TB, "TB"),
            _ => (PB, "PB"),
        };
        write!(f, "{:.2} {name}", self.0 as f64 / unit as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_units() {
        assert_eq!(ByteSize(0).to_string(), "0 bytes");
        assert_eq!(ByteSize(999).to_string(), "999 bytes");
        assert_eq!(ByteSize(1_000).to_string(), "1.00 kB");
        assert_eq!(ByteSize(2_500_000).to_string(), "2.50 MB");
        assert_eq!(ByteSize(3 * GB).to_string(), "3.00 GB");
        assert_eq!(ByteSize(TB).to_string(), "1.00 TB");
        assert_eq!(ByteSize(5 * PB).to_string(), "5.00 PB");
    }
}
