use std::fmt;

/// Decimal byte units, 1000-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeUnit {
    Bytes,
    KiloBytes,
    MegaBytes,
    GigaBytes,
    TeraBytes,
}

impl SizeUnit {
    /// Picks the unit whose bracket contains `bytes`.
    pub fn for_bytes(bytes: u64) -> SizeUnit {
        match bytes {
            0..=999 => SizeUnit::Bytes,
            1_000..=999_999 => SizeUnit::KiloBytes,
            1_000_000..=999_999_999 => SizeUnit::MegaBytes,
            1_000_000_000..=999_999_999_999 => SizeUnit::GigaBytes,
            _ => SizeUnit::TeraBytes,
        }
    }

    pub fn divisor(&self) -> u64 {
        match self {
            SizeUnit::Bytes => 1,
            SizeUnit::KiloBytes => 1_000,
            SizeUnit::MegaBytes => 1_000_000,
            SizeUnit::GigaBytes => 1_000_000_000,
            SizeUnit::TeraBytes => 1_000_000_000_000,
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SizeUnit::Bytes => "B",
            SizeUnit::KiloBytes => "KB",
            SizeUnit::MegaBytes => "MB",
            SizeUnit::GigaBytes => "GB",
            SizeUnit::TeraBytes => "TB",
        };
        f.write_str(s)
    }
}

/// Formats a byte count for humans, e.g. `1500000` becomes `"1.5 MB"`.
///
/// Plain bytes are rendered as an integer, everything above with one decimal.
pub fn format_size(bytes: u64) -> String {
    let unit = SizeUnit::for_bytes(bytes);
    match unit {
        SizeUnit::Bytes => format!("{} {}", bytes, unit),
        _ => format!("{:.1} {}", bytes as f64 / unit.divisor() as f64, unit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_brackets() {
        let test_data = [
            (0, "0 B"),
            (999, "999 B"),
            (1_000, "1.0 KB"),
            (1_500, "1.5 KB"),
            (999_000, "999.0 KB"),
            (1_000_000, "1.0 MB"),
            (1_500_000, "1.5 MB"),
            (1_000_000_000, "1.0 GB"),
            (1_500_000_000, "1.5 GB"),
            (1_000_000_000_000, "1.0 TB"),
            (2_340_000_000_000_000, "2340.0 TB"),
        ];
        for (bytes, expected) in &test_data {
            assert_eq!(&format_size(*bytes), expected, "bytes = {}", bytes);
        }
    }

    #[test]
    fn test_unit_for_bytes() {
        assert_eq!(SizeUnit::for_bytes(999), SizeUnit::Bytes);
        assert_eq!(SizeUnit::for_bytes(999_999), SizeUnit::KiloBytes);
        assert_eq!(SizeUnit::for_bytes(999_999_999), SizeUnit::MegaBytes);
        assert_eq!(SizeUnit::for_bytes(999_999_999_999), SizeUnit::GigaBytes);
        assert_eq!(SizeUnit::for_bytes(u64::MAX), SizeUnit::TeraBytes);
    }
}
