const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// Formats a byte count with binary (1024-based) units.
///
/// Below 1 KiB the count is printed as whole bytes; larger values are scaled to KB, MB or GB
/// with two decimals. GB is the largest unit.
///
/// ```rust
/// use cgroup_monitor::report::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(2048), "2.00 KB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    match bytes {
        b if b < KIB => format!("{b} B"),
        b if b < MIB => format!("{:.2} KB", b as f64 / KIB as f64),
        b if b < GIB => format!("{:.2} MB", b as f64 / MIB as f64),
        b => format!("{:.2} GB", b as f64 / GIB as f64),
    }
}

/// Formats an integer with `,` as thousands separator.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a core-equivalent CPU limit with two decimals.
pub fn format_cores(cores: f64) -> String {
    format!("{cores:.2} cores")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_thresholds() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_format_bytes_is_binary() {
        // 1_000_000 bytes is below one MiB
        assert_eq!(format_bytes(1_000_000), "976.56 KB");
        assert_eq!(format_bytes(1024 * 1024 - 1), "1024.00 KB");
    }

    #[test]
    fn test_format_bytes_caps_at_gb() {
        assert_eq!(format_bytes(2 * 1024 * GIB), "2048.00 GB");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(987_654_321), "987,654,321");
        assert_eq!(format_number(1_234_567_890), "1,234,567,890");
    }

    #[test]
    fn test_format_cores() {
        assert_eq!(format_cores(2.0), "2.00 cores");
        assert_eq!(format_cores(0.5), "0.50 cores");
        assert_eq!(format_cores(1.0 / 3.0), "0.33 cores");
    }
}
