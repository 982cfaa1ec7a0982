//! Human-readable byte-size formatting, generalized from the teacher's
//! `format_size`/`format_size_fixed_int` into the one-decimal-digit
//! formatter the output contract requires.

const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

/// Format `bytes` as e.g. `"1.5 KiB"`: the largest unit for which the value
/// is `>= 1`, with exactly one fractional digit.
pub fn human_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit_idx = 0;
    while value >= 1024.0 && unit_idx < UNITS.len() - 1 {
        value /= 1024.0;
        unit_idx += 1;
    }
    format!("{:.1} {}", value, UNITS[unit_idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_spec_table() {
        assert_eq!(human_size(1023), "1023.0 B");
        assert_eq!(human_size(1024), "1.0 KiB");
        assert_eq!(human_size(1536), "1.5 KiB");
        assert_eq!(human_size(1 << 20), "1.0 MiB");
        assert_eq!(human_size(3 << 30), "3.0 GiB");
    }
}
