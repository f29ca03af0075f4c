//! Version number encoding.
//!
//! Host versions are compared as integers: `major.minor.patch` becomes
//! `major * 1_000_000 + minor * 1_000 + patch`, so `"9.5.0"` is `9005000`.

const FIELD_WIDTH: u64 = 1_000;

/// Converts a dotted version string into its comparable integer form.
///
/// Each part contributes its leading decimal digits only (`"0-dev"` → 0,
/// `"2rc1"` → 2). Missing parts count as zero and anything past the patch
/// level is ignored. Minor and patch are clamped to 999.
pub fn version_to_integer(version: &str) -> u64 {
    let mut parts = version.trim().split('.');

    let major = parts.next().map(leading_number).unwrap_or(0);
    let minor = parts.next().map(leading_number).unwrap_or(0);
    let patch = parts.next().map(leading_number).unwrap_or(0);

    major
        .saturating_mul(FIELD_WIDTH * FIELD_WIDTH)
        .saturating_add(minor.min(FIELD_WIDTH - 1) * FIELD_WIDTH)
        .saturating_add(patch.min(FIELD_WIDTH - 1))
}

/// Inverse of [`version_to_integer`] for well-formed values.
pub fn integer_to_version(value: u64) -> String {
    let major = value / (FIELD_WIDTH * FIELD_WIDTH);
    let minor = (value / FIELD_WIDTH) % FIELD_WIDTH;
    let patch = value % FIELD_WIDTH;
    format!("{}.{}.{}", major, minor, patch)
}

fn leading_number(part: &str) -> u64 {
    let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    // Only overflow can fail here.
    digits.parse().unwrap_or(u64::MAX)
}
