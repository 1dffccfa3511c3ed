//! Rotation and retention policies for the file destination.
//!
//! # Responsibilities
//! - Turn raw interval strings ("7d", "12h") into typed policies
//! - Provide rollover boundaries and rotated-file suffixes
//!
//! # Design Decisions
//! - Parsing never fails: any malformed input yields the documented default
//! - Both parsers share one shape check (`<digits><s|m|h|d|w>`) so the two
//!   settings accept the same syntax

pub mod retention;
pub mod rotation;

pub use retention::{parse_retention, DEFAULT_RETENTION};
pub use rotation::{parse_rotation, RotationPolicy, RotationUnit};

/// Split a trimmed, lowercased `<digits><unit>` string into its parts.
///
/// Returns `None` for an empty string, a missing or unknown unit, or a
/// non-digit prefix. A count too large for `u32` saturates at `u32::MAX`.
pub(crate) fn split_interval(raw: &str) -> Option<(u32, char)> {
    let s = raw.trim().to_lowercase();
    let unit = s.chars().last()?;
    if !matches!(unit, 's' | 'm' | 'h' | 'd' | 'w') {
        return None;
    }

    let digits = &s[..s.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    // Only overflow can fail here, the prefix is all digits.
    let count = digits.parse().unwrap_or(u32::MAX);
    Some((count, unit))
}
