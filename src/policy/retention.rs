//! Retention policy: how many rotated files to keep.

use crate::policy::split_interval;

/// Rotated files kept when retention is absent or malformed.
pub const DEFAULT_RETENTION: usize = 7;

/// Parse a raw retention string into a rotated-file count.
///
/// The input must look like a rotation interval (`"15d"`), but only the
/// numeric prefix is used: `"15d"` and `"15h"` both keep 15 files. The
/// unit is not converted against the rotation interval.
pub fn parse_retention(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return DEFAULT_RETENTION;
    };

    match split_interval(raw) {
        Some((count, _unit)) => count as usize,
        None => {
            if !raw.trim().is_empty() {
                tracing::debug!(retention = %raw, "Malformed retention, keeping default count");
            }
            DEFAULT_RETENTION
        }
    }
}
