use super::constants::{FNV_OFFSET_BASIS, FNV_PRIME};
use std::f64::consts::PI;

/// Convert degrees to radians
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Convert radians to degrees
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Linear interpolation between two values, clamping `factor` into `[0,1]`.
#[inline]
pub fn lerp(start: f64, end: f64, factor: f64) -> f64 {
    start + (end - start) * factor.clamp(0.0, 1.0)
}

/// Clamp `v` into `[lo, hi]`. `lo` and `hi` are assumed ordered by the caller.
#[inline]
pub fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

#[inline]
pub fn is_finite(v: f64) -> bool {
    v.is_finite()
}

/// Divide `n / d`, returning `fallback` if `d` is zero or either operand is
/// non-finite. Never panics, never produces `NaN`/`Inf` on its own.
#[inline]
pub fn safe_div(n: f64, d: f64, fallback: f64) -> f64 {
    if !n.is_finite() || !d.is_finite() || d == 0.0 {
        fallback
    } else {
        n / d
    }
}

/// Deterministic 64-bit FNV-1a over raw bytes. Stable across platforms and
/// processes; used for artifact content hashes and cache fingerprints.
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut h = FNV_OFFSET_BASIS;
    for &b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// Render a 64-bit hash as lowercase hex, zero-padded to 16 digits.
pub fn hash_to_hex(h: u64) -> String {
    format!("{:016x}", h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a64_matches_known_vector() {
        // "" -> offset basis
        assert_eq!(fnv1a64(b""), FNV_OFFSET_BASIS);
        // well known FNV-1a 64 test vector for "a"
        assert_eq!(fnv1a64(b"a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn safe_div_guards_zero_and_nonfinite() {
        assert_eq!(safe_div(1.0, 0.0, -1.0), -1.0);
        assert_eq!(safe_div(f64::NAN, 2.0, -1.0), -1.0);
        assert_eq!(safe_div(1.0, 2.0, -1.0), 0.5);
    }

    #[test]
    fn lerp_clamps_factor() {
        assert_eq!(lerp(0.0, 10.0, -1.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 2.0), 10.0);
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
    }

    #[test]
    fn hash_to_hex_is_16_chars() {
        assert_eq!(hash_to_hex(0).len(), 16);
        assert_eq!(hash_to_hex(0xabcd), "000000000000abcd");
    }
}
