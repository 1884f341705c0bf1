//! Paint modes and source-over compositing.
//!
//! Colors are straight alpha in 0.0 to 1.0. A blend mode only decides the
//! mixed color where paint lands on existing paint; coverage then composites
//! that color source-over:
//!
//! ```text
//! mixed = (1 - a_dst) * src + a_dst * B(dst, src)
//! a_out = cov + a_dst * (1 - cov)
//! c_out = (cov * mixed + a_dst * dst * (1 - cov)) / a_out
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Addition,
    Darken,
    Lighten,
    Difference,
}

impl BlendMode {
    /// Blend one channel of `src` onto `dst`.
    #[inline]
    pub fn blend_channel(self, dst: f32, src: f32) -> f32 {
        match self {
            BlendMode::Normal => src,
            BlendMode::Multiply => dst * src,
            BlendMode::Screen => dst + src - dst * src,
            BlendMode::Overlay => {
                if dst <= 0.5 {
                    2.0 * dst * src
                } else {
                    1.0 - 2.0 * (1.0 - dst) * (1.0 - src)
                }
            }
            BlendMode::Addition => (dst + src).min(1.0),
            BlendMode::Darken => dst.min(src),
            BlendMode::Lighten => dst.max(src),
            BlendMode::Difference => (dst - src).abs(),
        }
    }
}

/// Composite `src` color onto the RGBA `dst` with the given coverage.
#[inline]
pub fn composite_rgba(dst: [f32; 4], src: [f32; 3], coverage: f32, mode: BlendMode) -> [f32; 4] {
    let cov = coverage.clamp(0.0, 1.0);
    if cov <= 0.0 {
        return dst;
    }
    let dst_a = dst[3];
    let out_a = cov + dst_a * (1.0 - cov);
    if out_a <= f32::EPSILON {
        return [0.0; 4];
    }

    let mut out = [0.0, 0.0, 0.0, out_a];
    for i in 0..3 {
        let mixed = (1.0 - dst_a) * src[i] + dst_a * mode.blend_channel(dst[i], src[i]);
        out[i] = ((cov * mixed + dst_a * dst[i] * (1.0 - cov)) / out_a).clamp(0.0, 1.0);
    }
    out
}

/// Composite a coverage value `src` onto coverage `dst`.
#[inline]
pub fn composite_coverage(dst: f32, src: f32, coverage: f32, mode: BlendMode) -> f32 {
    let cov = coverage.clamp(0.0, 1.0);
    let blended = mode.blend_channel(dst, src);
    (dst + (blended - dst) * cov).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAY: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

    fn approx(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_normal_full_coverage_replaces() {
        let out = composite_rgba(GRAY, [1.0, 0.0, 0.0], 1.0, BlendMode::Normal);
        assert!(approx(out, [1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_zero_coverage_keeps_destination() {
        let out = composite_rgba(GRAY, [1.0, 0.0, 0.0], 0.0, BlendMode::Multiply);
        assert_eq!(out, GRAY);
    }

    #[test]
    fn test_half_coverage_on_transparent() {
        let out = composite_rgba([0.0; 4], [1.0, 1.0, 1.0], 0.5, BlendMode::Multiply);
        // Nothing to blend with: paint lands as is.
        assert!(approx(out, [1.0, 1.0, 1.0, 0.5]));
    }

    #[test]
    fn test_multiply_and_screen() {
        let m = composite_rgba(GRAY, [0.5, 0.5, 0.5], 1.0, BlendMode::Multiply);
        assert!(approx(m, [0.25, 0.25, 0.25, 1.0]));
        let s = composite_rgba(GRAY, [0.5, 0.5, 0.5], 1.0, BlendMode::Screen);
        assert!(approx(s, [0.75, 0.75, 0.75, 1.0]));
    }

    #[test]
    fn test_channel_modes() {
        assert_eq!(BlendMode::Darken.blend_channel(0.3, 0.6), 0.3);
        assert_eq!(BlendMode::Lighten.blend_channel(0.3, 0.6), 0.6);
        assert_eq!(BlendMode::Addition.blend_channel(0.7, 0.6), 1.0);
        assert!((BlendMode::Difference.blend_channel(0.3, 0.6) - 0.3).abs() < 1e-6);
        assert!((BlendMode::Overlay.blend_channel(0.25, 0.5) - 0.25).abs() < 1e-6);
        assert!((BlendMode::Overlay.blend_channel(0.75, 0.5) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_coverage_composite() {
        assert!((composite_coverage(0.0, 1.0, 0.5, BlendMode::Normal) - 0.5).abs() < 1e-6);
        assert_eq!(composite_coverage(0.4, 1.0, 0.0, BlendMode::Normal), 0.4);
        assert!((composite_coverage(0.5, 0.5, 1.0, BlendMode::Multiply) - 0.25).abs() < 1e-6);
    }
}
