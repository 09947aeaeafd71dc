// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! DrawingML numeric conversions.
//!
//! DrawingML measures lengths in EMU (914400 per inch), angles in
//! 60000ths of a degree and percentages in 100000ths. All conversions
//! from SVG user units go through this module so the exact rounding
//! behavior lives in one place.

/// EMU per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Element coordinate system units.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Units {
    UserSpaceOnUse,
    ObjectBoundingBox,
}

impl Default for Units {
    fn default() -> Self {
        Units::UserSpaceOnUse
    }
}

/// Converts a user-unit (pixel) length into EMU at the provided DPI.
#[inline]
pub fn px_to_emu(px: f64, dpi: f64) -> i64 {
    (px * EMU_PER_INCH / dpi).round() as i64
}

/// Converts an angle in degrees into DrawingML's 60000ths of a degree.
#[inline]
pub fn degrees_to_angle_units(deg: f64) -> i64 {
    (deg * 60_000.0).round() as i64
}

/// Converts a 0..1 fraction into DrawingML's 100000ths percent unit.
#[inline]
pub fn fraction_to_percent_units(f: f64) -> i64 {
    (f * 100_000.0).round() as i64
}

/// Resolves shadow offsets into DrawingML `dist`/`dir`.
///
/// Distance is the Euclidean length of `(dx, dy)` in EMU. Direction is
/// `atan2(dy, dx)` normalized into `[0, 360)` degrees and emitted in
/// 60000ths. SVG and DrawingML both grow `y` downwards, so the angle
/// transfers directly.
pub fn shadow_offset(dx: f64, dy: f64, dpi: f64) -> (i64, i64) {
    let dist = px_to_emu(dx.hypot(dy), dpi);

    let mut dir = dy.atan2(dx).to_degrees();
    if dir < 0.0 {
        dir += 360.0;
    }

    (dist, degrees_to_angle_units(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emu_at_default_dpi() {
        assert_eq!(px_to_emu(1.0, 96.0), 9525);
        assert_eq!(px_to_emu(10.0, 96.0), 95_250);
        // 1pt at 72 DPI is one EMU inch / 72.
        assert_eq!(px_to_emu(1.0, 72.0), 12_700);
    }

    #[test]
    fn percent_units() {
        assert_eq!(fraction_to_percent_units(0.5), 50_000);
        assert_eq!(fraction_to_percent_units(1.0), 100_000);
    }

    #[test]
    fn angle_units() {
        assert_eq!(degrees_to_angle_units(90.0), 5_400_000);
        assert_eq!(degrees_to_angle_units(360.0), 21_600_000);
    }

    #[test]
    fn shadow_345() {
        // A 3-4-5 triangle: dist 5px, direction ~53.13 degrees.
        let (dist, dir) = shadow_offset(3.0, 4.0, 96.0);
        assert_eq!(dist, 5 * 9525);
        assert_eq!(dir, 3_187_806); // round(53.130102 * 60000)
    }

    #[test]
    fn shadow_dir_normalized() {
        // Up-left offsets must still land in [0, 360).
        let (_, dir) = shadow_offset(-3.0, -3.0, 96.0);
        assert_eq!(dir, 13_500_000); // 225 degrees
        assert!(dir >= 0 && dir < 21_600_000);
    }
}
