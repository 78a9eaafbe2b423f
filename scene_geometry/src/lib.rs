//! # scene_geometry
//!
//! Parametric point samplers for the bloom scene. Every generator here is a
//! pure function: deterministic in *shape* (the parametric rule) while the
//! randomized ones are deterministic only in *distribution*, since they
//! consume draws from a caller-supplied [`Rng`]. Seed a `StdRng` to make a
//! sampler reproducible in tests.
//!
//! Generators:
//!
//! * [`cone_volume`] — points filling a cone volume, area-uniform per slice
//!   (the tree particle cloud, with a vertical color gradient).
//! * [`spiral_point`] — a point on a rising spiral with linear taper
//!   (ornament and photo placement along the tree).
//! * [`torus_sample`] — a point on a torus shell (nebula targets).
//! * [`star_outline`] — closed 2D five-pointed star polygon (the tree topper).

use glam::{Vec2, Vec3};
use rand::Rng;

use std::f32::consts::PI;

// ════════════════════════════════════════════════════════════════════════════
// ARGB color helpers
// ════════════════════════════════════════════════════════════════════════════

/// Glowing green at the base of the tree.
pub const BASE_GREEN: u32 = 0xFF4A_DE80;
/// Lighter green toward the tip.
pub const TIP_GREEN: u32 = 0xFFA7_F3D0;

/// Ordered ornament palette: vintage gold, burgundy, grey blue, rose pink,
/// champagne. Ornaments cycle through this sequence round-robin; the order
/// is part of the visual design, not a free choice.
pub const ORNAMENT_PALETTE: [u32; 5] = [
    0xFFC5_A059, // vintage gold
    0xFF80_0020, // burgundy
    0xFF7A_8999, // grey blue
    0xFFB7_6E79, // rose pink
    0xFFF7_E7CE, // champagne
];

/// Pack 0–255 channels into opaque 0xAARRGGBB.
pub fn pack_argb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Linear blend of two ARGB colors. `t = 0.0` → all `a`, `t = 1.0` → all `b`.
pub fn lerp_argb(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let ch = |ca: u32, cb: u32| (ca as f32 + (cb as f32 - ca as f32) * t) as u32;
    let r = ch((a >> 16) & 0xFF, (b >> 16) & 0xFF);
    let g = ch((a >> 8) & 0xFF, (b >> 8) & 0xFF);
    let bl = ch(a & 0xFF, b & 0xFF);
    0xFF00_0000 | (r << 16) | (g << 8) | bl
}

/// Uniform draw in `[min, max)`.
pub fn random_range(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    rng.gen::<f32>() * (max - min) + min
}

// ════════════════════════════════════════════════════════════════════════════
// Cone volume sampler — the tree particle cloud
// ════════════════════════════════════════════════════════════════════════════

/// Sample `count` points inside a cone of the given `height` and base
/// `radius`, centered vertically on the origin (y spans `-height/2` to
/// `height/2`, apex up).
///
/// Per sample: y uniform along the height, then a radial draw of
/// `sqrt(U) * r_at_height` — the square-root transform keeps *area* density
/// uniform across each horizontal slice. A plain uniform radius would
/// cluster points at the axis.
///
/// Returns parallel position and ARGB color buffers; color is a linear
/// gradient from [`BASE_GREEN`] to [`TIP_GREEN`] keyed on normalized height.
pub fn cone_volume(
    rng: &mut impl Rng,
    count: usize,
    height: f32,
    radius: f32,
) -> (Vec<Vec3>, Vec<u32>) {
    let mut positions = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);

    for _ in 0..count {
        let y = rng.gen::<f32>() * height;
        let r_at_height = (1.0 - y / height) * radius;
        let angle = rng.gen::<f32>() * PI * 2.0;
        let r = rng.gen::<f32>().sqrt() * r_at_height;

        positions.push(Vec3::new(
            r * angle.cos(),
            y - height / 2.0,
            r * angle.sin(),
        ));
        colors.push(lerp_argb(BASE_GREEN, TIP_GREEN, y / height));
    }

    (positions, colors)
}

// ════════════════════════════════════════════════════════════════════════════
// Spiral path — ornament / photo placement
// ════════════════════════════════════════════════════════════════════════════

/// Point on a rising spiral winding up the tree.
///
/// `t` runs 0 → 1 from the base to the apex: `y = t*height - height/2`,
/// the radius tapers linearly from `bottom_radius` to zero, and the angle
/// winds through `loops` full turns.
pub fn spiral_point(t: f32, height: f32, bottom_radius: f32, loops: f32) -> Vec3 {
    let y = t * height - height / 2.0;
    let radius = bottom_radius * (1.0 - t);
    let angle = t * loops * PI * 2.0;

    Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
}

/// Winding angle of the spiral at `t` (shared by placement code that needs
/// the outward-facing rotation at a spiral point).
pub fn spiral_angle(t: f32, loops: f32) -> f32 {
    t * loops * PI * 2.0
}

// ════════════════════════════════════════════════════════════════════════════
// Torus shell sampler — nebula targets
// ════════════════════════════════════════════════════════════════════════════

/// Random point on a torus with main ring `radius` and cross-section `tube`.
/// Two independent uniform angles: θ around the ring, φ around the tube.
pub fn torus_sample(rng: &mut impl Rng, radius: f32, tube: f32) -> Vec3 {
    let theta = rng.gen::<f32>() * PI * 2.0;
    let phi = rng.gen::<f32>() * PI * 2.0;

    Vec3::new(
        (radius + tube * phi.cos()) * theta.cos(),
        tube * phi.sin(),
        (radius + tube * phi.cos()) * theta.sin(),
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Star outline — the tree topper
// ════════════════════════════════════════════════════════════════════════════

/// Closed 2D outline of a five-pointed star: 10 vertices alternating
/// between `outer` and `inner` radius, evenly spaced by angle, starting at
/// the top point. Suitable for extrusion or polyline rendering; the first
/// vertex is not repeated at the end.
pub fn star_outline(outer: f32, inner: f32) -> Vec<Vec2> {
    const POINTS: usize = 5;
    let mut verts = Vec::with_capacity(POINTS * 2);

    for i in 0..POINTS * 2 {
        let r = if i % 2 == 0 { outer } else { inner };
        let a = (i as f32 / (POINTS * 2) as f32) * PI * 2.0 - PI / 2.0;
        verts.push(Vec2::new(a.cos() * r, a.sin() * r));
    }

    verts
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5EED)
    }

    // ── color helpers ─────────────────────────────────────────────────────

    #[test]
    fn lerp_argb_endpoints_exact() {
        assert_eq!(lerp_argb(BASE_GREEN, TIP_GREEN, 0.0), BASE_GREEN);
        assert_eq!(lerp_argb(BASE_GREEN, TIP_GREEN, 1.0), TIP_GREEN);
    }

    #[test]
    fn lerp_argb_stays_opaque() {
        for i in 0..=10 {
            let c = lerp_argb(0xFF000000, 0xFFFFFFFF, i as f32 / 10.0);
            assert_eq!(c >> 24, 0xFF);
        }
    }

    #[test]
    fn palette_has_five_distinct_colors() {
        for i in 0..ORNAMENT_PALETTE.len() {
            for j in (i + 1)..ORNAMENT_PALETTE.len() {
                assert_ne!(ORNAMENT_PALETTE[i], ORNAMENT_PALETTE[j]);
            }
        }
    }

    // ── cone sampler ──────────────────────────────────────────────────────

    #[test]
    fn cone_points_inside_volume() {
        let (pos, col) = cone_volume(&mut rng(), 2_000, 14.0, 5.0);
        assert_eq!(pos.len(), 2_000);
        assert_eq!(col.len(), 2_000);

        for p in &pos {
            assert!(p.y >= -7.0 && p.y <= 7.0, "y out of range: {}", p.y);
            let r_at = (1.0 - (p.y + 7.0) / 14.0) * 5.0;
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!(r <= r_at + 1e-4, "r {} exceeds cone radius {}", r, r_at);
        }
    }

    /// 100k samples: the angular histogram must be flat, and the squared
    /// normalized radius must be uniform (area-uniform density — the
    /// square-root transform at work). Plain uniform-radius sampling fails
    /// the second check badly.
    #[test]
    fn cone_distribution_is_area_uniform() {
        let (pos, _) = cone_volume(&mut rng(), 100_000, 14.0, 5.0);

        let mut angle_buckets = [0usize; 8];
        let mut radial_buckets = [0usize; 10];
        let mut counted = 0usize;

        for p in &pos {
            let angle = p.z.atan2(p.x) + PI; // 0..2π
            let ai = ((angle / (2.0 * PI)) * 8.0) as usize % 8;
            angle_buckets[ai] += 1;

            let r_at = (1.0 - (p.y + 7.0) / 14.0) * 5.0;
            if r_at < 0.5 {
                continue; // skip the apex, where normalization is noisy
            }
            let u = ((p.x * p.x + p.z * p.z) / (r_at * r_at)).min(0.999_999);
            radial_buckets[(u * 10.0) as usize] += 1;
            counted += 1;
        }

        let angle_mean = pos.len() as f32 / 8.0;
        for (i, &b) in angle_buckets.iter().enumerate() {
            let dev = (b as f32 - angle_mean).abs() / angle_mean;
            assert!(dev < 0.05, "angle bucket {} off by {:.1}%", i, dev * 100.0);
        }

        let radial_mean = counted as f32 / 10.0;
        for (i, &b) in radial_buckets.iter().enumerate() {
            let dev = (b as f32 - radial_mean).abs() / radial_mean;
            assert!(dev < 0.05, "radial bucket {} off by {:.1}%", i, dev * 100.0);
        }
    }

    #[test]
    fn cone_color_gradient_follows_height() {
        let (pos, col) = cone_volume(&mut rng(), 5_000, 14.0, 5.0);
        for (p, &c) in pos.iter().zip(&col) {
            let expected = lerp_argb(BASE_GREEN, TIP_GREEN, (p.y + 7.0) / 14.0);
            assert_eq!(c, expected);
        }
    }

    // ── spiral ────────────────────────────────────────────────────────────

    #[test]
    fn spiral_base_and_apex() {
        let base = spiral_point(0.0, 14.0, 5.0, 5.5);
        assert!((base.y + 7.0).abs() < 1e-6);
        assert!((base.x - 5.0).abs() < 1e-6); // angle 0 → +x at full radius
        assert!(base.z.abs() < 1e-6);

        let apex = spiral_point(1.0, 14.0, 5.0, 5.5);
        assert!((apex.y - 7.0).abs() < 1e-6);
        assert!(apex.x.abs() < 1e-4 && apex.z.abs() < 1e-4); // radius tapers to 0
    }

    #[test]
    fn spiral_radius_tapers_linearly() {
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let p = spiral_point(t, 14.0, 5.0, 5.5);
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!((r - 5.0 * (1.0 - t)).abs() < 1e-4);
        }
    }

    #[test]
    fn spiral_angle_winds_full_loops() {
        assert!((spiral_angle(1.0, 5.5) - 5.5 * 2.0 * PI).abs() < 1e-4);
        assert_eq!(spiral_angle(0.0, 5.5), 0.0);
    }

    // ── torus ─────────────────────────────────────────────────────────────

    #[test]
    fn torus_points_on_shell() {
        let mut r = rng();
        for _ in 0..2_000 {
            let p = torus_sample(&mut r, 15.0, 4.0);
            let ring_dist = (p.x * p.x + p.z * p.z).sqrt();
            // Distance from the ring circle must equal the tube radius.
            let d = ((ring_dist - 15.0).powi(2) + p.y * p.y).sqrt();
            assert!((d - 4.0).abs() < 1e-3, "off-shell distance {}", d);
        }
    }

    // ── star ──────────────────────────────────────────────────────────────

    #[test]
    fn star_alternates_outer_inner() {
        let verts = star_outline(0.8, 0.4);
        assert_eq!(verts.len(), 10);
        for (i, v) in verts.iter().enumerate() {
            let r = v.length();
            let expected = if i % 2 == 0 { 0.8 } else { 0.4 };
            assert!((r - expected).abs() < 1e-5, "vertex {} radius {}", i, r);
        }
    }

    #[test]
    fn star_starts_at_top_point() {
        let verts = star_outline(0.8, 0.4);
        // First vertex lies on the vertical axis at full outer radius.
        assert!(verts[0].x.abs() < 1e-6);
        assert!((verts[0].y.abs() - 0.8).abs() < 1e-5);
    }
}
