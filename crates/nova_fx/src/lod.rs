//! # Screen-Space LOD Selection
//!
//! Picks a detail tier for a new effect from how wide its LOD0 bitmap would
//! appear on screen. Runs once at spawn; the tier is fixed for the
//! instance's life.
//!
//! ```text
//! project ─► width/bitmap ratio ─► tier 0..3 ─► +1 if behind ─► clamp
//!                                    (spawn) ─► +1 if low-res ─► warp pin ─► clamp
//! ```

use std::f32::consts::FRAC_PI_2;

use nova_shared::{Matrix3, Vec3};

use crate::catalog::{EffectTypeDefinition, MAX_WARP_LOD};
use crate::config::DetailLevel;

/// Tier used when the apparent size cannot be measured.
pub const DEFAULT_TIER: usize = 1;

/// Camera projection used for LOD selection.
pub trait Projector {
    /// Eye position.
    fn eye_position(&self) -> Vec3;

    /// Eye orientation.
    fn eye_orientation(&self) -> Matrix3;

    /// View-space depth of a world point; zero or less is behind the eye.
    fn view_depth(&self, point: Vec3) -> f32 {
        (point - self.eye_position()).dot(self.eye_orientation().fvec)
    }

    /// On-screen width in pixels of an object of `radius` at `depth`.
    ///
    /// `None` if the object cannot be projected.
    fn screen_width(&self, depth: f32, radius: f32) -> Option<f32>;
}

/// Plain perspective camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewCamera {
    /// Eye position.
    pub position: Vec3,
    /// Eye orientation.
    pub orientation: Matrix3,
    /// Horizontal field of view in radians.
    pub fov: f32,
    /// Viewport width in pixels.
    pub viewport_width: f32,
}

impl Default for ViewCamera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Matrix3::IDENTITY,
            fov: FRAC_PI_2,
            viewport_width: 1024.0,
        }
    }
}

impl Projector for ViewCamera {
    fn eye_position(&self) -> Vec3 {
        self.position
    }

    fn eye_orientation(&self) -> Matrix3 {
        self.orientation
    }

    fn screen_width(&self, depth: f32, radius: f32) -> Option<f32> {
        if depth <= 0.0 {
            return None;
        }
        let half_tan = (self.fov * 0.5).tan();
        if half_tan <= 0.0 {
            return None;
        }
        Some(radius * self.viewport_width / (depth * half_tan))
    }
}

/// Tier for a bitmap of `bitmap_width` pixels drawn `width` pixels wide.
///
/// Smaller on screen means a coarser (higher) tier.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn tier_for_width(width: f32, bitmap_width: u32, detail: DetailLevel) -> usize {
    let bm = bitmap_width as f32;
    let (coarse, fine) = match detail {
        DetailLevel::High => (bm / 2.0, 1.56 * bm),
        DetailLevel::Normal => (bm / 3.0, 1.2 * bm),
    };

    if width <= bm / 8.0 {
        3
    } else if width <= coarse {
        2
    } else if width <= fine {
        1
    } else {
        0
    }
}

/// Projected tier for an effect of `radius` at `position`.
///
/// A point behind the eye is measured as if it were the same distance
/// straight ahead, then biased one tier coarser. The result is clamped to
/// the entry's configured tiers.
#[must_use]
pub fn select_lod(
    projector: &dyn Projector,
    position: Vec3,
    radius: f32,
    def: &EffectTypeDefinition,
    detail: DetailLevel,
) -> usize {
    let mut depth = projector.view_depth(position);
    let mut behind = false;

    if depth <= 0.0 {
        let eye = projector.eye_position();
        let ahead = eye.scale_add(projector.eye_orientation().fvec, eye.distance(position));
        depth = projector.view_depth(ahead);
        behind = depth > 0.0;
    }

    let measured = def
        .animation(0)
        .zip(projector.screen_width(depth, radius))
        .map(|(animation, width)| tier_for_width(width, animation.width, detail));

    let mut tier = measured.unwrap_or(DEFAULT_TIER);
    if behind {
        tier += 1;
    }
    tier.min(def.lod_count.saturating_sub(1))
}

/// Final tier at spawn.
///
/// Fixed order: projected tier, low-res bump (clamped), warp-family pin,
/// final clamp.
#[must_use]
pub fn spawn_lod(projected: usize, low_res: bool, warp_family: bool, lod_count: usize) -> usize {
    let last = lod_count.saturating_sub(1);

    let mut tier = projected;
    if low_res {
        tier = (tier + 1).min(last);
    }
    if warp_family {
        tier = MAX_WARP_LOD;
    }
    tier.min(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::{AnimationInfo, BitmapId};

    fn entry(lod_count: usize, bitmap_width: u32) -> EffectTypeDefinition {
        let mut def = EffectTypeDefinition::defaulted(0);
        def.lod_count = lod_count;
        def.lods[0].animation = Some(AnimationInfo {
            first_frame: BitmapId(0),
            num_frames: 10,
            fps: 10.0,
            width: bitmap_width,
        });
        def
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(tier_for_width(8.0, 64, DetailLevel::High), 3);
        assert_eq!(tier_for_width(32.0, 64, DetailLevel::High), 2);
        assert_eq!(tier_for_width(99.0, 64, DetailLevel::High), 1);
        assert_eq!(tier_for_width(101.0, 64, DetailLevel::High), 0);

        assert_eq!(tier_for_width(21.0, 64, DetailLevel::Normal), 2);
        assert_eq!(tier_for_width(32.0, 64, DetailLevel::Normal), 1);
        assert_eq!(tier_for_width(77.0, 64, DetailLevel::Normal), 0);
    }

    #[test]
    fn test_tier_monotone_as_width_shrinks() {
        for detail in [DetailLevel::High, DetailLevel::Normal] {
            let mut previous = 0;
            let mut width = 400.0;
            while width > 0.5 {
                let tier = tier_for_width(width, 128, detail);
                assert!(tier >= previous, "tier fell at width {width}");
                previous = tier;
                width *= 0.9;
            }
            assert_eq!(previous, 3);
        }
    }

    #[test]
    fn test_select_lod_by_distance() {
        let camera = ViewCamera::default();
        let def = entry(4, 64);

        let near = select_lod(&camera, Vec3::new(0.0, 0.0, 10.0), 5.0, &def, DetailLevel::High);
        let far = select_lod(&camera, Vec3::new(0.0, 0.0, 5000.0), 5.0, &def, DetailLevel::High);
        assert_eq!(near, 0);
        assert_eq!(far, 3);
    }

    #[test]
    fn test_behind_is_one_tier_coarser() {
        let camera = ViewCamera::default();
        let def = entry(4, 64);

        // 5 * 1024 / 200 = 25.6 px: tier 2 ahead, tier 3 behind
        let ahead = select_lod(&camera, Vec3::new(0.0, 0.0, 200.0), 5.0, &def, DetailLevel::High);
        let behind = select_lod(&camera, Vec3::new(0.0, 0.0, -200.0), 5.0, &def, DetailLevel::High);
        assert_eq!(ahead, 2);
        assert_eq!(behind, 3);
    }

    #[test]
    fn test_unmeasurable_uses_default_and_clamps() {
        let camera = ViewCamera::default();
        let mut def = entry(4, 64);
        def.lods[0].animation = None;
        assert_eq!(select_lod(&camera, Vec3::Z, 1.0, &def, DetailLevel::High), DEFAULT_TIER);

        def.lod_count = 1;
        assert_eq!(select_lod(&camera, Vec3::Z, 1.0, &def, DetailLevel::High), 0);
    }

    #[test]
    fn test_spawn_order() {
        assert_eq!(spawn_lod(1, true, false, 4), 2);
        assert_eq!(spawn_lod(3, true, false, 4), 3);
        assert_eq!(spawn_lod(2, true, true, 4), MAX_WARP_LOD);
        assert_eq!(spawn_lod(3, false, false, 2), 1);
        assert_eq!(spawn_lod(0, false, false, 1), 0);
    }
}
