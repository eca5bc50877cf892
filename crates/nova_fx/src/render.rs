//! # Render Parameters
//!
//! Turns an instance plus its effect type into the numbers the draw code
//! needs. Nothing here submits anything; the host batches the result.
//!
//! ```text
//! elapsed ──► frame clock ──► frame index ──► bitmap
//!    │
//!    └──────► envelope ──► body radius, flare radius
//!    └──────► spin     ──► warp orientation
//! ```

use nova_shared::{Matrix3, Vec3};

use crate::catalog::EffectTypeDefinition;
use crate::curves;
use crate::instance::{EffectInstance, InstanceFlags, RenderKind};
use crate::integration::{BitmapId, ModelId};
use crate::style::{ModelStyle, WarpTiming};

/// Everything needed to draw one instance this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParameters {
    /// How to draw it.
    pub kind: RenderKind,
    /// Bitmap frame to draw.
    pub bitmap: BitmapId,
    /// World position.
    pub position: Vec3,
    /// Drawn radius. For warps, the object radius scaled by the envelope.
    pub radius: f32,
    /// Bitmap rotation for bursts; spin angle for cinematic warps.
    pub rotation: f32,
    /// Warp orientation, spin applied.
    pub orientation: Matrix3,
    /// Body envelope in `[0, 1]`; 1 for bursts.
    pub intensity: f32,
    /// Warp flare radius; 0 for bursts.
    pub flare_radius: f32,
    /// Fraction of life used.
    pub life_used: f32,
    /// Warp flare flicker amplitude.
    pub flicker_magnitude: f32,
    /// Unscaled object radius.
    pub max_radius: f32,
    /// Draw the 3D warp model.
    pub warp_3d: bool,
    /// Warp glow bitmap.
    pub glow: Option<BitmapId>,
    /// Warp ball bitmap.
    pub ball: Option<BitmapId>,
    /// Warp model.
    pub model: Option<ModelId>,
    /// Draw the warp ball flash.
    pub flash: bool,
}

/// Timing of a warp instance right now.
#[must_use]
pub fn warp_timing(instance: &EffectInstance) -> WarpTiming {
    WarpTiming {
        elapsed: instance.elapsed,
        total: instance.total,
        open: instance.warp_open_duration,
        close: instance.warp_close_duration,
    }
}

/// Bitmap frame for the instance's current elapsed time.
///
/// Bursts spread their clip across their lifetime. Warps loop their clip at
/// its own rate (through the cinematic clock if the type uses one) and play
/// it backwards when reversed. `None` if the instance's tier has no loaded
/// animation.
#[must_use]
pub fn select_frame(instance: &EffectInstance, def: &EffectTypeDefinition) -> Option<BitmapId> {
    let animation = def.animation(instance.lod)?;
    let frames = animation.num_frames;

    let frame = match instance.render_kind {
        RenderKind::WarpEffect => {
            let clock = def.model_style.frame_time(&warp_timing(instance), def.frame_anim);
            let frame = curves::looping_frame(clock, animation.fps, frames);
            if instance.facing.is_reverse() {
                curves::mirror_frame(frame, frames)
            } else {
                frame
            }
        }
        RenderKind::SmallBurst | RenderKind::LargeBurst => {
            curves::span_frame(instance.elapsed, instance.total, frames)
        }
    };

    Some(animation.first_frame.frame(frame))
}

/// Derives this frame's draw parameters.
///
/// `position` and `orientation` are the owning object's current values.
/// `None` until the instance has a frame to draw.
#[must_use]
pub fn render_parameters(
    instance: &EffectInstance,
    def: &EffectTypeDefinition,
    position: Vec3,
    orientation: Matrix3,
    standalone: bool,
) -> Option<RenderParameters> {
    let bitmap = instance.current_frame?;
    let radius = instance.radius;

    let mut params = RenderParameters {
        kind: instance.render_kind,
        bitmap,
        position,
        radius,
        rotation: instance.facing.rotation(),
        orientation,
        intensity: 1.0,
        flare_radius: 0.0,
        life_used: 1.0 - instance.life_fraction(),
        flicker_magnitude: 0.0,
        max_radius: radius,
        warp_3d: false,
        glow: None,
        ball: None,
        model: None,
        flash: false,
    };

    if instance.render_kind != RenderKind::WarpEffect {
        return Some(params);
    }

    let timing = warp_timing(instance);
    let intensity = def.model_style.intensity(&timing);

    params.intensity = intensity;
    params.radius = radius * intensity * def.warp_size_ratio;
    params.flare_radius = def.flare_style.flare_radius(radius, def.flare_size_ratio, intensity, &timing);
    params.life_used = timing.life_fraction();
    params.flicker_magnitude = def.flicker_magnitude;

    if def.model_style == ModelStyle::Cinematic {
        let angle = def.model_style.rotation(&timing, def.rot_anim);
        params.rotation = angle;
        params.orientation = orientation.multiply(&Matrix3::from_heading(angle));
    } else {
        params.rotation = 0.0;
    }

    params.warp_3d =
        !standalone && (def.use_3d_warp || instance.flags.contains(InstanceFlags::WARP_3D));
    params.glow = def.glow_bitmap;
    params.ball = def.ball_bitmap;
    params.model = def.model;
    params.flash = def.warp_flash;

    Some(params)
}
