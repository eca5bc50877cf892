//! # Effect Instances
//!
//! Per-instance state for one live burst or warp hole, plus everything a
//! spawn request carries.

use std::f32::consts::{FRAC_PI_4, PI};

use bitflags::bitflags;
use nova_core::PoolHandle;
use nova_shared::{Matrix3, Vec3};

use crate::integration::{BitmapId, ObjectHandle, SoundCue};

/// How an instance is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderKind {
    /// Camera-facing bitmap in one of eight fixed orientations.
    #[default]
    SmallBurst,
    /// Camera-facing bitmap at an arbitrary angle.
    LargeBurst,
    /// Warp hole.
    WarpEffect,
}

bitflags! {
    /// Per-instance state bits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct InstanceFlags: u8 {
        /// The close cue has been handled.
        const WARP_CLOSE_SOUND_PLAYED = 1 << 0;
        /// Opened for a huge hull.
        const WARP_CAPITAL_SIZE = 1 << 1;
        /// Opened for a big hull.
        const WARP_CRUISER_SIZE = 1 << 2;
        /// Draw the 3D warp model.
        const WARP_3D = 1 << 3;
    }
}

/// Orientation seed chosen at spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    /// One of eight orientations, 0-7.
    Octant(u8),
    /// Whole degrees, 0-359.
    Degrees(u16),
    /// Warp direction; `reverse` plays the hole closing.
    Warp {
        /// Warp-out: the clip plays backwards.
        reverse: bool,
    },
}

impl Facing {
    /// In-plane rotation for the bitmap, in radians.
    #[must_use]
    pub fn rotation(self) -> f32 {
        match self {
            Self::Octant(octant) => f32::from(octant) * FRAC_PI_4,
            Self::Degrees(degrees) => f32::from(degrees) * PI / 180.0,
            Self::Warp { .. } => 0.0,
        }
    }

    /// True for a warp-out.
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::Warp { reverse: true })
    }
}

/// Size class of whatever opened a warp hole.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HullClass {
    /// Fighters and bombers.
    #[default]
    Small,
    /// Cruisers and the like.
    Big,
    /// Capital ships.
    Huge,
}

/// What the spawning entity is, for warp audio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassHint {
    /// Hull size.
    pub hull: HullClass,
    /// Scales the warp cue's audible range.
    pub warp_sound_range_multiplier: f32,
}

impl ClassHint {
    /// A hint with the default range.
    #[must_use]
    pub const fn new(hull: HullClass) -> Self {
        Self { hull, warp_sound_range_multiplier: 1.0 }
    }
}

/// Everything a spawn request carries.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnParams {
    /// World position.
    pub position: Vec3,
    /// Catalog index.
    pub effect_type: usize,
    /// How to draw it.
    pub render_kind: RenderKind,
    /// Object that caused the effect.
    pub parent: Option<ObjectHandle>,
    /// Object radius.
    pub size: f32,
    /// Warp-out: flip the hole and play it backwards.
    pub reverse: bool,
    /// Constant drift velocity.
    pub velocity: Option<Vec3>,
    /// Requested warp lifetime in seconds; raised to the configured minimum.
    pub warp_lifetime: f32,
    /// Entity that opened the warp.
    pub class_hint: Option<ClassHint>,
    /// Orientation to use instead of the parent's.
    pub orientation_override: Option<Matrix3>,
    /// Draw one tier coarser.
    pub low_res: bool,
    /// Initial flag bits.
    pub extra_flags: InstanceFlags,
    /// Cue to play instead of the usual warp-open sound.
    pub open_sound: Option<SoundCue>,
    /// Cue to play instead of the usual warp-close sound.
    pub close_sound: Option<SoundCue>,
    /// Opening phase length; configured default if `None`.
    pub open_duration: Option<f32>,
    /// Closing phase length; configured default if `None`.
    pub close_duration: Option<f32>,
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            effect_type: 0,
            render_kind: RenderKind::SmallBurst,
            parent: None,
            size: 1.0,
            reverse: false,
            velocity: None,
            warp_lifetime: 0.0,
            class_hint: None,
            orientation_override: None,
            low_res: false,
            extra_flags: InstanceFlags::empty(),
            open_sound: None,
            close_sound: None,
            open_duration: None,
            close_duration: None,
        }
    }
}

impl SpawnParams {
    /// An explosion burst.
    #[must_use]
    pub fn burst(effect_type: usize, render_kind: RenderKind, position: Vec3, size: f32) -> Self {
        Self { position, effect_type, render_kind, size, ..Self::default() }
    }

    /// A warp hole lasting `lifetime` seconds.
    #[must_use]
    pub fn warp(effect_type: usize, position: Vec3, size: f32, lifetime: f32) -> Self {
        Self {
            position,
            effect_type,
            render_kind: RenderKind::WarpEffect,
            size,
            warp_lifetime: lifetime,
            ..Self::default()
        }
    }
}

/// One live effect.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectInstance {
    /// Pool slot.
    pub slot: PoolHandle,
    /// Owning object.
    pub object: ObjectHandle,
    /// Catalog index.
    pub effect_type: usize,
    /// How to draw it.
    pub render_kind: RenderKind,
    /// Seconds since spawn.
    pub elapsed: f32,
    /// Lifetime in seconds.
    pub total: f32,
    /// Detail tier, fixed at spawn.
    pub lod: usize,
    /// Bitmap to draw this frame.
    pub current_frame: Option<BitmapId>,
    /// Orientation seed.
    pub facing: Facing,
    /// Spawn position.
    pub position: Vec3,
    /// Object radius.
    pub radius: f32,
    /// Orientation given to the owning object.
    pub orientation: Matrix3,
    /// Opening phase length.
    pub warp_open_duration: f32,
    /// Closing phase length.
    pub warp_close_duration: f32,
    /// Open cue override.
    pub open_sound: Option<SoundCue>,
    /// Close cue override.
    pub close_sound: Option<SoundCue>,
    /// Audible range scale for warp cues.
    pub warp_sound_range_multiplier: f32,
    /// State bits.
    pub flags: InstanceFlags,
}

impl EffectInstance {
    /// Seconds of life left; negative once expired.
    #[must_use]
    pub fn life_remaining(&self) -> f32 {
        self.total - self.elapsed
    }

    /// Fraction of life left, in `[0, 1]`.
    #[must_use]
    pub fn life_fraction(&self) -> f32 {
        if self.total <= 0.0 {
            return 0.0;
        }
        (self.life_remaining() / self.total).clamp(0.0, 1.0)
    }

    /// True once the instance has outlived its lifetime.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.elapsed > self.total
    }
}
