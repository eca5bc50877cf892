//! Effect type definitions - one per catalog slot.

use crate::integration::{AnimationInfo, BitmapId, ModelId, SoundId};
use crate::style::{FlareStyle, ModelStyle};

/// Maximum number of LOD tiers an effect type may configure.
pub const MAX_LOD: usize = 4;

/// Finest (and only) LOD tier warp-family effects ever use.
pub const MAX_WARP_LOD: usize = 0;

/// Number of built-in catalog slots.
pub const NUM_BUILTIN: usize = 6;

/// Default `[start rate, end rate, timescale]` for cinematic spin.
pub const DEFAULT_ROT_ANIM: [f32; 3] = [0.365, 0.083, 2.0];

/// Default `[start rate, end rate, timescale]` for cinematic playback.
pub const DEFAULT_FRAME_ANIM: [f32; 3] = [1.0, 1.0, 3.0];

/// Warp body size ratio when a cinematic model style sets none.
pub const CINEMATIC_WARP_SIZE_RATIO: f32 = 1.6;

/// Warp body size ratio for a 3D warp model.
pub const WARP_3D_SIZE_RATIO: f32 = 1.0 / 25.0;

/// Default flicker magnitude.
pub const DEFAULT_FLICKER: f32 = 0.10;

/// The six catalog slots every base table provides, in slot order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BuiltinEffect {
    /// Medium explosion burst.
    MediumExplosion = 0,
    /// Standard warp hole.
    Warp = 1,
    /// Special warp variant.
    Knossos = 2,
    /// Asteroid break-up burst.
    Asteroid = 3,
    /// Large explosion, first variant.
    LargeExplosion1 = 4,
    /// Large explosion, second variant.
    LargeExplosion2 = 5,
}

impl BuiltinEffect {
    /// All built-ins in slot order.
    pub const ALL: [Self; NUM_BUILTIN] = [
        Self::MediumExplosion,
        Self::Warp,
        Self::Knossos,
        Self::Asteroid,
        Self::LargeExplosion1,
        Self::LargeExplosion2,
    ];

    /// Built-in occupying catalog slot `index`, if any.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Catalog slot of this built-in.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Modular-table token that selects this built-in for override.
    #[must_use]
    pub const fn selector(self) -> &'static str {
        match self {
            Self::MediumExplosion => "+Explosion_Medium",
            Self::Warp => "+Warp_Effect",
            Self::Knossos => "+Knossos_Effect",
            Self::Asteroid => "+Asteroid",
            Self::LargeExplosion1 => "+Explosion_Large1",
            Self::LargeExplosion2 => "+Explosion_Large2",
        }
    }

    /// Unique id given to the slot when the table names none.
    #[must_use]
    pub const fn default_unique_id(self) -> &'static str {
        match self {
            Self::MediumExplosion => "Medium Explosion",
            Self::Warp => "Warp Effect",
            Self::Knossos => "Knossos Effect",
            Self::Asteroid => "Asteroid Explosion",
            Self::LargeExplosion1 => "Large Explosion 1",
            Self::LargeExplosion2 => "Large Explosion 2",
        }
    }

    /// True for the warp hole and its special variant.
    #[must_use]
    pub const fn is_warp_family(self) -> bool {
        matches!(self, Self::Warp | Self::Knossos)
    }

    /// Light color for the slot (RGB, 0-1).
    #[must_use]
    pub const fn default_color(self) -> [f32; 3] {
        match self {
            Self::MediumExplosion | Self::Asteroid | Self::LargeExplosion1 | Self::LargeExplosion2 => {
                [1.0, 0.5, 0.125] // Orange
            }
            Self::Warp => [0.75, 0.75, 1.0],    // Pale blue
            Self::Knossos => [0.75, 1.0, 0.75], // Pale green
        }
    }
}

/// True if catalog slot `index` is a warp-family built-in.
#[must_use]
pub fn is_warp_family_index(index: usize) -> bool {
    BuiltinEffect::from_index(index).is_some_and(BuiltinEffect::is_warp_family)
}

/// One LOD tier of an effect type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LodEntry {
    /// Animation filename (no extension).
    pub filename: String,
    /// Loaded animation, once `load_data` has run.
    pub animation: Option<AnimationInfo>,
}

/// A named, table-configured effect template.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectTypeDefinition {
    /// Case-insensitive unique id.
    pub unique_id: String,
    /// LOD tiers; only the first `lod_count` are meaningful.
    pub lods: [LodEntry; MAX_LOD],
    /// Number of configured LOD tiers.
    pub lod_count: usize,
    /// Light color (RGB, 0-1).
    pub color: [f32; 3],
    /// Warp glow bitmap name.
    pub warp_glow: String,
    /// Warp ball bitmap name.
    pub warp_ball: String,
    /// Warp model filename.
    pub warp_model: String,
    /// Draw the warp ball flash.
    pub warp_flash: bool,
    /// Always use the 3D warp model.
    pub use_3d_warp: bool,
    /// Warp body radius relative to the object radius.
    pub warp_size_ratio: f32,
    /// Flare radius relative to the object radius.
    pub flare_size_ratio: f32,
    /// Flare flicker amplitude.
    pub flicker_magnitude: f32,
    /// Flare animation style.
    pub flare_style: FlareStyle,
    /// Body animation style.
    pub model_style: ModelStyle,
    /// Cinematic spin coefficients.
    pub rot_anim: [f32; 3],
    /// Cinematic playback coefficients.
    pub frame_anim: [f32; 3],
    /// Type-default warp open cue.
    pub open_sound: Option<SoundId>,
    /// Type-default warp close cue.
    pub close_sound: Option<SoundId>,
    /// Loaded warp glow.
    pub glow_bitmap: Option<BitmapId>,
    /// Loaded warp ball.
    pub ball_bitmap: Option<BitmapId>,
    /// Loaded warp model.
    pub model: Option<ModelId>,
    /// Referenced by something in the current mission.
    pub used: bool,
}

impl EffectTypeDefinition {
    /// A fully defaulted definition for catalog slot `index`.
    ///
    /// Every field is either a documented default or empty; parsed table
    /// values are applied over this.
    #[must_use]
    pub fn defaulted(index: usize) -> Self {
        let builtin = BuiltinEffect::from_index(index);

        let unique_id = match builtin {
            Some(b) => b.default_unique_id().to_string(),
            None => format!("Custom Effect {}", index - NUM_BUILTIN + 1),
        };
        let color = builtin.map_or([1.0, 1.0, 1.0], BuiltinEffect::default_color);

        let (warp_glow, warp_ball, warp_model) = if builtin.is_some_and(BuiltinEffect::is_warp_family) {
            ("warpglow01", "warpball01", "warp.pof")
        } else {
            ("", "", "")
        };

        Self {
            unique_id,
            lods: Default::default(),
            lod_count: 1,
            color,
            warp_glow: warp_glow.to_string(),
            warp_ball: warp_ball.to_string(),
            warp_model: warp_model.to_string(),
            warp_flash: false,
            use_3d_warp: false,
            warp_size_ratio: 1.0,
            flare_size_ratio: 1.0,
            flicker_magnitude: DEFAULT_FLICKER,
            flare_style: FlareStyle::Classic,
            model_style: ModelStyle::Classic,
            rot_anim: [0.0; 3],
            frame_anim: [0.0; 3],
            open_sound: None,
            close_sound: None,
            glow_bitmap: None,
            ball_bitmap: None,
            model: None,
            used: false,
        }
    }

    /// Base (LOD0) animation filename.
    #[must_use]
    pub fn base_filename(&self) -> &str {
        &self.lods[0].filename
    }

    /// Configured LOD tiers.
    #[must_use]
    pub fn active_lods(&self) -> &[LodEntry] {
        &self.lods[..self.lod_count.min(MAX_LOD)]
    }

    /// Loaded animation for a tier, if any.
    #[must_use]
    pub fn animation(&self, lod: usize) -> Option<&AnimationInfo> {
        self.active_lods().get(lod)?.animation.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_round_trip_indices() {
        for (index, builtin) in BuiltinEffect::ALL.iter().enumerate() {
            assert_eq!(builtin.index(), index);
            assert_eq!(BuiltinEffect::from_index(index), Some(*builtin));
        }
        assert_eq!(BuiltinEffect::from_index(NUM_BUILTIN), None);
    }

    #[test]
    fn test_default_colors_by_family() {
        assert_eq!(EffectTypeDefinition::defaulted(0).color, [1.0, 0.5, 0.125]);
        assert_eq!(EffectTypeDefinition::defaulted(3).color, [1.0, 0.5, 0.125]);
        assert_eq!(EffectTypeDefinition::defaulted(1).color, [0.75, 0.75, 1.0]);
        assert_eq!(EffectTypeDefinition::defaulted(2).color, [0.75, 1.0, 0.75]);
        assert_eq!(EffectTypeDefinition::defaulted(9).color, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_default_ids_and_warp_assets() {
        let warp = EffectTypeDefinition::defaulted(BuiltinEffect::Warp.index());
        assert_eq!(warp.unique_id, "Warp Effect");
        assert_eq!(warp.warp_glow, "warpglow01");
        assert_eq!(warp.warp_model, "warp.pof");
        assert_eq!(warp.lod_count, 1);

        let custom = EffectTypeDefinition::defaulted(NUM_BUILTIN + 2);
        assert_eq!(custom.unique_id, "Custom Effect 3");
        assert!(custom.warp_glow.is_empty());
    }

    #[test]
    fn test_warp_family() {
        assert!(is_warp_family_index(1));
        assert!(is_warp_family_index(2));
        assert!(!is_warp_family_index(0));
        assert!(!is_warp_family_index(40));
    }
}
