//! Parsed table entries.
//!
//! An entry is read in full into an `EntryDelta` of optional fields and then
//! applied over a catalog slot. New slots start from
//! `EffectTypeDefinition::defaulted`, so the only new-versus-override logic
//! left is here in `apply`.

use nova_shared::{MAX_FILENAME_LEN, NAME_LENGTH};

use super::definition::{
    BuiltinEffect, EffectTypeDefinition, CINEMATIC_WARP_SIZE_RATIO, DEFAULT_FRAME_ANIM,
    DEFAULT_ROT_ANIM, MAX_LOD, WARP_3D_SIZE_RATIO,
};
use super::reader::TableReader;
use crate::error::FxResult;
use crate::integration::SoundId;
use crate::style::{FlareStyle, ModelStyle};

/// How a modular entry names the slot it overrides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selector {
    /// One of the six built-in slots.
    Builtin(BuiltinEffect),
    /// Any slot by raw index.
    Custom(i32),
}

/// A `$Warp flare style:` block.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlareDelta {
    /// Chosen style; `None` if the keyword was not recognised.
    pub style: Option<FlareStyle>,
    /// `+Flare size ratio:`, if given.
    pub size_ratio: Option<f32>,
}

/// Cinematic sub-options following `$Warp model style:`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CinematicDelta {
    /// `+Warp size ratio:`.
    pub warp_size_ratio: Option<f32>,
    /// `+Rotation anim:`.
    pub rot_anim: Option<[f32; 3]>,
    /// `+Frame anim:`.
    pub frame_anim: Option<[f32; 3]>,
}

/// Every field a table entry may set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryDelta {
    /// `$Unique ID:`; also used to find the slot to override.
    pub unique_id: Option<String>,
    /// `$Name:`, the LOD0 animation.
    pub filename: String,
    /// Override selector (modular tables only).
    pub selector: Option<Selector>,
    /// `$LOD:`, before clamping.
    pub lod_count: Option<i32>,
    /// `$Light color:` as raw channels.
    pub color: Option<[i32; 3]>,
    /// `$Warp glow:` bitmap.
    pub warp_glow: Option<String>,
    /// `$Warp ball:` bitmap.
    pub warp_ball: Option<String>,
    /// `$Force warp flash:`.
    pub force_warp_flash: Option<bool>,
    /// `$Warp model:`.
    pub warp_model: Option<String>,
    /// `$Force 3D Warp:`.
    pub force_3d_warp: Option<bool>,
    /// `$Warp size ratio:`.
    pub warp_size_ratio: Option<f32>,
    /// `$Flare size ratio:`.
    pub flare_size_ratio: Option<f32>,
    /// `$Flicker magnitude:`.
    pub flicker_magnitude: Option<f32>,
    /// `$Warp flare style:` and its sub-option.
    pub flare: Option<FlareDelta>,
    /// `$Warp model style:`; `None` when absent or unrecognised.
    pub model_style: Option<ModelStyle>,
    /// Cinematic sub-options, kept even for other styles.
    pub cinematic: CinematicDelta,
    /// `$Warp open sound:` index.
    pub open_sound: Option<i32>,
    /// `$Warp close sound:` index.
    pub close_sound: Option<i32>,
}

impl EntryDelta {
    /// Reads one entry, starting at `$Unique ID:` or `$Name:`.
    ///
    /// Override selectors are only recognised in modular tables.
    ///
    /// # Errors
    ///
    /// `FxError::ConfigParse` on any malformed token or value.
    pub fn parse(reader: &mut TableReader<'_>, modular: bool) -> FxResult<Self> {
        let mut delta = Self::default();

        if reader.optional("$Unique ID:") {
            delta.unique_id = Some(read_bounded(reader, NAME_LENGTH)?);
        }

        reader.required("$Name:")?;
        delta.filename = read_bounded(reader, MAX_FILENAME_LEN)?;

        if modular {
            delta.selector = Self::parse_selector(reader)?;
        }

        if reader.optional("$LOD:") {
            delta.lod_count = Some(reader.int()?);
        }
        if reader.optional("$Light color:") {
            delta.color = Some([reader.int()?, reader.int()?, reader.int()?]);
        }
        if reader.optional("$Warp glow:") {
            delta.warp_glow = Some(read_bounded(reader, NAME_LENGTH)?);
        }
        if reader.optional("$Warp ball:") {
            delta.warp_ball = Some(read_bounded(reader, NAME_LENGTH)?);
        }
        if reader.optional("$Force warp flash:") {
            delta.force_warp_flash = Some(reader.boolean()?);
        }
        if reader.optional("$Warp model:") {
            delta.warp_model = Some(read_bounded(reader, NAME_LENGTH)?);
        }
        if reader.optional("$Force 3D Warp:") {
            delta.force_3d_warp = Some(reader.boolean()?);
        }
        if reader.optional("$Warp size ratio:") {
            delta.warp_size_ratio = Some(reader.float()?);
        }
        if reader.optional("$Flare size ratio:") {
            delta.flare_size_ratio = Some(reader.float()?);
        }
        if reader.optional("$Flicker magnitude:") {
            delta.flicker_magnitude = Some(reader.float()?);
        }

        if reader.optional("$Warp flare style:") {
            let keyword = reader.keyword()?;
            let style = FlareStyle::from_keyword(keyword);
            if style.is_none() {
                tracing::warn!(
                    table = reader.name(),
                    line = reader.line(),
                    keyword,
                    "invalid warp flare style; must be classic, enhanced, or cinematic"
                );
            }
            let size_ratio = if reader.optional("+Flare size ratio:") {
                Some(reader.float()?)
            } else {
                None
            };
            delta.flare = Some(FlareDelta { style, size_ratio });
        }

        if reader.optional("$Warp model style:") {
            let keyword = reader.keyword()?;
            delta.model_style = ModelStyle::from_keyword(keyword);
            if delta.model_style.is_none() {
                tracing::warn!(
                    table = reader.name(),
                    line = reader.line(),
                    keyword,
                    "invalid warp model style; must be classic or cinematic"
                );
            }
        }

        // Read whenever present; `apply` ignores them for non-cinematic entries.
        if reader.optional("+Warp size ratio:") {
            delta.cinematic.warp_size_ratio = Some(reader.float()?);
        }
        if reader.optional("+Rotation anim:") {
            delta.cinematic.rot_anim = Some(reader.float_list::<3>()?);
        }
        if reader.optional("+Frame anim:") {
            delta.cinematic.frame_anim = Some(reader.float_list::<3>()?);
        }

        if reader.optional("$Warp open sound:") {
            delta.open_sound = Some(reader.int()?);
        }
        if reader.optional("$Warp close sound:") {
            delta.close_sound = Some(reader.int()?);
        }

        Ok(delta)
    }

    fn parse_selector(reader: &mut TableReader<'_>) -> FxResult<Option<Selector>> {
        for builtin in BuiltinEffect::ALL {
            if reader.optional(builtin.selector()) {
                return Ok(Some(Selector::Builtin(builtin)));
            }
        }
        if reader.optional("+Custom_Fireball") {
            reader.optional(":");
            return Ok(Some(Selector::Custom(reader.int()?)));
        }
        Ok(None)
    }

    /// Writes this entry over `def`.
    ///
    /// `is_new` is true when `def` was freshly defaulted for this entry;
    /// a few fields are only defaulted the first time.
    pub fn apply(&self, def: &mut EffectTypeDefinition, is_new: bool) {
        if let Some(id) = &self.unique_id {
            def.unique_id.clone_from(id);
        }
        def.lods[0].filename.clone_from(&self.filename);

        if let Some(count) = self.lod_count {
            def.lod_count = usize::try_from(count).unwrap_or(0).min(MAX_LOD);
        } else if is_new {
            def.lod_count = 1;
        }

        if let Some([r, g, b]) = self.color {
            def.color = [r, g, b].map(channel);
        }

        if let Some(glow) = &self.warp_glow {
            def.warp_glow.clone_from(glow);
        }
        if let Some(ball) = &self.warp_ball {
            def.warp_ball.clone_from(ball);
            def.warp_flash = true;
        }
        if let Some(flash) = self.force_warp_flash {
            def.warp_flash = flash;
        }
        if let Some(model) = &self.warp_model {
            def.warp_model.clone_from(model);
            def.use_3d_warp = true;
        }
        if let Some(force) = self.force_3d_warp {
            def.use_3d_warp = force;
        }

        if let Some(ratio) = self.warp_size_ratio {
            def.warp_size_ratio = ratio;
        } else if is_new {
            def.warp_size_ratio = if def.use_3d_warp { WARP_3D_SIZE_RATIO } else { 1.0 };
        }
        if let Some(ratio) = self.flare_size_ratio {
            def.flare_size_ratio = ratio;
        }
        if let Some(flicker) = self.flicker_magnitude {
            def.flicker_magnitude = flicker;
        }

        if let Some(flare) = self.flare {
            if let Some(style) = flare.style {
                def.flare_style = style;
            }
            if let Some(ratio) = flare.size_ratio.or(def.flare_style.default_size_ratio()) {
                def.flare_size_ratio = ratio;
            }
        }

        if let Some(style) = self.model_style {
            def.model_style = style;
        }

        if def.model_style == ModelStyle::Cinematic {
            let cinematic = &self.cinematic;
            def.warp_size_ratio = cinematic.warp_size_ratio.unwrap_or(CINEMATIC_WARP_SIZE_RATIO);
            def.rot_anim = cinematic.rot_anim.map_or(DEFAULT_ROT_ANIM, |[a, b, c]| {
                [a.clamp(0.0, 2.0), b.clamp(0.0, 2.0), c.max(0.0)]
            });
            def.frame_anim = cinematic.frame_anim.map_or(DEFAULT_FRAME_ANIM, |[a, b, c]| {
                [a.clamp(0.0, 4.0), b.clamp(1.0, 4.0), c.max(0.0)]
            });
        } else if self.cinematic != CinematicDelta::default() {
            tracing::debug!(
                entry = %def.unique_id,
                "cinematic warp options ignored for non-cinematic model style"
            );
        }

        if let Some(id) = self.open_sound {
            def.open_sound = sound_id(id);
        }
        if let Some(id) = self.close_sound {
            def.close_sound = sound_id(id);
        }
    }
}

/// 0-255 table color channel to 0-1.
fn channel(value: i32) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let value = value.clamp(0, 255) as f32;
    value / 255.0
}

/// Negative ids clear the cue.
fn sound_id(id: i32) -> Option<SoundId> {
    u32::try_from(id).ok().map(SoundId)
}

/// Reads a string value, truncated to fit a fixed field of `width` bytes
/// (terminator included).
fn read_bounded(reader: &mut TableReader<'_>, width: usize) -> FxResult<String> {
    let value = reader.string()?;
    let limit = width - 1;
    if value.len() <= limit {
        return Ok(value);
    }

    let mut end = limit;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    tracing::warn!(
        table = reader.name(),
        line = reader.line(),
        value = %value,
        limit,
        "value too long; truncated"
    );
    Ok(value[..end].to_string())
}
