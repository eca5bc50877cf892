//! Warp visual styles.
//!
//! Each style is a closed enum; the math for every behaviour it controls
//! (intensity envelope, frame clock, rotation, flare) sits in one `match`.

use std::f32::consts::PI;

use crate::curves;

/// Timing of a warp instance at one moment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpTiming {
    /// Seconds since spawn.
    pub elapsed: f32,
    /// Total lifetime in seconds.
    pub total: f32,
    /// Opening phase length.
    pub open: f32,
    /// Closing phase length.
    pub close: f32,
}

impl WarpTiming {
    /// Fraction of life already used, `elapsed / total`.
    #[must_use]
    pub fn life_fraction(&self) -> f32 {
        if self.total > 0.0 {
            self.elapsed / self.total
        } else {
            1.0
        }
    }

    /// `2 / open`: compresses the animation coefficients to the open phase.
    fn duration_ratio(&self) -> f32 {
        2.0 / self.open
    }
}

/// How the warp flare grows and fades.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlareStyle {
    /// Flare follows the body envelope.
    #[default]
    Classic,
    /// Body envelope plus a flash at open and close.
    Enhanced,
    /// Independent bloom-then-fade curve.
    Cinematic,
}

impl FlareStyle {
    /// Parses a table keyword (case-insensitive).
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "classic" => Some(Self::Classic),
            "enhanced" => Some(Self::Enhanced),
            "cinematic" => Some(Self::Cinematic),
            _ => None,
        }
    }

    /// Flare size ratio implied by choosing this style, if it implies one.
    #[must_use]
    pub const fn default_size_ratio(self) -> Option<f32> {
        match self {
            Self::Classic => Some(1.0),
            Self::Cinematic => Some(5.3),
            Self::Enhanced => None,
        }
    }

    /// Flare radius for an object of `radius`.
    ///
    /// `intensity` is the body envelope at the same moment.
    #[must_use]
    pub fn flare_radius(self, radius: f32, size_ratio: f32, intensity: f32, timing: &WarpTiming) -> f32 {
        let base = radius * size_ratio;
        match self {
            Self::Classic => base * intensity,
            Self::Enhanced => {
                base + curves::enhanced_flare_spike(timing.life_fraction()) * radius * 1.5 * size_ratio
            }
            Self::Cinematic => {
                base * curves::cinematic_flare(timing.elapsed, timing.total, timing.open, timing.close)
            }
        }
    }
}

/// How the warp body (hole, model, rotation) animates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModelStyle {
    /// Power-law envelope, fixed-rate playback, no spin.
    #[default]
    Classic,
    /// Eased envelope, variable-rate playback, spin.
    Cinematic,
}

impl ModelStyle {
    /// Parses a table keyword (case-insensitive).
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "classic" => Some(Self::Classic),
            "cinematic" => Some(Self::Cinematic),
            _ => None,
        }
    }

    /// Body intensity envelope in `[0, 1]`.
    #[must_use]
    pub fn intensity(self, timing: &WarpTiming) -> f32 {
        let WarpTiming { elapsed, total, open, close } = *timing;
        match self {
            Self::Classic => curves::classic_intensity(elapsed, total, open, close),
            Self::Cinematic => curves::cinematic_intensity(elapsed, total, open, close),
        }
    }

    /// Clip time to sample the animation at.
    ///
    /// `frame_anim` is `[start rate, end rate, timescale]`.
    #[must_use]
    pub fn frame_time(self, timing: &WarpTiming, frame_anim: [f32; 3]) -> f32 {
        match self {
            Self::Classic => timing.elapsed,
            Self::Cinematic => {
                let ratio = timing.duration_ratio();
                curves::exp_to_line(
                    timing.elapsed,
                    frame_anim[0] * ratio,
                    frame_anim[1],
                    frame_anim[2] * ratio,
                )
            }
        }
    }

    /// Spin angle in radians about the heading axis.
    ///
    /// `rot_anim` is `[start rate, end rate, timescale]`; the rates are in
    /// multiples of pi per second.
    #[must_use]
    pub fn rotation(self, timing: &WarpTiming, rot_anim: [f32; 3]) -> f32 {
        match self {
            Self::Classic => 0.0,
            Self::Cinematic => {
                let ratio = timing.duration_ratio();
                curves::exp_to_line(
                    timing.elapsed,
                    PI * rot_anim[0] * ratio,
                    PI * rot_anim[1],
                    rot_anim[2] * ratio,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(elapsed: f32) -> WarpTiming {
        WarpTiming { elapsed, total: 10.0, open: 2.35, close: 2.35 }
    }

    #[test]
    fn test_keywords() {
        assert_eq!(FlareStyle::from_keyword("Cinematic"), Some(FlareStyle::Cinematic));
        assert_eq!(FlareStyle::from_keyword("enhanced"), Some(FlareStyle::Enhanced));
        assert_eq!(ModelStyle::from_keyword("enhanced"), None);
        assert_eq!(ModelStyle::from_keyword("CLASSIC"), Some(ModelStyle::Classic));
    }

    #[test]
    fn test_classic_model_is_plain_clock() {
        let t = timing(3.3);
        assert_eq!(ModelStyle::Classic.frame_time(&t, [1.0, 1.0, 3.0]), 3.3);
        assert_eq!(ModelStyle::Classic.rotation(&t, [0.365, 0.083, 2.0]), 0.0);
        assert_eq!(ModelStyle::Classic.intensity(&timing(5.0)), 1.0);
    }

    #[test]
    fn test_cinematic_model_runs_fast_then_settles() {
        let anim = [1.0, 1.0, 3.0];
        let early = ModelStyle::Cinematic.frame_time(&timing(0.5), anim);
        // initial rate is start * ratio + end, faster than real time
        assert!(early > 0.5);
        assert_eq!(ModelStyle::Cinematic.frame_time(&timing(0.0), anim), 0.0);
        assert_eq!(ModelStyle::Cinematic.rotation(&timing(0.0), [0.365, 0.083, 2.0]), 0.0);
        assert!(ModelStyle::Cinematic.rotation(&timing(1.0), [0.365, 0.083, 2.0]) > 0.0);
    }

    #[test]
    fn test_flare_styles() {
        let t = timing(5.0);
        let intensity = ModelStyle::Classic.intensity(&t);
        assert_eq!(FlareStyle::Classic.flare_radius(10.0, 1.0, intensity, &t), 10.0);
        // spike vanishes at mid-life
        assert_eq!(FlareStyle::Enhanced.flare_radius(10.0, 2.0, intensity, &t), 20.0);

        let end = timing(10.0);
        assert_eq!(FlareStyle::Cinematic.flare_radius(10.0, 5.3, 0.0, &end), 0.0);
        assert_eq!(FlareStyle::Enhanced.flare_radius(10.0, 2.0, 0.0, &end), 20.0 + 30.0);
    }

    #[test]
    fn test_style_size_ratio_defaults() {
        assert_eq!(FlareStyle::Classic.default_size_ratio(), Some(1.0));
        assert_eq!(FlareStyle::Cinematic.default_size_ratio(), Some(5.3));
        assert_eq!(FlareStyle::Enhanced.default_size_ratio(), None);
    }
}
