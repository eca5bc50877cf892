//! # Timing Curves
//!
//! Stateless, closed-form functions of elapsed time. Everything that
//! animates an effect is derived from these on demand; no curve keeps state
//! between frames.
//!
//! All times are in seconds.

/// Blends from an initial rate into a steady linear rate.
///
/// `scale - scale * e^(-start_slope / scale * t) + end_slope * t`
///
/// The slope at `t = 0` is `start_slope + end_slope`; after a few multiples
/// of `scale / start_slope` it settles to `end_slope`. Drives the cinematic
/// warp rotation angle and its variable-speed frame playback.
#[inline]
#[must_use]
pub fn exp_to_line(t: f32, start_slope: f32, end_slope: f32, scale: f32) -> f32 {
    if scale.abs() <= f32::EPSILON {
        // exponential term has fully saturated
        return end_slope * t;
    }
    scale - scale * (-start_slope / scale * t).exp() + end_slope * t
}

/// Sharply saturating ramp from 0 toward 1: `a / (a + 1)` with `a = 25 t^4`.
#[inline]
#[must_use]
pub fn saturating_ease(t: f32) -> f32 {
    let a = 25.0 * t.powi(4);
    a / (a + 1.0)
}

/// Classic warp envelope: power-law open, flat middle, power-law close.
///
/// Reaches exactly `1.0` once the open phase is over and stays there until
/// the close phase begins.
#[must_use]
pub fn classic_intensity(t: f32, total: f32, open: f32, close: f32) -> f32 {
    if t < open {
        (t / open).max(0.0).powf(0.4)
    } else if t < total - close {
        1.0
    } else {
        ((total - t) / close).max(0.0).powf(0.4)
    }
}

/// Cinematic warp envelope.
///
/// Product of an opening ease and a closing ease, each normalised by its
/// value at the half-way point, so the envelope is 1 at `total / 2` no
/// matter how the durations are configured.
#[must_use]
pub fn cinematic_intensity(t: f32, total: f32, open: f32, close: f32) -> f32 {
    let half = total / 2.0;
    let opening = saturating_ease(t.max(0.0) / open) / saturating_ease(half / open);
    let closing = saturating_ease((total - t).max(0.0) / close) / saturating_ease(half / close);
    opening * closing
}

/// Cinematic flare radius multiplier.
///
/// Two cubic-exponential saturation terms in opening-relative time give a
/// bloom that overshoots and settles; a decay in remaining time fades it
/// out as the hole closes.
#[must_use]
pub fn cinematic_flare(t: f32, total: f32, open: f32, close: f32) -> f32 {
    let x = (1.7 * t / open).powi(3);
    let bloom = 2.0 * (1.0 - (-4.0 * x).exp()) - (1.0 - (-2.0 * x).exp());
    let fade = 1.0 - (-2.0 * (total - t).max(0.0) / close).exp();
    bloom * fade
}

/// Enhanced flare bonus: a sharp spike at both ends of the effect's life.
#[inline]
#[must_use]
pub fn enhanced_flare_spike(life_fraction: f32) -> f32 {
    (2.0 * life_fraction - 1.0).powi(24)
}

/// Maps elapsed time linearly across `total` onto `num_frames` frames.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn span_frame(elapsed: f32, total: f32, num_frames: u32) -> u32 {
    if num_frames == 0 || total <= 0.0 {
        return 0;
    }
    let frame = (elapsed.max(0.0) / total * num_frames as f32) as u32;
    frame.min(num_frames - 1)
}

/// Plays `num_frames` frames at `fps`, wrapping around at the end.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn looping_frame(elapsed: f32, fps: f32, num_frames: u32) -> u32 {
    if num_frames == 0 || fps <= 0.0 {
        return 0;
    }
    ((elapsed.max(0.0) * fps) as u32) % num_frames
}

/// Mirrors a frame index so a clip plays backwards.
#[inline]
#[must_use]
pub fn mirror_frame(frame: u32, num_frames: u32) -> u32 {
    num_frames.saturating_sub(frame + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exp_to_line_starts_at_zero() {
        for &(s0, s1, scale) in &[(1.0, 1.0, 3.0), (0.365, 0.083, 2.0), (4.0, 0.0, 0.5), (2.0, 3.0, 0.0)] {
            assert_eq!(exp_to_line(0.0, s0, s1, scale), 0.0);
        }
    }

    #[test]
    fn test_exp_to_line_settles_to_end_slope() {
        let (s0, s1, scale) = (2.0, 0.5, 1.0);
        let late = exp_to_line(50.0, s0, s1, scale);
        // offset approaches `scale` once the exponential has died out
        assert!((late - (scale + s1 * 50.0)).abs() < 1e-4);

        let slope = exp_to_line(50.01, s0, s1, scale) - late;
        assert!((slope / 0.01 - s1).abs() < 1e-2);
    }

    #[test]
    fn test_saturating_ease_boundaries() {
        assert_eq!(saturating_ease(0.0), 0.0);
        assert_eq!(saturating_ease(1.0), 25.0 / 26.0);
    }

    #[test]
    fn test_saturating_ease_strictly_increasing() {
        let mut previous = saturating_ease(0.0);
        for i in 1..=1000 {
            let value = saturating_ease(i as f32 / 1000.0);
            assert!(value > previous, "not increasing at step {i}");
            previous = value;
        }
    }

    #[test]
    fn test_classic_intensity_scenario() {
        let (total, open, close) = (10.0, 2.35, 2.35);
        assert_eq!(classic_intensity(0.0, total, open, close), 0.0);
        assert_eq!(classic_intensity(5.0, total, open, close), 1.0);
        assert_eq!(classic_intensity(10.0, total, open, close), 0.0);
        assert!(classic_intensity(9.99, total, open, close) < 0.15);
        // lingering tick past the end stays finite
        assert_eq!(classic_intensity(10.2, total, open, close), 0.0);
    }

    #[test]
    fn test_cinematic_intensity_is_one_at_midpoint() {
        for &(total, open, close) in &[(10.0, 2.35, 2.35), (6.0, 1.0, 4.0), (20.0, 5.0, 0.5)] {
            let mid = cinematic_intensity(total / 2.0, total, open, close);
            assert!((mid - 1.0).abs() < 1e-5, "midpoint {mid} for {total}/{open}/{close}");
        }
        assert_eq!(cinematic_intensity(0.0, 10.0, 2.35, 2.35), 0.0);
        assert_eq!(cinematic_intensity(10.0, 10.0, 2.35, 2.35), 0.0);
    }

    #[test]
    fn test_cinematic_flare_blooms_then_fades() {
        let (total, open, close) = (10.0, 2.35, 2.35);
        assert_eq!(cinematic_flare(0.0, total, open, close), 0.0);

        let peak = (1..100)
            .map(|i| cinematic_flare(i as f32 * 0.05, total, open, close))
            .fold(0.0f32, f32::max);
        let settled = cinematic_flare(5.0, total, open, close);
        assert!(peak > settled, "flare should overshoot before settling");
        assert!(settled > 0.95 && settled < 1.0);
        assert_eq!(cinematic_flare(total, total, open, close), 0.0);
    }

    #[test]
    fn test_enhanced_spike() {
        assert_eq!(enhanced_flare_spike(0.5), 0.0);
        assert_eq!(enhanced_flare_spike(0.0), 1.0);
        assert_eq!(enhanced_flare_spike(1.0), 1.0);
    }

    #[test]
    fn test_span_frame() {
        assert_eq!(span_frame(0.0, 2.0, 30), 0);
        assert_eq!(span_frame(1.0, 2.0, 30), 15);
        assert_eq!(span_frame(2.0, 2.0, 30), 29);
        assert_eq!(span_frame(5.0, 2.0, 30), 29);
        assert_eq!(span_frame(1.0, 0.0, 30), 0);
    }

    #[test]
    fn test_looping_and_mirror() {
        assert_eq!(looping_frame(0.0, 20.0, 10), 0);
        assert_eq!(looping_frame(0.25, 20.0, 10), 5);
        assert_eq!(looping_frame(0.55, 20.0, 10), 1);
        assert_eq!(mirror_frame(0, 10), 9);
        assert_eq!(mirror_frame(9, 10), 0);
    }
}
