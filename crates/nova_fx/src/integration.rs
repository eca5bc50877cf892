//! # Collaborator Traits
//!
//! The effect subsystem owns its catalog and instance pool and nothing else.
//! Object lifecycle, audio and asset loading belong to other units; they
//! implement the traits here.
//!
//! ```text
//! nova_fx defines:     Host implements:
//! ┌──────────────┐    ┌──────────────┐
//! │ trait Foo    │ ←─ │ impl Foo     │
//! └──────────────┘    └──────────────┘
//! ```

use nova_core::PoolHandle;
use nova_shared::{Matrix3, Vec3};

// ============================================================================
// IDS
// ============================================================================

/// Handle of an object owned by the host's object system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u32);

/// A loaded bitmap. Animation frames are consecutive ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitmapId(pub u32);

impl BitmapId {
    /// Id of the `frame`-th frame of an animation starting at `self`.
    #[must_use]
    pub const fn frame(self, frame: u32) -> Self {
        Self(self.0 + frame)
    }
}

/// A loaded 3D model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelId(pub u32);

/// A table-defined sound entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundId(pub u32);

/// Built-in game sounds the subsystem falls back to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameSound {
    /// Standard warp hole opening.
    WarpIn,
    /// Warp hole opening for a capital ship.
    CapitalWarpIn,
    /// Warp hole closing for a capital ship.
    CapitalWarpOut,
}

/// What to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// A built-in game sound.
    Game(GameSound),
    /// A specific table entry.
    Entry(SoundId),
}

/// Mixing priority for a 3D cue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundPriority {
    /// At most one instance audible.
    SingleInstance,
    /// At most two instances audible.
    DoubleInstance,
}

/// Metadata for a loaded bitmap animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationInfo {
    /// First frame; later frames follow consecutively.
    pub first_frame: BitmapId,
    /// Number of frames in the clip.
    pub num_frames: u32,
    /// Playback rate in frames per second.
    pub fps: f32,
    /// Frame width in pixels.
    pub width: u32,
}

impl AnimationInfo {
    /// Clip length in seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self) -> f32 {
        if self.fps > 0.0 {
            self.num_frames as f32 / self.fps
        } else {
            0.0
        }
    }
}

/// Everything the object system needs to create an effect's owning object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectDesc {
    /// Object that caused the effect, if any.
    pub parent: Option<ObjectHandle>,
    /// Pool slot the object's instance lives in.
    pub slot: PoolHandle,
    /// World position.
    pub position: Vec3,
    /// Initial orientation.
    pub orientation: Matrix3,
    /// Object radius.
    pub radius: f32,
    /// Constant velocity, if the effect drifts.
    pub velocity: Option<Vec3>,
}

// ============================================================================
// OBJECT LIFECYCLE
// ============================================================================

/// Interface to the host's generic object manager.
///
/// The object system allocates and destroys the object that owns each
/// effect, drives its physics, and decides when a dead object is finally
/// torn down. On teardown it must call `EffectSystem::release`.
pub trait ObjectSystem {
    /// Number of live objects of every kind.
    fn live_objects(&self) -> usize;

    /// Creates the object that owns a new effect.
    ///
    /// Returns `None` if the object could not be created.
    fn create(&mut self, desc: &ObjectDesc) -> Option<ObjectHandle>;

    /// Current orientation of an object.
    fn orientation(&self, object: ObjectHandle) -> Option<Matrix3>;

    /// Current position of an object.
    fn position(&self, object: ObjectHandle) -> Option<Vec3>;

    /// Flags an object for deletion at the host's convenience.
    fn mark_should_be_dead(&mut self, object: ObjectHandle);

    /// Deletes an object immediately.
    ///
    /// The host must NOT call back into `EffectSystem::release` for objects
    /// removed this way; the caller already released the slot.
    fn delete_now(&mut self, object: ObjectHandle);

    /// True once the object has been drawn at least once.
    fn was_rendered(&self, object: ObjectHandle) -> bool;
}

// ============================================================================
// AUDIO
// ============================================================================

/// Interface to the audio subsystem.
pub trait AudioSink {
    /// Plays a positional cue.
    ///
    /// # Arguments
    /// * `cue` - What to play
    /// * `position` - Emitter position
    /// * `radius` - Emitter radius
    /// * `priority` - Mixing priority
    /// * `range_multiplier` - Scales the cue's attenuation distances
    fn play_3d(
        &mut self,
        cue: SoundCue,
        position: Vec3,
        radius: f32,
        priority: SoundPriority,
        range_multiplier: f32,
    );
}

// ============================================================================
// ASSETS
// ============================================================================

/// Interface to the asset loader. Only called at init and page-in.
pub trait AssetLoader {
    /// Loads a bitmap animation.
    fn load_animation(&mut self, name: &str) -> Option<AnimationInfo>;

    /// Loads a single bitmap.
    fn load_bitmap(&mut self, name: &str) -> Option<BitmapId>;

    /// True if a model file with this name exists.
    fn model_exists(&self, name: &str) -> bool;

    /// Loads a model.
    fn load_model(&mut self, name: &str) -> Option<ModelId>;

    /// Makes a bitmap (and `frames - 1` following frames) resident.
    fn page_in(&mut self, bitmap: BitmapId, frames: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_ids_are_consecutive() {
        let first = BitmapId(100);
        assert_eq!(first.frame(0), first);
        assert_eq!(first.frame(7), BitmapId(107));
    }

    #[test]
    fn test_animation_duration() {
        let anim = AnimationInfo {
            first_frame: BitmapId(0),
            num_frames: 30,
            fps: 15.0,
            width: 128,
        };
        assert!((anim.duration() - 2.0).abs() < f32::EPSILON);

        let still = AnimationInfo { fps: 0.0, ..anim };
        assert_eq!(still.duration(), 0.0);
    }
}
