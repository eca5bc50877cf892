//! # NOVA FX
//!
//! Transient visual effects for the space-combat simulation: explosion
//! bursts and warp holes.
//!
//! ## Design Principles
//!
//! 1. **Table-driven** - every effect type comes from `effects.tbl` plus modular `*-fx.tbm` overrides
//! 2. **Pooled** - instances live in recycled slots; spawn never allocates once the pool is warm
//! 3. **Closed-form timing** - warp envelopes are pure functions of elapsed time
//! 4. **Owned collaborators stay outside** - objects, audio, assets and the camera are traits
//!
//! ## Example
//!
//! ```rust,ignore
//! use nova_fx::{EffectSystem, FxConfig, SpawnParams, TableSource, ViewCamera};
//!
//! let config = FxConfig::from_toml_file("data/fx.toml")?;
//! let base = TableSource::new("effects.tbl", std::fs::read_to_string("data/tables/effects.tbl")?);
//! let mut fx = EffectSystem::init(config, &base, &[], &mut loader)?;
//!
//! fx.level_reset();
//! fx.page_in(&mut loader);
//!
//! let warp = SpawnParams::warp(1, ship_position, ship_radius, 10.0);
//! let spawned = fx.spawn(&warp, &mut objects, &mut audio, &ViewCamera::default());
//!
//! // Every frame
//! fx.tick_all(frame_time, &mut objects, &mut audio);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod catalog;
pub mod config;
pub mod curves;
pub mod error;
pub mod instance;
pub mod integration;
pub mod lod;
pub mod render;
pub mod style;
pub mod system;

pub use catalog::{BuiltinEffect, EffectCatalog, EffectTypeDefinition, TableSource};
pub use config::{DetailLevel, FxConfig};
pub use error::{FxError, FxResult};
pub use instance::{ClassHint, EffectInstance, Facing, HullClass, InstanceFlags, RenderKind, SpawnParams};
pub use integration::{
    AnimationInfo, AssetLoader, AudioSink, BitmapId, GameSound, ModelId, ObjectDesc, ObjectHandle,
    ObjectSystem, SoundCue, SoundId, SoundPriority,
};
pub use lod::{Projector, ViewCamera};
pub use render::RenderParameters;
pub use style::{FlareStyle, ModelStyle, WarpTiming};
pub use system::{EffectSystem, SpawnedEffect};

pub use nova_core::{PoolHandle, PoolStats};
pub use nova_shared::{Matrix3, Vec3};
