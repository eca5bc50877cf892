//! # Effect Lifecycle
//!
//! `EffectSystem` owns the catalog and the instance pool and drives every
//! instance through its life:
//!
//! ```text
//! spawn() ──► Active ──tick()──► expired? ──► mark_should_be_dead
//!                │                                │
//!                └── close cue once (warps)       ▼
//!                                        host tears object down
//!                                                 │
//!                                                 ▼
//!                                     release() ──► slot on free list
//! ```
//!
//! Everything runs on the simulation thread. Collaborators are passed in
//! per call; the system keeps no references to them.

use nova_core::{PoolHandle, PoolStats, SlotPool};
use nova_shared::{Matrix3, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::catalog::{is_warp_family_index, BuiltinEffect, EffectCatalog, EffectTypeDefinition, TableSource};
use crate::config::FxConfig;
use crate::error::FxResult;
use crate::instance::{EffectInstance, Facing, HullClass, InstanceFlags, RenderKind, SpawnParams};
use crate::integration::{
    AnimationInfo, AssetLoader, AudioSink, GameSound, ObjectDesc, ObjectHandle, ObjectSystem, SoundCue,
    SoundPriority,
};
use crate::lod::{select_lod, spawn_lod, Projector};
use crate::render::{render_parameters, select_frame, RenderParameters};

/// A successfully spawned effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnedEffect {
    /// Object that owns the effect.
    pub object: ObjectHandle,
    /// Instance slot; pass this to every other call.
    pub slot: PoolHandle,
}

/// The transient effect subsystem.
pub struct EffectSystem {
    /// Runtime settings.
    config: FxConfig,
    /// Effect types; built once, kept across levels.
    catalog: EffectCatalog,
    /// Live instances; cleared every level.
    pool: SlotPool<EffectInstance>,
    /// Facing and angle seeds.
    rng: ChaCha8Rng,
    /// The special warp variant appeared this level.
    special_warp_used: bool,
}

impl EffectSystem {
    /// Creates the system around an already-built catalog.
    #[must_use]
    pub fn new(config: FxConfig, catalog: EffectCatalog) -> Self {
        let pool = SlotPool::with_capacity(config.initial_capacity).with_max_slots(config.max_objects);
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);

        Self {
            config,
            catalog,
            pool,
            rng,
            special_warp_used: false,
        }
    }

    /// Builds the catalog from tables, loads its animations and returns a
    /// system ready for the first level.
    ///
    /// # Errors
    ///
    /// `FxError::AssetLoad` if a required animation is missing. Table parse
    /// errors are logged, not returned.
    pub fn init(
        config: FxConfig,
        base: &TableSource,
        modular: &[TableSource],
        loader: &mut dyn AssetLoader,
    ) -> FxResult<Self> {
        let mut catalog = EffectCatalog::load(base, modular);
        catalog.load_data(loader)?;

        tracing::info!(
            effect_types = catalog.len(),
            detail = ?config.detail,
            "effect system initialized"
        );
        Ok(Self::new(config, catalog))
    }

    /// Clears every instance at the start of a level.
    ///
    /// Handles from the previous level must not be used again.
    pub fn level_reset(&mut self) {
        let stale = self.pool.live_count();
        self.pool.reset(self.config.initial_capacity);
        self.special_warp_used = false;
        tracing::info!(stale, capacity = self.config.initial_capacity, "effect pool reset");
    }

    /// Makes this level's effect assets resident.
    pub fn page_in(&mut self, loader: &mut dyn AssetLoader) {
        self.catalog.page_in(loader, self.special_warp_used);
    }

    /// Records that catalog entry `index` is referenced this mission.
    pub fn mark_used(&mut self, index: usize) {
        if index == BuiltinEffect::Knossos.index() {
            self.special_warp_used = true;
        }
        self.catalog.mark_used(index);
    }

    // ========================================================================
    // SPAWN
    // ========================================================================

    /// Starts a new effect.
    ///
    /// Returns `None` without side effects when the type has no LODs, when
    /// effects are disabled and the type is not a warp, when the object
    /// budget is spent, or when the object system refuses the object.
    pub fn spawn(
        &mut self,
        params: &SpawnParams,
        objects: &mut dyn ObjectSystem,
        audio: &mut dyn AudioSink,
        projector: &dyn Projector,
    ) -> Option<SpawnedEffect> {
        let type_index = params.effect_type;
        let Some(def) = self.catalog.get(type_index) else {
            tracing::warn!(type_index, "spawn of unknown effect type");
            return None;
        };
        let warp_family = is_warp_family_index(type_index);

        if def.lod_count == 0 {
            tracing::debug!(type_index, "effect type has no LODs; not spawned");
            return None;
        }
        if !self.config.effects_enabled && !warp_family {
            tracing::debug!(type_index, "effects disabled; not spawned");
            return None;
        }
        if objects.live_objects() >= self.config.max_objects {
            tracing::debug!(type_index, limit = self.config.max_objects, "object budget spent; not spawned");
            return None;
        }

        let projected = select_lod(projector, params.position, params.size, def, self.config.detail);
        let lod = spawn_lod(projected, params.low_res, warp_family, def.lod_count);

        let mut orientation = params
            .orientation_override
            .or_else(|| params.parent.and_then(|parent| objects.orientation(parent)))
            .unwrap_or(Matrix3::IDENTITY);

        let warp = params.render_kind == RenderKind::WarpEffect;
        if warp && params.reverse {
            orientation.fvec = -orientation.fvec;
            orientation.rvec = -orientation.rvec;
        }

        let total = if warp {
            if params.warp_lifetime < self.config.min_warp_lifetime {
                tracing::warn!(
                    requested = params.warp_lifetime,
                    minimum = self.config.min_warp_lifetime,
                    "warp lifetime too short; raised to minimum"
                );
            }
            params.warp_lifetime.max(self.config.min_warp_lifetime)
        } else {
            def.animation(lod).map_or(0.0, AnimationInfo::duration)
        };

        let slot = self.pool.next_handle()?;
        let object = objects.create(&ObjectDesc {
            parent: params.parent,
            slot,
            position: params.position,
            orientation,
            radius: params.size,
            velocity: params.velocity,
        })?;

        let facing = match params.render_kind {
            RenderKind::SmallBurst => Facing::Octant(self.rng.gen_range(0..8)),
            RenderKind::LargeBurst => Facing::Degrees(self.rng.gen_range(0..360)),
            RenderKind::WarpEffect => Facing::Warp { reverse: params.reverse },
        };

        let duration = |requested: Option<f32>| {
            requested
                .filter(|d| *d >= 0.0)
                .unwrap_or(self.config.default_warp_duration)
        };

        let mut instance = EffectInstance {
            slot,
            object,
            effect_type: type_index,
            render_kind: params.render_kind,
            elapsed: 0.0,
            total,
            lod,
            current_frame: None,
            facing,
            position: params.position,
            radius: params.size,
            orientation,
            warp_open_duration: duration(params.open_duration),
            warp_close_duration: duration(params.close_duration),
            open_sound: params.open_sound,
            close_sound: params.close_sound,
            warp_sound_range_multiplier: 1.0,
            flags: params.extra_flags,
        };

        if warp {
            play_open_sound(&mut instance, def, params, audio);
        }
        instance.current_frame = select_frame(&instance, def);

        if self.pool.try_acquire_with(|_| instance).is_none() {
            objects.delete_now(object);
            return None;
        }

        if type_index == BuiltinEffect::Knossos.index() {
            self.special_warp_used = true;
        }

        Some(SpawnedEffect { object, slot })
    }

    // ========================================================================
    // UPDATE
    // ========================================================================

    /// Advances one instance by `delta` seconds.
    pub fn tick(
        &mut self,
        handle: PoolHandle,
        delta: f32,
        objects: &mut dyn ObjectSystem,
        audio: &mut dyn AudioSink,
    ) {
        debug_assert!(self.pool.is_live(handle), "tick of non-live effect slot {}", handle.index());
        let Some(instance) = self.pool.get_mut(handle) else {
            return;
        };
        if let Some(def) = self.catalog.get(instance.effect_type) {
            advance(instance, def, delta, objects, audio);
        }
    }

    /// Advances every live instance by `delta` seconds.
    pub fn tick_all(&mut self, delta: f32, objects: &mut dyn ObjectSystem, audio: &mut dyn AudioSink) {
        for (_, instance) in self.pool.iter_mut() {
            if let Some(def) = self.catalog.get(instance.effect_type) {
                advance(instance, def, delta, objects, audio);
            }
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Seconds of life left; negative once expired.
    #[must_use]
    pub fn life_remaining(&self, handle: PoolHandle) -> f32 {
        self.live(handle).map_or(0.0, EffectInstance::life_remaining)
    }

    /// Fraction of life left, in `[0, 1]`.
    #[must_use]
    pub fn life_fraction(&self, handle: PoolHandle) -> f32 {
        self.live(handle).map_or(0.0, EffectInstance::life_fraction)
    }

    /// Draw parameters for this frame.
    ///
    /// `None` if the instance has no frame to draw.
    #[must_use]
    pub fn render_parameters(&self, handle: PoolHandle, objects: &dyn ObjectSystem) -> Option<RenderParameters> {
        let instance = self.live(handle)?;
        let def = self.catalog.get(instance.effect_type)?;

        let position = objects.position(instance.object).unwrap_or(instance.position);
        let orientation = objects.orientation(instance.object).unwrap_or(instance.orientation);
        render_parameters(instance, def, position, orientation, self.config.standalone)
    }

    /// True for warp holes.
    #[must_use]
    pub fn is_warp(&self, handle: PoolHandle) -> bool {
        self.live(handle)
            .is_some_and(|instance| instance.render_kind == RenderKind::WarpEffect)
    }

    /// True if the host may cull this effect early.
    ///
    /// Small bursts always are and warp holes never are. A large burst is
    /// only once it has been drawn at least once.
    #[must_use]
    pub fn is_perishable(&self, handle: PoolHandle, objects: &dyn ObjectSystem) -> bool {
        match self.live(handle).map(|instance| (instance.render_kind, instance.object)) {
            Some((RenderKind::SmallBurst, _)) => true,
            Some((RenderKind::LargeBurst, object)) => objects.was_rendered(object),
            Some((RenderKind::WarpEffect, _)) | None => false,
        }
    }

    /// Read access to a live instance.
    #[must_use]
    pub fn instance(&self, handle: PoolHandle) -> Option<&EffectInstance> {
        self.pool.get(handle)
    }

    /// The effect catalog.
    #[must_use]
    pub fn catalog(&self) -> &EffectCatalog {
        &self.catalog
    }

    /// Runtime settings.
    #[must_use]
    pub fn config(&self) -> &FxConfig {
        &self.config
    }

    /// Number of live instances.
    #[must_use]
    pub fn count_live(&self) -> usize {
        self.pool.live_count()
    }

    /// Pool occupancy.
    #[must_use]
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    fn live(&self, handle: PoolHandle) -> Option<&EffectInstance> {
        let instance = self.pool.get(handle);
        debug_assert!(instance.is_some(), "query of non-live effect slot {}", handle.index());
        instance
    }

    // ========================================================================
    // TEARDOWN
    // ========================================================================

    /// Object-deletion callback: frees the instance's slot.
    ///
    /// Releasing a slot twice is a contract violation.
    pub fn release(&mut self, handle: PoolHandle) {
        self.pool.release(handle);
    }

    /// Deletes every live effect's object and frees every slot.
    pub fn release_all(&mut self, objects: &mut dyn ObjectSystem) {
        for handle in self.pool.live_handles() {
            if let Some(instance) = self.pool.release(handle) {
                objects.delete_now(instance.object);
            }
        }
    }

    /// Releases everything at game shutdown.
    pub fn shutdown(&mut self, objects: &mut dyn ObjectSystem) {
        let live = self.count_live();
        self.release_all(objects);
        tracing::info!(released = live, "effect system shut down");
    }
}

/// One tick of one instance.
fn advance(
    instance: &mut EffectInstance,
    def: &EffectTypeDefinition,
    delta: f32,
    objects: &mut dyn ObjectSystem,
    audio: &mut dyn AudioSink,
) {
    instance.elapsed += delta.max(0.0);
    if instance.is_expired() {
        // Still drawn this frame; the host removes it when it gets to it.
        objects.mark_should_be_dead(instance.object);
    }

    maybe_play_close_sound(instance, def, objects, audio);
    instance.current_frame = select_frame(instance, def);
}

fn play_open_sound(
    instance: &mut EffectInstance,
    def: &EffectTypeDefinition,
    params: &SpawnParams,
    audio: &mut dyn AudioSink,
) {
    let hull = params.class_hint.map(|hint| hint.hull);

    let cue = params
        .open_sound
        .or(def.open_sound.map(SoundCue::Entry))
        .unwrap_or(if hull == Some(HullClass::Huge) {
            SoundCue::Game(GameSound::CapitalWarpIn)
        } else {
            SoundCue::Game(GameSound::WarpIn)
        });

    if let Some(hint) = params.class_hint {
        match hint.hull {
            HullClass::Huge => instance.flags |= InstanceFlags::WARP_CAPITAL_SIZE,
            HullClass::Big => instance.flags |= InstanceFlags::WARP_CRUISER_SIZE,
            HullClass::Small => {}
        }
        instance.warp_sound_range_multiplier = hint.warp_sound_range_multiplier;
    }

    audio.play_3d(
        cue,
        instance.position,
        instance.radius,
        SoundPriority::DoubleInstance,
        instance.warp_sound_range_multiplier,
    );
}

fn maybe_play_close_sound(
    instance: &mut EffectInstance,
    def: &EffectTypeDefinition,
    objects: &dyn ObjectSystem,
    audio: &mut dyn AudioSink,
) {
    if instance.render_kind != RenderKind::WarpEffect
        || instance.flags.contains(InstanceFlags::WARP_CLOSE_SOUND_PLAYED)
        || instance.life_remaining() >= instance.warp_close_duration
    {
        return;
    }

    let capital = instance.flags.contains(InstanceFlags::WARP_CAPITAL_SIZE);
    let cue = instance
        .close_sound
        .or(def.close_sound.map(SoundCue::Entry))
        .or(capital.then_some(SoundCue::Game(GameSound::CapitalWarpOut)));

    if let Some(cue) = cue {
        let position: Vec3 = objects.position(instance.object).unwrap_or(instance.position);
        audio.play_3d(
            cue,
            position,
            instance.radius,
            SoundPriority::SingleInstance,
            instance.warp_sound_range_multiplier,
        );
    }
    instance.flags |= InstanceFlags::WARP_CLOSE_SOUND_PLAYED;
}
