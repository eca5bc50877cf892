//! # Effect Type Catalog
//!
//! Every effect type the game knows about, built once from one base table
//! and any number of modular tables:
//!
//! ```text
//! effects.tbl        ─┐
//! *-fx.tbm (sorted)  ─┼─► EntryDelta ─► apply over slot ─► finalize LODs
//!                     │        │
//!                     │        ├─ +Warp_Effect / +Custom_Fireball  → existing slot
//!                     │        ├─ $Unique ID matches              → existing slot (wins)
//!                     │        └─ otherwise                        → new defaulted slot
//! ```
//!
//! The catalog outlives levels. It is only mutated at load, at page-in
//! and when an entry is first referenced.

mod definition;
mod delta;
mod reader;

use std::path::Path;

use rand::Rng;

pub use definition::{
    is_warp_family_index, BuiltinEffect, EffectTypeDefinition, LodEntry, CINEMATIC_WARP_SIZE_RATIO,
    DEFAULT_FLICKER, DEFAULT_FRAME_ANIM, DEFAULT_ROT_ANIM, MAX_LOD, MAX_WARP_LOD, NUM_BUILTIN,
    WARP_3D_SIZE_RATIO,
};
pub use reader::TableReader;

use delta::{EntryDelta, Selector};
use nova_shared::MAX_FILENAME_LEN;

use crate::error::{FxError, FxResult};
use crate::integration::{AssetLoader, BitmapId};

/// Longest LOD0 name that still leaves room for a `_N` suffix.
pub const MAX_BASENAME_LEN: usize = MAX_FILENAME_LEN - 3;

/// Name of the base table inside a table directory.
pub const BASE_TABLE: &str = "effects.tbl";

/// Suffix shared by modular tables inside a table directory.
pub const MODULAR_SUFFIX: &str = "-fx.tbm";

/// Text of one table plus the name used in diagnostics.
#[derive(Clone, Debug)]
pub struct TableSource {
    /// File name, for diagnostics.
    pub name: String,
    /// Full table text.
    pub text: String,
}

impl TableSource {
    /// Wraps in-memory table text.
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into() }
    }
}

/// The set of effect types.
#[derive(Clone, Debug, Default)]
pub struct EffectCatalog {
    entries: Vec<EffectTypeDefinition>,
}

impl EffectCatalog {
    /// Builds the catalog from a base table and modular tables, in order.
    ///
    /// A table that fails to parse is logged and abandoned at the failing
    /// entry; everything applied before that point is kept, and later
    /// tables are still read.
    #[must_use]
    pub fn load(base: &TableSource, modular: &[TableSource]) -> Self {
        let mut catalog = Self::default();

        if let Err(e) = catalog.parse_table(base, false) {
            tracing::warn!(error = %e, "effect table aborted");
        }
        for table in modular {
            if let Err(e) = catalog.parse_table(table, true) {
                tracing::warn!(error = %e, "effect table aborted");
            }
        }

        catalog.finalize_lods();
        tracing::info!(entries = catalog.len(), tables = modular.len() + 1, "effect catalog loaded");
        catalog
    }

    /// Reads `effects.tbl` and every `*-fx.tbm` (sorted by name) from `dir`.
    ///
    /// # Errors
    ///
    /// `FxError::Io` if the directory or a table cannot be read.
    pub fn from_dir(dir: impl AsRef<Path>) -> FxResult<Self> {
        let dir = dir.as_ref();
        let base = read_table(&dir.join(BASE_TABLE))?;

        let listing = std::fs::read_dir(dir).map_err(|source| FxError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths = Vec::new();
        for entry in listing {
            let entry = entry.map_err(|source| FxError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let is_modular = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.to_ascii_lowercase().ends_with(MODULAR_SUFFIX));
            if is_modular {
                paths.push(path);
            }
        }
        paths.sort();

        let modular = paths.iter().map(|path| read_table(path)).collect::<FxResult<Vec<_>>>()?;
        Ok(Self::load(&base, &modular))
    }

    /// Parses one table into the catalog.
    ///
    /// LOD filenames are not derived here; `load` does that once all tables
    /// are in.
    ///
    /// # Errors
    ///
    /// `FxError::ConfigParse` at the first malformed entry. Entries before
    /// it have already been applied.
    pub fn parse_table(&mut self, table: &TableSource, modular: bool) -> FxResult<()> {
        let mut reader = TableReader::new(&table.name, &table.text);
        reader.required("#Start")?;

        while reader.required_one_of(&["#End", "$Name:", "$Unique ID:"])? != 0 {
            let delta = EntryDelta::parse(&mut reader, modular)?;
            self.apply(&delta, modular, &table.name);
        }

        reader.required("#End")
    }

    fn apply(&mut self, delta: &EntryDelta, modular: bool, table: &str) {
        match self.resolve(delta, modular, table) {
            Some(index) => delta.apply(&mut self.entries[index], false),
            None => {
                let mut def = EffectTypeDefinition::defaulted(self.entries.len());
                delta.apply(&mut def, true);
                self.entries.push(def);
            }
        }
    }

    /// Slot an entry overrides, or `None` for a new slot.
    fn resolve(&self, delta: &EntryDelta, modular: bool, table: &str) -> Option<usize> {
        if !modular {
            return None;
        }

        let selected = match delta.selector {
            Some(Selector::Builtin(builtin)) => Some(builtin.index()),
            Some(Selector::Custom(index)) => usize::try_from(index).ok(),
            None => None,
        };
        let selected = selected.filter(|&index| {
            let in_range = index < self.entries.len();
            if !in_range {
                tracing::warn!(
                    table,
                    index,
                    entries = self.entries.len(),
                    "override index out of range; adding a new entry"
                );
            }
            in_range
        });

        let by_id = delta.unique_id.as_deref().and_then(|id| self.lookup(id));
        by_id.or(selected)
    }

    /// Derives `name_N` filenames for LODs above 0.
    ///
    /// An entry whose LOD0 name is too long for the suffix drops to a single
    /// LOD.
    fn finalize_lods(&mut self) {
        for def in &mut self.entries {
            if def.lod_count <= 1 {
                continue;
            }

            let base = def.base_filename().to_owned();
            if base.len() > MAX_BASENAME_LEN {
                tracing::warn!(
                    entry = %def.unique_id,
                    filename = %base,
                    limit = MAX_BASENAME_LEN,
                    "base filename too long for LOD suffixes; only LOD0 will be used"
                );
                def.lod_count = 1;
                continue;
            }

            for (tier, lod) in def.lods.iter_mut().enumerate().take(def.lod_count).skip(1) {
                lod.filename = format!("{base}_{tier}");
            }
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Index of the entry with `unique_id` (case-insensitive).
    #[must_use]
    pub fn lookup(&self, unique_id: &str) -> Option<usize> {
        self.iter().position(|def| def.unique_id.eq_ignore_ascii_case(unique_id))
    }

    /// Entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&EffectTypeDefinition> {
        self.entries.get(index)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &EffectTypeDefinition> {
        self.entries.iter()
    }

    /// Light color of an entry; white for an unknown index.
    #[must_use]
    pub fn color(&self, index: usize) -> [f32; 3] {
        self.entries.get(index).map_or([1.0; 3], |def| def.color)
    }

    /// Records that an entry is referenced, so `page_in` loads it.
    pub fn mark_used(&mut self, index: usize) {
        if let Some(def) = self.entries.get_mut(index) {
            def.used = true;
        }
    }

    /// Drops indices that name no entry.
    ///
    /// `owner` names whatever the list came from, for the warning.
    pub fn retain_valid_indices(&self, indices: &mut Vec<i32>, owner: &str) {
        let len = self.entries.len();
        indices.retain(|&index| {
            let valid = usize::try_from(index).is_ok_and(|i| i < len);
            if !valid {
                tracing::warn!(owner, index, "effect index out of range; removing it");
            }
            valid
        });
    }

    /// A random entry from `candidates`, or `None` if there are none.
    pub fn pick_explosion_type<R: Rng>(&self, candidates: &[usize], rng: &mut R) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.gen_range(0..candidates.len())])
    }

    // ========================================================================
    // ASSETS
    // ========================================================================

    /// Loads every entry's animations and warp bitmaps.
    ///
    /// # Errors
    ///
    /// `FxError::AssetLoad` for the first LOD animation that cannot be
    /// loaded. Missing glow and ball bitmaps are only logged.
    pub fn load_data(&mut self, loader: &mut dyn AssetLoader) -> FxResult<()> {
        for (index, def) in self.entries.iter_mut().enumerate() {
            let skip_fine_lods = index == BuiltinEffect::Warp.index();
            let lod_count = def.lod_count.min(MAX_LOD);

            for (tier, lod) in def.lods[..lod_count].iter_mut().enumerate() {
                if skip_fine_lods && tier > MAX_WARP_LOD {
                    continue;
                }
                let animation = loader.load_animation(&lod.filename).ok_or_else(|| FxError::AssetLoad {
                    asset: lod.filename.clone(),
                    kind: "animation",
                })?;
                lod.animation = Some(animation);
            }

            def.glow_bitmap = load_optional_bitmap(loader, &def.warp_glow, "warp glow");
            def.ball_bitmap = load_optional_bitmap(loader, &def.warp_ball, "warp ball");
        }
        Ok(())
    }

    /// Makes the assets of every built-in or used entry resident.
    ///
    /// The special warp variant is only paged in when `special_warp_used`.
    pub fn page_in(&mut self, loader: &mut dyn AssetLoader, special_warp_used: bool) {
        for (index, def) in self.entries.iter_mut().enumerate() {
            let wanted = index < NUM_BUILTIN || def.used;
            let skipped = index == BuiltinEffect::Knossos.index() && !special_warp_used;

            if wanted && !skipped {
                for (tier, lod) in def.active_lods().iter().enumerate() {
                    if index == BuiltinEffect::Warp.index() && tier > MAX_WARP_LOD {
                        continue;
                    }
                    if let Some(animation) = &lod.animation {
                        loader.page_in(animation.first_frame, animation.num_frames);
                    }
                }
            }

            for bitmap in [def.glow_bitmap, def.ball_bitmap].into_iter().flatten() {
                loader.page_in(bitmap, 1);
            }

            def.model = if !def.warp_model.is_empty() && loader.model_exists(&def.warp_model) {
                tracing::debug!(model = %def.warp_model, "loading warp model");
                let model = loader.load_model(&def.warp_model);
                if model.is_none() {
                    tracing::warn!(model = %def.warp_model, "warp model failed to load");
                }
                model
            } else {
                None
            };
        }
    }
}

fn read_table(path: &Path) -> FxResult<TableSource> {
    let text = std::fs::read_to_string(path).map_err(|source| FxError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    Ok(TableSource { name, text })
}

fn load_optional_bitmap(
    loader: &mut dyn AssetLoader,
    name: &str,
    kind: &'static str,
) -> Option<BitmapId> {
    if name.is_empty() {
        return None;
    }
    tracing::debug!(kind, name, "loading bitmap");
    let bitmap = loader.load_bitmap(name);
    if bitmap.is_none() {
        tracing::warn!(kind, name, "bitmap failed to load");
    }
    bitmap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::{AnimationInfo, BitmapId, ModelId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const BASE: &str = "\
#Start
$Name: exp20
$LOD: 3
$Name: warp
$LOD: 2
$Light color: 192 192 255
$Name: warp_green
$Name: asteroid_boom
$Name: exp05
$Name: exp06
#End
";

    fn base() -> TableSource {
        TableSource::new("effects.tbl", BASE)
    }

    #[test]
    fn test_base_table_builds_builtins() {
        let catalog = EffectCatalog::load(&base(), &[]);
        assert_eq!(catalog.len(), NUM_BUILTIN);

        let medium = catalog.get(0).unwrap();
        assert_eq!(medium.unique_id, "Medium Explosion");
        assert_eq!(medium.lod_count, 3);
        assert_eq!(medium.lods[1].filename, "exp20_1");
        assert_eq!(medium.lods[2].filename, "exp20_2");

        assert_eq!(catalog.get(2).unwrap().color, [0.75, 1.0, 0.75]);
        assert_eq!(catalog.lookup("warp effect"), Some(1));
    }

    #[test]
    fn test_modular_override_by_selector() {
        let modular = TableSource::new(
            "blue-fx.tbm",
            "#Start\n$Name: warp\n+Warp_Effect\n$Light color: 0 0 255\n#End\n",
        );
        let catalog = EffectCatalog::load(&base(), &[modular]);

        assert_eq!(catalog.len(), NUM_BUILTIN);
        let warp = catalog.get(1).unwrap();
        assert_eq!(warp.color, [0.0, 0.0, 1.0]);
        assert_eq!(warp.unique_id, "Warp Effect");
        assert_eq!(warp.lod_count, 2);
    }

    #[test]
    fn test_unique_id_beats_selector() {
        let modular = TableSource::new(
            "a-fx.tbm",
            "#Start\n$Unique ID: Asteroid Explosion\n$Name: rock\n+Explosion_Medium\n#End\n",
        );
        let catalog = EffectCatalog::load(&base(), &[modular]);
        assert_eq!(catalog.get(3).unwrap().lods[0].filename, "rock");
        assert_eq!(catalog.get(0).unwrap().lods[0].filename, "exp20");
    }

    #[test]
    fn test_new_and_out_of_range_entries_append() {
        let modular = TableSource::new(
            "new-fx.tbm",
            "#Start\n$Name: plasma\n$Name: bogus\n+Custom_Fireball: 40\n#End\n",
        );
        let catalog = EffectCatalog::load(&base(), &[modular]);
        assert_eq!(catalog.len(), NUM_BUILTIN + 2);

        let plasma = catalog.get(6).unwrap();
        assert_eq!(plasma.unique_id, "Custom Effect 1");
        assert_eq!(plasma.color, [1.0, 1.0, 1.0]);
        assert_eq!(catalog.get(7).unwrap().lods[0].filename, "bogus");
    }

    #[test]
    fn test_bad_table_keeps_earlier_entries() {
        let broken = TableSource::new(
            "broken-fx.tbm",
            "#Start\n$Name: first\n$Name: second\n$LOD: lots\n#End\n",
        );
        let after = TableSource::new("z-fx.tbm", "#Start\n$Name: third\n#End\n");
        let catalog = EffectCatalog::load(&base(), &[broken, after]);

        assert_eq!(catalog.len(), NUM_BUILTIN + 2);
        assert_eq!(catalog.get(6).unwrap().lods[0].filename, "first");
        assert_eq!(catalog.get(7).unwrap().lods[0].filename, "third");
    }

    #[test]
    fn test_from_dir_reads_base_then_sorted_modular_tables() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(BASE_TABLE), BASE).unwrap();
        std::fs::write(
            dir.path().join("b-fx.tbm"),
            "#Start\n$Name: warp\n+Warp_Effect\n$Light color: 0 0 255\n#End\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a-fx.tbm"),
            "#Start\n$Name: warp\n+Warp_Effect\n$Light color: 255 0 0\n#End\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.tbm"), "not a table").unwrap();

        let catalog = EffectCatalog::from_dir(dir.path()).unwrap();

        assert_eq!(catalog.len(), NUM_BUILTIN);
        assert_eq!(catalog.color(1), [0.0, 0.0, 1.0]);
        let names: Vec<_> = catalog.iter().map(EffectTypeDefinition::base_filename).collect();
        assert_eq!(names, ["exp20", "warp", "warp_green", "asteroid_boom", "exp05", "exp06"]);
    }

    #[test]
    fn test_from_dir_without_base_table() {
        let dir = tempfile::tempdir().unwrap();
        let err = EffectCatalog::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, FxError::Io { ref path, .. } if path.ends_with(BASE_TABLE)));
    }

    #[test]
    fn test_parse_table_reports_error() {
        let mut catalog = EffectCatalog::default();
        let err = catalog
            .parse_table(&TableSource::new("x.tbl", "$Name: nope\n"), false)
            .unwrap_err();
        assert!(matches!(err, FxError::ConfigParse { line: 1, .. }));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_long_base_name_degrades_lods() {
        let name = "b".repeat(MAX_FILENAME_LEN - 2);
        let table = TableSource::new("effects.tbl", format!("#Start\n$Name: {name}\n$LOD: 3\n#End\n"));
        let catalog = EffectCatalog::load(&table, &[]);

        let def = catalog.get(0).unwrap();
        assert_eq!(def.lod_count, 1);
        assert!(def.lods[1].filename.is_empty());
    }

    #[test]
    fn test_color_and_index_lists() {
        let catalog = EffectCatalog::load(&base(), &[]);
        assert_eq!(catalog.color(1), [192.0 / 255.0, 192.0 / 255.0, 1.0]);
        assert_eq!(catalog.color(99), [1.0, 1.0, 1.0]);

        let mut list = vec![0, 5, 6, -1, 2];
        catalog.retain_valid_indices(&mut list, "test ship");
        assert_eq!(list, vec![0, 5, 2]);
    }

    #[test]
    fn test_pick_explosion_type() {
        let catalog = EffectCatalog::load(&base(), &[]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(catalog.pick_explosion_type(&[], &mut rng), None);
        assert_eq!(catalog.pick_explosion_type(&[4], &mut rng), Some(4));
        let picked = catalog.pick_explosion_type(&[4, 5], &mut rng).unwrap();
        assert!(picked == 4 || picked == 5);
    }

    #[derive(Default)]
    struct RecordingLoader {
        missing: Vec<&'static str>,
        animations: Vec<String>,
        paged: Vec<(BitmapId, u32)>,
        next: u32,
    }

    impl AssetLoader for RecordingLoader {
        fn load_animation(&mut self, name: &str) -> Option<AnimationInfo> {
            if self.missing.iter().any(|&m| m == name) {
                return None;
            }
            self.animations.push(name.to_string());
            self.next += 100;
            Some(AnimationInfo { first_frame: BitmapId(self.next), num_frames: 10, fps: 20.0, width: 64 })
        }

        fn load_bitmap(&mut self, name: &str) -> Option<BitmapId> {
            (!self.missing.iter().any(|&m| m == name)).then_some(BitmapId(7))
        }

        fn model_exists(&self, name: &str) -> bool {
            name == "warp.pof"
        }

        fn load_model(&mut self, _name: &str) -> Option<ModelId> {
            Some(ModelId(3))
        }

        fn page_in(&mut self, bitmap: BitmapId, frames: u32) {
            self.paged.push((bitmap, frames));
        }
    }

    #[test]
    fn test_load_data_skips_fine_warp_lods() {
        let mut catalog = EffectCatalog::load(&base(), &[]);
        let mut loader = RecordingLoader { missing: vec!["warpball01"], ..Default::default() };
        catalog.load_data(&mut loader).unwrap();

        assert!(loader.animations.contains(&"exp20_2".to_string()));
        assert!(!loader.animations.contains(&"warp_1".to_string()));

        let warp = catalog.get(1).unwrap();
        assert!(warp.animation(0).is_some());
        assert_eq!(warp.glow_bitmap, Some(BitmapId(7)));
        assert_eq!(warp.ball_bitmap, None);
    }

    #[test]
    fn test_missing_animation_is_fatal() {
        let mut catalog = EffectCatalog::load(&base(), &[]);
        let mut loader = RecordingLoader { missing: vec!["exp05"], ..Default::default() };
        let err = catalog.load_data(&mut loader).unwrap_err();
        assert!(matches!(err, FxError::AssetLoad { ref asset, .. } if asset == "exp05"));
    }

    #[test]
    fn test_page_in_loads_warp_model() {
        let mut catalog = EffectCatalog::load(&base(), &[]);
        let mut loader = RecordingLoader::default();
        catalog.load_data(&mut loader).unwrap();
        catalog.page_in(&mut loader, false);

        assert_eq!(catalog.get(1).unwrap().model, Some(ModelId(3)));
        assert_eq!(catalog.get(0).unwrap().model, None);

        let knossos_frames = catalog.get(2).unwrap().animation(0).unwrap().first_frame;
        assert!(!loader.paged.iter().any(|&(bitmap, _)| bitmap == knossos_frames));

        catalog.page_in(&mut loader, true);
        assert!(loader.paged.iter().any(|&(bitmap, _)| bitmap == knossos_frames));
    }
}
