//! Scene construction: from raw map files to batches and atlases.
//!
//! This module owns the load orchestration around the pure parsers: it
//! fetches every file of a map description concurrently, resolves placed
//! instances against their definitions, classifies them into zones, feeds
//! the batcher and packs the texture atlas. The graphics device, the
//! proprietary mesh decoder and the asset transport stay outside, behind
//! the [`AssetDecoder`] and [`AssetFetcher`] seams.
//!
//! # Key types
//!
//! - [`SceneBuilder`] drives one or more map loads over a shared asset cache
//! - [`MapDesc`] lists the files making up one map
//! - [`MapScene`] is the finished read-only result handed to the renderer
//! - [`Diagnostics`] collects the recoverable drops of a load

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::Context;
use cgmath::{EuclideanSpace, Point3};
use futures::future::join_all;

use crate::atlas::{TextureAtlas, pack_atlas};
use crate::batch::{Batch, MeshBatcher};
use crate::data_structures::color_set::ColorSet;
use crate::data_structures::definition::ObjectDefinition;
use crate::data_structures::instance::ItemInstance;
use crate::data_structures::mesh::{MeshData, RasterTexture};
use crate::data_structures::zone::ZoneTable;
use crate::error::{ResolutionError, ResourceError};
use crate::formats::definitions::parse_item_definitions;
use crate::formats::placements::{
    is_binary_placement, parse_item_placement, parse_item_placement_binary,
};
use crate::formats::timecycle::parse_time_cycle;
use crate::formats::zones::parse_zones;

/// Model-name prefixes marking distant-LOD stand-ins that never enter
/// batching.
const LOD_PREFIXES: [&str; 2] = ["islandlod", "lod"];

/// The one stand-in model that must keep rendering despite its prefix.
pub const LOD_EXCEPTION_MODEL: &str = "lodistancoast01";

/// External asset transport. Failures are fatal to the load that issued
/// them; retry policy, if any, lives behind this seam.
pub trait AssetFetcher {
    fn fetch(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Vec<u8>, ResourceError>>;
}

/// Native file-system fetcher rooted at a base directory.
#[cfg(not(target_arch = "wasm32"))]
pub struct FileFetcher {
    base: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileFetcher {
    pub fn new(base: impl Into<std::path::PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetFetcher for FileFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        tokio::fs::read(self.base.join(path))
            .await
            .map_err(|source| ResourceError {
                path: path.to_string(),
                source,
            })
    }
}

/// External decoder for the proprietary mesh container and its texture
/// dictionaries. The pipeline only consumes the output shapes.
pub trait AssetDecoder {
    fn decode_model(&self, bytes: &[u8], def: &ObjectDefinition) -> anyhow::Result<MeshData>;
    fn decode_texture_dictionary(&self, bytes: &[u8]) -> anyhow::Result<Vec<RasterTexture>>;
}

/// Byte cache keyed by fetched path, owned by the scene-loading session.
///
/// Fetches for missing paths are issued concurrently; the merge back into
/// the cache is a single-threaded reduction, which is all the data sizes
/// warrant.
pub struct AssetCache<F> {
    fetcher: F,
    entries: HashMap<String, Arc<Vec<u8>>>,
}

impl<F: AssetFetcher> AssetCache<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            entries: HashMap::new(),
        }
    }

    /// Drop every cached byte buffer. The explicit boundary between
    /// independent map loads.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    /// Fetch all `paths`, deduplicated, hitting the cache first. Returns
    /// buffers in input order.
    pub async fn fetch_many(&mut self, paths: &[String]) -> Result<Vec<Arc<Vec<u8>>>, ResourceError> {
        let missing: Vec<String> = paths
            .iter()
            .filter(|p| !self.entries.contains_key(*p))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let fetched = join_all(missing.iter().map(|p| self.fetcher.fetch(p))).await;
        for (path, result) in missing.into_iter().zip(fetched) {
            self.entries.insert(path, Arc::new(result?));
        }
        Ok(paths.iter().map(|p| self.entries[p].clone()).collect())
    }
}

/// The files making up one map, all relative to the fetcher root.
#[derive(Clone, Debug)]
pub struct MapDesc {
    pub name: String,
    pub definition_paths: Vec<String>,
    pub placement_paths: Vec<String>,
    pub zone_path: String,
    pub time_cycle_path: String,
    /// Directory of model containers, `<dir>/<model>.dff`.
    pub model_dir: String,
    /// Directory of texture dictionaries, `<dir>/<txd>.txd`.
    pub texture_dir: String,
}

impl MapDesc {
    fn model_path(&self, model: &str) -> String {
        format!("{}/{}.dff", self.model_dir, model)
    }

    fn texture_path(&self, txd: &str) -> String {
        format!("{}/{}.txd", self.texture_dir, txd)
    }
}

/// Recoverable drops recorded while a scene was constructed.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub dropped: Vec<ResolutionError>,
}

impl Diagnostics {
    fn record(&mut self, err: ResolutionError) {
        log::warn!("{err}");
        self.dropped.push(err);
    }
}

/// Finished scene: deterministic batches, the packed atlas (absent only
/// when no batch references any texture), supporting tables, and the
/// diagnostics of the load.
pub struct MapScene {
    pub batches: Vec<Batch>,
    pub atlas: Option<TextureAtlas>,
    pub color_sets: Vec<ColorSet>,
    pub zones: ZoneTable,
    pub diagnostics: Diagnostics,
}

/// Drives map loads over a shared [`AssetCache`].
pub struct SceneBuilder<F> {
    cache: AssetCache<F>,
}

impl<F: AssetFetcher> SceneBuilder<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            cache: AssetCache::new(fetcher),
        }
    }

    /// Invalidate cached assets before an independent map load.
    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate();
    }

    /// Construct the full scene for `desc`.
    ///
    /// Hard parse errors and fetch failures abort the load; unresolved
    /// instances and textures are dropped into [`Diagnostics`] and
    /// construction continues.
    pub async fn load_map<D: AssetDecoder>(
        &mut self,
        desc: &MapDesc,
        decoder: &D,
    ) -> anyhow::Result<MapScene> {
        let mut diagnostics = Diagnostics::default();

        // All map files travel together before any parsing starts.
        let mut paths = desc.definition_paths.clone();
        paths.extend(desc.placement_paths.iter().cloned());
        paths.push(desc.zone_path.clone());
        paths.push(desc.time_cycle_path.clone());
        let buffers = self
            .cache
            .fetch_many(&paths)
            .await
            .with_context(|| format!("loading map '{}'", desc.name))?;

        let def_count = desc.definition_paths.len();
        let ipl_count = desc.placement_paths.len();
        let (def_buffers, rest) = buffers.split_at(def_count);
        let (ipl_buffers, tail) = rest.split_at(ipl_count);

        // Definitions: later files win on model-name collisions.
        let mut definitions: HashMap<String, ObjectDefinition> = HashMap::new();
        let mut id_to_name: HashMap<i32, String> = HashMap::new();
        for (path, bytes) in desc.definition_paths.iter().zip(def_buffers) {
            let text = String::from_utf8_lossy(bytes);
            for def in parse_item_definitions(path, &text)? {
                if let Some(id) = def.id {
                    id_to_name.insert(id as i32, def.model_name.clone());
                }
                definitions.insert(def.model_name.clone(), def);
            }
        }

        let mut placements: Vec<Vec<ItemInstance>> = Vec::with_capacity(ipl_count);
        for (path, bytes) in desc.placement_paths.iter().zip(ipl_buffers) {
            let instances = if is_binary_placement(bytes) {
                parse_item_placement_binary(path, bytes)?
            } else {
                parse_item_placement(path, &String::from_utf8_lossy(bytes))?
            };
            placements.push(instances);
        }

        let zones = ZoneTable::new(parse_zones(
            &desc.zone_path,
            &String::from_utf8_lossy(&tail[0]),
        )?);
        let color_sets = parse_time_cycle(
            &desc.time_cycle_path,
            &String::from_utf8_lossy(&tail[1]),
        )?;

        // Resolve every instance to exactly one definition; unresolved ones
        // are dropped here, never merged into a default.
        let mut resolved: Vec<(ItemInstance, ObjectDefinition, bool)> = Vec::new();
        for file_instances in placements {
            let lod_targets: BTreeSet<usize> = file_instances
                .iter()
                .filter_map(|inst| inst.lod.filter(|&l| l >= 0).map(|l| l as usize))
                .collect();
            for (index, mut inst) in file_instances.into_iter().enumerate() {
                let name = match (&inst.model_name, inst.id) {
                    (Some(name), _) => name.clone(),
                    (None, Some(id)) => match id_to_name.get(&id) {
                        Some(name) => {
                            inst.model_name = Some(name.clone());
                            name.clone()
                        }
                        None => {
                            diagnostics.record(ResolutionError::UnknownId(id));
                            continue;
                        }
                    },
                    (None, None) => {
                        diagnostics.record(ResolutionError::UnknownModel("<unnamed>".to_string()));
                        continue;
                    }
                };
                // Distant-LOD stand-ins are content for the horizon, not
                // drawable items: referenced-by-index ones and prefix-named
                // ones (minus the single exception) are left out entirely.
                if lod_targets.contains(&index) {
                    continue;
                }
                if name != LOD_EXCEPTION_MODEL
                    && LOD_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
                {
                    continue;
                }
                let Some(def) = definitions.get(&name) else {
                    diagnostics.record(ResolutionError::UnknownModel(name));
                    continue;
                };
                let has_lod_stand_in = inst.lod.is_some_and(|l| l >= 0);
                resolved.push((inst, def.clone(), has_lod_stand_in));
            }
        }

        // One decode per distinct model, fetched together.
        let model_names: BTreeSet<String> = resolved
            .iter()
            .filter_map(|(inst, ..)| inst.model_name.clone())
            .collect();
        let model_paths: Vec<String> =
            model_names.iter().map(|m| desc.model_path(m)).collect();
        let model_buffers = self.cache.fetch_many(&model_paths).await?;
        let mut meshes: HashMap<String, Arc<MeshData>> = HashMap::new();
        for (name, bytes) in model_names.iter().zip(model_buffers) {
            let mesh = decoder
                .decode_model(&bytes, &definitions[name])
                .with_context(|| format!("decoding model '{name}'"))?;
            meshes.insert(name.clone(), Arc::new(mesh));
        }

        // One decode per distinct texture dictionary.
        let txd_names: BTreeSet<String> = resolved
            .iter()
            .map(|(_, def, _)| def.txd_name.clone())
            .collect();
        let txd_paths: Vec<String> = txd_names.iter().map(|t| desc.texture_path(t)).collect();
        let txd_buffers = self.cache.fetch_many(&txd_paths).await?;
        let mut textures: HashMap<String, RasterTexture> = HashMap::new();
        for (name, bytes) in txd_names.iter().zip(txd_buffers) {
            let decoded = decoder
                .decode_texture_dictionary(&bytes)
                .with_context(|| format!("decoding texture dictionary '{name}'"))?;
            for texture in decoded {
                if texture.depth < 24 {
                    diagnostics.record(ResolutionError::UnsupportedDepth(
                        texture.name.clone(),
                        texture.depth,
                    ));
                    continue;
                }
                textures.insert(texture.name.clone(), texture);
            }
        }

        let mut batcher = MeshBatcher::new();
        for (inst, def, has_lod_stand_in) in &resolved {
            let zone = zones.classify(Point3::from_vec(inst.translation));
            let mesh = meshes[inst.model_name.as_deref().expect("resolved instance")].clone();
            batcher.add_item(def, inst, zone, *has_lod_stand_in, mesh);
        }

        let mut used: Vec<RasterTexture> = Vec::new();
        for name in batcher.texture_usage() {
            match textures.get(name) {
                Some(texture) => used.push(texture.clone()),
                None => diagnostics.record(ResolutionError::MissingTexture(name.clone())),
            }
        }
        let atlas = (!used.is_empty()).then(|| pack_atlas(&used));

        let batches = batcher.finish();
        log::info!(
            "map '{}': {} batches, {} textures, {} dropped",
            desc.name,
            batches.len(),
            used.len(),
            diagnostics.dropped.len()
        );

        Ok(MapScene {
            batches,
            atlas,
            color_sets,
            zones,
            diagnostics,
        })
    }
}
