//! Accumulation of placed meshes into per-draw-key batches.
//!
//! The batcher owns the structural `DrawKey -> batch` dictionary during
//! scene construction. Adding is append-only; once every placement has been
//! classified, [`MeshBatcher::finish`] computes the per-batch bounding
//! volumes the visibility evaluator needs and freezes the batches in a
//! deterministic order.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use cgmath::{Matrix4, Point3, Transform};

use crate::data_structures::definition::ObjectDefinition;
use crate::data_structures::draw_key::DrawKey;
use crate::data_structures::instance::ItemInstance;
use crate::data_structures::mesh::MeshData;
use crate::geometry::{Aabb, BoundingSphere};

/// One decoded model placed in the world.
#[derive(Clone, Debug)]
pub struct MeshInstance {
    pub mesh: Arc<MeshData>,
    pub world: Matrix4<f32>,
}

/// All instances sharing one draw key, with the distinct texture names
/// their fragments reference and the bounds the visibility tests consume.
#[derive(Clone, Debug)]
pub struct Batch {
    pub key: DrawKey,
    pub instances: Vec<MeshInstance>,
    pub textures: BTreeSet<String>,
    pub bounds: Aabb,
    pub sphere: BoundingSphere,
}

/// Interleaved vertex layout of a flattened batch: position, modulated
/// color, texture coordinates and the atlas rectangle of the sampled
/// texture (or -1s when the fragment is untextured).
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub tex_coord: [f32; 2],
    pub tex_rect: [f32; 4],
}

impl Batch {
    /// Bake every instance into one combined vertex/index pair, vertices in
    /// world space, ready for a single draw.
    ///
    /// `placements` maps texture names to their atlas rectangles; fragments
    /// whose texture is absent sample nothing (rectangle of -1s), matching
    /// untextured fragments.
    pub fn flatten(
        &self,
        placements: &HashMap<String, crate::atlas::TexturePlacement>,
    ) -> (Vec<PackedVertex>, Vec<u32>) {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for instance in &self.instances {
            for frag in &instance.mesh.fragments {
                let tex_rect = frag
                    .texture
                    .as_deref()
                    .and_then(|name| placements.get(name))
                    .map_or([-1.0; 4], |at| {
                        [at.x as f32, at.y as f32, at.width as f32, at.height as f32]
                    });
                let base = vertices.len() as u32;
                for v in &frag.vertices {
                    let world_pos = instance.world.transform_point(Point3::from(v.position));
                    vertices.push(PackedVertex {
                        position: world_pos.into(),
                        color: [
                            v.color[0] * frag.base_color[0],
                            v.color[1] * frag.base_color[1],
                            v.color[2] * frag.base_color[2],
                            v.color[3] * frag.base_color[3],
                        ],
                        tex_coord: v.tex_coord,
                        tex_rect,
                    });
                }
                indices.extend(frag.indices.iter().map(|&i| i + base));
            }
        }
        (vertices, indices)
    }
}

/// Append-only accumulator from draw keys to batches.
#[derive(Default)]
pub struct MeshBatcher {
    batches: HashMap<DrawKey, (Vec<MeshInstance>, BTreeSet<String>)>,
    texture_usage: BTreeSet<String>,
}

impl MeshBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one resolved placement and append its mesh.
    ///
    /// `has_lod_stand_in` suppresses the key's draw-distance field: a model
    /// with a distant-LOD sibling must keep rendering at any range, the
    /// stand-in never replaces it up close. An opaque key is upgraded to
    /// translucent when the decoded mesh turned out transparent.
    pub fn add_item(
        &mut self,
        def: &ObjectDefinition,
        item: &ItemInstance,
        zone: &str,
        has_lod_stand_in: bool,
        mesh: Arc<MeshData>,
    ) {
        let mut key = DrawKey::build(def, zone);
        if has_lod_stand_in {
            key = key.without_draw_distance();
        }
        if mesh.transparent() {
            key = key.upgraded_translucent();
        }
        self.add(key, mesh, item.world_matrix());
    }

    /// Append a mesh under an explicit key.
    pub fn add(&mut self, key: DrawKey, mesh: Arc<MeshData>, world: Matrix4<f32>) {
        let (instances, textures) = self.batches.entry(key).or_default();
        for frag in &mesh.fragments {
            if let Some(name) = &frag.texture {
                textures.insert(name.clone());
                self.texture_usage.insert(name.clone());
            }
        }
        instances.push(MeshInstance { mesh, world });
    }

    /// Distinct texture names referenced by any batch so far; the input of
    /// the atlas packer.
    pub fn texture_usage(&self) -> &BTreeSet<String> {
        &self.texture_usage
    }

    /// Freeze accumulation: compute per-batch bounds and order batches
    /// deterministically by key.
    pub fn finish(self) -> Vec<Batch> {
        let mut batches: Vec<Batch> = self
            .batches
            .into_iter()
            .map(|(key, (instances, textures))| {
                let mut bounds = Aabb::empty();
                for instance in &instances {
                    for frag in &instance.mesh.fragments {
                        for v in &frag.vertices {
                            bounds.extend(instance.world.transform_point(Point3::from(v.position)));
                        }
                    }
                }
                let sphere = if bounds.is_empty() {
                    BoundingSphere {
                        center: Point3::new(0.0, 0.0, 0.0),
                        radius: 0.0,
                    }
                } else {
                    bounds.bounding_sphere()
                };
                Batch {
                    key,
                    instances,
                    textures,
                    bounds,
                    sphere,
                }
            })
            .collect();
        batches.sort_by(|a, b| {
            (
                &a.key.zone,
                a.key.layer as u8,
                a.key.draw_distance.map(f32::to_bits),
                a.key.time_window.map(|w| (w.on, w.off)),
            )
                .cmp(&(
                    &b.key.zone,
                    b.key.layer as u8,
                    b.key.draw_distance.map(f32::to_bits),
                    b.key.time_window.map(|w| (w.on, w.off)),
                ))
        });
        batches
    }
}
