//! Greedy texture packing into shared atlases and texture arrays.
//!
//! Batches can only be drawn with few material switches if their textures
//! live in shared GPU resources. Two packing disciplines are provided:
//!
//! - [`pack_atlas`] shelf-packs arbitrary-sized textures into one
//!   fixed-width RGBA image, the layout the single-atlas renderer samples
//!   through per-vertex placement rectangles.
//! - [`pack_texture_arrays`] groups textures by exact (width, height,
//!   depth) signature into capacity-bounded array shards, one texture per
//!   layer, for hardware that prefers texture arrays over oversized
//!   atlases.
//!
//! Both are deterministic: identical input sets produce identical layouts,
//! which golden-image tests rely on.

use std::collections::{BTreeMap, HashMap};

use crate::data_structures::mesh::RasterTexture;

/// Layers per texture-array shard before spilling into a new shard.
pub const TEXTURE_ARRAY_CAPACITY: usize = 256;

/// Where one texture landed: which atlas image or array shard, which layer
/// within it, and the placed rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TexturePlacement {
    pub index: u32,
    pub layer: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A packed RGBA atlas image plus its placement table.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub placements: HashMap<String, TexturePlacement>,
}

impl TextureAtlas {
    /// View of the pixel buffer for debug dumps and golden tests.
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .expect("atlas pixel buffer matches its dimensions")
    }
}

/// Exact shape shared by every layer of one array shard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArraySignature {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

/// A capacity-bounded stack of same-shaped RGBA layers.
#[derive(Clone, Debug)]
pub struct TextureArray {
    pub signature: ArraySignature,
    pub layers: u32,
    /// RGBA pixels, layers concatenated in layer order.
    pub pixels: Vec<u8>,
}

/// Fixed atlas width for a total pixel area: the largest power of two not
/// exceeding 2048 and not below the rounded-up square root of the area.
pub fn atlas_width_for_area(area: u64) -> u32 {
    let side = (area as f64).sqrt().ceil() as u64;
    (side.next_power_of_two() as u32).min(2048)
}

/// Deterministic packing order: descending height, then descending width,
/// then reverse-lexicographic name.
fn packing_order<'a>(textures: &'a [RasterTexture]) -> Vec<&'a RasterTexture> {
    let mut sorted: Vec<&RasterTexture> = textures.iter().collect();
    sorted.sort_by(|a, b| {
        b.height
            .cmp(&a.height)
            .then(b.width.cmp(&a.width))
            .then(b.name.cmp(&a.name))
    });
    sorted
}

/// Copy one texture's pixels into an RGBA destination row rectangle,
/// forcing alpha opaque for RGB-only sources.
fn blit_rgba(dst: &mut [u8], dst_width: u32, x: u32, y: u32, texture: &RasterTexture) {
    let bpp = (texture.depth / 8) as usize;
    for row in 0..texture.height {
        for col in 0..texture.width {
            let src = ((row * texture.width + col) as usize) * bpp;
            let dst_at = (((y + row) * dst_width + x + col) as usize) * 4;
            dst[dst_at] = texture.pixels[src];
            dst[dst_at + 1] = texture.pixels[src + 1];
            dst[dst_at + 2] = texture.pixels[src + 2];
            dst[dst_at + 3] = if bpp == 4 { texture.pixels[src + 3] } else { 0xff };
        }
    }
}

/// Shelf-pack `textures` into a single fixed-width atlas.
///
/// Walks the sorted textures maintaining a current shelf; a texture that no
/// longer fits in the remaining shelf width starts a new shelf below it
/// with the texture's own height. Packing an empty set is a precondition
/// violation, not a runtime failure.
pub fn pack_atlas(textures: &[RasterTexture]) -> TextureAtlas {
    assert!(!textures.is_empty(), "cannot pack an empty texture set");

    let area: u64 = textures
        .iter()
        .map(|t| t.width as u64 * t.height as u64)
        .sum();
    let width = atlas_width_for_area(area);

    let sorted = packing_order(textures);
    let mut placements = HashMap::with_capacity(sorted.len());
    let mut ax = 0u32;
    let mut ay = 0u32;
    let mut height = sorted[0].height;
    for texture in &sorted {
        if ax + texture.width > width {
            ax = 0;
            ay = height;
            height += texture.height;
        }
        placements.insert(
            texture.name.clone(),
            TexturePlacement {
                index: 0,
                layer: 0,
                x: ax,
                y: ay,
                width: texture.width,
                height: texture.height,
            },
        );
        ax += texture.width;
    }

    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    for texture in &sorted {
        let at = placements[&texture.name];
        blit_rgba(&mut pixels, width, at.x, at.y, texture);
    }

    TextureAtlas {
        width,
        height,
        pixels,
        placements,
    }
}

/// Pack `textures` into capacity-bounded texture arrays, one layer each.
///
/// Textures are grouped by exact (width, height, depth) signature; each
/// group fills shards of at most [`TEXTURE_ARRAY_CAPACITY`] layers before
/// spilling into the next. Placement `index` is the shard, `layer` the
/// texture's layer within it.
pub fn pack_texture_arrays(
    textures: &[RasterTexture],
) -> (Vec<TextureArray>, HashMap<String, TexturePlacement>) {
    assert!(!textures.is_empty(), "cannot pack an empty texture set");

    let mut groups: BTreeMap<ArraySignature, Vec<&RasterTexture>> = BTreeMap::new();
    for texture in packing_order(textures) {
        let signature = ArraySignature {
            width: texture.width,
            height: texture.height,
            depth: texture.depth,
        };
        groups.entry(signature).or_default().push(texture);
    }

    let mut arrays = Vec::new();
    let mut placements = HashMap::with_capacity(textures.len());
    for (signature, members) in groups {
        for shard in members.chunks(TEXTURE_ARRAY_CAPACITY) {
            let layer_size = signature.width as usize * signature.height as usize * 4;
            let mut pixels = vec![0u8; layer_size * shard.len()];
            for (layer, texture) in shard.iter().enumerate() {
                blit_rgba(
                    &mut pixels[layer * layer_size..(layer + 1) * layer_size],
                    signature.width,
                    0,
                    0,
                    texture,
                );
                placements.insert(
                    texture.name.clone(),
                    TexturePlacement {
                        index: arrays.len() as u32,
                        layer: layer as u32,
                        x: 0,
                        y: 0,
                        width: signature.width,
                        height: signature.height,
                    },
                );
            }
            arrays.push(TextureArray {
                signature,
                layers: shard.len() as u32,
                pixels,
            });
        }
    }
    (arrays, placements)
}
