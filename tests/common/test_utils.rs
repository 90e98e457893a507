use std::collections::HashMap;

use map_ngin::data_structures::definition::ObjectDefinition;
use map_ngin::data_structures::mesh::{MeshData, MeshFragment, MeshVertex, RasterTexture};
use map_ngin::error::ResourceError;
use map_ngin::scene::{AssetDecoder, AssetFetcher};

/// In-memory fetcher backed by a path -> bytes map.
pub(crate) struct MemoryFetcher {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub(crate) fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.to_string(), bytes.into());
    }
}

impl AssetFetcher for MemoryFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError {
                path: path.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}

/// Decoder stub producing one unit-quad fragment per model.
///
/// The fragment samples the texture registered for the model, if any, so
/// tests can drive texture collection and atlas packing without a real
/// mesh-container decoder.
pub(crate) struct StubDecoder {
    pub(crate) model_textures: HashMap<String, String>,
    pub(crate) dictionary_textures: Vec<RasterTexture>,
    pub(crate) transparent_models: Vec<String>,
}

impl StubDecoder {
    pub(crate) fn new() -> Self {
        Self {
            model_textures: HashMap::new(),
            dictionary_textures: Vec::new(),
            transparent_models: Vec::new(),
        }
    }
}

impl AssetDecoder for StubDecoder {
    fn decode_model(&self, _bytes: &[u8], def: &ObjectDefinition) -> anyhow::Result<MeshData> {
        let transparent = self.transparent_models.contains(&def.model_name);
        Ok(MeshData {
            fragments: vec![unit_quad(
                self.model_textures.get(&def.model_name).cloned(),
                transparent,
            )],
        })
    }

    fn decode_texture_dictionary(&self, _bytes: &[u8]) -> anyhow::Result<Vec<RasterTexture>> {
        Ok(self.dictionary_textures.clone())
    }
}

/// A one-by-one quad in the XY plane.
pub(crate) fn unit_quad(texture: Option<String>, transparent: bool) -> MeshFragment {
    let positions = [
        [-0.5, -0.5, 0.0],
        [0.5, -0.5, 0.0],
        [0.5, 0.5, 0.0],
        [-0.5, 0.5, 0.0],
    ];
    let vertices = positions
        .iter()
        .map(|&position| MeshVertex {
            position,
            normal: [0.0, 0.0, 1.0],
            tex_coord: [position[0] + 0.5, position[1] + 0.5],
            color: [1.0, 1.0, 1.0, 1.0],
        })
        .collect();
    MeshFragment {
        vertices,
        indices: vec![0, 1, 2, 2, 3, 0],
        texture,
        base_color: [1.0, 1.0, 1.0, 1.0],
        transparent,
    }
}

/// Solid-color raster texture with the given pixel depth (24 or 32).
pub(crate) fn make_texture(name: &str, width: u32, height: u32, depth: u32) -> RasterTexture {
    let bpp = depth / 8;
    let pixels = (0..width * height)
        .flat_map(|i| {
            let v = (i % 251) as u8;
            if bpp == 4 {
                vec![v, v.wrapping_add(1), v.wrapping_add(2), 0x80]
            } else {
                vec![v, v.wrapping_add(1), v.wrapping_add(2)]
            }
        })
        .collect();
    RasterTexture {
        name: name.to_string(),
        width,
        height,
        depth,
        pixels,
    }
}

/// Serialize a binary placement buffer with the standard header layout.
pub(crate) fn binary_placement(records: &[(f32, f32, f32, [f32; 4], i32, i32, i32)]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"bnry");
    bytes.extend_from_slice(&(records.len() as u32).to_le_bytes());
    // The fixed header region up to the instance data at 0x4c.
    for word in 2..19 {
        let value: u32 = if word == 7 { 0x4c } else { 0 };
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    assert_eq!(bytes.len(), 0x4c);
    for &(x, y, z, rot, id, interior, lod) in records {
        for f in [x, y, z, rot[0], rot[1], rot[2], rot[3]] {
            bytes.extend_from_slice(&f.to_le_bytes());
        }
        for i in [id, interior, lod] {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
    }
    bytes
}
