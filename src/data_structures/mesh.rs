//! CPU-side mesh and texture shapes exchanged with the external decoder.
//!
//! The proprietary model container is decoded by an external collaborator
//! (see [`crate::scene::AssetDecoder`]); this module only fixes the shapes
//! the pipeline consumes: mesh fragments with their referenced texture
//! names, and raw raster textures destined for the atlas packer.

/// One vertex of a decoded mesh fragment.
#[derive(Clone, Copy, Debug)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
    pub color: [f32; 4],
}

/// A run of geometry sharing one material: vertices, triangle indices, the
/// texture it samples (if any) and the material base color.
#[derive(Clone, Debug)]
pub struct MeshFragment {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    /// Lower-cased texture name, or `None` for untextured fragments.
    pub texture: Option<String>,
    pub base_color: [f32; 4],
    /// Set by the decoder when the texture format carries alpha or the base
    /// color is not fully opaque.
    pub transparent: bool,
}

/// All fragments of one decoded model.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub fragments: Vec<MeshFragment>,
}

impl MeshData {
    pub fn transparent(&self) -> bool {
        self.fragments.iter().any(|frag| frag.transparent)
    }
}

/// A decoded texture as raw pixels, before atlas placement.
///
/// `depth` is bits per pixel: 32 for RGBA sources, 24 for RGB sources that
/// get an opaque alpha channel during atlas assembly.
#[derive(Clone, Debug)]
pub struct RasterTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub pixels: Vec<u8>,
}
