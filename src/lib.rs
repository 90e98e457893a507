//! map-ngin
//!
//! A map-data pipeline for open-world city scenes. This crate ingests a
//! city's worth of map-description assets — item definitions, item
//! placements, zone bounds, day/night color curves — and organizes them
//! into a small number of batched draw groups suitable for efficient
//! rendering. Graphics-device work, mesh-container decoding and asset
//! transport stay behind small trait seams; the crate hands the renderer
//! deterministic batches, packed atlas pixels and per-frame visibility
//! answers.
//!
//! High-level modules
//! - `formats`: parsers for the text and binary map file formats
//! - `data_structures`: the pipeline data model (definitions, instances,
//!   zones, color sets, draw keys, meshes)
//! - `batch`: accumulation of placed meshes into per-draw-key batches
//! - `atlas`: greedy texture packing into shared atlases and arrays
//! - `visibility`: per-frame time/distance/frustum culling
//! - `scene`: load orchestration over the fetcher/decoder seams
//! - `geometry`: shared AABB/sphere/frustum primitives
//! - `error`: the FormatError/ResolutionError/ResourceError taxonomy
//!

pub mod atlas;
pub mod batch;
pub mod data_structures;
pub mod error;
pub mod formats;
pub mod geometry;
pub mod scene;
pub mod visibility;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
