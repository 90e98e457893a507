//! Placed item instances and their world transforms.
//!
//! An [`ItemInstance`] is one placed occurrence of a defined model: position,
//! rotation (as quaternion), and non-uniform scale, plus the optional
//! interior and level-of-detail bookkeeping the placement formats carry.
//! Instances are ephemeral: they are consumed once during batching.

use cgmath::{Matrix4, Quaternion, Vector3};

/// Interior index meaning "visible from every interior".
pub const INTERIOR_EVERYWHERE: i32 = 13;

/// One placed occurrence of a model.
///
/// The binary placement format carries only a numeric id; the model name is
/// resolved later through the id-to-name table built from the definitions.
#[derive(Clone, Debug)]
pub struct ItemInstance {
    pub id: Option<i32>,
    pub model_name: Option<String>,
    pub translation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub interior: Option<i32>,
    /// Index of this instance's distant-LOD stand-in within the same
    /// placement file, where the format provides one.
    pub lod: Option<i32>,
}

impl ItemInstance {
    /// Translation, rotation and non-uniform scale composed into a single
    /// world matrix.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// World matrix with the source data's Z-up convention rotated into the
    /// renderer's Y-up space.
    pub fn world_matrix(&self) -> Matrix4<f32> {
        // 120-degree rotation about (1,1,1): maps +Z onto +Y.
        let basis_change = Quaternion::new(-0.5, 0.5, 0.5, 0.5);
        Matrix4::from(basis_change) * self.to_matrix()
    }
}
