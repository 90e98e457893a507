//! Geometry primitives shared across classification, batching and visibility.
//!
//! - [`Aabb`] is the axis-aligned box used for zone bounds and batch bounds
//! - [`BoundingSphere`] is the coarse batch volume for distance culling
//! - [`Frustum`] holds the six camera planes for per-frame culling

use cgmath::{InnerSpace, Matrix, Matrix4, Point3, Vector3, Vector4};

/// Axis-aligned bounding box with inclusive bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    /// Build from two opposite corners in any order. Each axis is normalised
    /// to min/max so flipped corner pairs still produce a valid box.
    pub fn from_corners(a: Point3<f32>, b: Point3<f32>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// An inverted box that any `extend` call will snap to its first point.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn extend(&mut self, p: Point3<f32>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn contains(&self, p: Point3<f32>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Circumsphere of the box.
    pub fn bounding_sphere(&self) -> BoundingSphere {
        let center = self.center();
        let radius = (self.max - center).magnitude();
        BoundingSphere { center, radius }
    }
}

/// Center and radius of a batch's coarse bounding volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3<f32>,
    pub radius: f32,
}

/// Six camera planes in the order left, right, bottom, top, near, far.
///
/// Planes are stored as `(n.x, n.y, n.z, d)` with inward-pointing normals,
/// extracted from a view-projection matrix with the Gribb-Hartmann method
/// (depth range 0..1).
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    planes: [Vector4<f32>; 6],
}

impl Frustum {
    pub fn from_matrix(m: Matrix4<f32>) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];

        let mut planes = [
            rows[3] + rows[0], // left
            rows[3] - rows[0], // right
            rows[3] + rows[1], // bottom
            rows[3] - rows[1], // top
            rows[2],           // near
            rows[3] - rows[2], // far
        ];
        for plane in &mut planes {
            let len = Vector3::new(plane.x, plane.y, plane.z).magnitude();
            *plane /= len;
        }

        Self { planes }
    }

    fn signed_distance(plane: Vector4<f32>, p: Point3<f32>) -> f32 {
        plane.x * p.x + plane.y * p.y + plane.z * p.z + plane.w
    }

    /// Perpendicular distance from the near plane to `p`, positive in front
    /// of the camera.
    pub fn near_plane_distance(&self, p: Point3<f32>) -> f32 {
        Self::signed_distance(self.planes[4], p)
    }

    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes
            .iter()
            .all(|&plane| Self::signed_distance(plane, sphere.center) >= -sphere.radius)
    }

    /// Conservative AABB test: the box is rejected only when it lies fully
    /// behind one of the planes.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|&plane| {
            // The box corner furthest along the plane normal.
            let v = Point3::new(
                if plane.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if plane.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if plane.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            Self::signed_distance(plane, v) >= 0.0
        })
    }
}
