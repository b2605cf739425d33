use glam::{
    Mat4,
    Vec3,
    Vec4,
};
use serde::{
    Deserialize,
    Serialize,
};


/// Maps a store-space (z-up) point into the caller's y-up world space,
/// `(x, y, z) -> (x, -z, y)`.
pub const STORE_TO_WORLD: Mat4 = Mat4::from_cols(
    Vec4::X,
    Vec4::Z,
    Vec4::NEG_Y,
    Vec4::W,
);


/// Inverse of [`STORE_TO_WORLD`] applied to a point, `(x, y, z) -> (x, z, -y)`.
///
/// The sort engine receives camera positions in this permuted order. The
/// permutation is a rotation, so distances measured against store-space splat
/// positions match distances measured in world space.
pub fn world_to_store(position: Vec3) -> [f32; 3] {
    [position.x, position.z, -position.y]
}

/// Rebases a world-space view-projection matrix onto store axes and lays it
/// out row-major, the form the sort engine consumes for frustum culling.
pub fn store_view_projection(view_projection: Mat4) -> [f32; 16] {
    (view_projection * STORE_TO_WORLD).transpose().to_cols_array()
}


/// Camera state crossing the sort engine protocol.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
)]
pub struct SortCamera {
    /// Camera position permuted into store axis order.
    pub xyz: [f32; 3],
    /// Row-major store-space view-projection matrix, present only when
    /// frustum culling is requested.
    pub vpm: Option<[f32; 16]>,
}

impl SortCamera {
    pub fn new(position: Vec3, view_projection: Option<Mat4>) -> Self {
        Self {
            xyz: world_to_store(position),
            vpm: view_projection.map(store_view_projection),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.xyz)
    }

    pub fn clip_from_store(&self) -> Option<Mat4> {
        self.vpm.map(|vpm| Mat4::from_cols_array(&vpm).transpose())
    }
}
