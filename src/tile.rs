use glam::{
    Mat4,
    Vec3,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::cloud::TiledCloud;

#[cfg(feature = "query_raycast")]
use crate::query::raycast::{Ray, RaycastHit};


/// Stable identity of one inserted tile, valid for the cloud's lifetime.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
)]
pub struct TileId(pub(crate) u64);

impl TileId {
    pub fn value(&self) -> u64 {
        self.0
    }
}


#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    Deserialize,
)]
pub enum TileState {
    /// Inserted but not part of the render order.
    #[default]
    Hidden,
    Visible,
    /// Terminal; the tile's batches have been released for reuse.
    Removed,
}


/// Borrowing convenience wrapper over one tile of a [`TiledCloud`].
pub struct Tile<'a> {
    pub(crate) cloud: &'a mut TiledCloud,
    pub(crate) id: TileId,
}

impl Tile<'_> {
    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn state(&self) -> TileState {
        self.cloud.tile_state(self.id).unwrap_or(TileState::Removed)
    }

    /// See [`TiledCloud::show`]; `on_visible` runs once the tile's splats are
    /// part of an applied render order.
    pub fn show(&mut self, on_visible: impl FnOnce() + 'static) {
        self.cloud.show(self.id, on_visible);
    }

    pub fn hide(&mut self) {
        self.cloud.hide(self.id);
    }

    pub fn remove(&mut self) {
        self.cloud.remove(self.id);
    }

    /// Requests a fresh order for the whole cloud. Inert once the tile has
    /// been removed.
    pub fn sort(&mut self, camera_position: Vec3, view_projection: Option<Mat4>) {
        if self.state() == TileState::Removed {
            return;
        }

        self.cloud.sort(camera_position, view_projection);
    }

    #[cfg(feature = "query_raycast")]
    pub fn raycast(&self, ray: &Ray, threshold: f32) -> Vec<RaycastHit> {
        self.cloud.raycast(self.id, ray, threshold)
    }
}
