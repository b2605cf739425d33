use std::collections::BTreeMap;

use glam::{Mat4, Vec3};

use crate::{
    camera::SortCamera,
    sort::{sort_entries, SortEntry, SortMode, SortRequest, SortResponse},
    splat::{Position, PositionBuffer},
};


/// Widening applied to the clip volume so splats whose footprint straddles
/// the frustum edge keep rendering.
const CULL_MARGIN: f32 = 1.2;


struct SplatBatch {
    positions: Vec<Position>,
    visible: bool,
}


/// Authoritative registry of live splat batches plus the depth-ordering
/// kernel. Single-threaded; [`worker`](crate::sort::worker) runs one of these
/// on its own thread and feeds it requests in arrival order.
pub struct DepthSorter {
    batches: BTreeMap<u32, SplatBatch>,
    entries: Vec<SortEntry>,
    mode: SortMode,
}

impl DepthSorter {
    pub fn new(mode: SortMode) -> Self {
        Self {
            batches: BTreeMap::new(),
            entries: Vec::new(),
            mode,
        }
    }

    /// Applies one protocol request, answering with the recomputed order for
    /// every stamped variant.
    pub fn handle(&mut self, request: SortRequest) -> Option<SortResponse> {
        match request {
            SortRequest::AddBatches { addresses, positions, batch_size } => {
                self.add_batches(&addresses, &positions, batch_size);
                None
            },
            SortRequest::ShowBatches { addresses, camera, id } => {
                self.show_batches(&addresses);
                Some(self.respond(&camera, id))
            },
            SortRequest::HideBatches { addresses, camera, id } => {
                self.hide_batches(&addresses);
                Some(self.respond(&camera, id))
            },
            SortRequest::RemoveBatches { addresses, camera, id } => {
                self.remove_batches(&addresses);
                Some(self.respond(&camera, id))
            },
            SortRequest::Sort { camera, id } => {
                Some(self.respond(&camera, id))
            },
        }
    }

    /// Registers a tile's batches as known but hidden. Each batch keeps a
    /// tight copy of its own slice of the position buffer; the final batch of
    /// a tile may hold fewer points than the batch size.
    pub fn add_batches(
        &mut self,
        addresses: &[u32],
        positions: &PositionBuffer,
        batch_size: u32,
    ) {
        let batch_size = batch_size as usize;

        for (batch, &address) in addresses.iter().enumerate() {
            let start = batch * batch_size;
            let end = positions.len().min(start + batch_size);
            let tight: Vec<Position> = (start..end)
                .map(|index| positions.point(index))
                .collect();

            self.batches.insert(address, SplatBatch {
                positions: tight,
                visible: false,
            });
        }
    }

    pub fn show_batches(&mut self, addresses: &[u32]) {
        for address in addresses {
            if let Some(batch) = self.batches.get_mut(address) {
                batch.visible = true;
            }
        }
    }

    pub fn hide_batches(&mut self, addresses: &[u32]) {
        for address in addresses {
            if let Some(batch) = self.batches.get_mut(address) {
                batch.visible = false;
            }
        }
    }

    pub fn remove_batches(&mut self, addresses: &[u32]) {
        for address in addresses {
            self.batches.remove(address);
        }
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn visible_splats(&self) -> usize {
        self.batches
            .values()
            .filter(|batch| batch.visible)
            .map(|batch| batch.positions.len())
            .sum()
    }

    /// Back-to-front order of every visible splat as seen from `camera`,
    /// frustum-culled when the camera carries a view-projection matrix.
    pub fn sort(&mut self, camera: &SortCamera) -> Vec<u32> {
        let eye = camera.position();
        let clip_from_store = camera.clip_from_store();

        self.entries.clear();

        for (&address, batch) in &self.batches {
            if !batch.visible {
                continue;
            }

            for (offset, point) in batch.positions.iter().enumerate() {
                let position = Vec3::from_array(*point);

                if let Some(clip_from_store) = &clip_from_store {
                    if culled(clip_from_store, position) {
                        continue;
                    }
                }

                let delta = eye - position;

                self.entries.push(SortEntry {
                    key: bytemuck::cast(delta.length_squared()),
                    index: address + offset as u32,
                });
            }
        }

        sort_entries(self.mode, &mut self.entries);

        self.entries.iter().map(|entry| entry.index).collect()
    }

    fn respond(&mut self, camera: &SortCamera, id: u64) -> SortResponse {
        let order = self.sort(camera);
        let count = order.len();

        SortResponse { order, count, id }
    }
}


fn culled(clip_from_store: &Mat4, position: Vec3) -> bool {
    let clip = *clip_from_store * position.extend(1.0);
    let margin = CULL_MARGIN * clip.w;

    clip.z < -clip.w
        || clip.x < -margin
        || clip.x > margin
        || clip.y < -margin
        || clip.y > margin
}
