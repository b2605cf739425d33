use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::{Duration, Instant},
};

use glam::{Mat4, Vec3};
use tracing::{debug, error, info};

use crate::{
    allocator::{BatchAllocator, StoreBacking},
    camera::{store_view_projection, world_to_store, SortCamera},
    error::CloudError,
    settings::CloudSettings,
    sort::{worker::SortWorker, SortRequest, SortResponse},
    splat::{Position, SplatTileData},
    store::{packer, AttributeStore, StoreSnapshot},
    tile::{Tile, TileId, TileState},
};

#[cfg(feature = "query_raycast")]
use crate::query::raycast::{raycast_positions, Ray, RaycastHit};


/// Snapshot of the draw order: splat addresses back-to-front, valid up to
/// `count`. Replaced wholesale on every sort response, never mutated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderOrder {
    pub order: Vec<u32>,
    pub count: usize,
}


struct TileRecord {
    state: TileState,
    addresses: Vec<u32>,
    /// Tight store-space copy kept for raycasting, cleared on removal.
    positions: Vec<Position>,
    splat_count: usize,
    /// Sequencing id of the not-yet-resolved `show` continuation, if any.
    pending_show: Option<u64>,
}


/// Grows both attribute planes in lockstep when the allocator runs dry.
struct StorePair<'a> {
    position_color: &'a mut AttributeStore,
    covariance: &'a mut AttributeStore,
}

impl StoreBacking for StorePair<'_> {
    fn grow_unit(&mut self) -> u32 {
        let units = self.position_color.units() + 1;

        let capacity = self.position_color.grow(units);
        let covariance_capacity = self.covariance.grow(units);
        debug_assert_eq!(capacity, covariance_capacity);

        info!(capacity, units, "attribute stores grown");

        capacity
    }
}


/// Owner of the splat storage pipeline: allocator, the two attribute planes,
/// the sort worker, and the request sequencing that ties responses back to
/// tile callbacks.
///
/// All methods run on the owning context; the only other participant is the
/// sort thread, reached purely by message passing. Call [`update`] once per
/// frame to drain responses and refresh the render order.
///
/// [`update`]: TiledCloud::update
pub struct TiledCloud {
    settings: CloudSettings,
    allocator: BatchAllocator,
    position_color: AttributeStore,
    covariance: AttributeStore,
    worker: SortWorker,

    tiles: HashMap<TileId, TileRecord>,
    next_tile_id: u64,

    next_sort_id: u64,
    applied_sort_id: Option<u64>,
    continuations: BTreeMap<u64, Box<dyn FnOnce()>>,

    render_order: Arc<RenderOrder>,

    camera_position: Vec3,
    /// Store-space row-major view-projection, cached from the last `sort`.
    view_projection: Option<[f32; 16]>,
}

impl TiledCloud {
    pub fn new(settings: CloudSettings) -> Result<Self, CloudError> {
        settings.validate()?;

        let position_color = AttributeStore::new(settings.unit_size, settings.initial_units);
        let covariance = AttributeStore::new(settings.unit_size, settings.initial_units);
        let allocator = BatchAllocator::new(settings.batch_size, position_color.capacity());
        let worker = SortWorker::spawn(settings.sort_mode)?;

        Ok(Self {
            settings,
            allocator,
            position_color,
            covariance,
            worker,
            tiles: HashMap::new(),
            next_tile_id: 0,
            next_sort_id: 0,
            applied_sort_id: None,
            continuations: BTreeMap::new(),
            render_order: Arc::new(RenderOrder::default()),
            camera_position: Vec3::ZERO,
            view_projection: None,
        })
    }

    pub fn settings(&self) -> &CloudSettings {
        &self.settings
    }

    pub fn capacity(&self) -> u32 {
        self.allocator.capacity()
    }

    pub fn batch_size(&self) -> u32 {
        self.allocator.batch_size()
    }

    pub fn free_batches(&self) -> usize {
        self.allocator.free_batches()
    }

    /// Live (non-removed) splats across all tiles.
    pub fn len(&self) -> usize {
        self.tiles
            .values()
            .filter(|record| record.state != TileState::Removed)
            .map(|record| record.splat_count)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn visible_tiles(&self) -> usize {
        self.tiles
            .values()
            .filter(|record| record.state == TileState::Visible)
            .count()
    }

    /// Splats in the last applied render order, after any frustum culling.
    pub fn rendered_splats(&self) -> usize {
        self.render_order.count
    }

    /// Inserts one tile of splats: reserves batch addresses (growing the
    /// stores as needed), packs both attribute planes, and registers the
    /// positions with the sort engine. The tile starts [`TileState::Hidden`].
    pub fn insert(&mut self, data: SplatTileData) -> Result<TileId, CloudError> {
        let splat_count = data.len();
        let positions = data.positions.to_tight();

        let mut backing = StorePair {
            position_color: &mut self.position_color,
            covariance: &mut self.covariance,
        };

        let addresses = match self.allocator.reserve(splat_count, &mut backing) {
            Ok(addresses) => addresses,
            Err(err) => {
                error!("splat tile insertion dropped: {err}");
                return Err(err);
            },
        };

        let batch_size = self.settings.batch_size as usize;
        for (batch, &address) in addresses.iter().enumerate() {
            let start = batch * batch_size;

            let position_color =
                packer::pack_position_color(start, batch_size, &positions, &data.colors);
            let covariance =
                packer::pack_covariance(start, batch_size, &data.covariance_a, &data.covariance_b);

            self.position_color.write_region(address, &position_color);
            self.covariance.write_region(address, &covariance);
        }

        self.worker.send(SortRequest::AddBatches {
            addresses: addresses.clone(),
            positions: data.positions,
            batch_size: self.settings.batch_size,
        });

        let id = TileId(self.next_tile_id);
        self.next_tile_id += 1;

        debug!(
            tile = id.0,
            splats = splat_count,
            batches = addresses.len(),
            "splat tile inserted",
        );

        self.tiles.insert(id, TileRecord {
            state: TileState::Hidden,
            addresses,
            positions,
            splat_count,
            pending_show: None,
        });

        Ok(id)
    }

    /// Makes a hidden tile visible and registers `on_visible` to run once a
    /// render order containing the tile has been applied. A no-op on visible,
    /// removed, or unknown tiles; the callback is dropped in that case. A
    /// later [`hide`](TiledCloud::hide) or [`remove`](TiledCloud::remove)
    /// cancels an unresolved callback.
    pub fn show(&mut self, tile: TileId, on_visible: impl FnOnce() + 'static) {
        let id = self.next_sort_id;

        let Some(record) = self.tiles.get_mut(&tile) else {
            return;
        };
        if record.state != TileState::Hidden {
            return;
        }

        record.state = TileState::Visible;
        record.pending_show = Some(id);
        let addresses = record.addresses.clone();

        self.next_sort_id += 1;
        self.continuations.insert(id, Box::new(on_visible));

        let camera = self.sort_camera();
        self.worker.send(SortRequest::ShowBatches { addresses, camera, id });
    }

    /// Takes a visible tile out of the render order without discarding its
    /// data. A no-op unless the tile is visible.
    pub fn hide(&mut self, tile: TileId) {
        let Some(record) = self.tiles.get_mut(&tile) else {
            return;
        };
        if record.state != TileState::Visible {
            return;
        }

        record.state = TileState::Hidden;
        let pending = record.pending_show.take();
        let addresses = record.addresses.clone();

        if let Some(pending) = pending {
            self.continuations.remove(&pending);
        }

        let camera = self.sort_camera();
        let id = self.stamp();
        self.worker.send(SortRequest::HideBatches { addresses, camera, id });
    }

    /// Permanently removes a tile: its batches leave the sort engine's
    /// working set and their addresses return to the free set for reuse.
    /// Raycasts against the tile stop hitting. Idempotent.
    pub fn remove(&mut self, tile: TileId) {
        let Some(record) = self.tiles.get_mut(&tile) else {
            return;
        };
        if record.state == TileState::Removed {
            return;
        }

        record.state = TileState::Removed;
        let pending = record.pending_show.take();
        let addresses = std::mem::take(&mut record.addresses);
        record.positions = Vec::new();
        record.splat_count = 0;

        if let Some(pending) = pending {
            self.continuations.remove(&pending);
        }

        for &address in &addresses {
            self.allocator.release(address);
        }

        let camera = self.sort_camera();
        let id = self.stamp();
        self.worker.send(SortRequest::RemoveBatches { addresses, camera, id });
    }

    /// Requests a re-sort for a camera move. A sort with an unchanged camera
    /// position is skipped; pass the matrix whenever culling is wanted, it is
    /// only forwarded while [`CloudSettings::cpu_culling`] is set.
    pub fn sort(&mut self, camera_position: Vec3, view_projection: Option<Mat4>) {
        if camera_position == self.camera_position {
            return;
        }

        self.camera_position = camera_position;
        self.view_projection = view_projection.map(store_view_projection);

        self.send_sort();
    }

    /// Forces a re-sort with the last camera, for topology changes under a
    /// parked camera.
    pub fn resort(&mut self) {
        self.send_sort();
    }

    /// Drains every pending sort response, swapping in the newest render
    /// order and firing due tile callbacks.
    pub fn update(&mut self) {
        while let Some(response) = self.worker.try_recv() {
            self.apply(response);
        }
    }

    /// Blocks until every request issued so far has been answered and
    /// applied, or `timeout` elapses. Returns whether it drained fully.
    /// Intended for loading screens and tests; the frame path uses
    /// [`update`](TiledCloud::update).
    pub fn flush(&mut self, timeout: Duration) -> bool {
        if self.next_sort_id == 0 {
            return true;
        }

        let last = self.next_sort_id - 1;
        if self.applied_sort_id.is_some_and(|applied| applied >= last) {
            return true;
        }

        let deadline = Instant::now() + timeout;

        loop {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }

            match self.worker.recv_timeout(deadline - now) {
                Some(response) => {
                    let answered = response.id;
                    self.apply(response);

                    if answered >= last {
                        return true;
                    }
                },
                None => return false,
            }
        }
    }

    pub fn render_order(&self) -> Arc<RenderOrder> {
        Arc::clone(&self.render_order)
    }

    pub fn position_color_snapshot(&self) -> StoreSnapshot {
        self.position_color.snapshot()
    }

    pub fn covariance_snapshot(&self) -> StoreSnapshot {
        self.covariance.snapshot()
    }

    pub fn tile(&mut self, id: TileId) -> Option<Tile<'_>> {
        if self.tiles.contains_key(&id) {
            Some(Tile { cloud: self, id })
        } else {
            None
        }
    }

    pub fn tile_state(&self, tile: TileId) -> Option<TileState> {
        self.tiles.get(&tile).map(|record| record.state)
    }

    pub fn tile_addresses(&self, tile: TileId) -> Option<&[u32]> {
        self.tiles.get(&tile).map(|record| record.addresses.as_slice())
    }

    /// Synchronous query against one tile's retained positions, in store
    /// axes. Removed or unknown tiles yield no hits.
    #[cfg(feature = "query_raycast")]
    pub fn raycast(&self, tile: TileId, ray: &Ray, threshold: f32) -> Vec<RaycastHit> {
        self.tiles
            .get(&tile)
            .map(|record| raycast_positions(&record.positions, ray, threshold))
            .unwrap_or_default()
    }

    fn stamp(&mut self) -> u64 {
        let id = self.next_sort_id;
        self.next_sort_id += 1;
        id
    }

    fn sort_camera(&self) -> SortCamera {
        SortCamera {
            xyz: world_to_store(self.camera_position),
            vpm: if self.settings.cpu_culling {
                self.view_projection
            } else {
                None
            },
        }
    }

    fn send_sort(&mut self) {
        let camera = self.sort_camera();
        let id = self.stamp();
        self.worker.send(SortRequest::Sort { camera, id });
    }

    /// Every response is applied, even when a newer request is already in
    /// flight; the newer response arrives later and corrects the order.
    fn apply(&mut self, response: SortResponse) {
        self.applied_sort_id = Some(response.id);
        self.render_order = Arc::new(RenderOrder {
            order: response.order,
            count: response.count,
        });

        let keep = self.continuations.split_off(&(response.id + 1));
        let due = std::mem::replace(&mut self.continuations, keep);

        if due.is_empty() {
            return;
        }

        for record in self.tiles.values_mut() {
            if record.pending_show.is_some_and(|pending| pending <= response.id) {
                record.pending_show = None;
            }
        }

        for (_, continuation) in due {
            continuation();
        }
    }
}
