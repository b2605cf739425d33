pub use allocator::{
    BatchAllocator,
    StoreBacking,
};
pub use camera::SortCamera;
pub use cloud::{
    RenderOrder,
    TiledCloud,
};
pub use error::CloudError;
pub use settings::{
    default_batch_size,
    CloudSettings,
};
pub use sort::{
    SortEntry,
    SortMode,
    SortRequest,
    SortResponse,
};
pub use splat::{
    rand::random_splats,
    Position,
    PositionBuffer,
    Splat,
    SplatTileData,
};
pub use store::{
    AttributeStore,
    StoreSnapshot,
    Texel,
};
pub use tile::{
    Tile,
    TileId,
    TileState,
};

pub mod allocator;
pub mod camera;
pub mod cloud;
pub mod error;
pub mod query;
pub mod settings;
pub mod sort;
pub mod splat;
pub mod store;
pub mod tile;
