use bytemuck::{
    Pod,
    Zeroable,
};
use serde::{
    Deserialize,
    Serialize,
};

pub mod covariance;
pub mod f16;
pub mod rand;


pub type Position = [f32; 3];


/// One splat in caller-facing form: store-space position, linear `[0, 1]`
/// color, and the upper triangle of the 3d covariance matrix split across
/// two 3-component halves `(xx, xy, xz)` and `(yy, yz, zz)`.
#[derive(
    Clone,
    Debug,
    Default,
    Copy,
    PartialEq,
    Pod,
    Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Splat {
    pub position: Position,
    pub color: [f32; 4],
    pub covariance_a: [f32; 3],
    pub covariance_b: [f32; 3],
}


/// Splat positions in a possibly interleaved vertex buffer. `point(i)` reads
/// three consecutive floats at `i * stride + offset`.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
)]
pub struct PositionBuffer {
    pub data: Vec<f32>,
    pub offset: usize,
    pub stride: usize,
}

impl PositionBuffer {
    pub fn tight(data: Vec<f32>) -> Self {
        Self {
            data,
            offset: 0,
            stride: 3,
        }
    }

    pub fn interleaved(data: Vec<f32>, offset: usize, stride: usize) -> Self {
        assert!(stride >= 3, "position stride must cover three components");

        Self {
            data,
            offset,
            stride,
        }
    }

    pub fn len(&self) -> usize {
        if self.stride == 0 {
            return 0;
        }

        self.data.len() / self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn point(&self, index: usize) -> Position {
        let base = index * self.stride + self.offset;

        [
            self.data[base],
            self.data[base + 1],
            self.data[base + 2],
        ]
    }

    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.len()).map(|index| self.point(index))
    }

    pub fn to_tight(&self) -> Vec<Position> {
        self.iter().collect()
    }
}


/// Input of one insertion call, the unit a tile is built from.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
)]
pub struct SplatTileData {
    pub positions: PositionBuffer,
    pub colors: Vec<[f32; 4]>,
    pub covariance_a: Vec<[f32; 3]>,
    pub covariance_b: Vec<[f32; 3]>,
}

impl SplatTileData {
    pub fn from_splats(splats: &[Splat]) -> Self {
        let mut positions = Vec::with_capacity(splats.len() * 3);
        let mut colors = Vec::with_capacity(splats.len());
        let mut covariance_a = Vec::with_capacity(splats.len());
        let mut covariance_b = Vec::with_capacity(splats.len());

        for splat in splats {
            positions.extend_from_slice(&splat.position);
            colors.push(splat.color);
            covariance_a.push(splat.covariance_a);
            covariance_b.push(splat.covariance_b);
        }

        Self {
            positions: PositionBuffer::tight(positions),
            colors,
            covariance_a,
            covariance_b,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
