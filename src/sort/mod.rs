use bytemuck::{
    Pod,
    Zeroable,
};
use serde::{
    Deserialize,
    Serialize,
};
use static_assertions::assert_cfg;

use crate::{
    camera::SortCamera,
    splat::PositionBuffer,
};

pub mod engine;

#[cfg(feature = "sort_rayon")]
pub mod rayon;

#[cfg(feature = "sort_std")]
pub mod std_sort;

pub mod worker;


assert_cfg!(
    any(
        feature = "sort_rayon",
        feature = "sort_std",
    ),
    "no sort mode enabled",
);


#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
pub enum SortMode {
    None,

    #[cfg(feature = "sort_rayon")]
    Rayon,

    #[cfg(feature = "sort_std")]
    Std,
}

impl Default for SortMode {
    #[allow(unreachable_code)]
    fn default() -> Self {
        #[cfg(feature = "sort_rayon")]
        return Self::Rayon;

        #[cfg(feature = "sort_std")]
        return Self::Std;

        Self::None
    }
}


/// Sort key pair: `key` holds the bit pattern of a non-negative squared
/// distance, `index` the splat's slot address. Non-negative floats order the
/// same as their bit patterns, so entries compare as plain integers.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Pod,
    Zeroable,
)]
#[repr(C)]
pub struct SortEntry {
    pub key: u32,
    pub index: u32,
}

/// Back-to-front: descending distance, ascending address on ties so repeated
/// sorts of the same scene are bit-identical.
pub fn sort_entries(mode: SortMode, entries: &mut [SortEntry]) {
    match mode {
        SortMode::None => {},

        #[cfg(feature = "sort_rayon")]
        SortMode::Rayon => rayon::sort_entries(entries),

        #[cfg(feature = "sort_std")]
        SortMode::Std => std_sort::sort_entries(entries),
    }
}


/// One message to the sort engine. Every variant except `AddBatches` carries
/// a sequencing id and produces exactly one [`SortResponse`]; registration is
/// fire-and-forget and is observed through the next stamped response.
#[derive(Clone, Debug)]
pub enum SortRequest {
    AddBatches {
        addresses: Vec<u32>,
        positions: PositionBuffer,
        batch_size: u32,
    },
    ShowBatches {
        addresses: Vec<u32>,
        camera: SortCamera,
        id: u64,
    },
    HideBatches {
        addresses: Vec<u32>,
        camera: SortCamera,
        id: u64,
    },
    RemoveBatches {
        addresses: Vec<u32>,
        camera: SortCamera,
        id: u64,
    },
    Sort {
        camera: SortCamera,
        id: u64,
    },
}

/// Ordered splat addresses for back-to-front drawing; entries past `count`
/// are not valid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SortResponse {
    pub order: Vec<u32>,
    pub count: usize,
    pub id: u64,
}
