use std::{
    cmp::Reverse,
    collections::BinaryHeap,
};

use crate::error::CloudError;


/// Backing storage the allocator drives when the free set runs dry. One call
/// adds one storage unit of capacity and returns the new total slot count.
pub trait StoreBacking {
    fn grow_unit(&mut self) -> u32;
}


/// Tracks free batch-aligned base addresses over a growable slot space.
///
/// Addresses are handed out lowest-first so recycled batches are reused
/// before growth widens the address range.
#[derive(Debug)]
pub struct BatchAllocator {
    free: BinaryHeap<Reverse<u32>>,
    batch_size: u32,
    capacity: u32,
}

impl BatchAllocator {
    /// `capacity` must be a multiple of `batch_size`; the settings layer
    /// guarantees this for store-derived capacities.
    pub fn new(batch_size: u32, capacity: u32) -> Self {
        let free = (0..capacity)
            .step_by(batch_size as usize)
            .map(Reverse)
            .collect();

        Self {
            free,
            batch_size,
            capacity,
        }
    }

    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn free_batches(&self) -> usize {
        self.free.len()
    }

    pub fn batches_for(&self, splat_count: usize) -> usize {
        splat_count.div_ceil(self.batch_size as usize)
    }

    /// Reserves enough batches to hold `splat_count` splats, growing the
    /// backing until the free set suffices. Returned base addresses are
    /// multiples of the batch size, in ascending order.
    pub fn reserve(
        &mut self,
        splat_count: usize,
        backing: &mut impl StoreBacking,
    ) -> Result<Vec<u32>, CloudError> {
        let batches = self.batches_for(splat_count);

        while self.free.len() < batches {
            let new_capacity = backing.grow_unit();
            if new_capacity <= self.capacity {
                return Err(CloudError::AddressSpaceExhausted);
            }

            self.extend(new_capacity);
        }

        let mut addresses = Vec::with_capacity(batches);
        for _ in 0..batches {
            let Reverse(address) = self
                .free
                .pop()
                .ok_or(CloudError::AddressSpaceExhausted)?;
            addresses.push(address);
        }

        Ok(addresses)
    }

    /// Returns a previously reserved batch back to the free set.
    pub fn release(&mut self, address: u32) {
        debug_assert_eq!(address % self.batch_size, 0);
        self.free.push(Reverse(address));
    }

    fn extend(&mut self, new_capacity: u32) {
        for address in (self.capacity..new_capacity).step_by(self.batch_size as usize) {
            self.free.push(Reverse(address));
        }

        self.capacity = new_capacity;
    }
}
