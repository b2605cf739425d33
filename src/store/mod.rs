use std::sync::Arc;

pub mod packer;


/// One RGBA32UI slot of an attribute plane.
pub type Texel = [u32; 4];


/// Growable, address-indexed texel storage for one splat attribute plane.
///
/// Slots are laid out as `units` square pages of `unit_size^2` texels,
/// flattened to linear addresses `0..capacity`. Growth builds a larger
/// buffer, copies every existing texel into its low slots, then swaps the
/// buffer in; snapshots taken earlier keep the old buffer alive until they
/// drop, so readers never observe a partially grown store.
#[derive(Clone, Debug)]
pub struct AttributeStore {
    texels: Arc<Vec<Texel>>,
    unit_size: u32,
    units: u32,
}

impl AttributeStore {
    pub fn new(unit_size: u32, units: u32) -> Self {
        let capacity = unit_size as usize * unit_size as usize * units as usize;

        Self {
            texels: Arc::new(vec![Texel::default(); capacity]),
            unit_size,
            units,
        }
    }

    pub fn unit_size(&self) -> u32 {
        self.unit_size
    }

    pub fn units(&self) -> u32 {
        self.units
    }

    pub fn capacity(&self) -> u32 {
        self.unit_size * self.unit_size * self.units
    }

    pub fn texel(&self, address: u32) -> Texel {
        self.texels[address as usize]
    }

    /// Writes one batch's packed texels at `address`. Writing through a live
    /// snapshot copies the buffer first, so the snapshot stays untouched.
    pub fn write_region(&mut self, address: u32, texels: &[Texel]) {
        let start = address as usize;
        let end = start + texels.len();
        assert!(
            end <= self.texels.len(),
            "write region {start}..{end} exceeds store capacity {}",
            self.texels.len(),
        );

        Arc::make_mut(&mut self.texels)[start..end].copy_from_slice(texels);
    }

    /// Copy-then-swap growth to `new_units` total pages. Returns the new slot
    /// capacity.
    pub fn grow(&mut self, new_units: u32) -> u32 {
        assert!(new_units > self.units, "store growth never shrinks");

        let unit_slots = self.unit_size as usize * self.unit_size as usize;
        let mut next = vec![Texel::default(); unit_slots * new_units as usize];
        next[..self.texels.len()].copy_from_slice(&self.texels);

        self.texels = Arc::new(next);
        self.units = new_units;

        self.capacity()
    }

    /// Cheap shared view of the current buffer; the surface a render adapter
    /// uploads from.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            texels: Arc::clone(&self.texels),
            unit_size: self.unit_size,
            units: self.units,
        }
    }
}


#[derive(Clone, Debug)]
pub struct StoreSnapshot {
    texels: Arc<Vec<Texel>>,
    unit_size: u32,
    units: u32,
}

impl StoreSnapshot {
    pub fn texel(&self, address: u32) -> Texel {
        self.texels[address as usize]
    }

    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    pub fn unit_size(&self) -> u32 {
        self.unit_size
    }

    pub fn units(&self) -> u32 {
        self.units
    }

    pub fn capacity(&self) -> u32 {
        self.unit_size * self.unit_size * self.units
    }
}


#[cfg(test)]
mod tests {
    use super::*;


    #[test]
    fn write_then_read_roundtrips() {
        let mut store = AttributeStore::new(4, 1);
        let texels = [[1, 2, 3, 4], [5, 6, 7, 8]];

        store.write_region(4, &texels);

        assert_eq!(store.texel(4), [1, 2, 3, 4]);
        assert_eq!(store.texel(5), [5, 6, 7, 8]);
        assert_eq!(store.texel(6), Texel::default());
    }

    #[test]
    fn growth_preserves_low_slots_and_zero_extends() {
        let mut store = AttributeStore::new(4, 1);
        store.write_region(0, &[[9, 9, 9, 9]]);
        store.write_region(15, &[[7, 7, 7, 7]]);

        let capacity = store.grow(2);

        assert_eq!(capacity, 32);
        assert_eq!(store.units(), 2);
        assert_eq!(store.texel(0), [9, 9, 9, 9]);
        assert_eq!(store.texel(15), [7, 7, 7, 7]);
        assert_eq!(store.texel(16), Texel::default());
        assert_eq!(store.texel(31), Texel::default());
    }

    #[test]
    fn snapshot_survives_growth_and_writes() {
        let mut store = AttributeStore::new(4, 1);
        store.write_region(3, &[[1, 1, 1, 1]]);

        let snapshot = store.snapshot();

        store.grow(2);
        store.write_region(3, &[[2, 2, 2, 2]]);

        assert_eq!(snapshot.capacity(), 16);
        assert_eq!(snapshot.texel(3), [1, 1, 1, 1]);
        assert_eq!(store.texel(3), [2, 2, 2, 2]);
        assert_eq!(store.capacity(), 32);
    }

    #[test]
    fn write_through_snapshot_copies_on_write() {
        let mut store = AttributeStore::new(4, 1);
        let snapshot = store.snapshot();

        store.write_region(0, &[[5, 5, 5, 5]]);

        assert_eq!(snapshot.texel(0), Texel::default());
        assert_eq!(store.texel(0), [5, 5, 5, 5]);
    }
}
