use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    error::CloudError,
    sort::SortMode,
};


/// Batch size chosen so one batch covers whole rows of a storage unit,
/// aiming for 4096 splats per batch where the unit size allows it.
pub fn default_batch_size(unit_size: u32) -> u32 {
    (4096u32.div_ceil(unit_size) * unit_size).min(unit_size * unit_size)
}


#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Serialize,
    Deserialize,
)]
pub struct CloudSettings {
    /// Side length of one square storage unit; a unit holds `unit_size^2` slots.
    pub unit_size: u32,
    pub initial_units: u32,
    pub batch_size: u32,
    pub sort_mode: SortMode,
    /// Forward the view-projection matrix to the sort engine so off-screen
    /// splats are dropped from the render order.
    pub cpu_culling: bool,
}

impl Default for CloudSettings {
    fn default() -> Self {
        let unit_size = 1024;

        Self {
            unit_size,
            initial_units: 1,
            batch_size: default_batch_size(unit_size),
            sort_mode: SortMode::default(),
            cpu_culling: false,
        }
    }
}

impl CloudSettings {
    pub fn with_unit_size(unit_size: u32) -> Self {
        Self {
            unit_size,
            batch_size: default_batch_size(unit_size.max(1)),
            ..Self::default()
        }
    }

    /// Slots added by one growth step.
    pub fn unit_slots(&self) -> u32 {
        self.unit_size * self.unit_size
    }

    pub fn initial_capacity(&self) -> u32 {
        self.unit_slots() * self.initial_units
    }

    /// Batches must cover whole unit rows and divide the unit evenly, so
    /// every growth step adds a whole number of batch-aligned addresses.
    pub fn validate(&self) -> Result<(), CloudError> {
        if self.unit_size == 0 {
            return Err(CloudError::ZeroSetting { field: "unit_size" });
        }

        if self.initial_units == 0 {
            return Err(CloudError::ZeroSetting { field: "initial_units" });
        }

        if self.batch_size == 0 {
            return Err(CloudError::ZeroSetting { field: "batch_size" });
        }

        if self.batch_size % self.unit_size != 0 || self.unit_slots() % self.batch_size != 0 {
            return Err(CloudError::BatchAlignment {
                batch_size: self.batch_size,
                unit_size: self.unit_size,
            });
        }

        Ok(())
    }
}
