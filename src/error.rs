use thiserror::Error;


#[derive(Debug, Error)]
pub enum CloudError {
    #[error("{field} must be non-zero")]
    ZeroSetting {
        field: &'static str,
    },

    #[error("batch size {batch_size} does not tile the {unit_size}x{unit_size} storage unit")]
    BatchAlignment {
        batch_size: u32,
        unit_size: u32,
    },

    #[error("address space exhausted: no free batch after growth")]
    AddressSpaceExhausted,

    #[error("failed to spawn sort worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}
