#[cfg(feature = "query_raycast")]
pub mod raycast;
