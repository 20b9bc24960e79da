// Adapters - container driver implementations

pub mod mock;

#[cfg(feature = "libav")]
pub mod libav;

pub use mock::MockDriver;

#[cfg(feature = "libav")]
pub use libav::LibavDriver;
