pub mod conquest;
pub mod error;
pub mod math;
#[cfg(test)]
mod test_meshes;
pub mod topology;

pub use error::{PromeshError, Result};
