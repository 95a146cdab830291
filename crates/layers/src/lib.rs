pub mod layer;
pub mod manager;
pub mod snapshot;

pub use layer::*;
pub use manager::*;
pub use snapshot::*;
