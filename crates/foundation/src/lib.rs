pub mod bounds;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
