pub mod config;
pub mod geometry;
pub mod map;
pub mod view;

pub use config::*;
pub use geometry::*;
pub use map::*;
pub use view::*;
