pub mod archive;
pub mod decode;
pub mod feature_set;
pub mod projection;
pub mod reproject;

pub use archive::*;
pub use decode::*;
pub use feature_set::*;
pub use projection::*;
pub use reproject::*;
