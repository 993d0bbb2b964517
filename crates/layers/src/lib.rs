pub mod layer;
pub mod marker;
pub mod symbology;

pub use layer::*;
pub use marker::*;
pub use symbology::*;
