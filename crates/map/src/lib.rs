pub mod globe;
pub mod model;
pub mod snapshot;
pub mod surface;
pub mod view;

pub use globe::*;
pub use model::*;
pub use snapshot::*;
pub use surface::*;
pub use view::*;
