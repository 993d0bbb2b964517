pub mod debounce;
pub mod deferred;
pub mod event_bus;
pub mod sequence;

pub use debounce::*;
pub use deferred::*;
pub use event_bus::*;
pub use sequence::*;
