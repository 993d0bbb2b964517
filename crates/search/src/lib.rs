pub mod config;
pub mod controller;
pub mod item;

pub use config::*;
pub use controller::*;
pub use item::*;
