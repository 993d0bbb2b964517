pub mod client;
pub mod error;
pub mod protocol;

#[cfg(not(target_arch = "wasm32"))]
pub mod http;

pub use client::*;
pub use error::*;
pub use protocol::*;

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpSearchService;
