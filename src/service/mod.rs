pub mod protocol;
#[cfg(not(target_arch = "wasm32"))]
pub mod worker;
#[cfg(not(target_arch = "wasm32"))]
pub mod client;

pub use protocol::*;
#[cfg(not(target_arch = "wasm32"))]
pub use worker::*;
#[cfg(not(target_arch = "wasm32"))]
pub use client::*;
