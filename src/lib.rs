pub mod board;
pub mod engine;
pub mod error;
pub mod moves;
pub mod piece;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

/// Build time stamped by `build.rs`.
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
