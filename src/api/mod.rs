//! Public entry points: the in-process engine and its C ABI.

pub mod engine;
pub mod ffi;

pub use engine::Engine;
