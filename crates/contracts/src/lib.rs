//! Types shared between the backend and the WASM frontend.

pub mod shared;
pub mod usecases;
