//! OceanStor DeviceManager REST API
//!
//! - [`client`]: session lifecycle and authenticated fetches
//! - [`wire`]: response envelopes and their decoding

pub mod client;
pub mod wire;

pub use client::*;
