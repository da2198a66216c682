//! Room lifecycle for Duelrelay.
//!
//! A room pairs at most two connections under a six-digit code. This crate
//! holds the data structures only; message handling lives in the router.
//!
//! # Key types
//!
//! - [`Room`]: the two seats and whether the game started
//! - [`RoomRegistry`]: live rooms by code, and code generation
//! - [`RegistryConfig`]: code-generation and room-count limits

mod config;
mod error;
mod registry;
mod room;

pub use config::RegistryConfig;
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{Room, Seat};
