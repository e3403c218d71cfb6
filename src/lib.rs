//! Tile order and visibility for the pet-health dashboard
//!
//! A compiled-in [`catalog::Catalog`] lists every tile; per-scope
//! [`settings::TileSettings`] record the user's order and hidden tiles.
//! [`session::TileSettingsSession`] applies changes optimistically and writes
//! them through a [`store::SettingsStore`], [`render::tiles_to_render`] turns
//! settings into what a surface shows, and [`drag::DragController`] turns
//! pointer/touch input into reorders.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod constants;
pub mod drag;
pub mod gui;
pub mod render;
pub mod session;
pub mod settings;
pub mod store;
pub mod timer;
