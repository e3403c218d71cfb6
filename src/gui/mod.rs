//! egui front end for tile configuration

mod app;
pub mod components;
pub mod constants;

pub use app::run_gui;
