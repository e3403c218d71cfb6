//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Config and local store file locations
pub mod config {
    /// Directory under the platform config/data dirs
    pub const APP_DIR: &str = "pet-tiles";

    /// Application config file name
    pub const FILENAME: &str = "config.json";

    /// Local key-value store file name
    pub const STORE_FILENAME: &str = "store.json";

    /// Key holding the device-wide tile settings in the local store
    pub const TILES_SETTINGS_KEY: &str = "tilesSettings";
}

/// Remote pet resource field names
pub mod remote {
    /// Field of the pet record that carries tile settings
    pub const TILES_SETTINGS_FIELD: &str = "tiles_settings";
}

/// Touch disambiguation defaults (pixels)
///
/// Heuristic values observed in the shipped mobile UI, kept as
/// configurable defaults.
pub mod gesture {
    /// Vertical travel that starts a drag when it also dominates horizontal travel
    pub const DRAG_MIN_DY: f32 = 10.0;

    /// Horizontal travel below which a small vertical move already starts a drag
    pub const SMALL_DX_BOUND: f32 = 20.0;

    /// Vertical travel required together with `SMALL_DX_BOUND`
    pub const SMALL_DX_MIN_DY: f32 = 5.0;

    /// Vertical travel that gives the gesture back to page scrolling
    pub const SCROLL_CANCEL_DY: f32 = 30.0;

    /// Horizontal travel that gives the gesture back to page scrolling
    pub const SCROLL_CANCEL_DX: f32 = 40.0;
}

/// Autoscroll defaults
pub mod autoscroll {
    /// Distance from a viewport edge that activates autoscroll (pixels)
    pub const EDGE_MARGIN: f32 = 100.0;

    /// Scroll step at the very edge (pixels per tick)
    pub const MAX_SPEED: f32 = 15.0;

    /// Scroll step at the inner border of the margin (pixels per tick)
    pub const MIN_SPEED: f32 = 5.0;

    /// Tick period (~60fps)
    pub const TICK_MS: u64 = 16;
}

/// Config validation bounds
pub mod validation {
    /// Largest accepted gesture threshold or edge margin (pixels)
    pub const MAX_DISTANCE: f32 = 1000.0;

    /// Largest accepted autoscroll step (pixels per tick)
    pub const MAX_SPEED: f32 = 200.0;

    /// Autoscroll tick period bounds (milliseconds)
    pub const MIN_TICK_MS: u64 = 4;
    pub const MAX_TICK_MS: u64 = 1000;
}
