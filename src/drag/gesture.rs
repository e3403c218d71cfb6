//! Touch disambiguation: page scroll or tile reorder

use serde::{Deserialize, Serialize};

use crate::constants::gesture::*;

/// What early touch movement says about the gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchIntent {
    /// Vertical reorder; take over the input stream
    Drag,
    /// Page scroll; stop tracking
    Scroll,
    /// Not enough movement yet
    Undecided,
}

/// Pixel thresholds for [`GestureThresholds::classify`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureThresholds {
    #[serde(default = "default_drag_min_dy")]
    pub drag_min_dy: f32,
    #[serde(default = "default_small_dx_bound")]
    pub small_dx_bound: f32,
    #[serde(default = "default_small_dx_min_dy")]
    pub small_dx_min_dy: f32,
    #[serde(default = "default_scroll_cancel_dy")]
    pub scroll_cancel_dy: f32,
    #[serde(default = "default_scroll_cancel_dx")]
    pub scroll_cancel_dx: f32,
}

fn default_drag_min_dy() -> f32 {
    DRAG_MIN_DY
}

fn default_small_dx_bound() -> f32 {
    SMALL_DX_BOUND
}

fn default_small_dx_min_dy() -> f32 {
    SMALL_DX_MIN_DY
}

fn default_scroll_cancel_dy() -> f32 {
    SCROLL_CANCEL_DY
}

fn default_scroll_cancel_dx() -> f32 {
    SCROLL_CANCEL_DX
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            drag_min_dy: DRAG_MIN_DY,
            small_dx_bound: SMALL_DX_BOUND,
            small_dx_min_dy: SMALL_DX_MIN_DY,
            scroll_cancel_dy: SCROLL_CANCEL_DY,
            scroll_cancel_dx: SCROLL_CANCEL_DX,
        }
    }
}

impl GestureThresholds {
    /// Classify displacement from the touch start point
    ///
    /// A drag needs vertical travel that dominates horizontal travel, or a
    /// small vertical move with almost no horizontal travel. NaN input never
    /// classifies as a drag.
    pub fn classify(&self, dx: f32, dy: f32) -> TouchIntent {
        let (abs_dx, abs_dy) = (dx.abs(), dy.abs());

        let vertical = abs_dy > self.drag_min_dy && abs_dy > abs_dx;
        let small_horizontal = abs_dx < self.small_dx_bound && abs_dy > self.small_dx_min_dy;

        if vertical || small_horizontal {
            TouchIntent::Drag
        } else if abs_dy > self.scroll_cancel_dy || abs_dx > self.scroll_cancel_dx {
            TouchIntent::Scroll
        } else {
            TouchIntent::Undecided
        }
    }
}
