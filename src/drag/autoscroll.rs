//! Edge autoscroll while dragging

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::autoscroll::*;

/// Scroll state of the viewport hosting the list
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Visible height
    pub height: f32,
    /// Current scroll offset, 0 at the top
    pub scroll_offset: f32,
    /// Largest reachable scroll offset
    pub max_scroll: f32,
}

impl Viewport {
    pub fn new(height: f32, scroll_offset: f32, max_scroll: f32) -> Self {
        Self {
            height,
            scroll_offset,
            max_scroll,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoscrollConfig {
    /// Distance from the top/bottom edge that activates scrolling
    #[serde(default = "default_edge_margin")]
    pub edge_margin: f32,
    /// Step at the very edge
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,
    /// Step at the inner border of the margin
    #[serde(default = "default_min_speed")]
    pub min_speed: f32,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_edge_margin() -> f32 {
    EDGE_MARGIN
}

fn default_max_speed() -> f32 {
    MAX_SPEED
}

fn default_min_speed() -> f32 {
    MIN_SPEED
}

fn default_tick_ms() -> u64 {
    TICK_MS
}

impl Default for AutoscrollConfig {
    fn default() -> Self {
        Self {
            edge_margin: EDGE_MARGIN,
            max_speed: MAX_SPEED,
            min_speed: MIN_SPEED,
            tick_ms: TICK_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl AutoscrollConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Edge zone the pointer is in, if any
    pub fn zone(&self, pointer_y: f32, viewport: &Viewport) -> Option<ScrollDirection> {
        if pointer_y < self.edge_margin {
            Some(ScrollDirection::Up)
        } else if pointer_y > viewport.height - self.edge_margin {
            Some(ScrollDirection::Down)
        } else {
            None
        }
    }

    /// Step for a pointer `distance` px away from the edge
    pub fn speed(&self, distance: f32) -> f32 {
        let closeness = 1.0 - (distance / self.edge_margin).clamp(0.0, 1.0);
        (self.max_speed * closeness).max(self.min_speed).min(self.max_speed)
    }

    /// Signed scroll delta for one tick; `None` outside the zones or at the scroll limit
    pub fn step(&self, pointer_y: f32, viewport: &Viewport) -> Option<f32> {
        match self.zone(pointer_y, viewport)? {
            ScrollDirection::Up => {
                if viewport.scroll_offset <= 0.0 {
                    return None;
                }
                let speed = self.speed(pointer_y);
                Some(-speed.min(viewport.scroll_offset))
            }
            ScrollDirection::Down => {
                let room = viewport.max_scroll - viewport.scroll_offset;
                if room <= 0.0 {
                    return None;
                }
                let speed = self.speed(viewport.height - pointer_y);
                Some(speed.min(room))
            }
        }
    }
}
