//! Drag-to-reorder gesture controller
//!
//! Turns raw pointer/touch input into an order mutation. The rendering layer
//! feeds input events, supplies the current `(id, rect)` layout on each frame
//! and applies autoscroll deltas; the controller never touches the UI.
//!
//! States: `Idle -> Armed -> Dragging -> Idle`. Pointer presses on a handle
//! start dragging immediately; touches arm first and only start dragging
//! once early movement looks like a vertical reorder rather than a scroll.

pub mod autoscroll;
pub mod coalesce;
pub mod geometry;
pub mod gesture;

pub use autoscroll::{AutoscrollConfig, ScrollDirection, Viewport};
pub use coalesce::FrameCoalescer;
pub use geometry::{drop_indicator, reorder, DropIndicator, Edge, LayoutItem, Point, Rect};
pub use gesture::{GestureThresholds, TouchIntent};

use tracing::debug;

use crate::timer::RepeatingTimer;

/// Kind of input that pressed the drag handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Mouse/pen: the handle is an explicit affordance
    Pointer,
    /// Touch: ambiguous with page scrolling until disambiguated
    Touch,
}

/// Observable controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Armed,
    Dragging,
}

/// What the host should do with the input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Not ours; let the platform handle it (page scroll keeps working)
    PassThrough,
    /// Owned by the gesture; suppress default handling
    Captured,
    /// Gesture finished with a new order to persist
    Committed(Vec<String>),
    /// Gesture abandoned without side effects
    Cancelled,
}

impl DragOutcome {
    /// Whether the host must suppress default handling (page scroll)
    pub fn is_captured(&self) -> bool {
        matches!(self, DragOutcome::Captured | DragOutcome::Committed(_))
    }
}

enum Phase<G> {
    Idle,
    Armed {
        id: String,
        start: Point,
    },
    Dragging {
        id: String,
        pointer: Point,
        autoscroll: Option<G>,
    },
}

/// Gesture state machine for one reorderable list
pub struct DragController<T: RepeatingTimer> {
    timer: T,
    thresholds: GestureThresholds,
    autoscroll: AutoscrollConfig,
    phase: Phase<T::Guard>,
    frames: FrameCoalescer<Point>,
    indicator: Option<DropIndicator>,
    order: Vec<String>,
}

impl<T: RepeatingTimer> DragController<T> {
    pub fn new(timer: T, thresholds: GestureThresholds, autoscroll: AutoscrollConfig) -> Self {
        Self {
            timer,
            thresholds,
            autoscroll,
            phase: Phase::Idle,
            frames: FrameCoalescer::default(),
            indicator: None,
            order: Vec::new(),
        }
    }

    pub fn state(&self) -> DragState {
        match self.phase {
            Phase::Idle => DragState::Idle,
            Phase::Armed { .. } => DragState::Armed,
            Phase::Dragging { .. } => DragState::Dragging,
        }
    }

    /// Tile lifted out of the layout flow, while dragging
    pub fn dragged_id(&self) -> Option<&str> {
        match &self.phase {
            Phase::Dragging { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Insertion indicator computed on the last frame
    pub fn indicator(&self) -> Option<&DropIndicator> {
        self.indicator.as_ref()
    }

    /// A pointer update is waiting for the next frame
    pub fn wants_frame(&self) -> bool {
        self.frames.is_pending()
    }

    pub fn autoscroll_active(&self) -> bool {
        matches!(
            self.phase,
            Phase::Dragging {
                autoscroll: Some(_),
                ..
            }
        )
    }

    /// Press on the drag handle of `id`
    ///
    /// `order` is the full order the gesture reorders; it is snapshotted
    /// until the gesture ends.
    pub fn press(&mut self, id: &str, at: Point, kind: InputKind, order: &[String]) -> DragOutcome {
        if !matches!(self.phase, Phase::Idle) {
            debug!(id, "Press during an active gesture, restarting");
            self.finish();
        }
        if !order.iter().any(|entry| entry == id) {
            debug!(id, "Press on a tile outside the current order, ignoring");
            return DragOutcome::PassThrough;
        }

        self.order = order.to_vec();
        match kind {
            InputKind::Pointer => {
                debug!(id, "Drag started");
                self.phase = Phase::Dragging {
                    id: id.to_string(),
                    pointer: at,
                    autoscroll: None,
                };
                self.frames.offer(at);
                DragOutcome::Captured
            }
            InputKind::Touch => {
                debug!(id, "Touch armed");
                self.phase = Phase::Armed {
                    id: id.to_string(),
                    start: at,
                };
                DragOutcome::PassThrough
            }
        }
    }

    /// Pointer or touch moved
    pub fn moved(&mut self, at: Point, viewport: &Viewport) -> DragOutcome {
        if let Phase::Armed { id, start } = &self.phase {
            match self.thresholds.classify(at.x - start.x, at.y - start.y) {
                TouchIntent::Undecided => return DragOutcome::PassThrough,
                TouchIntent::Scroll => {
                    debug!(id = %id, "Touch classified as scroll");
                    self.finish();
                    return DragOutcome::Cancelled;
                }
                TouchIntent::Drag => {
                    debug!(id = %id, "Touch classified as drag");
                    let id = id.clone();
                    self.phase = Phase::Dragging {
                        id,
                        pointer: at,
                        autoscroll: None,
                    };
                }
            }
        }

        let Phase::Dragging {
            pointer, autoscroll, ..
        } = &mut self.phase
        else {
            return DragOutcome::PassThrough;
        };

        *pointer = at;
        self.frames.offer(at);

        let in_zone = self.autoscroll.zone(at.y, viewport).is_some();
        if in_zone && autoscroll.is_none() {
            *autoscroll = Some(self.timer.start(self.autoscroll.period()));
        } else if !in_zone && autoscroll.is_some() {
            *autoscroll = None;
        }
        DragOutcome::Captured
    }

    /// Per-frame update with the current layout
    ///
    /// Recomputes the indicator at most once per frame from the latest
    /// pointer position. Never mutates the order.
    pub fn frame(&mut self, layout: &[LayoutItem]) -> Option<&DropIndicator> {
        if let Some(at) = self.frames.take()
            && let Phase::Dragging { id, .. } = &self.phase
        {
            self.indicator = drop_indicator(at.y, layout, id);
        }
        self.indicator.as_ref()
    }

    /// One autoscroll tick; returns the delta the host should scroll by
    ///
    /// Stops the timer when the pointer left the edge zone or the scroll
    /// limit was reached.
    pub fn autoscroll_tick(&mut self, viewport: &Viewport) -> Option<f32> {
        let Phase::Dragging {
            pointer, autoscroll, ..
        } = &mut self.phase
        else {
            return None;
        };
        autoscroll.as_ref()?;

        match self.autoscroll.step(pointer.y, viewport) {
            Some(delta) => {
                // Rows moved under a resting pointer
                self.frames.offer(*pointer);
                Some(delta)
            }
            None => {
                *autoscroll = None;
                None
            }
        }
    }

    /// Pointer/touch released
    pub fn release(&mut self, layout: &[LayoutItem]) -> DragOutcome {
        let outcome = match &self.phase {
            Phase::Idle => return DragOutcome::PassThrough,
            Phase::Armed { .. } => DragOutcome::PassThrough,
            Phase::Dragging { id, pointer, .. } => {
                match drop_indicator(pointer.y, layout, id)
                    .and_then(|indicator| reorder(&self.order, id, &indicator))
                {
                    Some(order) => {
                        debug!(id = %id, "Drag committed");
                        DragOutcome::Committed(order)
                    }
                    None => {
                        debug!(id = %id, "Drag released without a move");
                        DragOutcome::Captured
                    }
                }
            }
        };
        self.finish();
        outcome
    }

    /// Gesture interrupted (platform cancel, pointer left the surface, escape)
    pub fn cancel(&mut self) -> DragOutcome {
        if matches!(self.phase, Phase::Idle) {
            return DragOutcome::PassThrough;
        }
        debug!("Drag cancelled");
        self.finish();
        DragOutcome::Cancelled
    }

    /// Back to idle; drops the autoscroll guard and clears indicators
    fn finish(&mut self) {
        self.phase = Phase::Idle;
        self.frames.cancel();
        self.indicator = None;
        self.order.clear();
    }
}
