//! Layout geometry and drop-position computation
//!
//! All coordinates are viewport-relative, the same space pointer events
//! arrive in.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn mid_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.top() && y <= self.bottom()
    }
}

/// A rendered row of the configuration list
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutItem {
    pub id: String,
    pub rect: Rect,
}

impl LayoutItem {
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self { id: id.into(), rect }
    }
}

/// Which side of the target the dragged tile lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Above,
    Below,
}

/// Highlighted insertion point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndicator {
    pub target: String,
    pub edge: Edge,
}

impl DropIndicator {
    /// Y coordinate of the indicator line for the current layout
    pub fn line_y(&self, layout: &[LayoutItem]) -> Option<f32> {
        let item = layout.iter().find(|item| item.id == self.target)?;
        Some(match self.edge {
            Edge::Above => item.rect.top(),
            Edge::Below => item.rect.bottom(),
        })
    }
}

/// Insertion point under `pointer_y`
///
/// The row under the pointer (the dragged row excluded) is the target; the
/// upper half of a row inserts above it, the lower half below it. Pure: the
/// same pointer and layout always give the same answer.
pub fn drop_indicator(pointer_y: f32, layout: &[LayoutItem], dragged: &str) -> Option<DropIndicator> {
    let target = layout
        .iter()
        .filter(|item| item.id != dragged)
        .find(|item| item.rect.contains_y(pointer_y))?;

    let edge = if pointer_y < target.rect.mid_y() {
        Edge::Above
    } else {
        Edge::Below
    };
    Some(DropIndicator {
        target: target.id.clone(),
        edge,
    })
}

/// Order after moving `dragged` to the indicated spot
///
/// `None` when the move would not change anything or the ids are unknown.
pub fn reorder(order: &[String], dragged: &str, indicator: &DropIndicator) -> Option<Vec<String>> {
    if indicator.target == dragged {
        return None;
    }
    let from = order.iter().position(|id| id == dragged)?;
    let target = order.iter().position(|id| *id == indicator.target)?;

    let mut slot = match indicator.edge {
        Edge::Above => target,
        Edge::Below => target + 1,
    };
    if from < slot {
        slot -= 1;
    }
    if slot == from {
        return None;
    }

    let mut next = order.to_vec();
    let id = next.remove(from);
    next.insert(slot, id);
    Some(next)
}
