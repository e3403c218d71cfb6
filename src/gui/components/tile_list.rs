//! Reorderable tile list with visibility toggles

use std::time::Instant;

use eframe::egui;

use crate::catalog::Catalog;
use crate::drag::{
    AutoscrollConfig, DragController, DragOutcome, DragState, GestureThresholds, InputKind,
    LayoutItem, Point, Rect, Viewport,
};
use crate::gui::constants::*;
use crate::settings::TileSettings;
use crate::timer::FrameClock;

/// Change requested through the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileListAction {
    Reorder(Vec<String>),
    Toggle { id: String, visible: bool },
}

/// Gesture and scroll state carried across frames
pub struct TileListState {
    controller: DragController<FrameClock>,
    clock: FrameClock,
    viewport: Viewport,
    scroll_to: Option<f32>,
    last_pointer: Option<Point>,
    input_kind: InputKind,
}

impl TileListState {
    pub fn new(gesture: GestureThresholds, autoscroll: AutoscrollConfig) -> Self {
        let clock = FrameClock::new();
        Self {
            controller: DragController::new(clock.clone(), gesture, autoscroll),
            clock,
            viewport: Viewport::default(),
            scroll_to: None,
            last_pointer: None,
            input_kind: InputKind::Pointer,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.controller.state() != DragState::Idle
    }

    /// Apply autoscroll ticks that came due since the previous frame
    fn run_autoscroll(&mut self, ctx: &egui::Context) {
        for _ in 0..self.clock.due_ticks(Instant::now()) {
            let Some(delta) = self.controller.autoscroll_tick(&self.viewport) else {
                break;
            };
            self.viewport.scroll_offset += delta;
            self.scroll_to = Some(self.viewport.scroll_offset);
        }

        if let Some(deadline) = self.clock.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }

    /// Scroll the list by hand while a touch is not ours
    fn scroll_by(&mut self, dy: f32) {
        let offset = (self.viewport.scroll_offset - dy).clamp(0.0, self.viewport.max_scroll);
        self.viewport.scroll_offset = offset;
        self.scroll_to = Some(offset);
    }
}

/// Input that ends a gesture without a release: the pointer leaving the
/// window, the platform cancelling a touch, or the window losing focus
fn interrupts_gesture(event: &egui::Event) -> bool {
    matches!(
        event,
        egui::Event::PointerGone
            | egui::Event::WindowFocused(false)
            | egui::Event::Touch {
                phase: egui::TouchPhase::Cancel,
                ..
            }
    )
}

/// Renders the tile list and returns the change the user made, if any
pub fn ui(
    ui: &mut egui::Ui,
    settings: &TileSettings,
    catalog: &Catalog,
    state: &mut TileListState,
) -> Option<TileListAction> {
    let mut action = None;
    state.run_autoscroll(ui.ctx());

    let (pointer, touching, released, interrupted) = ui.input(|i| {
        (
            i.pointer.interact_pos(),
            i.any_touches(),
            i.pointer.any_released(),
            i.key_pressed(egui::Key::Escape) || i.events.iter().any(interrupts_gesture),
        )
    });

    let mut scroll = egui::ScrollArea::vertical()
        .id_salt("tile_list")
        .max_height(LIST_MAX_HEIGHT)
        .auto_shrink([false, true]);
    if let Some(offset) = state.scroll_to.take() {
        scroll = scroll.vertical_scroll_offset(offset);
    }

    let output = scroll.show(ui, |ui| {
        let clip = ui.clip_rect();
        ui.spacing_mut().item_spacing.y = 0.0;

        let mut layout = Vec::with_capacity(settings.order.len());
        for id in &settings.order {
            let title = catalog.get(id).map_or(id.as_str(), |tile| tile.title);
            let mut visible = settings.is_visible(id);

            let row = ui.horizontal(|ui| {
                ui.set_min_height(ROW_HEIGHT);
                let handle = ui
                    .add(egui::Label::new(egui::RichText::new(DRAG_HANDLE).weak()).sense(egui::Sense::drag()))
                    .on_hover_cursor(egui::CursorIcon::Grab);
                let toggled = ui.checkbox(&mut visible, title).changed();

                // Spacer to make row full width
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(" ");
                });
                (handle, toggled)
            });
            let (handle, toggled) = row.inner;
            let rect = row.response.rect;

            if state.controller.dragged_id() == Some(id.as_str()) {
                let lifted = ui.visuals().selection.bg_fill.gamma_multiply(0.25);
                ui.painter().rect_filled(rect, 4.0, lifted);
            }

            layout.push(LayoutItem::new(
                id.clone(),
                Rect::new(rect.left() - clip.left(), rect.top() - clip.top(), rect.width(), rect.height()),
            ));

            if toggled {
                action = Some(TileListAction::Toggle {
                    id: id.clone(),
                    visible,
                });
            }

            if handle.drag_started()
                && let Some(pos) = pointer
            {
                let at = Point::new(pos.x - clip.left(), pos.y - clip.top());
                let kind = if touching { InputKind::Touch } else { InputKind::Pointer };
                state.controller.press(id, at, kind, &settings.order);
                state.last_pointer = Some(at);
                state.input_kind = kind;
            }
        }
        (layout, clip)
    });

    let (layout, clip) = output.inner;
    state.viewport = Viewport::new(
        output.inner_rect.height(),
        output.state.offset.y,
        (output.content_size.y - output.inner_rect.height()).max(0.0),
    );

    if state.is_dragging() {
        if interrupted {
            state.controller.cancel();
        } else if released {
            if let DragOutcome::Committed(order) = state.controller.release(&layout) {
                action = Some(TileListAction::Reorder(order));
            }
        } else if let Some(pos) = pointer {
            let at = Point::new(pos.x - clip.left(), pos.y - clip.top());
            if let Some(last) = state.last_pointer
                && last != at
            {
                state.last_pointer = Some(at);
                let outcome = state.controller.moved(at, &state.viewport);
                if state.input_kind == InputKind::Touch && !outcome.is_captured() {
                    state.scroll_by(at.y - last.y);
                }
            }
        }
    }

    if state.controller.wants_frame() {
        state.controller.frame(&layout);
    }

    if let Some(y) = state.controller.indicator().and_then(|indicator| indicator.line_y(&layout)) {
        let stroke = egui::Stroke::new(INDICATOR_WIDTH, ui.visuals().selection.stroke.color);
        ui.painter()
            .with_clip_rect(clip)
            .hline(clip.x_range(), clip.top() + y, stroke);
    }

    if state.is_dragging() {
        ui.ctx().request_repaint();
    } else {
        state.last_pointer = None;
    }

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(phase: egui::TouchPhase) -> egui::Event {
        egui::Event::Touch {
            device_id: egui::TouchDeviceId(0),
            id: egui::TouchId(1),
            phase,
            pos: egui::pos2(10.0, 300.0),
            force: None,
        }
    }

    #[test]
    fn test_interrupts_gesture() {
        assert!(interrupts_gesture(&egui::Event::PointerGone));
        assert!(interrupts_gesture(&egui::Event::WindowFocused(false)));
        assert!(interrupts_gesture(&touch(egui::TouchPhase::Cancel)));

        assert!(!interrupts_gesture(&egui::Event::WindowFocused(true)));
        assert!(!interrupts_gesture(&touch(egui::TouchPhase::Move)));
        assert!(!interrupts_gesture(&touch(egui::TouchPhase::End)));
        assert!(!interrupts_gesture(&egui::Event::PointerMoved(egui::pos2(10.0, 300.0))));
    }

    #[test]
    fn test_cancel_mid_autoscroll_stops_clock() {
        let mut state = TileListState::new(GestureThresholds::default(), AutoscrollConfig::default());
        let order: Vec<String> = ["a", "b", "c"].iter().map(|id| id.to_string()).collect();
        state.viewport = Viewport::new(800.0, 0.0, 400.0);

        state.controller.press("a", Point::new(10.0, 200.0), InputKind::Pointer, &order);
        state.controller.moved(Point::new(10.0, 790.0), &state.viewport);
        assert!(state.is_dragging());
        assert!(state.clock.is_running());

        state.controller.cancel();
        assert!(!state.is_dragging());
        assert!(!state.clock.is_running());
        assert!(state.clock.next_deadline().is_none());
    }
}
