//! GUI-specific constants for layout, colors and repaint intervals

use egui;

/// Window dimensions
pub const WINDOW_WIDTH: f32 = 480.0;
pub const WINDOW_HEIGHT: f32 = 720.0;
pub const WINDOW_MIN_WIDTH: f32 = 360.0;
pub const WINDOW_MIN_HEIGHT: f32 = 420.0;

/// Layout spacing
pub const PADDING: f32 = 10.0;
pub const SECTION_SPACING: f32 = 15.0;
pub const ITEM_SPACING: f32 = 8.0;

/// Tile list rows
pub const ROW_HEIGHT: f32 = 36.0;
pub const LIST_MAX_HEIGHT: f32 = 360.0;
pub const DRAG_HANDLE: &str = "\u{2630}";
pub const INDICATOR_WIDTH: f32 = 2.0;

/// Save status colors
pub const STATUS_SAVED: egui::Color32 = egui::Color32::from_rgb(0, 160, 0);
pub const STATUS_NOT_SAVED: egui::Color32 = egui::Color32::from_rgb(200, 0, 0);
pub const STATUS_REJECTED: egui::Color32 = egui::Color32::from_rgb(200, 140, 0);

/// How long a "saved" notice stays up
pub const SAVED_NOTICE_MS: u64 = 2000;

/// Swatch for a catalog color key
pub fn tile_color(key: &str) -> egui::Color32 {
    match key {
        "brown" => egui::Color32::from_rgb(121, 85, 72),
        "orange" => egui::Color32::from_rgb(255, 152, 0),
        "red" => egui::Color32::from_rgb(229, 57, 53),
        "green" => egui::Color32::from_rgb(67, 160, 71),
        "purple" => egui::Color32::from_rgb(142, 36, 170),
        "teal" => egui::Color32::from_rgb(0, 137, 123),
        "cyan" => egui::Color32::from_rgb(0, 172, 193),
        "blue" => egui::Color32::from_rgb(30, 136, 229),
        "pink" => egui::Color32::from_rgb(216, 27, 96),
        "yellow" => egui::Color32::from_rgb(253, 216, 53),
        _ => egui::Color32::GRAY,
    }
}
