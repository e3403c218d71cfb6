//! Read-only preview of what each surface renders

use eframe::egui;

use crate::catalog::Catalog;
use crate::gui::constants::*;
use crate::render::{tiles_to_render, Surface};
use crate::settings::TileSettings;

pub fn ui(ui: &mut egui::Ui, settings: &TileSettings, catalog: &Catalog, privileged: bool, surface: &mut Surface) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Preview").strong());
            ui.selectable_value(surface, Surface::Dashboard, "Dashboard");
            ui.selectable_value(surface, Surface::History, "History");
        });
        ui.add_space(ITEM_SPACING);

        let tiles = tiles_to_render(settings, catalog, &privileged, *surface);
        if tiles.is_empty() {
            ui.label(egui::RichText::new("No tiles visible").weak());
            return;
        }

        ui.horizontal_wrapped(|ui| {
            for entry in tiles {
                let color = tile_color(entry.tile.color);
                egui::Frame::default()
                    .fill(color.gamma_multiply(0.2))
                    .stroke(egui::Stroke::new(1.0, color))
                    .corner_radius(4.0)
                    .inner_margin(6.0)
                    .show(ui, |ui| {
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new(entry.label).strong());
                            if *surface == Surface::Dashboard {
                                ui.label(egui::RichText::new(entry.tile.subtitle).small().weak());
                            }
                        });
                    })
                    .response
                    .on_hover_text(entry.tile.target);
            }
        });
    });
}
