//! Tile settings window implemented with egui/eframe

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use eframe::{egui, CreationContext, NativeOptions};
use tokio::runtime::Runtime;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use super::components::surface_preview;
use super::components::tile_list::{self, TileListAction, TileListState};
use super::constants::*;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::render::Surface;
use crate::session::{SaveEvent, SessionError, TileSettingsSession};
use crate::settings::TileSettings;
use crate::store::{JsonFileKv, LocalStore, Scope};

type LocalSession = TileSettingsSession<LocalStore<JsonFileKv>>;

struct StatusMessage {
    text: String,
    color: egui::Color32,
    expires: Option<Instant>,
}

struct TileSettingsApp {
    runtime: Runtime,
    session: LocalSession,
    settings: watch::Receiver<Arc<TileSettings>>,
    save_events: broadcast::Receiver<SaveEvent>,
    catalog: Catalog,
    privileged: bool,
    list: TileListState,
    surface: Surface,
    status: Option<StatusMessage>,
}

impl TileSettingsApp {
    fn new(
        _cc: &CreationContext<'_>,
        runtime: Runtime,
        session: LocalSession,
        catalog: Catalog,
        config: &AppConfig,
    ) -> Self {
        info!("Initializing tile settings window");

        Self {
            settings: session.subscribe(),
            save_events: session.save_events(),
            runtime,
            session,
            catalog,
            privileged: config.privileged,
            list: TileListState::new(config.gesture, config.autoscroll),
            surface: Surface::default(),
            status: None,
        }
    }

    fn apply(&mut self, action: TileListAction) {
        let result = match action {
            TileListAction::Reorder(order) => self.runtime.block_on(self.session.reorder(order)),
            TileListAction::Toggle { id, visible } => {
                self.runtime.block_on(self.session.toggle(&id, visible))
            }
        };
        self.report(result);
    }

    fn reset(&mut self) {
        info!("Resetting tiles to defaults");
        let result = self.runtime.block_on(self.session.reset());
        self.report(result);
    }

    fn report(&mut self, result: Result<Arc<TileSettings>, SessionError>) {
        match result {
            Ok(_) => {}
            Err(SessionError::Settings(err)) => {
                warn!(error = %err, "Tile settings change rejected");
                self.status = Some(StatusMessage {
                    text: format!("Change rejected: {err}"),
                    color: STATUS_REJECTED,
                    expires: None,
                });
            }
            // The NotSaved event carries the notice
            Err(SessionError::Store(err)) => error!(error = %err, "Failed to save tile settings"),
        }
    }

    fn poll_save_events(&mut self) {
        loop {
            match self.save_events.try_recv() {
                Ok(SaveEvent::Saved { revision }) => {
                    debug!(revision, "Tile settings saved");
                    self.status = Some(StatusMessage {
                        text: "\u{2714} Saved".to_string(),
                        color: STATUS_SAVED,
                        expires: Some(Instant::now() + Duration::from_millis(SAVED_NOTICE_MS)),
                    });
                }
                Ok(SaveEvent::NotSaved { reason, .. }) => {
                    self.status = Some(StatusMessage {
                        text: format!("Not saved: {reason}"),
                        color: STATUS_NOT_SAVED,
                        expires: None,
                    });
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed save events");
                }
                Err(_) => break,
            }
        }

        if self
            .status
            .as_ref()
            .and_then(|status| status.expires)
            .is_some_and(|expires| expires <= Instant::now())
        {
            self.status = None;
        }
    }
}

impl eframe::App for TileSettingsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_save_events();

        let settings = Arc::clone(&self.settings.borrow_and_update());
        let mut action = None;
        let mut reset = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(PADDING);
            ui.heading("Dashboard Tiles");
            ui.label(
                egui::RichText::new(format!("Drag {DRAG_HANDLE} to reorder, untick to hide"))
                    .small()
                    .weak(),
            );
            ui.add_space(SECTION_SPACING);

            ui.group(|ui| {
                action = tile_list::ui(ui, &settings, &self.catalog, &mut self.list);
            });

            ui.add_space(ITEM_SPACING);

            ui.horizontal(|ui| {
                let button = ui.add_enabled(!self.list.is_dragging(), egui::Button::new("\u{21BA} Reset to default"));
                if button.clicked() {
                    reset = true;
                }
                if let Some(message) = &self.status {
                    ui.colored_label(message.color, &message.text);
                }
            });

            ui.add_space(SECTION_SPACING);
            ui.separator();
            ui.add_space(SECTION_SPACING);

            surface_preview::ui(ui, &settings, &self.catalog, self.privileged, &mut self.surface);
        });

        if let Some(action) = action {
            self.apply(action);
        }
        if reset {
            self.reset();
        }

        if let Some(expires) = self.status.as_ref().and_then(|status| status.expires) {
            ctx.request_repaint_after(expires.saturating_duration_since(Instant::now()));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!(revision = self.session.revision(), "Tile settings window exiting");
    }
}

pub fn run_gui(config: AppConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to build async runtime")?;

    let catalog = Catalog::builtin();
    let ids = catalog.eligible_ids(config.privileged);
    let store = LocalStore::new(JsonFileKv::new(JsonFileKv::default_path()));
    let session = runtime
        .block_on(TileSettingsSession::load(store, Scope::Device, &ids))
        .context("Failed to load tile settings")?;

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT])
            .with_title("Pet Tiles"),
        ..Default::default()
    };

    eframe::run_native(
        "Pet Tiles",
        options,
        Box::new(move |cc| Ok(Box::new(TileSettingsApp::new(cc, runtime, session, catalog, &config)))),
    )
    .map_err(|err| anyhow!("Failed to launch tile settings window: {err}"))
}
