//! Core MurmurApp struct definition and initialization

use crossbeam_channel::{unbounded, Receiver, Sender};
use eframe::egui;
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

use crate::backend::{run_backend, InMemoryServices};
use crate::config::{load_settings, save_settings, Settings};
use crate::protocol::{BackendAction, GuiEvent};
use crate::state::ClientState;
use crate::ui::{self, MurmurTheme};

pub struct MurmurApp {
    // Conversation state (history, composer, toasts)
    pub state: ClientState,

    pub settings: Settings,

    // Channels for backend communication
    pub action_tx: Sender<BackendAction>,
    pub event_rx: Receiver<GuiEvent>,
}

impl MurmurApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = load_settings().unwrap_or_else(|e| {
            warn!(error = %e, "could not load settings, using defaults");
            Settings::default()
        });

        // Create channels for UI <-> Backend
        let (action_tx, action_rx) = unbounded::<BackendAction>();
        let (event_tx, event_rx) = unbounded::<GuiEvent>();

        let services = Arc::new(InMemoryServices::seeded(settings.user_id.clone())).services();
        let channel_id = settings.channel_id.clone();

        // Spawn the backend thread
        thread::spawn(move || {
            run_backend(services, channel_id, action_rx, event_tx);
        });

        let theme = MurmurTheme::by_name(&settings.theme);
        ui::apply_app_style(&cc.egui_ctx, &theme);

        let mut app = Self {
            state: ClientState::new(&settings),
            settings,
            action_tx,
            event_rx,
        };

        if let Some(action) = app.state.request_page() {
            app.dispatch(action);
        }
        info!(channel = %app.state.channel_id, "client started");
        app
    }

    pub(super) fn theme(&self) -> MurmurTheme {
        MurmurTheme::by_name(&self.settings.theme)
    }

    pub(super) fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.settings.theme = if self.theme().is_dark() { "light" } else { "dark" }.to_string();
        ui::apply_app_style(ctx, &self.theme());
    }

    pub(super) fn dispatch(&self, action: BackendAction) {
        if self.action_tx.send(action).is_err() {
            warn!("backend is gone; action dropped");
        }
    }
}

impl Drop for MurmurApp {
    fn drop(&mut self) {
        let _ = self.action_tx.send(BackendAction::Shutdown);
        // Persist settings on exit
        if let Err(e) = save_settings(&self.settings) {
            warn!(error = %e, "failed to save settings");
        }
    }
}
