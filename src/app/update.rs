//! Main update loop and global shortcuts

use eframe::egui;
use std::time::Duration;

use super::MurmurApp;
use crate::composer::MarkdownFormat;
use crate::ui::{self, MessageAction};

impl eframe::App for MurmurApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Process backend events
        self.process_events();

        // Global keyboard shortcuts
        let mut format = None;
        ctx.input(|i| {
            // Ctrl+B / Ctrl+I: bold and italic around the selection
            if i.modifiers.command && i.key_pressed(egui::Key::B) {
                format = Some(MarkdownFormat::Bold);
            }
            if i.modifiers.command && i.key_pressed(egui::Key::I) {
                format = Some(MarkdownFormat::Italic);
            }
            // Escape: close the mention popup, then drop the reply target
            if i.key_pressed(egui::Key::Escape) {
                if self.state.composer.mention.is_some() {
                    self.state.composer.dismiss_mention();
                } else {
                    self.state.composer.cancel_reply();
                }
            }
        });
        if let Some(format) = format {
            self.state.composer.format(&format);
        }

        // Request repaint to keep checking for events
        ctx.request_repaint_after(Duration::from_millis(100));
        // Purge old status messages (toasts) older than 4 seconds
        self.state.purge_old_status_messages(4);

        let theme = self.theme();

        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::new()
                    .fill(theme.surface[1])
                    .inner_margin(egui::Margin::symmetric(16, 10)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(format!("# {}", self.state.channel_id));
                    let unread = self.state.buffer.unread_count();
                    if unread > 0 {
                        ui.label(egui::RichText::new(format!("{} unread", unread)).color(theme.error));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let label = if theme.is_dark() { "☀" } else { "🌙" };
                        if ui.button(label).on_hover_text("Toggle theme").clicked() {
                            self.toggle_theme(ctx);
                        }
                    });
                });
            });

        // Bottom panel: composer
        let composer_actions = egui::TopBottomPanel::bottom("composer_panel")
            .frame(
                egui::Frame::new()
                    .fill(theme.surface[1])
                    .inner_margin(egui::Margin::symmetric(12, 10))
                    .stroke(egui::Stroke::new(1.0, theme.border_medium)),
            )
            .show(ctx, |ui| ui::render_composer(ui, &mut self.state, &theme))
            .inner;
        for action in composer_actions {
            self.dispatch(action);
        }

        // Central panel: messages
        let message_action = egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(theme.surface[2]))
            .show(ctx, |ui| {
                ui::render_messages(ui, &self.state.buffer, self.state.loading_history, &theme)
            })
            .inner;
        match message_action {
            Some(MessageAction::LoadOlder) => {
                if let Some(action) = self.state.request_page() {
                    self.dispatch(action);
                }
            }
            Some(MessageAction::ReplyTo(id)) => {
                self.state.composer.reply_to(id);
                ctx.memory_mut(|m| m.request_focus(ui::composer::composer_id()));
            }
            None => {}
        }

        ui::render_status_toasts(ctx, &self.state.status_messages, &theme);
    }
}
