//! Status toast notifications in the top-right corner.

use eframe::egui;
use std::time::Instant;

use super::theme::MurmurTheme;

pub fn render_status_toasts(ctx: &egui::Context, status_messages: &[(String, Instant)], theme: &MurmurTheme) {
    if status_messages.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("status_toast_area"))
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 50.0])
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(theme.surface[4].linear_multiply(0.95))
                .corner_radius(6.0)
                .inner_margin(egui::Margin::symmetric(12, 8))
                .show(ui, |ui| {
                    for (msg, _) in status_messages {
                        let color = if msg.starts_with("Error") || msg.contains("failed") {
                            theme.error
                        } else {
                            theme.success
                        };
                        ui.label(egui::RichText::new(msg).color(color));
                    }
                });
        });
}
