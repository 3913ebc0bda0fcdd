//! Message list rendering: dividers, grouped rows, reply indentation and
//! reactions.

use chrono::{Local, NaiveDate};
use eframe::egui;

use crate::buffer::ConversationBuffer;
use crate::grouping::DisplayRow;
use crate::message::{Message, MessageId};
use crate::thread::RenderItem;

use super::theme::{author_color, MurmurTheme};

const REPLY_INDENT: f32 = 28.0;

/// Interactions raised from the message list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageAction {
    LoadOlder,
    ReplyTo(MessageId),
}

/// Render the central message panel.
pub fn render_messages(
    ui: &mut egui::Ui,
    buffer: &ConversationBuffer,
    loading_history: bool,
    theme: &MurmurTheme,
) -> Option<MessageAction> {
    let mut action = None;

    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            ui.add_space(8.0);

            if loading_history {
                ui.horizontal(|ui| {
                    ui.add_space(16.0);
                    ui.spinner();
                    ui.label(egui::RichText::new("Loading history…").color(theme.text_muted));
                });
            } else if buffer.has_more_history() && buffer.is_loaded() {
                ui.vertical_centered(|ui| {
                    if ui.button("Load older messages").clicked() {
                        action = Some(MessageAction::LoadOlder);
                    }
                });
            } else if buffer.is_loaded() {
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new("This is the start of the conversation")
                            .small()
                            .color(theme.text_muted),
                    );
                });
            }

            for row in buffer.rows() {
                if let Some(reply) = render_row(ui, row, buffer, theme) {
                    action = Some(reply);
                }
            }

            ui.add_space(8.0);
        });

    action
}

fn render_row(
    ui: &mut egui::Ui,
    row: &DisplayRow,
    buffer: &ConversationBuffer,
    theme: &MurmurTheme,
) -> Option<MessageAction> {
    match &row.item {
        RenderItem::DateDivider(date) => {
            render_date_divider(ui, *date, theme);
            None
        }
        RenderItem::UnreadDivider => {
            render_divider(ui, "New messages", theme.error);
            None
        }
        RenderItem::Message { message, depth } => {
            render_message(ui, message, *depth, row.grouped, buffer, theme)
        }
    }
}

fn render_date_divider(ui: &mut egui::Ui, date: NaiveDate, theme: &MurmurTheme) {
    let label = if date == Local::now().date_naive() {
        "Today".to_string()
    } else {
        date.format("%A, %B %-d, %Y").to_string()
    };
    render_divider(ui, &label, theme.text_muted);
}

fn render_divider(ui: &mut egui::Ui, label: &str, color: egui::Color32) {
    ui.add_space(6.0);
    ui.horizontal(|ui| {
        let available = ui.available_width();
        let text = egui::RichText::new(label).small().strong().color(color);
        let galley_width = 8.0 * label.chars().count() as f32;
        let side = ((available - galley_width) / 2.0 - 12.0).max(8.0);
        let line = |ui: &mut egui::Ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(side, 12.0), egui::Sense::hover());
            ui.painter()
                .hline(rect.x_range(), rect.center().y, egui::Stroke::new(1.0, color.linear_multiply(0.5)));
        };
        line(ui);
        ui.label(text);
        line(ui);
    });
    ui.add_space(6.0);
}

fn render_message(
    ui: &mut egui::Ui,
    message: &Message,
    depth: u8,
    grouped: bool,
    buffer: &ConversationBuffer,
    theme: &MurmurTheme,
) -> Option<MessageAction> {
    let mut action = None;
    let local_time = message.timestamp.with_timezone(&Local);

    if !grouped {
        ui.add_space(6.0);
    }

    let rect = ui
        .horizontal(|ui| {
            ui.add_space(16.0 + REPLY_INDENT * depth as f32);
            if depth > 0 {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(2.0, 18.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 1.0, theme.border_medium);
            }

            ui.vertical(|ui| {
                if !grouped {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(&message.author_id)
                                .strong()
                                .color(author_color(&message.author_id)),
                        );
                        ui.label(
                            egui::RichText::new(local_time.format("%H:%M").to_string())
                                .text_style(egui::TextStyle::Name("timestamp".into()))
                                .color(theme.text_muted),
                        );
                        if depth == 0 {
                            if let Some(parent) = message.reply_to.as_deref().and_then(|id| buffer.get(id)) {
                                ui.label(
                                    egui::RichText::new(format!("↪ {}", parent.author_id))
                                        .small()
                                        .color(theme.text_muted),
                                );
                            }
                        }
                    });
                }

                ui.label(egui::RichText::new(&message.content).color(theme.text_primary))
                    .on_hover_text(local_time.format("%Y-%m-%d %H:%M:%S").to_string());

                if !message.reactions.is_empty() {
                    ui.horizontal(|ui| {
                        for reaction in &message.reactions {
                            egui::Frame::new()
                                .fill(theme.surface[3])
                                .corner_radius(8.0)
                                .inner_margin(egui::Margin::symmetric(6, 2))
                                .show(ui, |ui| {
                                    ui.label(
                                        egui::RichText::new(format!("{} {}", reaction.emoji, reaction.count))
                                            .small()
                                            .color(theme.text_secondary),
                                    );
                                });
                        }
                    });
                }
            });
        })
        .response
        .rect;

    let response = ui.interact(rect, ui.id().with(&message.id), egui::Sense::click());
    response.context_menu(|ui| {
        if ui.button("Reply").clicked() {
            action = Some(MessageAction::ReplyTo(message.id.clone()));
            ui.close_menu();
        }
        if ui.button("Copy text").clicked() {
            ui.ctx().copy_text(message.content.clone());
            ui.close_menu();
        }
    });

    action
}
