//! Composer panel: reply banner, attachments, markdown toolbar, the text
//! input with deferred caret sync, paste interception and the mention popup.

use eframe::egui;
use tracing::warn;

use crate::composer::caret::{byte_to_char, char_to_byte};
use crate::composer::{InputBounds, MarkdownFormat, PasteOutcome};
use crate::protocol::{BackendAction, FilePayload, UserCandidate};
use crate::state::ClientState;

use super::theme::MurmurTheme;

const MAX_POPUP_ROWS: usize = 8;

fn toolbar_formats() -> [(&'static str, MarkdownFormat); 7] {
    [
        ("B", MarkdownFormat::Bold),
        ("I", MarkdownFormat::Italic),
        ("</>", MarkdownFormat::InlineCode),
        ("{ }", MarkdownFormat::CodeBlock { language: String::new() }),
        ("•", MarkdownFormat::BulletItem),
        ("1.", MarkdownFormat::NumberedItem),
        ("🔗", MarkdownFormat::Link { url: "https://".into() }),
    ]
}

pub fn composer_id() -> egui::Id {
    egui::Id::new("composer_input")
}

/// Render the composer. Returns actions for the backend.
pub fn render_composer(ui: &mut egui::Ui, state: &mut ClientState, theme: &MurmurTheme) -> Vec<BackendAction> {
    let mut actions = Vec::new();
    let id = composer_id();
    let focused = ui.memory(|m| m.has_focus(id));

    render_reply_banner(ui, state, theme);
    render_attachments(ui, state, theme);

    ui.horizontal(|ui| {
        for (glyph, format) in toolbar_formats() {
            if ui.small_button(glyph).on_hover_text(format.label()).clicked() {
                state.composer.format(&format);
                ui.memory_mut(|m| m.request_focus(id));
            }
        }
    });

    // Paste and drops are taken out of the input stream before the text
    // edit sees them.
    if focused {
        let pasted: Vec<String> = ui.input_mut(|i| {
            let mut pasted = Vec::new();
            i.events.retain(|event| match event {
                egui::Event::Paste(text) => {
                    pasted.push(text.clone());
                    false
                }
                _ => true,
            });
            pasted
        });
        for text in pasted {
            state.composer.paste(&text, false);
        }
    }
    let dropped = ui.ctx().input(|i| i.raw.dropped_files.clone());
    if !dropped.is_empty() && state.composer.paste("", true) == PasteOutcome::UploadFiles {
        let payloads = read_dropped(&dropped, state);
        actions.extend(state.start_upload(payloads));
    }

    // Mention popup from the previous frame takes Enter/Tab.
    let popup_candidates = active_candidates(state);
    let mut chosen: Option<UserCandidate> = None;
    let mut send_requested = false;
    if focused {
        ui.input_mut(|i| {
            let accept = (!i.modifiers.shift && i.consume_key(egui::Modifiers::NONE, egui::Key::Enter))
                || (!popup_candidates.is_empty() && i.consume_key(egui::Modifiers::NONE, egui::Key::Tab));
            if accept {
                match popup_candidates.first() {
                    Some(first) => chosen = Some(first.clone()),
                    None => send_requested = true,
                }
            }
        });
    }

    let mut text = state.composer.text().to_string();
    let mut send_clicked = false;
    let output = ui
        .horizontal(|ui| {
            let output = egui::Frame::new()
                .fill(theme.surface[2])
                .corner_radius(6.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    egui::TextEdit::multiline(&mut text)
                        .id(id)
                        .desired_rows(1)
                        .desired_width(ui.available_width() - 80.0)
                        .frame(false)
                        .hint_text(format!(
                            "Message #{} (Enter to send, Shift+Enter for newline)",
                            state.channel_id
                        ))
                        .show(ui)
                })
                .inner;

            let label = if state.composer.uploading { "Uploading…" } else { "Send" };
            send_clicked = ui
                .add_enabled(state.composer.can_send().is_ok(), egui::Button::new(label))
                .clicked();
            output
        })
        .inner;

    let selection = output
        .cursor_range
        .map(|range| {
            let range = range.as_ccursor_range();
            let (a, b) = (range.primary.index, range.secondary.index);
            (char_to_byte(&text, a.min(b)), char_to_byte(&text, a.max(b)))
        })
        .unwrap_or_else(|| state.composer.buffer.selection());
    let rect = output.response.rect;
    state.composer.on_input(
        &text,
        selection,
        InputBounds {
            left: rect.left(),
            top: rect.top(),
        },
    );

    if let Some(offset) = state.composer.buffer.commit_render() {
        let index = byte_to_char(state.composer.text(), offset);
        let mut widget_state = output.state;
        widget_state
            .cursor
            .set_char_range(Some(egui::text::CCursorRange::one(egui::text::CCursor::new(index))));
        widget_state.store(ui.ctx(), id);
        ui.memory_mut(|m| m.request_focus(id));
        ui.ctx().request_repaint();
    }

    if let Some(query) = state.composer.mention.clone() {
        match state.candidates_for(&query.search_prefix).map(<[_]>::to_vec) {
            Some(candidates) => {
                let anchor = egui::pos2(query.anchor.x, query.anchor.y);
                if let Some(picked) = render_mention_popup(ui.ctx(), anchor, &candidates, theme) {
                    chosen = Some(picked);
                }
            }
            None => actions.extend(state.request_candidates(&query.search_prefix)),
        }
    }

    if let Some(candidate) = chosen {
        state.composer.select_mention(&candidate);
        ui.memory_mut(|m| m.request_focus(id));
    } else if send_requested || send_clicked {
        if let Ok(action) = state.send_composed() {
            actions.push(action);
        }
        ui.memory_mut(|m| m.request_focus(id));
    }

    actions
}

fn active_candidates(state: &ClientState) -> Vec<UserCandidate> {
    state
        .composer
        .mention
        .as_ref()
        .and_then(|query| state.candidates_for(&query.search_prefix))
        .map(|users| users.iter().take(MAX_POPUP_ROWS).cloned().collect())
        .unwrap_or_default()
}

fn render_mention_popup(
    ctx: &egui::Context,
    anchor: egui::Pos2,
    candidates: &[UserCandidate],
    theme: &MurmurTheme,
) -> Option<UserCandidate> {
    let mut picked = None;
    egui::Area::new(egui::Id::new("mention_popup"))
        .fixed_pos(anchor)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).fill(theme.surface[4]).show(ui, |ui| {
                ui.set_min_width(180.0);
                if candidates.is_empty() {
                    ui.label(egui::RichText::new("No matching people").color(theme.text_muted));
                }
                for (i, candidate) in candidates.iter().take(MAX_POPUP_ROWS).enumerate() {
                    if ui
                        .selectable_label(i == 0, format!("@{}", candidate.name))
                        .clicked()
                    {
                        picked = Some(candidate.clone());
                    }
                }
            });
        });
    picked
}

fn render_reply_banner(ui: &mut egui::Ui, state: &mut ClientState, theme: &MurmurTheme) {
    let Some(parent_id) = state.composer.reply_to.clone() else {
        return;
    };
    let summary = match state.buffer.get(&parent_id) {
        Some(parent) => {
            let snippet: String = parent.content.chars().take(60).collect();
            format!("Replying to {}: {}", parent.author_id, snippet)
        }
        None => "Replying to a message".to_string(),
    };
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(summary).small().color(theme.text_secondary));
        if ui.small_button("✕").on_hover_text("Cancel reply").clicked() {
            state.composer.cancel_reply();
        }
    });
}

fn render_attachments(ui: &mut egui::Ui, state: &mut ClientState, theme: &MurmurTheme) {
    if state.composer.attachments.is_empty() && !state.composer.uploading {
        return;
    }
    let mut removed = None;
    ui.horizontal_wrapped(|ui| {
        for file in &state.composer.attachments {
            egui::Frame::new()
                .fill(theme.surface[3])
                .corner_radius(6.0)
                .inner_margin(egui::Margin::symmetric(8, 4))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(format!("📎 {}", file.name)).small());
                    if ui.small_button("✕").clicked() {
                        removed = Some(file.id.clone());
                    }
                });
        }
        if state.composer.uploading {
            ui.spinner();
            ui.label(egui::RichText::new("Uploading…").small().color(theme.warning));
        }
    });
    if let Some(id) = removed {
        state.composer.remove_attachment(&id);
    }
}

fn read_dropped(files: &[egui::DroppedFile], state: &mut ClientState) -> Vec<FilePayload> {
    let mut payloads = Vec::new();
    for file in files {
        let bytes = match (&file.bytes, &file.path) {
            (Some(bytes), _) => bytes.to_vec(),
            (None, Some(path)) => match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read dropped file");
                    state.push_status(format!("Could not read {}: {}", path.display(), e));
                    continue;
                }
            },
            (None, None) => continue,
        };
        let name = match &file.path {
            Some(path) if file.name.is_empty() => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string()),
            _ if file.name.is_empty() => "file".to_string(),
            _ => file.name.clone(),
        };
        payloads.push(FilePayload { name, bytes });
    }
    payloads
}
