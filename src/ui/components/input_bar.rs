use eframe::egui;

use crate::sync::Composer;
use crate::ui::state::AppState;

const QUICK_EMOJI: [&str; 8] = ["😀", "😂", "😍", "👍", "🙏", "🎉", "😢", "🔥"];

/// What the user asked for this frame.
#[derive(Debug, Default)]
pub struct InputActions {
    pub text_changed: bool,
    pub send: bool,
    pub emoji: Option<&'static str>,
    pub attach_path: Option<String>,
    pub detach: bool,
}

pub fn render(ui: &mut egui::Ui, composer: &mut Composer, state: &mut AppState) -> InputActions {
    let mut actions = InputActions::default();

    if composer.emoji_picker_open() {
        ui.horizontal(|ui| {
            for emoji in QUICK_EMOJI {
                if ui.button(emoji).clicked() {
                    actions.emoji = Some(emoji);
                }
            }
        });
    }

    if let Some(attachment) = composer.attachment() {
        ui.horizontal(|ui| {
            ui.label(format!("{} {}", attachment.category().icon(), attachment.file_name));
            if ui.small_button("✕").clicked() {
                actions.detach = true;
            }
        });
    }

    ui.horizontal(|ui| {
        ui.label("📎");
        ui.add(
            egui::TextEdit::singleline(&mut state.attachment_path)
                .hint_text("Path of a file to attach"),
        );
        if ui.button("Attach").clicked() && !state.attachment_path.trim().is_empty() {
            actions.attach_path = Some(state.attachment_path.trim().to_string());
        }
    });
    if let Some(error) = &state.attachment_error {
        ui.colored_label(egui::Color32::RED, error);
    }

    ui.horizontal(|ui| {
        let edit_id = ui.make_persistent_id("composer_input");
        let enter_pressed = ui.memory(|memory| memory.has_focus(edit_id))
            && ui.input_mut(consume_send_key);

        let rows = composer.rows();
        let response = ui.add(
            egui::TextEdit::multiline(composer.input_mut())
                .id(edit_id)
                .desired_rows(rows)
                .hint_text("Type your message..."),
        );
        actions.text_changed = response.changed();

        if ui.button("😊").clicked() {
            composer.toggle_emoji_picker();
        }
        if ui.button("Send").clicked() || enter_pressed {
            actions.send = true;
        }
    });

    actions
}

/// Enter sends; with Shift held it is left for the text box as a newline.
fn is_send_chord(modifiers: egui::Modifiers) -> bool {
    !modifiers.shift
}

/// `consume_key` ignores an extra Shift, so the chord is checked first.
fn consume_send_key(input: &mut egui::InputState) -> bool {
    is_send_chord(input.modifiers) && input.consume_key(egui::Modifiers::NONE, egui::Key::Enter)
}
