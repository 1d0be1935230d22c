use chrono::Local;
use eframe::egui;

use crate::common::ChatMessage;
use crate::sync::grouping::{self, MessageRow};

const OWN_COLOR: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);
const REMOTE_COLOR: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);

pub fn render(ui: &mut egui::Ui, messages: &[ChatMessage], username: &str) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for row in grouping::rows(messages, &Local) {
                if let Some(date) = &row.date_label {
                    ui.vertical_centered(|ui| {
                        ui.colored_label(OWN_COLOR, date);
                    });
                }
                render_row(ui, &row, username);
                ui.add_space(6.0);
            }
        });
}

fn render_row(ui: &mut egui::Ui, row: &MessageRow<'_>, username: &str) {
    let own = row.message.is_own(username);
    let layout = if own {
        egui::Layout::right_to_left(egui::Align::TOP)
    } else {
        egui::Layout::left_to_right(egui::Align::TOP)
    };

    ui.with_layout(layout, |ui| {
        egui::Frame::group(ui.style())
            .stroke(egui::Stroke::new(2.0, if own { OWN_COLOR } else { REMOTE_COLOR }))
            .corner_radius(6.0)
            .show(ui, |ui| {
                ui.set_max_width(360.0);
                ui.vertical(|ui| {
                    if !own {
                        ui.label(egui::RichText::new(&row.message.sender).small().strong());
                    }
                    if let Some(text) = &row.message.text {
                        ui.label(text);
                    }
                    if let Some(attachment) = &row.message.attachment {
                        let label = format!("{} {}", attachment.category().icon(), attachment.file_name);
                        ui.hyperlink_to(label, &attachment.url);
                    }
                    ui.label(egui::RichText::new(&row.time_label).small().weak());
                });
            });
    });
}
