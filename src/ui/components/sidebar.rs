use eframe::egui;

use crate::sync::RoomSession;

pub fn render(ui: &mut egui::Ui, session: &RoomSession) {
    let settings = session.settings();
    ui.heading("Room");
    ui.label(egui::RichText::new(&settings.room_id).strong());
    ui.label(egui::RichText::new(format!("@{}", settings.username)).weak());
    ui.separator();

    ui.heading("Peers");
    let peers = session.peers();
    if peers.is_empty() {
        ui.label("No peers discovered yet");
        return;
    }

    for peer_id in peers.iter() {
        ui.horizontal(|ui| {
            ui.colored_label(egui::Color32::GREEN, "●");
            // Hiển thị peer ID (rút ngắn)
            ui.label(short_peer_id(peer_id));
        });
    }
}

fn short_peer_id(peer_id: &str) -> String {
    peer_id.chars().take(16).collect()
}
