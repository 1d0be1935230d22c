use std::path::Path;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::common::Attachment;
use crate::sync::RoomSession;

use super::components::input_bar::InputActions;
use super::components::{chat_area, input_bar, sidebar};
use super::state::AppState;

/// Upper bound between repaints while nothing is scheduled, so inbound
/// events are drained promptly.
const IDLE_REPAINT: Duration = Duration::from_millis(100);

pub struct ChatApp {
    state: AppState,
    session: RoomSession,
}

impl ChatApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, session: RoomSession) -> Self {
        Self {
            state: AppState::new(),
            session,
        }
    }

    fn handle_input(&mut self, actions: InputActions) {
        let now = Instant::now();
        if actions.text_changed {
            self.session.input_changed(now);
        }
        if let Some(emoji) = actions.emoji {
            self.session.pick_emoji(emoji);
        }
        if actions.detach {
            self.session.composer_mut().detach();
        }
        if let Some(path) = actions.attach_path {
            self.attach(&path);
        }
        if actions.send && self.session.compose().is_some() {
            self.state.attachment_path.clear();
        }
    }

    fn attach(&mut self, path: &str) {
        match Attachment::from_path(Path::new(path)) {
            Ok(attachment) => {
                log::debug!("Attached {}", attachment.url);
                self.session.composer_mut().attach(attachment);
                self.state.attachment_error = None;
            }
            Err(err) => {
                log::warn!("{err}");
                self.state.attachment_error = Some(err.to_string());
            }
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.tick(Instant::now());

        egui::SidePanel::left("room_sidebar").show(ctx, |ui| {
            sidebar::render(ui, &self.session);
        });

        egui::TopBottomPanel::bottom("composer").show(ctx, |ui| {
            // Dòng trạng thái "đang gõ"
            let presence = self.session.presence_text().unwrap_or_default();
            ui.label(egui::RichText::new(presence).italics().weak());

            let actions = input_bar::render(ui, self.session.composer_mut(), &mut self.state);
            self.handle_input(actions);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(format!("# {}", self.session.settings().room_id));
            ui.separator();
            let username = self.session.settings().username.clone();
            chat_area::render(ui, &self.session.messages(), &username);
        });

        let wake_in = self
            .session
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .map_or(IDLE_REPAINT, |delay| delay.min(IDLE_REPAINT));
        ctx.request_repaint_after(wake_in);
    }
}
