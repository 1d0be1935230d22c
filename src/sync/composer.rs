use chrono::{DateTime, FixedOffset, Local};

use crate::common::{Attachment, ChatMessage, MessageId};
use crate::error::{ChatResult, EmptyCompositionSnafu};

/// Upper bound of the auto-growing input, in text rows.
pub const MAX_INPUT_ROWS: usize = 4;

/// Builds an outgoing message, or refuses when there is nothing to send.
pub fn compose_message(
    text: &str,
    attachment: Option<Attachment>,
    sender: &str,
    room_id: &str,
    timestamp: DateTime<FixedOffset>,
) -> ChatResult<ChatMessage> {
    let text = text.trim();
    if text.is_empty() && attachment.is_none() {
        return EmptyCompositionSnafu.fail();
    }

    Ok(ChatMessage {
        id: MessageId::generate(),
        text: (!text.is_empty()).then(|| text.to_string()),
        sender: sender.to_string(),
        attachment,
        room_id: room_id.to_string(),
        timestamp,
    })
}

/// Local input state behind the message box.
#[derive(Debug, Clone)]
pub struct Composer {
    input: String,
    attachment: Option<Attachment>,
    rows: usize,
    emoji_picker_open: bool,
}

impl Composer {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            attachment: None,
            rows: 1,
            emoji_picker_open: false,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Direct access for text widgets; call [`Composer::refresh_rows`] after edits.
    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.refresh_rows();
    }

    pub fn refresh_rows(&mut self) {
        self.rows = self.input.lines().count().clamp(1, MAX_INPUT_ROWS);
        if self.input.ends_with('\n') && self.rows < MAX_INPUT_ROWS {
            self.rows += 1;
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn attach(&mut self, attachment: Attachment) {
        self.attachment = Some(attachment);
    }

    pub fn detach(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn toggle_emoji_picker(&mut self) {
        self.emoji_picker_open = !self.emoji_picker_open;
    }

    pub fn emoji_picker_open(&self) -> bool {
        self.emoji_picker_open
    }

    pub fn pick_emoji(&mut self, emoji: &str) {
        self.input.push_str(emoji);
        self.emoji_picker_open = false;
        self.refresh_rows();
    }

    pub fn compose(&mut self, sender: &str, room_id: &str) -> ChatResult<ChatMessage> {
        self.compose_at(sender, room_id, Local::now().fixed_offset())
    }

    /// On success the input is cleared, the attachment dropped and the box
    /// collapsed; on refusal nothing changes.
    pub fn compose_at(
        &mut self,
        sender: &str,
        room_id: &str,
        timestamp: DateTime<FixedOffset>,
    ) -> ChatResult<ChatMessage> {
        let message = compose_message(
            &self.input,
            self.attachment.clone(),
            sender,
            room_id,
            timestamp,
        )?;
        self.reset();
        Ok(message)
    }

    pub fn reset(&mut self) {
        self.input.clear();
        self.attachment = None;
        self.rows = 1;
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}
