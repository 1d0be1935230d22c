use super::types::ChatMessage;

/// Lệnh lõi chat gửi xuống tầng mạng.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelCommand {
    JoinRoom(String),
    LeaveRoom(String),
    SendMessage(ChatMessage),
    Typing { room_id: String, username: String },
    StopTyping(String),
}

impl ChannelCommand {
    /// Event name on the wire, as other clients of the room know it.
    pub fn event_name(&self) -> &'static str {
        match self {
            ChannelCommand::JoinRoom(_) => "join room",
            ChannelCommand::LeaveRoom(_) => "leave room",
            ChannelCommand::SendMessage(_) => "message",
            ChannelCommand::Typing { .. } => "typing",
            ChannelCommand::StopTyping(_) => "stop typing",
        }
    }
}
