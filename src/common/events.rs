use serde::{Deserialize, Serialize};

use super::commands::ChannelCommand;
use super::types::ChatMessage;

/// Sự kiện từ tầng mạng gửi lên lõi chat.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    MessageReceived(ChatMessage),
    Typing(String),
    StopTyping,
    PeerConnected(String),
    PeerDisconnected(String),
}

/// Room-scoped payload published on a room topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum Envelope {
    #[serde(rename = "message")]
    Message(ChatMessage),
    #[serde(rename = "typing")]
    Typing {
        #[serde(rename = "roomId")]
        room_id: String,
        username: String,
    },
    #[serde(rename = "stop typing")]
    StopTyping(String),
}

impl Envelope {
    /// Splits a command into its target room and the payload to publish.
    /// Join and leave are subscription changes and never hit the wire.
    pub fn from_command(command: ChannelCommand) -> Option<(String, Envelope)> {
        match command {
            ChannelCommand::SendMessage(message) => {
                Some((message.room_id.clone(), Envelope::Message(message)))
            }
            ChannelCommand::Typing { room_id, username } => Some((
                room_id.clone(),
                Envelope::Typing { room_id, username },
            )),
            ChannelCommand::StopTyping(room_id) => {
                Some((room_id.clone(), Envelope::StopTyping(room_id)))
            }
            ChannelCommand::JoinRoom(_) | ChannelCommand::LeaveRoom(_) => None,
        }
    }

    /// Maps a payload received on `room`'s topic to an inbound event.
    pub fn into_event(self, room: &str) -> ChannelEvent {
        match self {
            Envelope::Message(mut message) => {
                if message.room_id.is_empty() {
                    message.room_id = room.to_string();
                }
                ChannelEvent::MessageReceived(message)
            }
            Envelope::Typing { username, .. } => ChannelEvent::Typing(username),
            Envelope::StopTyping(_) => ChannelEvent::StopTyping,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_envelope_uses_channel_event_names() {
        let (room, envelope) = Envelope::from_command(ChannelCommand::Typing {
            room_id: "test-room-id".into(),
            username: "user".into(),
        })
        .unwrap();

        assert_eq!(room, "test-room-id");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["event"], "typing");
        assert_eq!(value["data"]["roomId"], "test-room-id");
        assert_eq!(value["data"]["username"], "user");

        let stop = serde_json::to_value(Envelope::StopTyping("test-room-id".into())).unwrap();
        assert_eq!(stop["event"], "stop typing");
        assert_eq!(stop["data"], "test-room-id");
    }

    #[test]
    fn join_and_leave_are_not_published() {
        assert!(Envelope::from_command(ChannelCommand::JoinRoom("r".into())).is_none());
        assert!(Envelope::from_command(ChannelCommand::LeaveRoom("r".into())).is_none());
    }

    #[test]
    fn inbound_message_without_room_takes_topic_room() {
        let envelope: Envelope = serde_json::from_str(
            r#"{"event":"message","data":{"id":"m1","message":"hello","sender":"salesmember","timestamp":"2024-08-30T09:00:00Z"}}"#,
        )
        .unwrap();

        match envelope.into_event("test-room-id") {
            ChannelEvent::MessageReceived(message) => assert_eq!(message.room_id, "test-room-id"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn malformed_inbound_message_fails_to_decode() {
        let decoded = serde_json::from_str::<Envelope>(
            r#"{"event":"message","data":{"message":"no id","sender":"x"}}"#,
        );
        assert!(decoded.is_err());
    }
}
