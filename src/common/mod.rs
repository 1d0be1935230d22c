pub mod commands;
pub mod events;
pub mod types;

pub use commands::ChannelCommand;
pub use events::{ChannelEvent, Envelope};
pub use types::{Attachment, ChatMessage, FileCategory, MessageId, PeerStatus};
