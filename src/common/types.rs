use std::fmt;
use std::path::Path;

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};
use uuid::Uuid;

use crate::error::{
    ChatError, ChatResult, InvalidTimestampSnafu, MalformedMessageSnafu, ResolveAttachmentSnafu,
};

/// Display name used when a peer sends a file without naming it.
const FALLBACK_FILE_NAME: &str = "file";

/// Định danh duy nhất của một tin nhắn trong phòng.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Time-ordered UUIDv7, so two sends inside the same millisecond still differ.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A file reference carried by a message: where to fetch it and what to call it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub file_name: String,
}

impl Attachment {
    pub fn new(url: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file_name: file_name.into(),
        }
    }

    /// Turns a local file into a `file://` reference plus its display name.
    pub fn from_path(path: &Path) -> ChatResult<Self> {
        let canonical = path.canonicalize().context(ResolveAttachmentSnafu {
            path: path.display().to_string(),
        })?;
        let file_name = canonical
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

        Ok(Self {
            url: format!("file://{}", canonical.display()),
            file_name,
        })
    }

    pub fn category(&self) -> FileCategory {
        FileCategory::from_file_name(&self.file_name)
    }
}

/// Coarse file kind, only used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Image,
    Archive,
    Document,
    Spreadsheet,
    Pdf,
    Other,
}

impl FileCategory {
    pub fn from_file_name(file_name: &str) -> Self {
        let Some((_, extension)) = file_name.rsplit_once('.') else {
            return FileCategory::Other;
        };

        match extension.to_ascii_lowercase().as_str() {
            "pdf" => FileCategory::Pdf,
            "jpg" | "jpeg" | "png" | "gif" => FileCategory::Image,
            "zip" | "rar" => FileCategory::Archive,
            "doc" | "docx" => FileCategory::Document,
            "xls" | "xlsx" => FileCategory::Spreadsheet,
            _ => FileCategory::Other,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            FileCategory::Image => "🖼",
            FileCategory::Archive => "🗜",
            FileCategory::Document => "📝",
            FileCategory::Spreadsheet => "📊",
            FileCategory::Pdf => "📕",
            FileCategory::Other => "📄",
        }
    }
}

/// Domain model đại diện một tin nhắn chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireMessage", try_from = "WireMessage")]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: Option<String>,
    pub sender: String,
    pub attachment: Option<Attachment>,
    pub room_id: String,
    pub timestamp: DateTime<FixedOffset>,
}

impl ChatMessage {
    pub fn is_own(&self, username: &str) -> bool {
        self.sender == username
    }

    pub fn has_content(&self) -> bool {
        self.text.is_some() || self.attachment.is_some()
    }

    /// A message the store can key and attribute.
    pub fn is_well_formed(&self) -> bool {
        !self.id.is_blank() && !self.sender.trim().is_empty()
    }
}

/// Message id as other clients send it: a string, or a millisecond counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

/// Flat record exchanged on the channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    #[serde(default)]
    pub id: Option<WireId>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl From<ChatMessage> for WireMessage {
    fn from(message: ChatMessage) -> Self {
        let (file, file_name) = match message.attachment {
            Some(attachment) => (Some(attachment.url), Some(attachment.file_name)),
            None => (None, None),
        };

        Self {
            id: Some(WireId::Text(message.id.0)),
            message: message.text,
            sender: Some(message.sender),
            file,
            file_name,
            room_id: Some(message.room_id),
            timestamp: Some(message.timestamp.to_rfc3339_opts(SecondsFormat::Millis, false)),
        }
    }
}

impl TryFrom<WireMessage> for ChatMessage {
    type Error = ChatError;

    fn try_from(wire: WireMessage) -> ChatResult<Self> {
        let id = match wire.id {
            Some(WireId::Text(raw)) if !raw.trim().is_empty() => MessageId::new(raw),
            Some(WireId::Number(raw)) => MessageId::new(raw.to_string()),
            _ => return MalformedMessageSnafu { field: "id" }.fail(),
        };
        let sender = wire
            .sender
            .filter(|sender| !sender.trim().is_empty())
            .context(MalformedMessageSnafu { field: "sender" })?;

        let text = wire.message.filter(|text| !text.is_empty());
        let attachment = match (wire.file, wire.file_name) {
            (Some(url), file_name) if !url.is_empty() => Some(Attachment {
                url,
                file_name: file_name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string()),
            }),
            _ => None,
        };
        if text.is_none() && attachment.is_none() {
            return MalformedMessageSnafu { field: "message" }.fail();
        }

        let timestamp = match wire.timestamp.as_deref().map(parse_timestamp) {
            Some(Ok(timestamp)) => timestamp,
            Some(Err(err)) => {
                log::warn!("Message {id}: {err}; stamping with receive time");
                Local::now().fixed_offset()
            }
            None => {
                log::warn!("Message {id} has no timestamp; stamping with receive time");
                Local::now().fixed_offset()
            }
        };

        Ok(Self {
            id,
            text,
            sender,
            attachment,
            room_id: wire.room_id.unwrap_or_default(),
            timestamp,
        })
    }
}

pub fn parse_timestamp(raw: &str) -> ChatResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).context(InvalidTimestampSnafu { raw })
}

/// Trạng thái của một peer trên kênh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerStatus {
    pub peer_id: String,
    pub online: bool,
}
