//! The handful of Bot API objects the built-in methods return.
//!
//! Only what the dispatch layer needs to be useful is modelled here; any
//! other object can be decoded by passing your own `Deserialize` type to
//! [`crate::Client::invoke`].

use serde::{Deserialize, Serialize};

use crate::peer::Peer;

// ─── ParseMode ────────────────────────────────────────────────────────────────

/// Text formatting style of a message or caption.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// No formatting; `parse_mode` is not sent.
    #[default]
    Plain,
    Markdown,
    MarkdownV2,
    Html,
}

impl ParseMode {
    /// Wire value, empty for [`ParseMode::Plain`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain      => "",
            Self::Markdown   => "Markdown",
            Self::MarkdownV2 => "MarkdownV2",
            Self::Html       => "HTML",
        }
    }
}

// ─── User ─────────────────────────────────────────────────────────────────────

/// A Telegram user or bot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id:         i64,
    #[serde(default)]
    pub is_bot:     bool,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name:  Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username:   Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

impl From<&User> for Peer {
    fn from(user: &User) -> Self { Peer::Id(user.id) }
}

// ─── Chat ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id:       i64,
    /// `private`, `group`, `supergroup` or `channel`.
    #[serde(rename = "type")]
    pub kind:     String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title:    Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Chat> for Peer {
    fn from(chat: &Chat) -> Self { Peer::Id(chat.id) }
}

// ─── Message ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Unix time the message was sent.
    pub date:       i64,
    pub chat:       Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from:       Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text:       Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption:    Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photo:      Vec<PhotoSize>,
}

// ─── Files ────────────────────────────────────────────────────────────────────

/// A file ready to be downloaded with [`crate::Client::download_file`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub file_id:   String,
    #[serde(default)]
    pub file_unique_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    /// Server-side path, valid for at least one hour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// One size of a photo or a thumbnail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id:   String,
    #[serde(default)]
    pub file_unique_id: String,
    pub width:     i32,
    pub height:    i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfilePhotos {
    pub total_count: i32,
    /// Up to 4 sizes for each photo.
    pub photos:      Vec<Vec<PhotoSize>>,
}

// ─── Tests ────────────────────────────────────────────────────────────────────
