//! Outgoing messages.
//!
//! Anything that can turn itself into a [`Request`] implements
//! [`OutgoingMessage`] and can be passed to [`crate::Client::send`]:
//!
//! ```rust
//! use layer_bot_api::{OutgoingMessage, ParseMode, TextMessage};
//!
//! let req = TextMessage::new("@channely_updates", "Hello, *world*!")
//!     .parse_mode(ParseMode::Markdown)
//!     .silent(true)
//!     .into_request();
//!
//! assert_eq!(req.method(), "sendMessage");
//! assert_eq!(req.arg("disable_notification"), Some("true"));
//! ```

use crate::input_file::Media;
use crate::peer::Peer;
use crate::request::Request;
use crate::types::ParseMode;

/// An operation that produces the request sending it.
pub trait OutgoingMessage {
    fn into_request(self) -> Request;
}

impl OutgoingMessage for Request {
    fn into_request(self) -> Request { self }
}

// Options shared by every kind of message.
#[derive(Clone, Debug, Default)]
struct Common {
    silent:   bool,
    reply_to: i64,
}

impl Common {
    fn add_to(&self, request: Request) -> Request {
        request
            .add_opt_bool("disable_notification", self.silent)
            .add_opt_int64("reply_to_message_id", self.reply_to)
    }
}

// ─── TextMessage ──────────────────────────────────────────────────────────────

/// `sendMessage`.
#[derive(Clone, Debug)]
pub struct TextMessage {
    pub peer:       Peer,
    pub text:       String,
    pub parse_mode: ParseMode,
    pub no_webpage: bool,
    common:         Common,
}

impl TextMessage {
    pub fn new(to: impl Into<Peer>, text: impl Into<String>) -> Self {
        Self {
            peer:       to.into(),
            text:       text.into(),
            parse_mode: ParseMode::Plain,
            no_webpage: false,
            common:     Common::default(),
        }
    }

    pub fn parse_mode(mut self, pm: ParseMode) -> Self {
        self.parse_mode = pm; self
    }

    /// Disable the link preview.
    pub fn no_webpage(mut self, v: bool) -> Self {
        self.no_webpage = v; self
    }

    /// Send without a notification sound.
    pub fn silent(mut self, v: bool) -> Self {
        self.common.silent = v; self
    }

    /// Reply to a message of the same chat.
    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.common.reply_to = message_id; self
    }
}

impl OutgoingMessage for TextMessage {
    fn into_request(self) -> Request {
        let req = Request::new("sendMessage")
            .add_chat_id(self.peer)
            .add_string("text", self.text)
            .add_opt_bool("disable_web_page_preview", self.no_webpage);
        self.common.add_to(add_parse_mode(req, self.parse_mode))
    }
}

// ─── PhotoMessage ─────────────────────────────────────────────────────────────

/// `sendPhoto`.
#[derive(Debug)]
pub struct PhotoMessage {
    pub peer:       Peer,
    pub photo:      Media,
    pub caption:    String,
    pub parse_mode: ParseMode,
    common:         Common,
}

impl PhotoMessage {
    pub fn new(to: impl Into<Peer>, photo: impl Into<Media>) -> Self {
        Self {
            peer:       to.into(),
            photo:      photo.into(),
            caption:    String::new(),
            parse_mode: ParseMode::Plain,
            common:     Common::default(),
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into(); self
    }

    pub fn parse_mode(mut self, pm: ParseMode) -> Self {
        self.parse_mode = pm; self
    }

    pub fn silent(mut self, v: bool) -> Self {
        self.common.silent = v; self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.common.reply_to = message_id; self
    }
}

impl OutgoingMessage for PhotoMessage {
    fn into_request(self) -> Request {
        let req = Request::new("sendPhoto").add_chat_id(self.peer);
        let req = self.photo.add_to_request("photo", req);
        let req = add_caption(req, self.caption, self.parse_mode);
        self.common.add_to(req)
    }
}

// ─── DocumentMessage ──────────────────────────────────────────────────────────

/// `sendDocument`.
#[derive(Debug)]
pub struct DocumentMessage {
    pub peer:       Peer,
    pub document:   Media,
    pub caption:    String,
    pub parse_mode: ParseMode,
    common:         Common,
}

impl DocumentMessage {
    pub fn new(to: impl Into<Peer>, document: impl Into<Media>) -> Self {
        Self {
            peer:       to.into(),
            document:   document.into(),
            caption:    String::new(),
            parse_mode: ParseMode::Plain,
            common:     Common::default(),
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into(); self
    }

    pub fn parse_mode(mut self, pm: ParseMode) -> Self {
        self.parse_mode = pm; self
    }

    pub fn silent(mut self, v: bool) -> Self {
        self.common.silent = v; self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.common.reply_to = message_id; self
    }
}

impl OutgoingMessage for DocumentMessage {
    fn into_request(self) -> Request {
        let req = Request::new("sendDocument").add_chat_id(self.peer);
        let req = self.document.add_to_request("document", req);
        let req = add_caption(req, self.caption, self.parse_mode);
        self.common.add_to(req)
    }
}

fn add_parse_mode(req: Request, pm: ParseMode) -> Request {
    match pm {
        ParseMode::Plain => req,
        pm               => req.add_string("parse_mode", pm.as_str()),
    }
}

fn add_caption(req: Request, caption: String, pm: ParseMode) -> Request {
    if caption.is_empty() {
        return req;
    }
    add_parse_mode(req.add_string("caption", caption), pm)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_file::InputFile;

    #[test]
    fn text_message_minimal() {
        let req = TextMessage::new(1i64, "test").into_request();
        assert_eq!(req.method(), "sendMessage");
        let args: Vec<_> = req.args().collect();
        assert_eq!(args, vec![("chat_id", "1"), ("text", "test")]);
    }

    #[test]
    fn text_message_full() {
        let req = TextMessage::new("@channely_updates", "*hi*")
            .parse_mode(ParseMode::MarkdownV2)
            .no_webpage(true)
            .silent(true)
            .reply_to(10)
            .into_request();
        assert_eq!(req.arg("chat_id"), Some("@channely_updates"));
        assert_eq!(req.arg("parse_mode"), Some("MarkdownV2"));
        assert_eq!(req.arg("disable_web_page_preview"), Some("true"));
        assert_eq!(req.arg("disable_notification"), Some("true"));
        assert_eq!(req.arg("reply_to_message_id"), Some("10"));
    }

    #[test]
    fn photo_upload_is_multipart() {
        let req = PhotoMessage::new(1i64, InputFile::from_bytes("cat.jpg", vec![0xff, 0xd8]))
            .caption("cat")
            .parse_mode(ParseMode::Html)
            .into_request();
        assert!(req.has_attachments());
        assert_eq!(req.attachment_name("photo"), Some("cat.jpg"));
        assert_eq!(req.arg("caption"), Some("cat"));
        assert_eq!(req.arg("parse_mode"), Some("HTML"));
    }

    #[test]
    fn photo_by_file_id_is_plain() {
        let req = PhotoMessage::new(1i64, Media::FileId("AgAD".into())).into_request();
        assert!(!req.has_attachments());
        assert_eq!(req.arg("photo"), Some("AgAD"));
        assert_eq!(req.arg("caption"), None);
        assert_eq!(req.arg("parse_mode"), None);
    }

    #[test]
    fn document_by_url() {
        let req = DocumentMessage::new("durov", Media::Url("https://example.com/a.pdf".into()))
            .silent(true)
            .into_request();
        assert_eq!(req.method(), "sendDocument");
        assert_eq!(req.arg("chat_id"), Some("@durov"));
        assert_eq!(req.arg("document"), Some("https://example.com/a.pdf"));
    }
}
