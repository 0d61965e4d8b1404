//! Transport-independent description of one Bot API call.
//!
//! ```rust
//! use layer_bot_api::Request;
//!
//! let req = Request::new("sendMessage")
//!     .add_chat_id("@channely_updates")
//!     .add_string("text", "Hello!")
//!     .add_opt_bool("disable_notification", false);
//!
//! assert_eq!(req.arg("chat_id"), Some("@channely_updates"));
//! assert_eq!(req.arg("disable_notification"), None);
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tokio::io::AsyncRead;

use crate::encoder::Encoder;
use crate::errors::EncodeError;
use crate::input_file::InputFile;
use crate::peer::Peer;

// ─── RequestPart ──────────────────────────────────────────────────────────────

/// A bundle of parameters that knows how to add itself to a request.
///
/// Option structs implement this so a method wrapper can take
/// `Option<&KickOptions>` without the request knowing their shape.
pub trait RequestPart {
    fn add_to_request(&self, request: Request) -> Request;
}

impl<T: RequestPart + ?Sized> RequestPart for &T {
    fn add_to_request(&self, request: Request) -> Request {
        (**self).add_to_request(request)
    }
}

impl<T: RequestPart> RequestPart for Option<T> {
    fn add_to_request(&self, request: Request) -> Request {
        match self {
            Some(part) => part.add_to_request(request),
            None       => request,
        }
    }
}

// ─── Request ──────────────────────────────────────────────────────────────────

/// Builder for one Bot API call: method name, string arguments and uploads.
///
/// Every `add_*` method takes the request by value and hands it back, so a
/// call is composed as one chain. A request is consumed by [`Request::encode`].
#[derive(Debug)]
pub struct Request {
    method:      String,
    token:       String,
    args:        BTreeMap<String, String>,
    attachments: BTreeMap<String, InputFile>,
}

impl Request {
    /// Create an empty request for `method`.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method:      method.into(),
            token:       String::new(),
            args:        BTreeMap::new(),
            attachments: BTreeMap::new(),
        }
    }

    /// Set the bot token. The client does this right before dispatch.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into(); self
    }

    pub fn method(&self) -> &str { &self.method }

    pub fn token(&self) -> &str { &self.token }

    /// Value of string argument `key`, if set.
    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    /// All string arguments, ordered by key.
    pub fn args(&self) -> impl Iterator<Item = (&str, &str)> {
        self.args.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Declared file name of attachment `key`, if set.
    pub fn attachment_name(&self, key: &str) -> Option<&str> {
        self.attachments.get(key).map(InputFile::name)
    }

    // ── Strings ────────────────────────────────────────────────────────────

    /// Set `key` to `value`, replacing any previous value.
    pub fn add_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into()); self
    }

    /// Same as [`Request::add_string`]: an empty string is still sent, because
    /// the API treats an explicit empty value differently from an absent one.
    pub fn add_opt_string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_string(key, value)
    }

    // ── Numbers and flags ──────────────────────────────────────────────────

    pub fn add_int(self, key: impl Into<String>, value: i32) -> Self {
        self.add_string(key, value.to_string())
    }

    /// Set `key` unless `value` is `0`.
    pub fn add_opt_int(self, key: impl Into<String>, value: i32) -> Self {
        if value != 0 { self.add_int(key, value) } else { self }
    }

    pub fn add_int64(self, key: impl Into<String>, value: i64) -> Self {
        self.add_string(key, value.to_string())
    }

    /// Set `key` unless `value` is `0`.
    pub fn add_opt_int64(self, key: impl Into<String>, value: i64) -> Self {
        if value != 0 { self.add_int64(key, value) } else { self }
    }

    /// Encoded as `"true"` / `"false"`.
    pub fn add_bool(self, key: impl Into<String>, value: bool) -> Self {
        self.add_string(key, value.to_string())
    }

    /// Set `key` to `"true"` only when `value` is `true`.
    pub fn add_opt_bool(self, key: impl Into<String>, value: bool) -> Self {
        if value { self.add_bool(key, true) } else { self }
    }

    /// Shortest decimal that round-trips, never in exponent form.
    pub fn add_float64(self, key: impl Into<String>, value: f64) -> Self {
        self.add_string(key, value.to_string())
    }

    /// Set `key` unless `value` is `0.0`.
    pub fn add_opt_float64(self, key: impl Into<String>, value: f64) -> Self {
        if value != 0.0 { self.add_float64(key, value) } else { self }
    }

    // ── Time ───────────────────────────────────────────────────────────────

    /// Encoded as Unix seconds.
    pub fn add_time(self, key: impl Into<String>, value: DateTime<Utc>) -> Self {
        self.add_int64(key, value.timestamp())
    }

    /// Set `key` only when a time is given.
    pub fn add_opt_time(self, key: impl Into<String>, value: Option<DateTime<Utc>>) -> Self {
        match value {
            Some(t) => self.add_time(key, t),
            None    => self,
        }
    }

    // ── Composite ──────────────────────────────────────────────────────────

    /// Add a recipient under `key`.
    pub fn add_peer(self, key: &str, peer: impl Into<Peer>) -> Self {
        peer.into().add_to_request(key, self)
    }

    /// Add a recipient under `chat_id`.
    pub fn add_chat_id(self, peer: impl Into<Peer>) -> Self {
        self.add_peer("chat_id", peer)
    }

    /// Let `part` add its own parameters.
    pub fn add_part(self, part: impl RequestPart) -> Self {
        part.add_to_request(self)
    }

    // ── Attachments ────────────────────────────────────────────────────────

    /// Attach `body` as file field `key` named `name`.
    pub fn add_attachment(
        self,
        key:  impl Into<String>,
        name: impl Into<String>,
        body: impl AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        self.add_file(key, InputFile::new(name, body))
    }

    /// Attach `file` as file field `key`.
    pub fn add_file(mut self, key: impl Into<String>, file: InputFile) -> Self {
        self.attachments.insert(key.into(), file); self
    }

    /// `true` if at least one file is attached; such a request must be
    /// sent as multipart.
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    // ── Encoding ───────────────────────────────────────────────────────────

    /// Write every field into `encoder`: attachments first, then arguments.
    ///
    /// An argument sharing its key with an attachment is skipped. The encoder
    /// is not closed.
    pub async fn encode(self, encoder: &mut dyn Encoder) -> Result<(), EncodeError> {
        let Self { args, mut attachments, .. } = self;

        for (key, file) in attachments.iter_mut() {
            encoder.write_file(key, &file.name, &mut *file.body).await?;
        }

        for (key, value) in &args {
            if attachments.contains_key(key) {
                continue;
            }
            encoder.write_string(key, value).await?;
        }

        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use tokio::io::AsyncReadExt;

    /// Records every write in order.
    #[derive(Default)]
    struct Recorder {
        writes: Vec<String>,
    }

    #[async_trait]
    impl Encoder for Recorder {
        async fn write_string(&mut self, key: &str, value: &str) -> Result<(), EncodeError> {
            self.writes.push(format!("{key}={value}"));
            Ok(())
        }

        async fn write_file(
            &mut self,
            key:  &str,
            name: &str,
            body: &mut (dyn AsyncRead + Send + Unpin),
        ) -> Result<(), EncodeError> {
            let mut content = String::new();
            body.read_to_string(&mut content).await?;
            self.writes.push(format!("{key}:{name}:{content}"));
            Ok(())
        }

        fn content_type(&self) -> String { "test/recorder".into() }

        async fn close(&mut self) -> Result<(), EncodeError> { Ok(()) }
    }

    #[test]
    fn new_request_is_empty() {
        let req = Request::new("getMe");
        assert_eq!(req.method(), "getMe");
        assert_eq!(req.token(), "");
        assert_eq!(req.args().count(), 0);
        assert!(!req.has_attachments());
    }

    #[test]
    fn with_token_sets_token() {
        assert_eq!(Request::new("getMe").with_token("1234:secret").token(), "1234:secret");
    }

    #[test]
    fn last_write_wins() {
        let req = Request::new("m").add_string("k", "a").add_string("k", "b");
        assert_eq!(req.arg("k"), Some("b"));
        assert_eq!(req.args().count(), 1);
    }

    #[test]
    fn opt_string_keeps_empty_value() {
        assert_eq!(Request::new("m").add_opt_string("parse_mode", "").arg("parse_mode"), Some(""));
    }

    #[test]
    fn opt_int_omits_zero() {
        assert_eq!(Request::new("m").add_opt_int("offset", 0).arg("offset"), None);
        assert_eq!(Request::new("m").add_opt_int("offset", 10).arg("offset"), Some("10"));
        assert_eq!(Request::new("m").add_opt_int("offset", -1).arg("offset"), Some("-1"));
        assert_eq!(Request::new("m").add_opt_int64("id", 0).arg("id"), None);
        assert_eq!(Request::new("m").add_opt_int64("id", i64::MAX).arg("id"), Some("9223372036854775807"));
    }

    #[test]
    fn opt_bool_only_true() {
        assert_eq!(Request::new("m").add_opt_bool("silent", false).arg("silent"), None);
        assert_eq!(Request::new("m").add_opt_bool("silent", true).arg("silent"), Some("true"));
        assert_eq!(Request::new("m").add_bool("silent", false).arg("silent"), Some("false"));
    }

    #[test]
    fn floats_are_plain_decimals() {
        let req = Request::new("sendLocation")
            .add_float64("latitude", 53.9)
            .add_float64("longitude", 1e21)
            .add_float64("accuracy", 0.000001)
            .add_opt_float64("heading", 0.0);
        assert_eq!(req.arg("latitude"), Some("53.9"));
        assert_eq!(req.arg("longitude"), Some("1000000000000000000000"));
        assert_eq!(req.arg("accuracy"), Some("0.000001"));
        assert_eq!(req.arg("heading"), None);
    }

    #[test]
    fn time_is_unix_seconds() {
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let req = Request::new("m")
            .add_time("until_date", t)
            .add_opt_time("other", None);
        assert_eq!(req.arg("until_date"), Some("1577836800"));
        assert_eq!(req.arg("other"), None);
    }

    struct Limits { offset: i32, limit: i32 }

    impl RequestPart for Limits {
        fn add_to_request(&self, request: Request) -> Request {
            request.add_opt_int("offset", self.offset).add_opt_int("limit", self.limit)
        }
    }

    #[test]
    fn parts_add_themselves() {
        let req = Request::new("m").add_part(Limits { offset: 0, limit: 5 });
        assert_eq!(req.arg("offset"), None);
        assert_eq!(req.arg("limit"), Some("5"));

        let none: Option<Limits> = None;
        assert_eq!(Request::new("m").add_part(none).args().count(), 0);

        let limits = Limits { offset: 3, limit: 0 };
        assert_eq!(Request::new("m").add_part(Some(&limits)).arg("offset"), Some("3"));
    }

    #[test]
    fn has_attachments_tracks_files() {
        let req = Request::new("sendDocument").add_string("chat_id", "1");
        assert!(!req.has_attachments());
        let req = req.add_attachment("document", "test.txt", &b"test"[..]);
        assert!(req.has_attachments());
        assert_eq!(req.attachment_name("document"), Some("test.txt"));
    }

    #[tokio::test]
    async fn encode_writes_attachments_first() {
        let req = Request::new("sendDocument")
            .add_string("chat_id", "1")
            .add_string("caption", "hi")
            .add_attachment("document", "test.txt", &b"test"[..]);

        let mut rec = Recorder::default();
        req.encode(&mut rec).await.unwrap();
        assert_eq!(rec.writes, vec!["document:test.txt:test", "caption=hi", "chat_id=1"]);
    }

    #[tokio::test]
    async fn attachment_wins_key_collision() {
        let req = Request::new("sendPhoto")
            .add_string("photo", "file-id")
            .add_attachment("photo", "a.png", &b"png"[..]);

        let mut rec = Recorder::default();
        req.encode(&mut rec).await.unwrap();
        assert_eq!(rec.writes, vec!["photo:a.png:png"]);
    }

    #[tokio::test]
    async fn encoder_errors_propagate() {
        let req = Request::new("sendDocument").add_attachment("document", "a.txt", &b"x"[..]);
        let mut enc = crate::encoder::UrlEncodedEncoder::new(Vec::new());
        let err = req.encode(&mut enc).await.unwrap_err();
        assert!(matches!(err, EncodeError::Unsupported { .. }));
    }
}
