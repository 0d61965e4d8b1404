//! Files to upload and the ways media can be referenced.
//!
//! ## Upload
//! An [`InputFile`] pairs a file name with any [`AsyncRead`]. The body is read
//! once, while the request is being streamed, and never buffered whole.
//!
//! ## Reference
//! Media the server already has is sent by [`Media::FileId`] or fetched by the
//! server itself from a [`Media::Url`]; neither needs a multipart body.

use std::fmt;
use std::io;
use std::path::Path;

use tokio::io::AsyncRead;

use crate::Request;

// ─── InputFile ────────────────────────────────────────────────────────────────

/// A named byte stream to upload.
pub struct InputFile {
    pub(crate) name: String,
    pub(crate) body: Box<dyn AsyncRead + Send + Unpin>,
}

impl InputFile {
    /// Upload `body` under `name`.
    pub fn new(name: impl Into<String>, body: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self { name: name.into(), body: Box::new(body) }
    }

    /// Upload an in-memory buffer.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(name, io::Cursor::new(bytes.into()))
    }

    /// Open a local file; its file name becomes the upload name.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        let file = tokio::fs::File::open(path).await?;
        Ok(Self::new(name, file))
    }

    /// The declared file name.
    pub fn name(&self) -> &str { &self.name }

    /// Split into name and body.
    pub fn into_parts(self) -> (String, Box<dyn AsyncRead + Send + Unpin>) {
        (self.name, self.body)
    }
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputFile {{ name: {:?} }}", self.name)
    }
}

// ─── Media ────────────────────────────────────────────────────────────────────

/// File content of an outgoing message.
#[derive(Debug)]
pub enum Media {
    /// New upload; forces a multipart request.
    Upload(InputFile),
    /// A file already stored on Telegram's servers.
    FileId(String),
    /// An HTTP URL Telegram downloads the file from.
    Url(String),
}

impl Media {
    /// Add this media to `request` under `key`.
    pub fn add_to_request(self, key: &str, request: Request) -> Request {
        match self {
            Self::Upload(file) => request.add_file(key, file),
            Self::FileId(id)   => request.add_string(key, id),
            Self::Url(url)     => request.add_string(key, url),
        }
    }
}

impl From<InputFile> for Media {
    fn from(file: InputFile) -> Self { Self::Upload(file) }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn from_bytes_reads_back() {
        let file = InputFile::from_bytes("test.txt", b"test".to_vec());
        assert_eq!(file.name(), "test.txt");
        let (_, mut body) = file.into_parts();
        let mut out = Vec::new();
        body.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"test");
    }

    #[tokio::test]
    async fn open_uses_file_name() {
        let file = InputFile::open("Cargo.toml").await.unwrap();
        assert_eq!(file.name(), "Cargo.toml");
    }

    #[tokio::test]
    async fn open_missing_file_fails() {
        assert!(InputFile::open("./SHOULD-NOT-EXIST.txt").await.is_err());
    }

    #[test]
    fn upload_media_is_an_attachment() {
        let req = Media::from(InputFile::from_bytes("a.png", vec![1, 2, 3]))
            .add_to_request("photo", Request::new("sendPhoto"));
        assert!(req.has_attachments());
        assert_eq!(req.arg("photo"), None);
    }

    #[test]
    fn file_id_and_url_are_strings() {
        let req = Media::FileId("AgADBAAD".into()).add_to_request("photo", Request::new("sendPhoto"));
        assert!(!req.has_attachments());
        assert_eq!(req.arg("photo"), Some("AgADBAAD"));

        let req = Media::Url("https://example.com/a.png".into())
            .add_to_request("photo", Request::new("sendPhoto"));
        assert_eq!(req.arg("photo"), Some("https://example.com/a.png"));
    }
}
