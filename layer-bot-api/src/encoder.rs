//! Request body encoders.
//!
//! A [`crate::Request`] never knows which wire format it ends up in: it only
//! talks to the [`Encoder`] trait. Two formats are provided:
//!
//! | Encoder | Content type | Files |
//! |---------|--------------|-------|
//! | [`UrlEncodedEncoder`] | `application/x-www-form-urlencoded` | rejected |
//! | [`MultipartEncoder`]  | `multipart/form-data; boundary=…`   | streamed |
//!
//! Both write straight into any [`AsyncWrite`], so the same code serves the
//! in-memory buffer of a plain call and the pipe of a streaming upload.

use async_trait::async_trait;
use rand::Rng;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::errors::EncodeError;

// ─── Encoder ──────────────────────────────────────────────────────────────────

/// Sink for the fields of one request.
#[async_trait]
pub trait Encoder: Send {
    /// Write a plain string field.
    async fn write_string(&mut self, key: &str, value: &str) -> Result<(), EncodeError>;

    /// Write a file field, reading `body` until EOF.
    ///
    /// `body` is never shut down; it still belongs to whoever attached it.
    async fn write_file(
        &mut self,
        key:  &str,
        name: &str,
        body: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<(), EncodeError>;

    /// Value of the `Content-Type` header for the produced body.
    fn content_type(&self) -> String;

    /// Finish the body. No field may be written afterwards.
    async fn close(&mut self) -> Result<(), EncodeError>;
}

// ─── UrlEncodedEncoder ────────────────────────────────────────────────────────

/// `key=value&key=value` body. Cannot carry files.
pub struct UrlEncodedEncoder<W> {
    dst:     W,
    written: bool,
}

impl<W: AsyncWrite + Unpin + Send> UrlEncodedEncoder<W> {
    pub fn new(dst: W) -> Self {
        Self { dst, written: false }
    }

    /// Give back the sink.
    pub fn into_inner(self) -> W { self.dst }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Encoder for UrlEncodedEncoder<W> {
    async fn write_string(&mut self, key: &str, value: &str) -> Result<(), EncodeError> {
        let mut pair = String::with_capacity(key.len() + value.len() + 2);
        if self.written {
            pair.push('&');
        }
        pair.extend(url::form_urlencoded::byte_serialize(key.as_bytes()));
        pair.push('=');
        pair.extend(url::form_urlencoded::byte_serialize(value.as_bytes()));

        self.dst.write_all(pair.as_bytes()).await?;
        self.written = true;
        Ok(())
    }

    async fn write_file(
        &mut self,
        key:   &str,
        _name: &str,
        _body: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<(), EncodeError> {
        Err(EncodeError::Unsupported { encoder: "urlencoded", field: key.to_string() })
    }

    fn content_type(&self) -> String {
        "application/x-www-form-urlencoded".to_string()
    }

    async fn close(&mut self) -> Result<(), EncodeError> {
        self.dst.flush().await?;
        Ok(())
    }
}

// ─── MultipartEncoder ─────────────────────────────────────────────────────────

/// `multipart/form-data` body, written part by part.
///
/// File lengths are never needed up front: each part ends at the next
/// boundary line.
pub struct MultipartEncoder<W> {
    dst:      W,
    boundary: String,
    started:  bool,
}

impl<W: AsyncWrite + Unpin + Send> MultipartEncoder<W> {
    /// Create an encoder with a fresh random boundary.
    pub fn new(dst: W) -> Self {
        Self::with_boundary(dst, random_boundary())
    }

    pub fn with_boundary(dst: W, boundary: impl Into<String>) -> Self {
        Self { dst, boundary: boundary.into(), started: false }
    }

    pub fn boundary(&self) -> &str { &self.boundary }

    /// Give back the sink.
    pub fn into_inner(self) -> W { self.dst }

    async fn begin_part(&mut self, headers: &str) -> Result<(), EncodeError> {
        let lead = if self.started { "\r\n--" } else { "--" };
        let head = format!("{lead}{}\r\n{headers}\r\n", self.boundary);
        self.dst.write_all(head.as_bytes()).await?;
        self.started = true;
        Ok(())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Encoder for MultipartEncoder<W> {
    async fn write_string(&mut self, key: &str, value: &str) -> Result<(), EncodeError> {
        let headers = format!(
            "Content-Disposition: form-data; name=\"{}\"\r\n",
            escape_quotes(key),
        );
        self.begin_part(&headers).await?;
        self.dst.write_all(value.as_bytes()).await?;
        Ok(())
    }

    async fn write_file(
        &mut self,
        key:  &str,
        name: &str,
        body: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<(), EncodeError> {
        let mime = mime_guess::from_path(name).first_or_octet_stream();
        let headers = format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n",
            escape_quotes(key),
            escape_quotes(name),
            mime.essence_str(),
        );
        self.begin_part(&headers).await?;
        let copied = tokio::io::copy(body, &mut self.dst).await?;
        tracing::trace!("[layer-bot-api] multipart: streamed {copied} bytes into '{key}'");
        Ok(())
    }

    fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    async fn close(&mut self) -> Result<(), EncodeError> {
        let tail = if self.started {
            format!("\r\n--{}--\r\n", self.boundary)
        } else {
            format!("--{}--\r\n", self.boundary)
        };
        self.dst.write_all(tail.as_bytes()).await?;
        self.dst.shutdown().await?;
        Ok(())
    }
}

fn random_boundary() -> String {
    let mut bytes = [0u8; 30];
    rand::thread_rng().fill(&mut bytes[..]);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn urlencoded_round_trips_through_form_parser() {
        let mut enc = UrlEncodedEncoder::new(Vec::new());
        enc.write_string("chat_id", "@channely_updates").await.unwrap();
        enc.write_string("text", "1+1=2 & more?").await.unwrap();
        enc.write_string("ключ", "значение").await.unwrap();
        enc.close().await.unwrap();
        assert_eq!(enc.content_type(), "application/x-www-form-urlencoded");

        let body = enc.into_inner();
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(&body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs, vec![
            ("chat_id".to_string(), "@channely_updates".to_string()),
            ("text".to_string(), "1+1=2 & more?".to_string()),
            ("ключ".to_string(), "значение".to_string()),
        ]);
    }

    #[tokio::test]
    async fn urlencoded_separator_only_between_pairs() {
        let mut enc = UrlEncodedEncoder::new(Vec::new());
        enc.write_string("a", "1").await.unwrap();
        enc.write_string("b", "two words").await.unwrap();
        assert_eq!(enc.into_inner(), b"a=1&b=two+words");
    }

    #[tokio::test]
    async fn urlencoded_rejects_files_without_writing() {
        let mut enc = UrlEncodedEncoder::new(Vec::new());
        enc.write_string("chat_id", "1").await.unwrap();

        let mut body: &[u8] = b"test, test, test";
        let err = enc.write_file("document", "test.txt", &mut body).await.unwrap_err();
        assert!(matches!(
            err,
            EncodeError::Unsupported { encoder: "urlencoded", ref field } if field == "document"
        ));
        assert_eq!(enc.into_inner(), b"chat_id=1");
    }

    #[tokio::test]
    async fn multipart_layout() {
        let mut enc = MultipartEncoder::with_boundary(Vec::new(), "XyZ");
        enc.write_string("chat_id", "@channely_updates").await.unwrap();
        let mut body: &[u8] = b"test, test, test";
        enc.write_file("document", "test.txt", &mut body).await.unwrap();
        enc.close().await.unwrap();
        assert_eq!(enc.content_type(), "multipart/form-data; boundary=XyZ");

        let expected = concat!(
            "--XyZ\r\n",
            "Content-Disposition: form-data; name=\"chat_id\"\r\n",
            "\r\n",
            "@channely_updates",
            "\r\n--XyZ\r\n",
            "Content-Disposition: form-data; name=\"document\"; filename=\"test.txt\"\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "test, test, test",
            "\r\n--XyZ--\r\n",
        );
        assert_eq!(String::from_utf8(enc.into_inner()).unwrap(), expected);
    }

    #[tokio::test]
    async fn multipart_unknown_extension_is_octet_stream() {
        let mut enc = MultipartEncoder::with_boundary(Vec::new(), "b");
        let mut body: &[u8] = &[0, 1, 2, 255];
        enc.write_file("blob", "data.zzz-unknown", &mut body).await.unwrap();
        let out = enc.into_inner();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("Content-Type: application/octet-stream\r\n"));
        assert!(out.ends_with(&[0, 1, 2, 255]));
    }

    #[tokio::test]
    async fn multipart_escapes_quotes_in_names() {
        let mut enc = MultipartEncoder::with_boundary(Vec::new(), "b");
        let mut body: &[u8] = b"";
        enc.write_file("doc", "my \"quoted\" file.txt", &mut body).await.unwrap();
        let text = String::from_utf8(enc.into_inner()).unwrap();
        assert!(text.contains(r#"filename="my \"quoted\" file.txt""#));
    }

    #[test]
    fn random_boundaries_are_hex_and_distinct() {
        let a = random_boundary();
        let b = random_boundary();
        assert_eq!(a.len(), 60);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
