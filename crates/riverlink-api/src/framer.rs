// ── JSON document framer ──
//
// The server writes one JSON document per command with no length prefix
// or delimiter guarantee, so documents are recovered by tracking bracket
// depth across chunks and parsing once the top-level value closes.

use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Error;

/// Upper bound for a single socket read.
pub const READ_CHUNK_SIZE: usize = 4096;

/// Largest response accepted before the session is considered broken.
pub const MAX_DOCUMENT_SIZE: usize = 32 * 1024 * 1024;

/// Accumulates socket bytes until a syntactically complete JSON document forms.
///
/// Bytes that follow a completed document stay buffered for the next call.
#[derive(Debug)]
pub struct JsonFramer {
    buf: Vec<u8>,
    scan: Scan,
    timeout: Duration,
    max_document: usize,
}

/// Progress through the document at the front of the buffer, so each byte
/// is examined once however many chunks the document spans.
#[derive(Debug, Default)]
struct Scan {
    pos: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl Scan {
    /// Advance over `bytes[self.pos..]`, returning the end offset of the
    /// top-level container once it closes.
    fn advance(&mut self, bytes: &[u8]) -> Option<usize> {
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            self.pos += 1;
            if self.in_string {
                match b {
                    _ if self.escaped => self.escaped = false,
                    b'\\' => self.escaped = true,
                    b'"' => self.in_string = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        return Some(self.pos);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

impl JsonFramer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            buf: Vec::with_capacity(READ_CHUNK_SIZE),
            scan: Scan::default(),
            timeout,
            max_document: MAX_DOCUMENT_SIZE,
        }
    }

    /// Override the response size cap.
    #[must_use]
    pub fn with_max_document(mut self, max_document: usize) -> Self {
        self.max_document = max_document;
        self
    }

    /// Number of bytes currently held back for the next document.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Read chunks until one complete document is available.
    ///
    /// Each chunk read carries the framer's timeout. A zero-length read
    /// before completion is a peer close, bytes that can never become
    /// valid JSON fail fast with the raw text attached, and a document
    /// outgrowing the size cap is dropped with an error.
    pub async fn read_document<R>(&mut self, reader: &mut R) -> Result<Value, Error>
    where
        R: AsyncRead + Unpin,
    {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            if let Some(doc) = self.try_take()? {
                return Ok(doc);
            }
            if self.buf.len() > self.max_document {
                self.reset();
                return Err(Error::ResponseTooLarge {
                    limit: self.max_document,
                });
            }

            let n = tokio::time::timeout(self.timeout, reader.read(&mut chunk))
                .await
                .map_err(|_| Error::Timeout {
                    timeout: self.timeout,
                })??;

            if n == 0 {
                return Err(Error::ConnectionClosed);
            }
            tracing::trace!(bytes = n, buffered = self.buf.len(), "read chunk");
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.scan = Scan::default();
    }

    fn try_take(&mut self) -> Result<Option<Value>, Error> {
        let Some(start) = self.buf.iter().position(|b| !b.is_ascii_whitespace()) else {
            self.reset();
            return Ok(None);
        };

        if !matches!(self.buf[start], b'{' | b'[') {
            return self.take_scalar(start);
        }

        self.scan.pos = self.scan.pos.max(start);
        let Some(end) = self.scan.advance(&self.buf) else {
            return Ok(None);
        };
        match serde_json::from_slice::<Value>(&self.buf[start..end]) {
            Ok(doc) => {
                self.buf.drain(..end);
                self.scan = Scan::default();
                Ok(Some(doc))
            }
            Err(e) => Err(self.invalid(&e)),
        }
    }

    /// Anything not opening with a bracket is parsed directly, so garbage
    /// is reported without waiting for more bytes.
    fn take_scalar(&mut self, start: usize) -> Result<Option<Value>, Error> {
        let mut docs = serde_json::Deserializer::from_slice(&self.buf[start..]).into_iter::<Value>();
        match docs.next() {
            Some(Ok(doc)) => {
                let consumed = start + docs.byte_offset();
                self.buf.drain(..consumed);
                Ok(Some(doc))
            }
            Some(Err(e)) if e.is_eof() => Ok(None),
            Some(Err(e)) => Err(self.invalid(&e)),
            None => Ok(None),
        }
    }

    fn invalid(&mut self, e: &serde_json::Error) -> Error {
        let body = String::from_utf8_lossy(&self.buf).into_owned();
        self.reset();
        Error::InvalidJson {
            message: e.to_string(),
            body,
        }
    }
}
