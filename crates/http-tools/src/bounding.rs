//! Response body size bounding.
//!
//! Limits are measured in bytes of the UTF-8 encoding, never in characters. A cut that would split
//! a multi-byte character backs off to the preceding character boundary, so a bounded body may be
//! up to three bytes shorter than the limit.

/// A response body after the size limit was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedBody {
    pub body: String,
    /// `true` iff `original_bytes > limit`.
    pub truncated: bool,
    /// Byte length of the body before truncation.
    pub original_bytes: usize,
}

/// Clip `body` to at most `limit` bytes.
#[must_use]
pub fn bound(body: String, limit: usize) -> BoundedBody {
    let original_bytes = body.len();
    if original_bytes <= limit {
        return BoundedBody {
            body,
            truncated: false,
            original_bytes,
        };
    }

    let mut body = body;
    body.truncate(floor_char_boundary(&body, limit));
    BoundedBody {
        body,
        truncated: true,
        original_bytes,
    }
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Accumulates a streamed body while retaining at most `limit` bytes.
///
/// The total size is still counted so the caller can report it and flag truncation.
#[derive(Debug)]
pub(crate) struct BoundedCollector {
    limit: usize,
    kept: Vec<u8>,
    total: usize,
}

impl BoundedCollector {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            limit,
            kept: Vec::new(),
            total: 0,
        }
    }

    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.total = self.total.saturating_add(chunk.len());
        let room = self.limit.saturating_sub(self.kept.len());
        if room > 0 {
            self.kept
                .extend_from_slice(&chunk[..room.min(chunk.len())]);
        }
    }

    /// Decode what was kept and clip it to the limit.
    ///
    /// `truncated` and `original_bytes` describe the bytes received. An incomplete UTF-8 sequence
    /// left by the cut is dropped. Invalid bytes elsewhere are replaced with U+FFFD, which can grow
    /// the text, so it is clipped again without changing the flag.
    pub(crate) fn finish(self) -> BoundedBody {
        let Self { limit, kept, total } = self;
        let truncated = total > limit;
        let text = match String::from_utf8(kept) {
            Ok(s) => s,
            Err(e) => {
                let utf8 = e.utf8_error();
                let mut bytes = e.into_bytes();
                if truncated && utf8.error_len().is_none() {
                    bytes.truncate(utf8.valid_up_to());
                }
                String::from_utf8_lossy(&bytes).into_owned()
            }
        };
        BoundedBody {
            body: bound(text, limit).body,
            truncated,
            original_bytes: total,
        }
    }
}
