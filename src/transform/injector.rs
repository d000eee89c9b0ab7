//! Incremental `</body>` search-and-insert state machine.
//!
//! # Responsibilities
//! - Accumulate chunks until the closing body marker is seen
//! - Insert the snippet (plus a newline) right before the first marker
//! - Flush unconfirmed bytes once the buffer passes the high-water mark
//! - Append the snippet at end of input when no marker ever appeared
//!
//! # Design Decisions
//! - Works on bytes, not decoded text; the marker is ASCII so a match can
//!   never start inside a multi-byte character
//! - A suffix of at least `MARKER.len()` bytes is always retained on flush,
//!   so a marker straddling chunk boundaries is still found
//! - The flush point backs off to a UTF-8 boundary so emitted chunks never
//!   end mid-character
//! - `injected` flips false → true exactly once; afterwards chunks pass
//!   through without copying

use bytes::{BufMut, Bytes, BytesMut};
use memchr::memmem;

use crate::transform::snippet::Snippet;

/// The closing body tag the snippet is inserted in front of.
pub const MARKER: &[u8] = b"</body>";

/// Per-response injection state.
#[derive(Debug)]
pub struct Injector {
    snippet: Bytes,
    buffer: BytesMut,
    injected: bool,
    high_water_mark: usize,
}

impl Injector {
    /// Create a fresh injector. `high_water_mark` is raised to at least the
    /// marker length.
    pub fn new(snippet: &Snippet, high_water_mark: usize) -> Self {
        Self {
            snippet: snippet.to_bytes(),
            buffer: BytesMut::new(),
            injected: false,
            high_water_mark: high_water_mark.max(MARKER.len()),
        }
    }

    /// Whether the snippet has been emitted.
    pub fn is_injected(&self) -> bool {
        self.injected
    }

    /// Bytes held back waiting for more input.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Feed one chunk. Returns the bytes that are safe to emit now, if any.
    pub fn push(&mut self, chunk: Bytes) -> Option<Bytes> {
        if self.injected {
            return if chunk.is_empty() { None } else { Some(chunk) };
        }

        // Only the tail that could not have matched before needs scanning.
        let scan_from = self.buffer.len().saturating_sub(MARKER.len() - 1);
        self.buffer.extend_from_slice(&chunk);

        if let Some(offset) = memmem::find(&self.buffer[scan_from..], MARKER) {
            return Some(self.inject_at(scan_from + offset));
        }

        if self.buffer.len() > self.high_water_mark {
            let split = utf8_floor(&self.buffer, self.buffer.len() - MARKER.len());
            if split > 0 {
                return Some(self.buffer.split_to(split).freeze());
            }
        }

        None
    }

    /// Signal end of input and take whatever is left.
    ///
    /// If the marker never appeared, the snippet is appended here. Calling
    /// `finish` again yields an empty chunk.
    pub fn finish(&mut self) -> Bytes {
        if !self.injected {
            self.injected = true;
            self.buffer.extend_from_slice(&self.snippet);
        }
        self.buffer.split().freeze()
    }

    fn inject_at(&mut self, position: usize) -> Bytes {
        let mut out = BytesMut::with_capacity(self.buffer.len() + self.snippet.len() + 1);
        out.extend_from_slice(&self.buffer[..position]);
        out.extend_from_slice(&self.snippet);
        out.put_u8(b'\n');
        out.extend_from_slice(&self.buffer[position..]);

        self.buffer.clear();
        self.injected = true;
        out.freeze()
    }
}

/// Largest index `<= index` that does not split a UTF-8 sequence.
fn utf8_floor(bytes: &[u8], index: usize) -> usize {
    let floor = index.saturating_sub(3);
    let mut index = index;
    while index > floor && is_continuation(bytes[index]) {
        index -= 1;
    }
    index
}

fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}
