//! Frame Decoder
//!
//! Splits a byte stream into newline-terminated text frames, carrying any
//! trailing partial line over to the next chunk.
//!
//! # Chunk boundaries
//!
//! Transports deliver bytes at arbitrary boundaries. A frame may arrive in
//! pieces, several frames may arrive in one chunk, and a chunk may end in
//! the middle of a multi-byte UTF-8 character. Splitting happens on raw
//! bytes before any text decoding: `\n` never appears inside a multi-byte
//! sequence, so a complete line always holds complete characters and the
//! output is identical for every way of cutting the same input.
//!
//! The decoder performs no semantic parsing and cannot fail. Blank lines are
//! emitted like any other frame; interpreting them is the assembler's job.

/// Minimum buffer capacity for decoder
const MIN_BUFFER_CAPACITY: usize = 4096;

/// Frame separator
const LINE_SEPARATOR: u8 = b'\n';

/// Line decoder with carry-over between chunks
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    /// Start of the first unconsumed byte
    read_pos: usize,
    /// Bytes before this position are known to hold no separator
    scan_pos: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a new decoder with default buffer capacity
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(MIN_BUFFER_CAPACITY),
            read_pos: 0,
            scan_pos: 0,
        }
    }

    /// Append a chunk to the carry-over
    pub fn push(&mut self, chunk: &[u8]) {
        if self.read_pos == self.buffer.len() {
            self.buffer.clear();
            self.read_pos = 0;
            self.scan_pos = 0;
        } else if self.read_pos > self.buffer.len() / 2 && self.read_pos > MIN_BUFFER_CAPACITY {
            // Compact buffer if we've consumed a lot
            self.buffer.drain(..self.read_pos);
            self.scan_pos -= self.read_pos;
            self.read_pos = 0;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Take the next complete frame, if one is buffered
    ///
    /// The separator is not part of the frame, and a single trailing `\r`
    /// is dropped as well.
    pub fn next_frame(&mut self) -> Option<String> {
        let unscanned = &self.buffer[self.scan_pos..];
        match unscanned.iter().position(|&b| b == LINE_SEPARATOR) {
            Some(offset) => {
                let end = self.scan_pos + offset;
                let frame = decode_line(&self.buffer[self.read_pos..end]);
                self.read_pos = end + 1;
                self.scan_pos = self.read_pos;
                Some(frame)
            }
            None => {
                self.scan_pos = self.buffer.len();
                None
            }
        }
    }

    /// Push a chunk and iterate over the frames it completes
    ///
    /// The iterator is lazy; frames left unconsumed stay buffered and are
    /// returned by later calls.
    pub fn decode(&mut self, chunk: &[u8]) -> Frames<'_> {
        self.push(chunk);
        Frames { decoder: self }
    }

    /// Number of carried-over bytes not yet part of a complete frame
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buffer.len() - self.read_pos
    }

    /// Check if a partial frame is carried over
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_len() > 0
    }

    /// End of stream: return the unterminated carry-over as a last frame
    ///
    /// Only the bytes after the last separator are returned, so the result
    /// never contains `\n`. Callers drain [`next_frame`](Self::next_frame)
    /// until it yields `None` before calling this; complete frames left in
    /// the buffer are discarded. Leaves the decoder empty.
    pub fn finish(&mut self) -> Option<String> {
        let pending = &self.buffer[self.read_pos..];
        let tail_start = pending
            .iter()
            .rposition(|&b| b == LINE_SEPARATOR)
            .map_or(0, |i| i + 1);
        let tail = &pending[tail_start..];
        let frame = (!tail.is_empty()).then(|| decode_line(tail));
        self.reset();
        frame
    }

    /// Discard all carry-over state (start of a new stream)
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.read_pos = 0;
        self.scan_pos = 0;
    }
}

/// Lazy iterator over the frames completed by a chunk
#[derive(Debug)]
pub struct Frames<'a> {
    decoder: &'a mut FrameDecoder,
}

impl Iterator for Frames<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.next_frame()
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
