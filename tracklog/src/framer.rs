use core::ops::Deref;
use std::fmt;

/// Longest unterminated run the framer keeps before giving up on it.
///
/// NMEA-0183 caps a sentence at 82 characters, the extra room covers receivers
/// that append proprietary fields.
pub const MAX_SENTENCE_LEN: usize = 512;

/// This trait represents the buffer holding a partial sentence between reads. We
/// provide implementations for `Vec<u8>` and for [`FixedLinearBuffer`], if you want
/// to use your own storage you can implement this trait.
pub trait UnderlyingBuffer {
    /// Removes all elements from the buffer.
    fn clear(&mut self);

    /// Returns the number of elements currently stored in the buffer.
    fn len(&self) -> usize;

    /// Returns the maximum number of bytes the buffer can hold.
    ///
    /// The Vec implementation returns `usize::MAX`, the framer additionally caps
    /// every buffer at its own sentence limit.
    fn max_capacity(&self) -> usize;

    /// Appends as much of `other` as fits, returning the number of bytes not copied.
    fn extend_from_slice(&mut self, other: &[u8]) -> usize;

    /// Removes the first `count` elements from the buffer. Cannot fail.
    fn drain(&mut self, count: usize);

    fn as_slice(&self) -> &[u8];

    /// Returns whether the buffer is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UnderlyingBuffer for Vec<u8> {
    fn clear(&mut self) {
        self.clear();
    }

    fn len(&self) -> usize {
        self.len()
    }

    fn max_capacity(&self) -> usize {
        usize::MAX
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> usize {
        self.extend_from_slice(other);
        0
    }

    fn drain(&mut self, count: usize) {
        self.drain(0..count);
    }

    fn as_slice(&self) -> &[u8] {
        self
    }
}

/// Borrowed, fixed size storage for a framer that must never allocate.
pub struct FixedLinearBuffer<'a> {
    buffer: &'a mut [u8],
    len: usize,
}

impl<'a> FixedLinearBuffer<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buffer: buf,
            len: 0,
        }
    }
}

impl UnderlyingBuffer for FixedLinearBuffer<'_> {
    fn clear(&mut self) {
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn max_capacity(&self) -> usize {
        self.buffer.len()
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> usize {
        let to_copy = core::cmp::min(other.len(), self.buffer.len() - self.len);
        let uncopyable = other.len() - to_copy;
        self.buffer[self.len..self.len + to_copy].copy_from_slice(&other[..to_copy]);
        self.len += to_copy;
        uncopyable
    }

    fn drain(&mut self, count: usize) {
        if count >= self.len {
            self.len = 0;
            return;
        }
        self.buffer.copy_within(count..self.len, 0);
        self.len -= count;
    }

    fn as_slice(&self) -> &[u8] {
        &self.buffer[..self.len]
    }
}

/// One line of receiver output with the line terminators removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSentence(String);

impl CandidateSentence {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for CandidateSentence {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CandidateSentence {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for CandidateSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_terminator(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

/// Streaming line framer for NMEA output. The default constructor builds a framer
/// backed by a Vec, pass your own buffer to [`SentenceFramer::new`] otherwise.
///
/// Reads may end anywhere inside a sentence: the unterminated tail is kept and
/// completed by the next call to [`SentenceFramer::consume`].
pub struct SentenceFramer<T = Vec<u8>>
where
    T: UnderlyingBuffer,
{
    buf: T,
    max_len: usize,
    dropped: usize,
    // Set after an overlong run, cleared by the next terminator
    skipping: bool,
}

impl Default for SentenceFramer<Vec<u8>> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: UnderlyingBuffer> SentenceFramer<T> {
    pub fn new(underlying: T) -> Self {
        let max_len = core::cmp::min(underlying.max_capacity(), MAX_SENTENCE_LEN);
        Self {
            buf: underlying,
            max_len,
            dropped: 0,
            skipping: false,
        }
    }

    pub fn is_buffer_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn buffer_len(&self) -> usize {
        self.buf.len()
    }

    /// Number of overlong runs thrown away since construction.
    pub fn dropped_runs(&self) -> usize {
        self.dropped
    }

    /// Forget any partial sentence, e.g. after the port was reopened.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.skipping = false;
    }

    /// Adds `new_data` to the framer and returns an iterator over every sentence
    /// completed by it. Data not yet taken when the iterator is dropped is kept for
    /// the next call.
    pub fn consume<'a>(&'a mut self, new_data: &'a [u8]) -> SentenceIter<'a, T> {
        SentenceIter {
            framer: self,
            pending: new_data,
        }
    }

    fn take_line(&mut self) -> Option<Option<CandidateSentence>> {
        let end = self.buf.as_slice().iter().position(|b| is_terminator(*b))?;
        let line = &self.buf.as_slice()[..end];
        // Resync on the last sentence start if the receiver glued output together
        let start = line.iter().rposition(|b| *b == b'$').unwrap_or(0);
        let sentence = if start < end {
            Some(CandidateSentence(
                String::from_utf8_lossy(&line[start..]).into_owned(),
            ))
        } else {
            None
        };
        self.buf.drain(end + 1);
        Some(sentence)
    }

    fn fill(&mut self, pending: &mut &[u8]) -> bool {
        if pending.is_empty() {
            return false;
        }
        if self.skipping {
            match pending.iter().position(|b| is_terminator(*b)) {
                Some(pos) => {
                    *pending = &pending[pos + 1..];
                    self.skipping = false;
                },
                None => *pending = &[],
            }
            return true;
        }
        let room = self.max_len.saturating_sub(self.buf.len());
        if room == 0 {
            if self.buf.as_slice().iter().any(|b| is_terminator(*b)) {
                return false;
            }
            if self.buf.is_empty() {
                tracing::debug!("framer has no storage, {} bytes discarded", pending.len());
                *pending = &[];
                return false;
            }
            tracing::debug!(
                "dropping {} bytes without a line terminator",
                self.buf.len()
            );
            self.dropped += 1;
            self.buf.clear();
            self.skipping = true;
            return true;
        }
        // Stop at the first terminator so a full buffer never hides one
        let take = match pending.iter().position(|b| is_terminator(*b)) {
            Some(pos) => core::cmp::min(pos + 1, room),
            None => core::cmp::min(pending.len(), room),
        };
        let not_copied = self.buf.extend_from_slice(&pending[..take]);
        *pending = &pending[take - not_copied..];
        true
    }
}

/// Iterator over the sentences completed by one [`SentenceFramer::consume`] call
pub struct SentenceIter<'a, T: UnderlyingBuffer> {
    framer: &'a mut SentenceFramer<T>,
    pending: &'a [u8],
}

impl<T: UnderlyingBuffer> Iterator for SentenceIter<'_, T> {
    type Item = CandidateSentence;

    fn next(&mut self) -> Option<CandidateSentence> {
        loop {
            match self.framer.take_line() {
                Some(Some(sentence)) => return Some(sentence),
                // Empty segment between "\r" and "\n"
                Some(None) => continue,
                None => {},
            }
            if !self.framer.fill(&mut self.pending) {
                return None;
            }
        }
    }
}

impl<T: UnderlyingBuffer> Drop for SentenceIter<'_, T> {
    fn drop(&mut self) {
        while self.framer.fill(&mut self.pending) {}
        if !self.pending.is_empty() {
            tracing::debug!("framer full, {} bytes discarded", self.pending.len());
        }
    }
}
