//! Editable query text.
//!
//! The buffer holds raw bytes rather than a `String`: typed text and pasted
//! item text are not guaranteed to be valid UTF-8, and every cursor operation
//! has to stay well-defined on malformed input.

/// Maximum number of bytes the query can hold.
pub const CAP: usize = 8191;

/// Code point reported for any byte sequence that does not decode.
pub const INVALID_RUNE: u32 = 0xFFFD;

const UTF_SIZ: usize = 4;
const UTF_MIN: [u32; UTF_SIZ + 1] = [0, 0, 0x80, 0x800, 0x10000];
const UTF_MAX: [u32; UTF_SIZ + 1] = [0x10FFFF, 0x7F, 0x7FF, 0xFFFF, 0x10FFFF];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}

/// Decode the first code point of `bytes`.
///
/// Returns the code point and the number of bytes it spans. Anything that is
/// not a well-formed, in-range, non-surrogate scalar decodes to
/// [`INVALID_RUNE`] with a length of one byte. Empty input yields a length of
/// zero.
pub fn decode_rune(bytes: &[u8]) -> (u32, usize) {
    let Some(&lead) = bytes.first() else {
        return (INVALID_RUNE, 0);
    };
    let Some(len) = sequence_len(lead) else {
        return (INVALID_RUNE, 1);
    };
    if len == 1 {
        return (u32::from(lead), 1);
    }
    if bytes.len() < len {
        return (INVALID_RUNE, 1);
    }

    let mask = 0xFFu8 >> (len + 1);
    let mut value = u32::from(lead & mask);
    for &byte in &bytes[1..len] {
        if !is_continuation(byte) {
            return (INVALID_RUNE, 1);
        }
        value = (value << 6) | u32::from(byte & 0x3F);
    }

    if !(UTF_MIN[len]..=UTF_MAX[len]).contains(&value) || (0xD800..=0xDFFF).contains(&value) {
        return (INVALID_RUNE, 1);
    }
    (value, len)
}

/// Text for display: every byte that does not start a valid sequence becomes
/// its own U+FFFD.
pub fn decode_lossy(mut bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    while !bytes.is_empty() {
        let (rune, len) = decode_rune(bytes);
        text.push(char::from_u32(rune).unwrap_or(char::REPLACEMENT_CHARACTER));
        bytes = &bytes[len..];
    }
    text
}

#[derive(Clone, Debug, Default)]
pub struct TextBuffer {
    bytes: Vec<u8>,
    cursor: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer holding `initial` with the cursor at its end.
    pub fn with_text(initial: &[u8]) -> Self {
        let mut buffer = Self::new();
        buffer.replace(initial);
        buffer
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_string_lossy(&self) -> String {
        decode_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.bytes.len()
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.bytes.len());
    }

    /// Splice `text` in at byte offset `at`.
    ///
    /// Input that would grow the buffer past [`CAP`] is cut to the longest
    /// prefix that fits without splitting a multi-byte sequence. Returns the
    /// number of bytes actually inserted.
    pub fn insert_at(&mut self, at: usize, text: &[u8]) -> usize {
        let at = at.min(self.bytes.len());
        let room = CAP.saturating_sub(self.bytes.len());
        let mut take = text.len().min(room);
        if take < text.len() {
            while take > 0 && is_continuation(text[take]) {
                take -= 1;
            }
            log::debug!("query truncated: {} of {} bytes fit", take, text.len());
        }
        if take == 0 {
            return 0;
        }

        self.bytes.splice(at..at, text[..take].iter().copied());
        if self.cursor >= at {
            self.cursor += take;
        }
        take
    }

    pub fn insert(&mut self, text: &[u8]) -> usize {
        self.insert_at(self.cursor, text)
    }

    /// Remove `count` bytes starting at `from`; a negative count removes the
    /// bytes before `from`. Both ends are clamped to the buffer.
    pub fn delete_range(&mut self, from: usize, count: isize) {
        let from = from.min(self.bytes.len());
        let (start, end) = if count < 0 {
            (from.saturating_sub(count.unsigned_abs()), from)
        } else {
            (from, from.saturating_add(count.unsigned_abs()).min(self.bytes.len()))
        };
        if start == end {
            return;
        }

        self.bytes.drain(start..end);
        if self.cursor >= end {
            self.cursor -= end - start;
        } else if self.cursor > start {
            self.cursor = start;
        }
    }

    /// Replace the whole content and park the cursor at the end.
    pub fn replace(&mut self, text: &[u8]) {
        self.bytes.clear();
        self.cursor = 0;
        self.insert(text);
    }

    /// Position of the neighbouring rune boundary in `direction`.
    pub fn next_rune(&self, direction: Direction) -> usize {
        let len = self.bytes.len();
        match direction {
            Direction::Forward => {
                if self.cursor >= len {
                    return len;
                }
                let mut n = self.cursor + 1;
                while n < len && is_continuation(self.bytes[n]) {
                    n += 1;
                }
                n
            }
            Direction::Backward => {
                if self.cursor == 0 {
                    return 0;
                }
                let mut n = self.cursor - 1;
                while n > 0 && is_continuation(self.bytes[n]) {
                    n -= 1;
                }
                n
            }
        }
    }

    pub fn move_rune(&mut self, direction: Direction) {
        self.cursor = self.next_rune(direction);
    }

    /// Move to the start (backward) or end (forward) of the adjacent word.
    pub fn move_word_edge(&mut self, direction: Direction, delimiters: &[u8]) {
        let is_delim = |byte: u8| delimiters.contains(&byte);
        match direction {
            Direction::Backward => {
                while self.cursor > 0 && is_delim(self.bytes[self.next_rune(direction)]) {
                    self.move_rune(direction);
                }
                while self.cursor > 0 && !is_delim(self.bytes[self.next_rune(direction)]) {
                    self.move_rune(direction);
                }
            }
            Direction::Forward => {
                while !self.at_end() && is_delim(self.bytes[self.cursor]) {
                    self.move_rune(direction);
                }
                while !self.at_end() && !is_delim(self.bytes[self.cursor]) {
                    self.move_rune(direction);
                }
            }
        }
    }

    pub fn delete_rune_backward(&mut self) {
        let start = self.next_rune(Direction::Backward);
        self.delete_range(start, (self.cursor - start) as isize);
    }

    pub fn delete_rune_forward(&mut self) {
        let end = self.next_rune(Direction::Forward);
        self.delete_range(self.cursor, (end - self.cursor) as isize);
    }

    /// Delete from the cursor back to the start of the previous word.
    pub fn delete_word_backward(&mut self, delimiters: &[u8]) {
        let end = self.cursor;
        self.move_word_edge(Direction::Backward, delimiters);
        let start = self.cursor;
        self.cursor = end;
        self.delete_range(start, (end - start) as isize);
    }

    pub fn kill_to_end(&mut self) {
        self.bytes.truncate(self.cursor);
    }

    pub fn kill_to_start(&mut self) {
        self.delete_range(self.cursor, -(self.cursor as isize));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buffer_at(text: &str, cursor: usize) -> TextBuffer {
        let mut buffer = TextBuffer::with_text(text.as_bytes());
        buffer.set_cursor(cursor);
        buffer
    }

    #[test]
    fn decodes_multibyte_runes() {
        assert_eq!(decode_rune("a".as_bytes()), (0x61, 1));
        assert_eq!(decode_rune("é".as_bytes()), (0xE9, 2));
        assert_eq!(decode_rune("€".as_bytes()), (0x20AC, 3));
        assert_eq!(decode_rune("𝄞".as_bytes()), (0x1D11E, 4));
        assert_eq!(decode_rune(b""), (INVALID_RUNE, 0));
    }

    #[test]
    fn malformed_sequences_decode_as_single_invalid_byte() {
        // lead byte promising more bytes than available
        assert_eq!(decode_rune(&[0xE2, 0x82]), (INVALID_RUNE, 1));
        // stray continuation byte
        assert_eq!(decode_rune(&[0x80, 0x41]), (INVALID_RUNE, 1));
        // missing continuation
        assert_eq!(decode_rune(&[0xC3, 0x41]), (INVALID_RUNE, 1));
        // surrogate U+D800
        assert_eq!(decode_rune(&[0xED, 0xA0, 0x80]), (INVALID_RUNE, 1));
        // overlong encoding of '/'
        assert_eq!(decode_rune(&[0xC0, 0xAF]), (INVALID_RUNE, 1));
        // above U+10FFFF
        assert_eq!(decode_rune(&[0xF4, 0x90, 0x80, 0x80]), (INVALID_RUNE, 1));
        assert_eq!(decode_rune(&[0xFF]), (INVALID_RUNE, 1));
    }

    #[test]
    fn lossy_text_replaces_each_malformed_byte() {
        assert_eq!(decode_lossy("aé€".as_bytes()), "aé€");
        assert_eq!(decode_lossy(b"ab\xE2\x82"), "ab\u{FFFD}\u{FFFD}");
        assert_eq!(decode_lossy(b"\xFFx\xC3"), "\u{FFFD}x\u{FFFD}");
        assert_eq!(decode_lossy(b""), "");
        assert_eq!(TextBuffer::with_text(b"q\x80").to_string_lossy(), "q\u{FFFD}");
    }

    #[test]
    fn insert_moves_cursor_past_inserted_text() {
        let mut buffer = buffer_at("held", 3);
        assert_eq!(buffer.insert(b"l"), 1);
        assert_eq!(buffer.as_bytes(), b"helld");
        assert_eq!(buffer.cursor(), 4);

        buffer.insert_at(0, b">");
        assert_eq!(buffer.as_bytes(), b">helld");
        assert_eq!(buffer.cursor(), 5);
    }

    #[test]
    fn insert_truncates_at_capacity_on_rune_boundary() {
        let mut buffer = TextBuffer::with_text(&vec![b'a'; CAP - 2]);
        let inserted = buffer.insert("é€".as_bytes());
        assert_eq!(inserted, 2);
        assert_eq!(buffer.len(), CAP);
        assert_eq!(&buffer.as_bytes()[CAP - 2..], "é".as_bytes());
        assert_eq!(buffer.insert(b"x"), 0);
        assert_eq!(buffer.len(), CAP);
    }

    #[test]
    fn delete_range_handles_both_directions_and_clamps() {
        let mut buffer = buffer_at("abcdef", 4);
        buffer.delete_range(4, -2);
        assert_eq!(buffer.as_bytes(), b"abef");
        assert_eq!(buffer.cursor(), 2);

        buffer.delete_range(2, 100);
        assert_eq!(buffer.as_bytes(), b"ab");
        assert_eq!(buffer.cursor(), 2);

        buffer.delete_range(1, -100);
        assert_eq!(buffer.as_bytes(), b"b");
        assert_eq!(buffer.cursor(), 1);
    }

    #[test]
    fn next_rune_skips_continuation_bytes() {
        let buffer = buffer_at("aé€b", 1);
        assert_eq!(buffer.next_rune(Direction::Forward), 3);
        let buffer = buffer_at("aé€b", 6);
        assert_eq!(buffer.next_rune(Direction::Backward), 3);
        assert_eq!(buffer_at("", 0).next_rune(Direction::Backward), 0);
        assert_eq!(buffer_at("ab", 2).next_rune(Direction::Forward), 2);
    }

    #[test]
    fn rune_walk_never_lands_on_continuation_bytes() {
        let samples: [&[u8]; 4] = [
            "x€y𝄞".as_bytes(),
            &[0x80, 0x80, b'a'],
            &[b'a', 0xE2, 0x82, b'b', 0xFF],
            &[0xC3],
        ];
        for sample in samples {
            let mut buffer = TextBuffer::with_text(sample);
            for start in 0..=sample.len() {
                for direction in [Direction::Forward, Direction::Backward] {
                    buffer.set_cursor(start);
                    let mut steps = 0;
                    loop {
                        let next = buffer.next_rune(direction);
                        if next == buffer.cursor() {
                            break;
                        }
                        buffer.set_cursor(next);
                        steps += 1;
                        if next != 0 && next != sample.len() {
                            assert!(!is_continuation(sample[next]), "{sample:?} at {next}");
                        }
                    }
                    let target = match direction {
                        Direction::Forward => sample.len(),
                        Direction::Backward => 0,
                    };
                    assert_eq!(buffer.cursor(), target);
                    assert!(steps <= sample.len());
                }
            }
        }
    }

    #[test]
    fn word_edges_skip_delimiters_then_words() {
        let mut buffer = buffer_at("foo  bar baz", 12);
        buffer.move_word_edge(Direction::Backward, b" ");
        assert_eq!(buffer.cursor(), 9);
        buffer.set_cursor(5);
        buffer.move_word_edge(Direction::Backward, b" ");
        assert_eq!(buffer.cursor(), 0);

        buffer.set_cursor(3);
        buffer.move_word_edge(Direction::Forward, b" ");
        assert_eq!(buffer.cursor(), 8);
        buffer.move_word_edge(Direction::Forward, b" /");
        assert_eq!(buffer.cursor(), 12);
    }

    #[test]
    fn editing_shortcuts() {
        let mut buffer = buffer_at("open the door", 8);
        buffer.delete_word_backward(b" ");
        assert_eq!(buffer.as_bytes(), b"open  door");
        assert_eq!(buffer.cursor(), 5);

        buffer.kill_to_end();
        assert_eq!(buffer.as_bytes(), b"open ");

        buffer.set_cursor(2);
        buffer.kill_to_start();
        assert_eq!(buffer.as_bytes(), b"en ");
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn rune_deletion_removes_whole_sequences() {
        let mut buffer = buffer_at("a€b", 4);
        buffer.delete_rune_backward();
        assert_eq!(buffer.as_bytes(), b"ab");
        assert_eq!(buffer.cursor(), 1);

        let mut buffer = buffer_at("a€b", 1);
        buffer.delete_rune_forward();
        assert_eq!(buffer.as_bytes(), b"ab");
        assert_eq!(buffer.cursor(), 1);
    }
}
