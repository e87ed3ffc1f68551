//! Character cursor over the query source
//!
//! Positions are character offsets, not byte offsets, so that diagnostics line
//! up with what the user typed.

/// A character-by-character cursor with a save/restore stack
#[derive(Debug, Clone)]
pub struct Cursor {
    chars: Vec<char>,
    position: usize,
    saved: Vec<usize>,
}

impl Cursor {
    /// Create a cursor positioned at the start of `input`
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
            saved: Vec::new(),
        }
    }

    /// Return the current character and advance past it
    pub fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        Some(c)
    }

    /// Return the current character without advancing
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    pub fn eof(&self) -> bool {
        self.position >= self.chars.len()
    }

    /// Current character offset
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of characters in the source
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Characters in `start..end`, clamped to the source
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }

    /// Push the current position so a speculative scan can be undone
    pub fn save(&mut self) {
        self.saved.push(self.position);
    }

    /// Pop the last saved position and rewind to it (no-op if nothing was saved)
    pub fn restore(&mut self) {
        if let Some(position) = self.saved.pop() {
            self.position = position;
        }
    }

    /// Consume characters while `predicate` holds
    pub fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            s.push(c);
            self.position += 1;
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_and_peek() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.next(), Some('a'));
        assert_eq!(cursor.peek(), Some('b'));
        assert_eq!(cursor.next(), Some('b'));
        assert!(cursor.eof());
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_empty_input() {
        let cursor = Cursor::new("");
        assert!(cursor.eof());
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_save_restore() {
        let mut cursor = Cursor::new("severity");
        cursor.next();
        cursor.save();
        cursor.next();
        cursor.next();
        assert_eq!(cursor.position(), 3);
        cursor.restore();
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.peek(), Some('e'));
    }

    #[test]
    fn test_nested_save_restore() {
        let mut cursor = Cursor::new("abcdef");
        cursor.save();
        cursor.next();
        cursor.save();
        cursor.next();
        cursor.next();
        cursor.restore();
        assert_eq!(cursor.position(), 1);
        cursor.restore();
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_restore_without_save_is_noop() {
        let mut cursor = Cursor::new("abc");
        cursor.next();
        cursor.restore();
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_positions_count_characters() {
        let mut cursor = Cursor::new("日本 x");
        cursor.read_while(|c| c != ' ');
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.len(), 4);
    }

    #[test]
    fn test_slice_is_clamped() {
        let cursor = Cursor::new("hello");
        assert_eq!(cursor.slice(1, 3), "el");
        assert_eq!(cursor.slice(3, 100), "lo");
        assert_eq!(cursor.slice(10, 20), "");
    }
}
