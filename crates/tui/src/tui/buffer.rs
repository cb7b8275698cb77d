/// Single-line text input with a byte cursor that always sits on a char boundary.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\r' || ch == '\n' {
            return;
        }
        let mut buf = [0u8; 4];
        let encoded = ch.encode_utf8(&mut buf);
        self.text.insert_str(self.cursor, encoded);
        self.cursor += encoded.len();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let mut iter = self.text[..self.cursor].char_indices().rev();
        if let Some((idx, _ch)) = iter.next() {
            self.text.drain(idx..self.cursor);
            self.cursor = idx;
        }
    }

    pub fn delete_char(&mut self) {
        if self.cursor >= self.text.len() {
            return;
        }
        let mut iter = self.text[self.cursor..].char_indices();
        if let Some((idx, ch)) = iter.next() {
            let end = self.cursor + idx + ch.len_utf8();
            self.text.drain(self.cursor..end);
        }
    }

    pub fn move_left(&mut self) {
        if let Some((idx, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.text[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Cursor position in characters, for placing the terminal cursor.
    pub fn cursor_column(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }
}
