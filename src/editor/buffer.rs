use std::cmp::Ordering;

/// Line-based gap buffer backing the note editor.
/// `before` holds the lines above the gap, `after` the lines below it in reverse,
/// so edits around the cursor row stay O(1).
#[derive(Debug, Clone)]
pub struct TextBuffer {
    before: Vec<String>,
    after: Vec<String>,
    trailing_newline: bool,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self {
            before: vec![String::new()],
            after: Vec::new(),
            trailing_newline: false,
        }
    }
}

impl TextBuffer {
    pub fn from_text(text: &str) -> Self {
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines: Vec<String> = body
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        Self {
            before: lines,
            after: Vec::new(),
            trailing_newline,
        }
    }

    #[cfg(test)]
    pub fn from_lines(lines: Vec<String>) -> Self {
        if lines.is_empty() {
            return Self::default();
        }
        Self { before: lines, after: Vec::new(), trailing_newline: false }
    }

    /// Joins the lines back into file content, keeping a final newline if the source had one.
    pub fn to_text(&self) -> String {
        let mut text = self.lines().join("\n");
        if self.trailing_newline {
            text.push('\n');
        }
        text
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.before.len() + self.after.len()
    }

    #[inline]
    fn gap_pos(&self) -> usize {
        self.before.len()
    }

    fn move_gap_to(&mut self, row: usize) {
        let current = self.gap_pos();
        match row.cmp(&current) {
            Ordering::Equal => {}
            Ordering::Less => {
                for _ in row..current {
                    if let Some(line) = self.before.pop() {
                        self.after.push(line);
                    }
                }
            }
            Ordering::Greater => {
                let target = row.min(self.line_count());
                for _ in current..target {
                    if let Some(line) = self.after.pop() {
                        self.before.push(line);
                    }
                }
            }
        }
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        let gap_pos = self.gap_pos();
        if row < gap_pos {
            self.before.get(row).map(|s| s.as_str())
        } else {
            let after_idx = self.after.len().checked_sub(row - gap_pos + 1)?;
            self.after.get(after_idx).map(|s| s.as_str())
        }
    }

    fn line_mut(&mut self, row: usize) -> Option<&mut String> {
        self.move_gap_to(row + 1);
        self.before.get_mut(row)
    }

    /// Length of a line in characters.
    pub fn line_len(&self, row: usize) -> usize {
        self.line(row).map_or(0, |l| l.chars().count())
    }

    pub fn lines(&self) -> Vec<&str> {
        let mut result = Vec::with_capacity(self.line_count());
        for line in &self.before {
            result.push(line.as_str());
        }
        for line in self.after.iter().rev() {
            result.push(line.as_str());
        }
        result
    }

    pub fn insert_char(&mut self, row: usize, col: usize, c: char) {
        if let Some(line) = self.line_mut(row) {
            let byte_idx = char_to_byte_index(line, col);
            line.insert(byte_idx, c);
        }
    }

    pub fn delete_char(&mut self, row: usize, col: usize) -> Option<char> {
        let line = self.line_mut(row)?;
        if col < line.chars().count() {
            let byte_idx = char_to_byte_index(line, col);
            return Some(line.remove(byte_idx));
        }
        None
    }

    pub fn delete_range(&mut self, row: usize, start_col: usize, end_col: usize) -> String {
        if let Some(line) = self.line_mut(row) {
            let len = line.chars().count();
            let start = start_col.min(len);
            let end = end_col.min(len);
            if start < end {
                let start_byte = char_to_byte_index(line, start);
                let end_byte = char_to_byte_index(line, end);
                return line.drain(start_byte..end_byte).collect();
            }
        }
        String::new()
    }

    pub fn split_line(&mut self, row: usize, col: usize) -> bool {
        self.move_gap_to(row + 1);
        if let Some(line) = self.before.get_mut(row) {
            let byte_idx = char_to_byte_index(line, col);
            let remainder = line.split_off(byte_idx);
            self.before.push(remainder);
            return true;
        }
        false
    }

    pub fn join_with_previous(&mut self, row: usize) -> bool {
        if row == 0 || row >= self.line_count() {
            return false;
        }
        self.move_gap_to(row + 1);
        if row < self.before.len() {
            let current_line = self.before.remove(row);
            if let Some(prev_line) = self.before.get_mut(row - 1) {
                prev_line.push_str(&current_line);
                return true;
            }
        }
        false
    }

    fn delete_line(&mut self, row: usize) -> Option<String> {
        if row >= self.line_count() {
            return None;
        }
        if self.line_count() == 1 {
            self.move_gap_to(1);
            return Some(std::mem::take(&mut self.before[0]));
        }
        self.move_gap_to(row + 1);
        self.before.pop()
    }

    /// Removes the text between two positions (half-open, char columns) and returns it.
    pub fn delete_text_range(&mut self, start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> String {
        if start_row == end_row {
            return self.delete_range(start_row, start_col, end_col);
        }

        let mut deleted = String::new();
        let end_remainder: String = match self.line(end_row) {
            Some(line) => {
                let byte_idx = char_to_byte_index(line, end_col);
                deleted.push_str(&line[..byte_idx]);
                line[byte_idx..].to_string()
            }
            None => String::new(),
        };

        let mut middle = Vec::new();
        for _ in (start_row + 1)..=end_row {
            if let Some(line) = self.delete_line(start_row + 1) {
                middle.push(line);
            }
        }

        let mut head = String::new();
        if let Some(line) = self.line_mut(start_row) {
            let byte_idx = char_to_byte_index(line, start_col);
            head = line.split_off(byte_idx);
            line.push_str(&end_remainder);
        }

        // middle holds every removed line, the last of which is the end row
        let mut out = head;
        for line in middle.iter().take(middle.len().saturating_sub(1)) {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
        out.push_str(&deleted);
        out
    }
}

pub(crate) fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer() {
        let buf = TextBuffer::default();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line(0), Some(""));
    }

    #[test]
    fn test_from_text_keeps_trailing_newline() {
        let buf = TextBuffer::from_text("# Title\nSee [[Other]]\n");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line(1), Some("See [[Other]]"));
        assert_eq!(buf.to_text(), "# Title\nSee [[Other]]\n");
    }

    #[test]
    fn test_from_text_strips_carriage_returns() {
        let buf = TextBuffer::from_text("one\r\ntwo");
        assert_eq!(buf.lines(), vec!["one", "two"]);
        assert_eq!(buf.to_text(), "one\ntwo");
    }

    #[test]
    fn test_insert_char_multibyte() {
        let mut buf = TextBuffer::from_lines(vec!["café".into()]);
        buf.insert_char(0, 4, '!');
        assert_eq!(buf.line(0), Some("café!"));
        assert_eq!(buf.line_len(0), 5);
    }

    #[test]
    fn test_delete_char() {
        let mut buf = TextBuffer::from_lines(vec!["hello".into()]);
        assert_eq!(buf.delete_char(0, 4), Some('o'));
        assert_eq!(buf.delete_char(0, 10), None);
        assert_eq!(buf.line(0), Some("hell"));
    }

    #[test]
    fn test_split_and_join() {
        let mut buf = TextBuffer::from_lines(vec!["hello world".into()]);
        buf.split_line(0, 5);
        assert_eq!(buf.lines(), vec!["hello", " world"]);
        buf.join_with_previous(1);
        assert_eq!(buf.lines(), vec!["hello world"]);
    }

    #[test]
    fn test_delete_range_single_line() {
        let mut buf = TextBuffer::from_lines(vec!["[x](https://a.example)".into()]);
        let removed = buf.delete_text_range(0, 4, 0, 21);
        assert_eq!(removed, "https://a.example");
        assert_eq!(buf.line(0), Some("[x]()"));
    }

    #[test]
    fn test_delete_range_across_lines() {
        let mut buf = TextBuffer::from_lines(vec![
            "line one".into(),
            "line two".into(),
            "line three".into(),
        ]);
        let removed = buf.delete_text_range(0, 5, 2, 4);
        assert_eq!(removed, "one\nline two\nline");
        assert_eq!(buf.lines(), vec!["line  three"]);
    }
}
