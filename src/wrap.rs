use std::collections::BTreeMap;

/// Per-column carry-over for wrap-enabled table columns.
///
/// Fragments are cut by character count. Every string handed out is exactly
/// the column width, left-justified and padded with spaces.
#[derive(Debug, Clone, Default)]
pub struct WrappedBuffer {
    pending: BTreeMap<usize, Vec<char>>,
}

impl WrappedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns what fits in `width` and keeps the rest for [`WrappedBuffer::consume`].
    pub fn add(&mut self, column: usize, value: &str, width: usize) -> String {
        let chars: Vec<char> = value.chars().collect();
        if chars.len() <= width || width == 0 {
            self.pending.remove(&column);
            return fit(&chars, width);
        }
        let (head, rest) = chars.split_at(width);
        self.pending.insert(column, rest.to_vec());
        head.iter().collect()
    }

    /// Next `width` characters buffered for `column`, all spaces when it is drained.
    pub fn consume(&mut self, column: usize, width: usize) -> String {
        let Some(rest) = self.pending.get_mut(&column) else {
            return " ".repeat(width);
        };
        let head: Vec<char> = rest.drain(..width.min(rest.len())).collect();
        if rest.is_empty() {
            self.pending.remove(&column);
        }
        fit(&head, width)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn remaining(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    /// Drains every column into continuation rows. `widths[i]` is the width of
    /// column `i`; each row holds one fragment (or spaces) per column.
    pub fn flush(&mut self, widths: &[usize]) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        while !self.is_empty() {
            let before = self.remaining();
            let row = widths
                .iter()
                .enumerate()
                .map(|(column, width)| self.consume(column, *width))
                .collect();
            if self.remaining() == before {
                // Fragments for columns without a usable width never drain.
                self.pending.clear();
                break;
            }
            rows.push(row);
        }
        rows
    }
}

fn fit(chars: &[char], width: usize) -> String {
    let mut out: String = chars.iter().collect();
    let len = chars.len();
    if len < width {
        out.push_str(&" ".repeat(width - len));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_short_value_is_padded() {
        let mut buffer = WrappedBuffer::new();
        assert_eq!(buffer.add(0, "abc", 5), "abc  ");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_add_long_value_buffers_remainder() {
        let mut buffer = WrappedBuffer::new();
        assert_eq!(buffer.add(0, "abcdefgh", 3), "abc");
        assert!(!buffer.is_empty());
        assert_eq!(buffer.consume(0, 3), "def");
        assert_eq!(buffer.consume(0, 3), "gh ");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_add_replaces_previous_remainder() {
        let mut buffer = WrappedBuffer::new();
        buffer.add(1, "abcdef", 2);
        assert_eq!(buffer.add(1, "xy", 2), "xy");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_consume_empty_column() {
        let mut buffer = WrappedBuffer::new();
        assert_eq!(buffer.consume(4, 6), "      ");
    }

    #[test]
    fn test_flush_row_count() {
        let mut buffer = WrappedBuffer::new();
        // 25 chars in width 10 -> 2 extra rows, 7 chars in width 3 -> 2 extra rows.
        buffer.add(0, "aaaaaaaaaabbbbbbbbbbccccc", 10);
        buffer.add(1, "1234567", 3);
        buffer.add(2, "ok", 4);
        let rows = buffer.flush(&[10, 3, 4]);
        assert_eq!(
            rows,
            vec![
                vec!["bbbbbbbbbb".to_string(), "456".to_string(), "    ".to_string()],
                vec!["ccccc     ".to_string(), "7  ".to_string(), "    ".to_string()],
            ]
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_flush_uneven_columns() {
        let mut buffer = WrappedBuffer::new();
        buffer.add(0, "abcdefghij", 2);
        buffer.add(1, "xyz", 2);
        let rows = buffer.flush(&[2, 2]);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], vec!["cd".to_string(), "z ".to_string()]);
        assert_eq!(rows[3], vec!["ij".to_string(), "  ".to_string()]);
    }
}
