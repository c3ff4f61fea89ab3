//! Report / page / line model with page-capacity bookkeeping.
//!
//! A [`Report`] is an ordered list of [`Page`]s. Each page holds header lines,
//! content lines and footer lines, and never holds more than its page length
//! once an insert has been settled.

use crate::config::PageFormat;
use crate::error::DocumentError;
use crate::placeholder::{pad, Alignment};

/// One column of a [`TableLine`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    /// Placeholder expression resolved against each row, e.g. `hourRate:currency`.
    /// Wrap it in `{{ }}` to evaluate it as a script instead.
    pub text: String,
    pub width: usize,
    pub caption: Option<String>,
    /// Carry overflowing text to continuation rows instead of truncating it.
    pub wrap: bool,
    /// Overrides the numeric-right / text-left default.
    pub alignment: Option<Alignment>,
}

impl TableColumn {
    pub fn new(text: impl Into<String>, width: usize) -> Self {
        Self {
            text: text.into(),
            width,
            caption: None,
            wrap: false,
            alignment: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn wrapped(mut self) -> Self {
        self.wrap = true;
        self
    }

    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Caption shown in the caption row, the column text when unset.
    pub fn caption(&self) -> &str {
        self.caption.as_deref().unwrap_or(&self.text)
    }
}

/// Marker for a table expanded from a row collection.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLine {
    /// Member path of the row collection in the active data sources.
    pub source: String,
    pub columns: Vec<TableColumn>,
    pub border: bool,
    pub header: Vec<String>,
    pub footer: Vec<String>,
}

impl TableLine {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            columns: Vec::new(),
            border: false,
            header: Vec::new(),
            footer: Vec::new(),
        }
    }

    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_border(mut self) -> Self {
        self.border = true;
        self
    }

    pub fn with_header<S: Into<String>>(mut self, lines: impl IntoIterator<Item = S>) -> Self {
        self.header = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_footer<S: Into<String>>(mut self, lines: impl IntoIterator<Item = S>) -> Self {
        self.footer = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Prepends a caption row built from the column captions to the header.
    pub fn with_caption_row(mut self) -> Self {
        let row = self.caption_row();
        self.header.insert(0, row);
        self
    }

    /// Usable characters inside a column once the border glyph is accounted for.
    pub fn cell_width(&self, column: &TableColumn) -> usize {
        if self.border {
            column.width.saturating_sub(1)
        } else {
            column.width
        }
    }

    /// Joins already padded cells into one row.
    pub fn join_cells(&self, cells: &[String]) -> String {
        if self.border {
            let mut row: String = cells.iter().map(|cell| format!("|{}", cell)).collect();
            row.push('|');
            row
        } else {
            cells.concat()
        }
    }

    pub fn caption_row(&self) -> String {
        let cells: Vec<String> = self
            .columns
            .iter()
            .map(|column| pad(column.caption(), self.cell_width(column), Alignment::Left))
            .collect();
        self.join_cells(&cells)
    }

    /// Horizontal rule matching the border layout, `+----+--+`.
    pub fn rule(&self) -> String {
        let mut rule = String::new();
        for column in &self.columns {
            rule.push('+');
            rule.push_str(&"-".repeat(self.cell_width(column)));
        }
        rule.push('+');
        rule
    }
}

/// Marker for a list: one line per row, rendered from a row template.
#[derive(Debug, Clone, PartialEq)]
pub struct ListLine {
    pub source: String,
    /// Placeholder text resolved against each row, e.g. `${qty:3} x ${name}`.
    pub template: String,
    pub header: Vec<String>,
    pub footer: Vec<String>,
}

impl ListLine {
    pub fn new(source: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            template: template.into(),
            header: Vec::new(),
            footer: Vec::new(),
        }
    }

    pub fn with_header<S: Into<String>>(mut self, lines: impl IntoIterator<Item = S>) -> Self {
        self.header = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_footer<S: Into<String>>(mut self, lines: impl IntoIterator<Item = S>) -> Self {
        self.footer = lines.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Text(String),
    Empty,
    Table(TableLine),
    List(ListLine),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub kind: LineKind,
    line_number: Option<usize>,
    global_line_number: Option<usize>,
}

impl Line {
    pub fn new(kind: LineKind) -> Self {
        Self {
            kind,
            line_number: None,
            global_line_number: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(LineKind::Text(text.into()))
    }

    pub fn empty() -> Self {
        Self::new(LineKind::Empty)
    }

    pub fn table(table: TableLine) -> Self {
        Self::new(LineKind::Table(table))
    }

    pub fn list(list: ListLine) -> Self {
        Self::new(LineKind::List(list))
    }

    /// Whether the rendered line count is only known after resolving rows.
    pub fn is_dynamic(&self) -> bool {
        match self.kind {
            LineKind::Text(_) | LineKind::Empty => false,
            LineKind::Table(_) | LineKind::List(_) => true,
        }
    }

    /// Printable text of a static line. Dynamic lines have none.
    pub fn content(&self) -> &str {
        match &self.kind {
            LineKind::Text(text) => text,
            LineKind::Empty | LineKind::Table(_) | LineKind::List(_) => "",
        }
    }

    /// 1-based position on its page, header first.
    pub fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    /// Position across the whole report.
    pub fn global_line_number(&self) -> Option<usize> {
        self.global_line_number
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    number: usize,
    page_length: Option<usize>,
    header: Vec<Line>,
    content: Vec<Line>,
    footer: Vec<Line>,
}

impl Page {
    pub fn new(number: usize, page_length: Option<usize>, header: Vec<Line>, footer: Vec<Line>) -> Self {
        Self {
            number,
            page_length,
            header,
            content: Vec::new(),
            footer,
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn page_length(&self) -> Option<usize> {
        self.page_length
    }

    pub fn header(&self) -> &[Line] {
        &self.header
    }

    pub fn content(&self) -> &[Line] {
        &self.content
    }

    pub fn footer(&self) -> &[Line] {
        &self.footer
    }

    /// Header, content and footer line count.
    pub fn len(&self) -> usize {
        self.header.len() + self.content.len() + self.footer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.page_length.is_some_and(|length| self.len() == length)
    }

    pub fn is_overflow(&self) -> bool {
        self.page_length.is_some_and(|length| self.len() > length)
    }

    /// Content lines the page can hold, `None` when unbounded.
    pub fn content_capacity(&self) -> Option<usize> {
        self.page_length
            .map(|length| length.saturating_sub(self.header.len() + self.footer.len()))
    }

    pub fn append(&mut self, line: Line) -> Result<(), DocumentError> {
        if self.page_length.is_some_and(|length| self.len() >= length) {
            return Err(DocumentError::PageFull { page: self.number });
        }
        self.content.push(line);
        Ok(())
    }

    /// Inserts `line` at `position`, counted from the first header line.
    ///
    /// When the page overflows, its last content line is evicted and handed
    /// back so the caller can move it to a following page.
    pub fn insert(&mut self, line: Line, position: usize) -> Result<Option<Line>, DocumentError> {
        let start = self.header.len();
        let end = start + self.content.len();
        if position < start || position > end {
            return Err(DocumentError::PageOverflow {
                page: self.number,
                position,
            });
        }
        self.content.insert(position - start, line);
        if self.is_overflow() {
            return Ok(self.content.pop());
        }
        Ok(None)
    }

    /// Removes the content line at `index` (not counting the header).
    pub fn remove(&mut self, index: usize) -> Option<Line> {
        (index < self.content.len()).then(|| self.content.remove(index))
    }

    /// Content index of the first table or list marker.
    pub fn dynamic_position(&self) -> Option<usize> {
        self.content.iter().position(Line::is_dynamic)
    }

    /// Assigns local line numbers and returns the lines in print order.
    pub fn get_lines(&mut self) -> Vec<&Line> {
        self.number_lines(None);
        self.lines().collect()
    }

    /// Numbers every line from 1, and globally from `first_global` when given.
    /// Returns the next free global number.
    fn number_lines(&mut self, first_global: Option<usize>) -> Option<usize> {
        let mut global = first_global;
        let lines = self
            .header
            .iter_mut()
            .chain(self.content.iter_mut())
            .chain(self.footer.iter_mut());
        for (index, line) in lines.enumerate() {
            line.line_number = Some(index + 1);
            if let Some(number) = global.as_mut() {
                line.global_line_number = Some(*number);
                *number += 1;
            }
        }
        global
    }

    /// Header, content and footer lines in print order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.header
            .iter()
            .chain(self.content.iter())
            .chain(self.footer.iter())
    }

    pub fn into_lines(self) -> Vec<Line> {
        let mut lines = self.header;
        lines.extend(self.content);
        lines.extend(self.footer);
        lines
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    format: PageFormat,
    header: Vec<String>,
    footer: Vec<String>,
    pages: Vec<Page>,
    last_page_number: usize,
    current: Option<usize>,
    break_requested: bool,
}

impl Report {
    pub fn new(format: PageFormat) -> Self {
        Self {
            format,
            header: Vec::new(),
            footer: Vec::new(),
            pages: Vec::new(),
            last_page_number: 0,
            current: None,
            break_requested: false,
        }
    }

    /// A report of `page_length` lines per page with default format settings.
    pub fn bounded(page_length: usize) -> Self {
        Self::new(PageFormat::default().with_page_length(page_length))
    }

    /// Sets the header seeded into every page created afterwards.
    pub fn with_header<S: Into<String>>(mut self, lines: impl IntoIterator<Item = S>) -> Self {
        self.header = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the footer seeded into every page created afterwards.
    pub fn with_footer<S: Into<String>>(mut self, lines: impl IntoIterator<Item = S>) -> Self {
        self.footer = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn format(&self) -> &PageFormat {
        &self.format
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn footer(&self) -> &[String] {
        &self.footer
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    pub fn last_page_number(&self) -> usize {
        self.last_page_number
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.current.map(|index| &self.pages[index])
    }

    /// Starts a page, seeded with the report header and footer unless `plain`.
    pub fn new_page(&mut self, plain: bool) -> &mut Page {
        self.last_page_number += 1;
        let (header, footer) = if plain {
            (Vec::new(), Vec::new())
        } else {
            (
                self.header.iter().map(Line::text).collect(),
                self.footer.iter().map(Line::text).collect(),
            )
        };
        self.pages.push(Page::new(
            self.last_page_number,
            self.format.page_length,
            header,
            footer,
        ));
        let index = self.pages.len() - 1;
        self.current = Some(index);
        &mut self.pages[index]
    }

    /// Makes the next [`Report::append`] start a new page.
    pub fn request_page_break(&mut self) {
        self.break_requested = true;
    }

    /// Appends to the current page, starting a new one when there is none, it
    /// is full, or a break was requested.
    pub fn append(&mut self, line: Line, plain: bool) -> Result<(), DocumentError> {
        let needs_page = match self.current {
            None => true,
            Some(index) => self.break_requested || self.pages[index].is_full(),
        };
        let page = if needs_page {
            self.break_requested = false;
            self.new_page(plain)
        } else {
            let index = self.current.unwrap_or_default();
            &mut self.pages[index]
        };
        page.append(line)
    }

    /// Appends a text line to a header/footer seeded page.
    pub fn append_text(&mut self, text: impl Into<String>) -> Result<(), DocumentError> {
        self.append(Line::text(text), false)
    }

    pub fn has_dynamic_lines(&self) -> bool {
        self.pages.iter().any(|page| page.dynamic_position().is_some())
    }

    /// First marker as (page index, content index), scanning pages in order.
    pub fn find_dynamic(&self) -> Option<(usize, usize)> {
        self.pages
            .iter()
            .enumerate()
            .find_map(|(index, page)| page.dynamic_position().map(|position| (index, position)))
    }

    /// Assigns page-local and report-global line numbers.
    pub fn number_lines(&mut self) {
        let mut next = Some(1);
        for page in &mut self.pages {
            next = page.number_lines(next);
        }
    }

    pub fn line_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(page: &Page) -> Vec<&str> {
        page.lines().map(Line::content).collect()
    }

    #[test]
    fn test_append_fills_pages_exactly() {
        let mut report = Report::bounded(4)
            .with_header(["H"])
            .with_footer(["F"]);
        for i in 0..5 {
            report.append_text(format!("line {}", i)).unwrap();
        }
        assert_eq!(report.pages().len(), 3);
        assert_eq!(report.last_page_number(), 3);
        assert!(report.pages()[0].is_full());
        assert!(report.pages()[1].is_full());
        assert_eq!(texts(&report.pages()[0]), vec!["H", "line 0", "line 1", "F"]);
        assert_eq!(texts(&report.pages()[2]), vec!["H", "line 4", "F"]);
    }

    #[test]
    fn test_plain_pages_skip_header_and_footer() {
        let mut report = Report::bounded(2).with_header(["H"]).with_footer(["F"]);
        report.append(Line::text("a"), true).unwrap();
        report.append(Line::text("b"), true).unwrap();
        report.append(Line::text("c"), true).unwrap();
        assert_eq!(report.pages().len(), 2);
        assert_eq!(texts(&report.pages()[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_requested_break_starts_new_page() {
        let mut report = Report::new(PageFormat::default());
        report.append_text("a").unwrap();
        report.request_page_break();
        report.append_text("b").unwrap();
        report.append_text("c").unwrap();
        assert_eq!(report.pages().len(), 2);
        assert_eq!(texts(&report.pages()[1]), vec!["b", "c"]);
    }

    #[test]
    fn test_page_append_rejects_when_full() {
        let mut page = Page::new(7, Some(2), vec![Line::text("H")], Vec::new());
        page.append(Line::text("a")).unwrap();
        assert_eq!(
            page.append(Line::text("b")),
            Err(DocumentError::PageFull { page: 7 })
        );
    }

    #[test]
    fn test_insert_evicts_last_content_line() {
        let mut page = Page::new(1, Some(4), vec![Line::text("H")], vec![Line::text("F")]);
        page.append(Line::text("a")).unwrap();
        page.append(Line::text("b")).unwrap();
        let evicted = page.insert(Line::text("new"), 1).unwrap();
        assert_eq!(evicted, Some(Line::text("b")));
        assert_eq!(texts(&page), vec!["H", "new", "a", "F"]);
        assert!(page.is_full());
    }

    #[test]
    fn test_insert_at_end_of_full_page_hands_line_back() {
        let mut page = Page::new(2, Some(3), vec![Line::text("H")], Vec::new());
        page.append(Line::text("a")).unwrap();
        page.append(Line::text("b")).unwrap();
        assert!(page.is_full());
        let evicted = page.insert(Line::text("late"), 3).unwrap();
        assert_eq!(evicted, Some(Line::text("late")));
        assert_eq!(texts(&page), vec!["H", "a", "b"]);
        assert_eq!(
            page.insert(Line::text("x"), 4),
            Err(DocumentError::PageOverflow { page: 2, position: 4 })
        );
    }

    #[test]
    fn test_insert_without_overflow() {
        let mut page = Page::new(1, None, Vec::new(), Vec::new());
        page.append(Line::text("a")).unwrap();
        assert_eq!(page.insert(Line::text("b"), 1).unwrap(), None);
        assert_eq!(texts(&page), vec!["a", "b"]);
    }

    #[test]
    fn test_insert_rejects_positions_outside_content() {
        let mut page = Page::new(3, Some(5), vec![Line::text("H")], Vec::new());
        assert_eq!(
            page.insert(Line::text("x"), 0),
            Err(DocumentError::PageOverflow { page: 3, position: 0 })
        );
        assert!(page.insert(Line::text("x"), 2).is_err());
        assert!(page.insert(Line::text("x"), 1).is_ok());
    }

    #[test]
    fn test_line_numbers() {
        let mut report = Report::bounded(3).with_header(["H"]);
        for text in ["a", "b", "c"] {
            report.append_text(text).unwrap();
        }
        report.number_lines();
        let numbers: Vec<(Option<usize>, Option<usize>)> = report
            .pages()
            .iter()
            .flat_map(Page::lines)
            .map(|line| (line.line_number(), line.global_line_number()))
            .collect();
        assert_eq!(
            numbers,
            vec![
                (Some(1), Some(1)),
                (Some(2), Some(2)),
                (Some(3), Some(3)),
                (Some(1), Some(4)),
                (Some(2), Some(5)),
            ]
        );
    }

    #[test]
    fn test_get_lines_refreshes_local_numbers() {
        let mut page = Page::new(1, None, vec![Line::text("H")], Vec::new());
        page.append(Line::text("a")).unwrap();
        page.insert(Line::text("b"), 1).unwrap();
        let numbers: Vec<_> = page.get_lines().iter().map(|l| l.line_number()).collect();
        assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_find_dynamic() {
        let mut report = Report::bounded(3);
        report.append_text("a").unwrap();
        report.append_text("b").unwrap();
        report.append_text("c").unwrap();
        report.append(Line::list(ListLine::new("items", "${name}")), false).unwrap();
        assert!(report.has_dynamic_lines());
        assert_eq!(report.find_dynamic(), Some((1, 0)));
    }

    #[test]
    fn test_table_layout_helpers() {
        let table = TableLine::new("rows")
            .column(TableColumn::new("name", 6).with_caption("Name"))
            .column(TableColumn::new("qty", 4))
            .with_border();
        assert_eq!(table.caption_row(), "|Name |qty|");
        assert_eq!(table.rule(), "+-----+---+");
        let plain = TableLine::new("rows").column(TableColumn::new("name", 6));
        assert_eq!(plain.caption_row(), "name  ");
    }
}
