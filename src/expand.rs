//! Expansion of table and list markers into concrete lines.
//!
//! Each marker is laid out in a bounded sub-report sized to the content area
//! of the page it sits on, so the marker's own header and footer repeat on
//! every page the rows spill onto. The flattened lines are then spliced back
//! into the report and anything pushed off a page moves to the next one.

use crate::config::PageFormat;
use crate::document::{Line, LineKind, ListLine, Page, Report, TableLine};
use crate::error::{DocumentError, FillError};
use crate::placeholder::{pad, resolve_member, Alignment};
use crate::resolver::Resolver;
use crate::source::{row_source, DataSource};
use crate::value::Value;
use crate::wrap::WrappedBuffer;
use log::{debug, info};

/// Where a marker sat and how much room its page offers.
#[derive(Debug, Clone, Copy)]
struct Slot {
    page: usize,
    /// Content index of the marker on its page.
    offset: usize,
    /// Content lines per page, `None` when unbounded.
    budget: Option<usize>,
}

/// Replaces every marker in `report`, first to last.
pub fn expand(
    report: &mut Report,
    sources: &[&dyn DataSource],
    resolver: &mut Resolver,
) -> Result<(), FillError> {
    while let Some((page_index, content_index)) = report.find_dynamic() {
        let page = &mut report.pages_mut()[page_index];
        let slot = Slot {
            page: page.number(),
            offset: content_index,
            budget: page.content_capacity(),
        };
        let Some(marker) = page.remove(content_index) else {
            break;
        };
        let lines = match &marker.kind {
            LineKind::Table(table) => {
                let rows = resolve_rows(&table.source, sources)?;
                debug!("Expanding table '{}' with {} rows", table.source, rows.len());
                let (header, footer) = table_frame(table);
                let body = table_rows(table, rows, resolver)?;
                layout(&header, &footer, body, slot)?
            }
            LineKind::List(list) => {
                let rows = resolve_rows(&list.source, sources)?;
                debug!("Expanding list '{}' with {} rows", list.source, rows.len());
                let body = list_rows(list, rows, resolver)?;
                layout(&list.header, &list.footer, body, slot)?
            }
            LineKind::Text(_) | LineKind::Empty => continue,
        };
        splice(report, page_index, content_index, lines)?;
    }
    info!("Expanded report into {} pages", report.pages().len());
    Ok(())
}

/// A list becomes its rows, null becomes nothing, anything else one row.
fn resolve_rows(name: &str, sources: &[&dyn DataSource]) -> Result<Vec<Value>, FillError> {
    match resolve_member(sources, name).map_err(|e| e.at(name))? {
        Value::List(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

fn table_frame(table: &TableLine) -> (Vec<String>, Vec<String>) {
    let mut header = table.header.clone();
    let mut footer = table.footer.clone();
    if table.border {
        header.push(table.rule());
        footer.insert(0, table.rule());
    }
    (header, footer)
}

fn table_rows(
    table: &TableLine,
    rows: Vec<Value>,
    resolver: &mut Resolver,
) -> Result<Vec<String>, FillError> {
    let widths: Vec<usize> = table
        .columns
        .iter()
        .map(|column| table.cell_width(column))
        .collect();
    let mut buffer = WrappedBuffer::new();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let source = row_source(row);
        let active: [&dyn DataSource; 1] = [source.as_ref()];
        let mut cells = Vec::with_capacity(table.columns.len());
        for (index, column) in table.columns.iter().enumerate() {
            let cell = resolver.cell(&column.text, &active)?;
            let width = widths[index];
            if column.wrap {
                cells.push(buffer.add(index, &cell.text, width));
            } else {
                let alignment = cell
                    .alignment
                    .or(column.alignment)
                    .unwrap_or(if cell.numeric {
                        Alignment::Right
                    } else {
                        Alignment::Left
                    });
                cells.push(pad(&cell.text, width, alignment));
            }
        }
        out.push(table.join_cells(&cells));
        for continuation in buffer.flush(&widths) {
            out.push(table.join_cells(&continuation));
        }
    }
    Ok(out)
}

fn list_rows(
    list: &ListLine,
    rows: Vec<Value>,
    resolver: &mut Resolver,
) -> Result<Vec<String>, FillError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let source = row_source(row);
        let active: [&dyn DataSource; 1] = [source.as_ref()];
        let text = resolver.basic_pass(&list.template, &active)?;
        out.push(resolver.scripted_pass(&text, &active)?);
    }
    Ok(out)
}

/// Paginates `rows` between `header` and `footer` in pages of the slot's
/// budget, the first page starting `slot.offset` lines down.
fn layout(
    header: &[String],
    footer: &[String],
    rows: Vec<String>,
    slot: Slot,
) -> Result<Vec<Line>, FillError> {
    let no_room = |detail: String| FillError::InsufficientPageSpace {
        page: slot.page,
        detail,
    };
    let mut sub = match slot.budget {
        Some(budget) => {
            let start = header.len() + slot.offset;
            let footer_start = budget.saturating_sub(footer.len());
            if start >= footer_start {
                return Err(no_room(format!(
                    "section starts at line {} but its footer starts at line {}",
                    start, footer_start
                )));
            }
            Report::bounded(budget)
        }
        None => Report::new(PageFormat::default()),
    }
    .with_header(header.iter().cloned())
    .with_footer(footer.iter().cloned());

    let spacers = if slot.budget.is_some() { slot.offset } else { 0 };
    sub.new_page(false);
    for _ in 0..spacers {
        sub.append(Line::empty(), false)?;
    }
    for row in rows {
        sub.append(Line::text(row), false).map_err(|err| match err {
            DocumentError::PageFull { .. } => {
                no_room("section header and footer leave no room for rows".to_string())
            }
            other => other.into(),
        })?;
    }

    let mut lines = Vec::new();
    for (index, page) in sub.into_pages().into_iter().enumerate() {
        let header_len = page.header().len();
        let mut page_lines = page.into_lines();
        if index == 0 {
            page_lines.drain(header_len..header_len + spacers);
        }
        lines.extend(page_lines);
    }
    Ok(lines)
}

/// Inserts `lines` where the marker was and moves evicted lines forward.
fn splice(
    report: &mut Report,
    page_index: usize,
    content_index: usize,
    lines: Vec<Line>,
) -> Result<(), FillError> {
    for line in lines.into_iter().rev() {
        let page = &mut report.pages_mut()[page_index];
        let position = page.header().len() + content_index;
        if let Some(evicted) = page.insert(line, position)? {
            relocate(report, page_index, evicted)?;
        }
    }
    Ok(())
}

/// Pushes `line` onto the top of the pages after `page_index`, cascading
/// until a page absorbs it and creating pages past the end as needed.
///
/// Created pages always carry the report header and footer, also when the
/// marker sat on a plain page, so their content budget can differ from the
/// budget the rows were laid out against.
fn relocate(report: &mut Report, mut page_index: usize, mut line: Line) -> Result<(), FillError> {
    loop {
        page_index += 1;
        if page_index == report.pages().len() {
            let page = report.new_page(false);
            if page.content_capacity() == Some(0) {
                return Err(FillError::InsufficientPageSpace {
                    page: page.number(),
                    detail: "page header and footer leave no room for content".to_string(),
                });
            }
        }
        let page: &mut Page = &mut report.pages_mut()[page_index];
        let position = page.header().len();
        match page.insert(line, position)? {
            Some(evicted) => line = evicted,
            None => return Ok(()),
        }
    }
}
