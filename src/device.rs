//! # Device Directives
//!
//! The fill engine treats printer control sequences as opaque strings and
//! only decides where they go. A [`DeviceEncoder`] supplies them.
//!
//! Two encoders ship with the crate:
//!
//! - [`PlainEncoder`]: no control sequences, `\n` between lines and `\x0c`
//!   between pages. Useful for previews and tests.
//! - [`EscpEncoder`]: ESC/P style sequences for 9/24-pin impact printers.

use crate::config::{CharacterPitch, DeviceKind, LineSpacing, PageFormat};

/// ESC (Escape) - Command prefix byte
pub const ESC: char = '\x1b';

/// CR (Carriage Return)
pub const CR: char = '\r';

/// LF (Line Feed)
pub const LF: char = '\n';

/// FF (Form Feed) - Eject to top of next page
pub const FF: char = '\x0c';

/// Toggleable print styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Bold,
    Italic,
    DoubleStrike,
    Underline,
    Superscript,
    Subscript,
}

pub trait DeviceEncoder {
    /// Preamble emitted once at the start of the output.
    fn page_format(&self, format: &PageFormat) -> String;

    /// Re-initialization emitted once at the very end.
    fn initialize(&self) -> String;

    /// Soft line terminator.
    fn line_break(&self, format: &PageFormat) -> String;

    /// Hard page terminator.
    fn page_break(&self) -> String;

    fn style(&self, style: Style, on: bool) -> String;
}

/// Text only, no control sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainEncoder;

impl DeviceEncoder for PlainEncoder {
    fn page_format(&self, _format: &PageFormat) -> String {
        String::new()
    }

    fn initialize(&self) -> String {
        String::new()
    }

    fn line_break(&self, _format: &PageFormat) -> String {
        LF.to_string()
    }

    fn page_break(&self) -> String {
        FF.to_string()
    }

    fn style(&self, _style: Style, _on: bool) -> String {
        String::new()
    }
}

/// ESC/P command set.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscpEncoder;

impl EscpEncoder {
    /// `ESC @`
    pub fn init() -> String {
        format!("{ESC}@")
    }

    /// `ESC C n` - page length in lines
    pub fn page_length(lines: usize) -> String {
        format!("{ESC}C{}", byte(lines))
    }

    /// `ESC N n` - skip-over-perforation
    pub fn bottom_margin(lines: usize) -> String {
        format!("{ESC}N{}", byte(lines))
    }

    /// `ESC l n`
    pub fn left_margin(columns: usize) -> String {
        format!("{ESC}l{}", byte(columns))
    }

    /// `ESC Q n`
    pub fn right_margin(columns: usize) -> String {
        format!("{ESC}Q{}", byte(columns))
    }

    /// `ESC P` / `ESC M` / `ESC g`
    pub fn pitch(pitch: CharacterPitch) -> String {
        match pitch {
            CharacterPitch::Pica => format!("{ESC}P"),
            CharacterPitch::Elite => format!("{ESC}M"),
            CharacterPitch::Micron => format!("{ESC}g"),
        }
    }

    /// `ESC 0` / `ESC 2`
    pub fn line_spacing(spacing: LineSpacing) -> String {
        match spacing {
            LineSpacing::OneEighthInch => format!("{ESC}0"),
            LineSpacing::OneSixthInch => format!("{ESC}2"),
        }
    }
}

/// Parameter byte of a one-byte ESC/P argument, clamped to what the printer reads.
fn byte(n: usize) -> char {
    char::from(n.min(127) as u8)
}

impl DeviceEncoder for EscpEncoder {
    fn page_format(&self, format: &PageFormat) -> String {
        let mut out = Self::init();
        if let Some(spacing) = format.line_spacing {
            out.push_str(&Self::line_spacing(spacing));
        }
        if let Some(lines) = format.page_length {
            out.push_str(&Self::page_length(lines));
        }
        if let Some(lines) = format.bottom_margin {
            out.push_str(&Self::bottom_margin(lines));
        }
        if let Some(pitch) = format.pitch {
            out.push_str(&Self::pitch(pitch));
        }
        if let Some(columns) = format.left_margin {
            out.push_str(&Self::left_margin(columns));
        }
        if let Some(columns) = format.right_margin {
            out.push_str(&Self::right_margin(columns));
        }
        out
    }

    fn initialize(&self) -> String {
        Self::init()
    }

    fn line_break(&self, format: &PageFormat) -> String {
        if format.auto_line_feed {
            CR.to_string()
        } else {
            format!("{CR}{LF}")
        }
    }

    fn page_break(&self) -> String {
        FF.to_string()
    }

    fn style(&self, style: Style, on: bool) -> String {
        let code = match (style, on) {
            (Style::Bold, true) => "E",
            (Style::Bold, false) => "F",
            (Style::Italic, true) => "4",
            (Style::Italic, false) => "5",
            (Style::DoubleStrike, true) => "G",
            (Style::DoubleStrike, false) => "H",
            (Style::Underline, true) => "-1",
            (Style::Underline, false) => "-0",
            (Style::Superscript, true) => "S0",
            (Style::Subscript, true) => "S1",
            (Style::Superscript | Style::Subscript, false) => "T",
        };
        format!("{ESC}{code}")
    }
}

pub fn encoder_for(kind: DeviceKind) -> Box<dyn DeviceEncoder> {
    match kind {
        DeviceKind::Plain => Box::new(PlainEncoder),
        DeviceKind::Escp => Box::new(EscpEncoder),
    }
}
