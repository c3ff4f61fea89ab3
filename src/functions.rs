//! `%{...}` directives: page/line numbers, character codes and style toggles.

use crate::device::{DeviceEncoder, Style};
use log::debug;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// The regex pattern for built-in functions.
pub static FUNCTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\{(?P<name>[^{}]+)\}").unwrap());

/// `%{65}` or `%{65 R3}`
static CHAR_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<code>\d+)(?:\s+R(?P<repeat>\d+))?$").unwrap());

/// Largest `Rk` repeat count; anything above is not a directive.
const MAX_REPEAT: usize = 1024;

/// Position of the line being rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineContext {
    pub page_number: usize,
    pub line_number: usize,
    pub global_line_number: usize,
}

/// Toggle state of the style directives. Everything starts off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Functions {
    bold: bool,
    italic: bool,
    double_strike: bool,
    underline: bool,
    superscript: bool,
    subscript: bool,
}

impl Functions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_on(&self, style: Style) -> bool {
        match style {
            Style::Bold => self.bold,
            Style::Italic => self.italic,
            Style::DoubleStrike => self.double_strike,
            Style::Underline => self.underline,
            Style::Superscript => self.superscript,
            Style::Subscript => self.subscript,
        }
    }

    fn toggle(&mut self, style: Style) -> bool {
        let flag = match style {
            Style::Bold => &mut self.bold,
            Style::Italic => &mut self.italic,
            Style::DoubleStrike => &mut self.double_strike,
            Style::Underline => &mut self.underline,
            Style::Superscript => &mut self.superscript,
            Style::Subscript => &mut self.subscript,
        };
        *flag = !*flag;
        let on = *flag;
        if on {
            match style {
                Style::Superscript => self.subscript = false,
                Style::Subscript => self.superscript = false,
                _ => {}
            }
        }
        on
    }

    /// Replaces every directive in `text`. Unknown directives stay as written.
    pub fn apply(&mut self, text: &str, context: LineContext, encoder: &dyn DeviceEncoder) -> String {
        FUNCTION_PATTERN
            .replace_all(text, |caps: &Captures| {
                let name = caps["name"].trim();
                match self.evaluate(name, context, encoder) {
                    Some(output) => output,
                    None => {
                        debug!("Unknown function '{}' left in place", name);
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    fn evaluate(&mut self, name: &str, context: LineContext, encoder: &dyn DeviceEncoder) -> Option<String> {
        let style = match name {
            "PAGE_NO" => return Some(context.page_number.to_string()),
            "LINE_NO" => return Some(context.line_number.to_string()),
            "GLOBAL_LINE_NO" => return Some(context.global_line_number.to_string()),
            "BOLD" => Style::Bold,
            "ITALIC" => Style::Italic,
            "DOUBLE" => Style::DoubleStrike,
            "UNDERLINE" => Style::Underline,
            "SUPER" => Style::Superscript,
            "SUB" => Style::Subscript,
            _ => return char_code(name),
        };
        let on = self.toggle(style);
        Some(encoder.style(style, on))
    }
}

fn char_code(name: &str) -> Option<String> {
    let caps = CHAR_CODE_PATTERN.captures(name)?;
    let code: u32 = caps["code"].parse().ok()?;
    let ch = char::from_u32(code)?;
    let repeat: usize = match caps.name("repeat") {
        Some(repeat) => repeat.as_str().parse().ok()?,
        None => 1,
    };
    if repeat > MAX_REPEAT {
        return None;
    }
    Some(std::iter::repeat(ch).take(repeat).collect())
}
