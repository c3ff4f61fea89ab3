use crate::config::FormatSettings;
use crate::engine::ExpressionEvaluator;
use crate::error::FillError;
use crate::placeholder::{Alignment, Placeholder, PlaceholderKind, BASIC_PATTERN, SCRIPTED_PATTERN};
use crate::source::DataSource;
use log::debug;
use regex::Regex;
use std::collections::HashMap;

/// A resolved table cell before padding.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub numeric: bool,
    pub alignment: Option<Alignment>,
}

/// Substitution passes with a parse cache keyed by expression text.
///
/// Only parsed placeholders are cached; values are resolved again for every
/// occurrence, so one resolver serves any number of rows and pages.
pub struct Resolver<'a> {
    evaluator: &'a dyn ExpressionEvaluator,
    settings: &'a FormatSettings,
    cache: HashMap<(PlaceholderKind, String), Placeholder>,
}

impl<'a> Resolver<'a> {
    pub fn new(evaluator: &'a dyn ExpressionEvaluator, settings: &'a FormatSettings) -> Self {
        Self {
            evaluator,
            settings,
            cache: HashMap::new(),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn placeholder(&mut self, kind: PlaceholderKind, text: &str) -> Result<&Placeholder, FillError> {
        let key = (kind, text.to_string());
        if !self.cache.contains_key(&key) {
            let parsed = match kind {
                PlaceholderKind::Basic => Placeholder::basic(text),
                PlaceholderKind::Scripted => Placeholder::scripted(text),
            }
            .map_err(|e| e.at(text))?;
            debug!("Parsed placeholder '{}'", text);
            self.cache.insert(key.clone(), parsed);
        }
        Ok(&self.cache[&key])
    }

    /// Replaces every `${...}` in `text`.
    pub fn basic_pass(&mut self, text: &str, sources: &[&dyn DataSource]) -> Result<String, FillError> {
        self.pass(&BASIC_PATTERN, PlaceholderKind::Basic, text, sources)
    }

    /// Replaces every `{{...}}` in `text`.
    pub fn scripted_pass(&mut self, text: &str, sources: &[&dyn DataSource]) -> Result<String, FillError> {
        self.pass(&SCRIPTED_PATTERN, PlaceholderKind::Scripted, text, sources)
    }

    fn pass(
        &mut self,
        pattern: &Regex,
        kind: PlaceholderKind,
        text: &str,
        sources: &[&dyn DataSource],
    ) -> Result<String, FillError> {
        let mut out = String::with_capacity(text.len());
        let mut last_pos = 0;
        for caps in pattern.captures_iter(text) {
            let (Some(whole), Some(expr)) = (caps.get(0), caps.name("expr")) else {
                continue;
            };
            let evaluator = self.evaluator;
            let settings = self.settings;
            let placeholder = self.placeholder(kind, expr.as_str())?;
            let rendered = placeholder
                .render(sources, evaluator, settings)
                .map_err(|e| e.at(expr.as_str()))?;
            out.push_str(&text[last_pos..whole.start()]);
            out.push_str(&rendered);
            last_pos = whole.end();
        }
        out.push_str(&text[last_pos..]);
        Ok(out)
    }

    /// Resolves a table column expression. `{{...}}` is scripted, `${...}`
    /// or a bare expression is basic.
    pub fn cell(&mut self, column_text: &str, sources: &[&dyn DataSource]) -> Result<Cell, FillError> {
        let trimmed = column_text.trim();
        let (kind, expr) = if let Some(inner) = trimmed
            .strip_prefix("{{")
            .and_then(|rest| rest.strip_suffix("}}"))
        {
            (PlaceholderKind::Scripted, inner)
        } else if let Some(inner) = trimmed
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
        {
            (PlaceholderKind::Basic, inner)
        } else {
            (PlaceholderKind::Basic, trimmed)
        };
        let evaluator = self.evaluator;
        let settings = self.settings;
        let placeholder = self.placeholder(kind, expr)?;
        let value = placeholder
            .value(sources, evaluator)
            .map_err(|e| e.at(expr))?;
        let numeric = value.is_numeric()
            || placeholder.aggregate.is_some()
            || placeholder.formatter.is_some_and(|f| f.is_numeric());
        let alignment = placeholder.alignment;
        let text = placeholder
            .render_value(value, settings)
            .map_err(|e| e.at(expr))?;
        Ok(Cell {
            text,
            numeric,
            alignment,
        })
    }
}
