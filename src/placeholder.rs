//! Placeholder grammar and the resolve → aggregate → format → pad pipeline.
//!
//! A placeholder expression is split on [`SEPARATOR`] into a base segment and
//! modifier segments:
//!
//! ```text
//! ${customer.name:20}            basic, width 20, left aligned
//! ${lines.amount:sum:currency:12:right}
//! {{ price * qty :number:10}}    scripted, modifiers peeled from the right
//! ```

use crate::config::FormatSettings;
use crate::engine::{Bindings, ExpressionEvaluator};
use crate::error::{PlaceholderError, PlaceholderErrorKind};
use crate::formatting::Formatter;
use crate::source::{first_having, DataSource};
use crate::value::Value;
use regex::Regex;
use std::sync::LazyLock;

/// Reserved separator between the base segment and the modifiers.
pub const SEPARATOR: char = ':';

/// The regex pattern for basic placeholders.
pub static BASIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(?P<expr>[^{}]+)\}").unwrap());

/// The regex pattern for scripted placeholders.
pub static SCRIPTED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(?P<expr>.+?)\}\}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    /// Member lookup against ranked data sources.
    Basic,
    /// Expression handed to an [`ExpressionEvaluator`].
    Scripted,
}

enum Modifier {
    Format(Formatter),
    Width(usize),
    Align(Alignment),
    Aggregate(Aggregate),
}

impl Modifier {
    fn parse(segment: &str) -> Option<Self> {
        let segment = segment.trim();
        if let Some(formatter) = Formatter::from_keyword(segment) {
            return Some(Modifier::Format(formatter));
        }
        if let Ok(width) = segment.parse::<usize>() {
            return Some(Modifier::Width(width));
        }
        match segment {
            "left" => Some(Modifier::Align(Alignment::Left)),
            "right" => Some(Modifier::Align(Alignment::Right)),
            "center" => Some(Modifier::Align(Alignment::Center)),
            "sum" => Some(Modifier::Aggregate(Aggregate::Sum)),
            "count" => Some(Modifier::Aggregate(Aggregate::Count)),
            _ => None,
        }
    }
}

/// A parsed placeholder expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    /// Raw expression text, as found between the delimiters.
    pub text: String,
    /// Member path (basic) or expression (scripted).
    pub base: String,
    pub formatter: Option<Formatter>,
    /// Output width, 0 means unconstrained.
    pub width: usize,
    pub alignment: Option<Alignment>,
    pub aggregate: Option<Aggregate>,
}

impl Placeholder {
    fn empty(kind: PlaceholderKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            base: String::new(),
            formatter: None,
            width: 0,
            alignment: None,
            aggregate: None,
        }
    }

    /// Parses the text of a `${...}` placeholder.
    pub fn basic(text: &str) -> Result<Self, PlaceholderError> {
        let mut placeholder = Self::empty(PlaceholderKind::Basic, text);
        let mut segments = text.split(SEPARATOR);
        let base = segments.next().unwrap_or_default().trim();
        if base.is_empty() {
            return Err(PlaceholderError::new(
                PlaceholderErrorKind::Syntax,
                "empty member name",
            ));
        }
        placeholder.base = base.to_string();
        for segment in segments {
            let modifier = Modifier::parse(segment).ok_or_else(|| {
                PlaceholderError::new(
                    PlaceholderErrorKind::Syntax,
                    format!("unknown modifier '{}'", segment.trim()),
                )
            })?;
            placeholder.apply(modifier)?;
        }
        Ok(placeholder)
    }

    /// Parses the text of a `{{...}}` placeholder. Modifiers are only taken
    /// from the end of the text, so the expression itself may contain the
    /// separator.
    pub fn scripted(text: &str) -> Result<Self, PlaceholderError> {
        let mut placeholder = Self::empty(PlaceholderKind::Scripted, text);
        let mut segments: Vec<&str> = text.split(SEPARATOR).collect();
        while segments.len() > 1 {
            let Some(modifier) = segments.last().and_then(|s| Modifier::parse(s)) else {
                break;
            };
            placeholder.apply(modifier)?;
            segments.pop();
        }
        let separator = SEPARATOR.to_string();
        let expression = segments.join(separator.as_str());
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(PlaceholderError::new(
                PlaceholderErrorKind::Syntax,
                "empty expression",
            ));
        }
        placeholder.base = expression.to_string();
        Ok(placeholder)
    }

    fn apply(&mut self, modifier: Modifier) -> Result<(), PlaceholderError> {
        match modifier {
            Modifier::Format(formatter) => {
                if self.formatter.is_some() {
                    return Err(PlaceholderError::new(
                        PlaceholderErrorKind::Syntax,
                        "more than one formatter",
                    ));
                }
                self.formatter = Some(formatter);
            }
            Modifier::Width(width) => self.width = width,
            Modifier::Align(alignment) => self.alignment = Some(alignment),
            Modifier::Aggregate(aggregate) => {
                if self.aggregate.is_some() {
                    return Err(PlaceholderError::new(
                        PlaceholderErrorKind::Syntax,
                        "sum and count are mutually exclusive",
                    ));
                }
                self.aggregate = Some(aggregate);
            }
        }
        Ok(())
    }

    /// Resolves the base value, before aggregation and formatting.
    pub fn value(
        &self,
        sources: &[&dyn DataSource],
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<Value, PlaceholderError> {
        match self.kind {
            PlaceholderKind::Basic => resolve_member(sources, &self.base),
            PlaceholderKind::Scripted => {
                let bindings = bindings(sources);
                evaluator
                    .evaluate(&self.base, &bindings)
                    .map_err(|e| PlaceholderError::new(PlaceholderErrorKind::EvaluationError, e.0))
            }
        }
    }

    /// Aggregates and formats a resolved value into unpadded text.
    pub fn render_value(
        &self,
        value: Value,
        settings: &FormatSettings,
    ) -> Result<String, PlaceholderError> {
        let value = match self.aggregate {
            Some(aggregate) => apply_aggregate(aggregate, value)?,
            None => value,
        };
        match self.formatter {
            Some(formatter) => formatter
                .format(&value, settings)
                .map_err(|detail| PlaceholderError::new(PlaceholderErrorKind::FormatError, detail)),
            None => Ok(value.to_text()),
        }
    }

    /// Runs the whole pipeline with left alignment as the default.
    pub fn render(
        &self,
        sources: &[&dyn DataSource],
        evaluator: &dyn ExpressionEvaluator,
        settings: &FormatSettings,
    ) -> Result<String, PlaceholderError> {
        let value = self.value(sources, evaluator)?;
        let text = self.render_value(value, settings)?;
        Ok(pad(
            &text,
            self.width,
            self.alignment.unwrap_or(Alignment::Left),
        ))
    }
}

/// Resolves a member path against the first source that has it. Sources that
/// answer `get` without `has` (the empty source) act as a silent fallback.
pub fn resolve_member(sources: &[&dyn DataSource], name: &str) -> Result<Value, PlaceholderError> {
    if let Some(source) = first_having(sources, name) {
        return Ok(source.get(name)?);
    }
    sources
        .iter()
        .find_map(|source| source.get(name).ok())
        .ok_or_else(|| {
            PlaceholderError::new(
                PlaceholderErrorKind::MissingMember,
                format!("no data source has member '{}'", name),
            )
        })
}

/// Exposes every member of the active sources by name. Higher-ranked sources
/// win on clashes.
pub fn bindings(sources: &[&dyn DataSource]) -> Bindings {
    let mut bindings = Bindings::new();
    for source in sources.iter().rev() {
        for member in source.members() {
            if let Ok(value) = source.get(&member) {
                bindings.insert(member, value);
            }
        }
    }
    bindings
}

fn apply_aggregate(aggregate: Aggregate, value: Value) -> Result<Value, PlaceholderError> {
    let mismatch = |detail: String| {
        PlaceholderError::new(PlaceholderErrorKind::AggregateTypeMismatch, detail)
    };
    let Value::List(items) = value else {
        return Err(mismatch(format!(
            "aggregate needs a collection, got a {}",
            value.kind_name()
        )));
    };
    if let Some(first) = items.first() {
        let kind = first.kind_name();
        if let Some(odd) = items.iter().find(|item| item.kind_name() != kind) {
            return Err(mismatch(format!(
                "collection mixes {} and {} values",
                kind,
                odd.kind_name()
            )));
        }
    }
    match aggregate {
        Aggregate::Count => Ok(Value::Int(items.len() as i64)),
        Aggregate::Sum => {
            if items.iter().any(|item| !item.is_numeric()) {
                return Err(mismatch("sum needs numeric values".to_string()));
            }
            if items.iter().all(|item| matches!(item, Value::Int(_))) {
                Ok(Value::Int(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::Int(i) => *i,
                            _ => 0,
                        })
                        .sum(),
                ))
            } else {
                Ok(Value::Float(items.iter().filter_map(Value::as_f64).sum()))
            }
        }
    }
}

/// Pads `text` to `width` characters, or truncates it. Width 0 leaves the
/// text untouched.
pub fn pad(text: &str, width: usize, alignment: Alignment) -> String {
    if width == 0 {
        return text.to_string();
    }
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }
    let gap = width - len;
    match alignment {
        Alignment::Left => format!("{}{}", text, " ".repeat(gap)),
        Alignment::Right => format!("{}{}", " ".repeat(gap), text),
        Alignment::Center => {
            let left = gap / 2;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(gap - left))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScriptEngine;
    use crate::source::{EmptySource, JsonSource, MapSource};
    use serde_json::json;

    fn render(placeholder: &Placeholder, sources: &[&dyn DataSource]) -> Result<String, PlaceholderError> {
        placeholder.render(sources, &ScriptEngine::new(), &FormatSettings::default())
    }

    #[test]
    fn test_parse_basic_modifiers_in_any_order() {
        let p = Placeholder::basic("amount:right:currency:12").unwrap();
        assert_eq!(p.base, "amount");
        assert_eq!(p.formatter, Some(Formatter::Currency));
        assert_eq!(p.width, 12);
        assert_eq!(p.alignment, Some(Alignment::Right));
        assert_eq!(p.aggregate, None);
    }

    #[test]
    fn test_parse_basic_rejects_bad_modifiers() {
        let err = Placeholder::basic("name:bogus").unwrap_err();
        assert_eq!(err.kind, PlaceholderErrorKind::Syntax);
        assert!(Placeholder::basic("items:sum:count").is_err());
        assert!(Placeholder::basic("n:number:currency").is_err());
        assert!(Placeholder::basic(":10").is_err());
    }

    #[test]
    fn test_parse_scripted_peels_modifiers_from_the_right() {
        let p = Placeholder::scripted(" items[1:3] | length :number:8").unwrap();
        assert_eq!(p.base, "items[1:3] | length");
        assert_eq!(p.formatter, Some(Formatter::Number));
        assert_eq!(p.width, 8);
    }

    #[test]
    fn test_render_width_and_alignment() {
        let source = MapSource::default().with("name", "Snake").with("score", 80);
        let sources: Vec<&dyn DataSource> = vec![&source];
        assert_eq!(render(&Placeholder::basic("name:8").unwrap(), &sources).unwrap(), "Snake   ");
        assert_eq!(
            render(&Placeholder::basic("score:5:right").unwrap(), &sources).unwrap(),
            "   80"
        );
        assert_eq!(
            render(&Placeholder::basic("name:9:center").unwrap(), &sources).unwrap(),
            "  Snake  "
        );
        assert_eq!(render(&Placeholder::basic("name:3").unwrap(), &sources).unwrap(), "Sna");
    }

    #[test]
    fn test_render_aggregates() {
        let source = JsonSource::from_json(json!({
            "lines": [{"amount": 10}, {"amount": 15.5}],
            "tags": ["a", "b", "c"],
            "mixed": [1, "x"]
        }));
        let sources: Vec<&dyn DataSource> = vec![&source];
        assert_eq!(
            render(&Placeholder::basic("lines.amount:sum").unwrap(), &sources).unwrap(),
            "25.5"
        );
        assert_eq!(render(&Placeholder::basic("tags:count").unwrap(), &sources).unwrap(), "3");
        let err = render(&Placeholder::basic("tags:sum").unwrap(), &sources).unwrap_err();
        assert_eq!(err.kind, PlaceholderErrorKind::AggregateTypeMismatch);
        let err = render(&Placeholder::basic("mixed:count").unwrap(), &sources).unwrap_err();
        assert_eq!(err.kind, PlaceholderErrorKind::AggregateTypeMismatch);
    }

    #[test]
    fn test_render_missing_member() {
        let source = MapSource::default().with("name", "Snake");
        let sources: Vec<&dyn DataSource> = vec![&source];
        let err = render(&Placeholder::basic("age").unwrap(), &sources).unwrap_err();
        assert_eq!(err.kind, PlaceholderErrorKind::MissingMember);
    }

    #[test]
    fn test_render_empty_source_is_blank() {
        let sources: Vec<&dyn DataSource> = vec![&EmptySource];
        assert_eq!(render(&Placeholder::basic("anything:4").unwrap(), &sources).unwrap(), "    ");
    }

    #[test]
    fn test_render_format_error() {
        let source = MapSource::default().with("name", "Snake");
        let sources: Vec<&dyn DataSource> = vec![&source];
        let err = render(&Placeholder::basic("name:currency").unwrap(), &sources).unwrap_err();
        assert_eq!(err.kind, PlaceholderErrorKind::FormatError);
    }

    #[test]
    fn test_render_scripted() {
        let source = MapSource::default().with("price", 2.5).with("qty", 4);
        let sources: Vec<&dyn DataSource> = vec![&source];
        let p = Placeholder::scripted("price * qty:currency").unwrap();
        assert_eq!(render(&p, &sources).unwrap(), "$10.00");
        let p = Placeholder::scripted("nothing_here + 1").unwrap();
        assert_eq!(
            render(&p, &sources).unwrap_err().kind,
            PlaceholderErrorKind::EvaluationError
        );
    }

    #[test]
    fn test_bindings_prefer_higher_rank() {
        let first = MapSource::default().with("name", "first");
        let second = MapSource::default().with("name", "second").with("only", 1);
        let sources: Vec<&dyn DataSource> = vec![&first, &second];
        let bindings = bindings(&sources);
        assert_eq!(bindings["name"], "first".into());
        assert_eq!(bindings["only"], Value::Int(1));
    }

    #[test]
    fn test_patterns() {
        let caps = BASIC_PATTERN.captures("Name: ${name:10}").unwrap();
        assert_eq!(&caps["expr"], "name:10");
        let caps = SCRIPTED_PATTERN.captures("Total {{ a + b }}.").unwrap();
        assert_eq!(&caps["expr"], " a + b ");
    }
}
