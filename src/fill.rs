//! The fill orchestrator: report template plus data in, device text out.

use crate::config::FormatSettings;
use crate::device::{DeviceEncoder, PlainEncoder};
use crate::document::Report;
use crate::engine::{ExpressionEvaluator, ScriptEngine};
use crate::error::FillError;
use crate::expand::expand;
use crate::functions::{Functions, LineContext};
use crate::resolver::Resolver;
use crate::source::{DataSource, EmptySource};
use log::{debug, info};

/// One fill of one report. The job owns its function toggle state and
/// placeholder cache, so it is consumed by [`FillJob::fill`].
pub struct FillJob {
    encoder: Box<dyn DeviceEncoder>,
    evaluator: Box<dyn ExpressionEvaluator>,
    settings: FormatSettings,
    functions: Functions,
}

impl Default for FillJob {
    fn default() -> Self {
        Self::new()
    }
}

impl FillJob {
    /// Plain encoder, [`ScriptEngine`] evaluator and default format settings.
    pub fn new() -> Self {
        Self {
            encoder: Box::new(PlainEncoder),
            evaluator: Box::new(ScriptEngine::new()),
            settings: FormatSettings::default(),
            functions: Functions::new(),
        }
    }

    pub fn with_encoder(mut self, encoder: Box<dyn DeviceEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_evaluator(mut self, evaluator: Box<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_settings(mut self, settings: FormatSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Fills `report` from `sources`, ranked first to last.
    ///
    /// The report is never modified: tables and lists are expanded in a
    /// working copy. Nothing is returned unless every placeholder resolves.
    pub fn fill(mut self, report: &Report, sources: &[&dyn DataSource]) -> Result<String, FillError> {
        self.functions.reset();
        let empty = EmptySource;
        let fallback: [&dyn DataSource; 1] = [&empty];
        let sources = if sources.is_empty() {
            debug!("No data sources given, using the empty source");
            &fallback[..]
        } else {
            sources
        };

        let mut resolver = Resolver::new(self.evaluator.as_ref(), &self.settings);
        let mut working = report.clone();
        if working.has_dynamic_lines() {
            expand(&mut working, sources, &mut resolver)?;
        }
        working.number_lines();

        let format = working.format();
        let encoder = self.encoder.as_ref();
        let line_break = encoder.line_break(format);
        let page_break = encoder.page_break();

        let mut out = encoder.page_format(format);
        for page in working.pages() {
            debug!("Rendering page {}", page.number());
            let mut lines = Vec::with_capacity(page.len());
            for line in page.lines() {
                let text = resolver.basic_pass(line.content(), sources)?;
                let text = resolver.scripted_pass(&text, sources)?;
                let context = LineContext {
                    page_number: page.number(),
                    line_number: line.line_number().unwrap_or_default(),
                    global_line_number: line.global_line_number().unwrap_or_default(),
                };
                lines.push(self.functions.apply(&text, context, encoder));
            }
            out.push_str(&lines.join(line_break.as_str()));
            if !format.auto_form_feed {
                out.push_str(&line_break);
            } else if !out.ends_with(&page_break) {
                out.push_str(&page_break);
            }
        }
        if format.auto_form_feed && !out.ends_with(&page_break) {
            out.push_str(&page_break);
        }
        out.push_str(&encoder.initialize());

        info!(
            "Filled {} pages, {} placeholders parsed",
            working.pages().len(),
            resolver.cached()
        );
        Ok(out)
    }
}

/// Fills `report` with the plain encoder and default settings.
pub fn fill(report: &Report, sources: &[&dyn DataSource]) -> Result<String, FillError> {
    FillJob::new().fill(report, sources)
}
