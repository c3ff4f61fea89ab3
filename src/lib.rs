//! Pagination and template fill for impact printers.
//!
//! A [`Report`] is laid out as fixed-length pages of header, content and
//! footer lines. [`fill`] resolves the placeholders in every line against a
//! ranked list of [`DataSource`]s, expands table and list markers into rows
//! that flow over as many pages as they need, and emits the text framed by
//! the directives of a [`device::DeviceEncoder`].
//!
//! ```
//! use lpfill::{fill, MapSource, Report};
//!
//! let mut report = Report::bounded(3)
//!     .with_header(["This is header."])
//!     .with_footer(["This is footer."]);
//! report.append_text("Name: ${name}").unwrap();
//!
//! let data = MapSource::default().with("name", "Solid Snake");
//! let out = fill(&report, &[&data]).unwrap();
//! assert_eq!(out, "This is header.\nName: Solid Snake\nThis is footer.\x0c");
//! ```

pub mod config;
pub mod device;
pub mod document;
pub mod engine;
pub mod error;
pub mod expand;
pub mod fill;
pub mod filters;
pub mod formatting;
pub mod functions;
pub mod placeholder;
pub mod resolver;
pub mod source;
pub mod value;
pub mod wrap;

pub use config::{FillConfig, FormatSettings, PageFormat};
pub use device::{EscpEncoder, PlainEncoder};
pub use document::{Line, LineKind, ListLine, Page, Report, TableColumn, TableLine};
pub use engine::{ExpressionEvaluator, ScriptEngine};
pub use error::FillError;
pub use fill::{fill, FillJob};
pub use placeholder::Alignment;
pub use source::{DataSource, EmptySource, JsonSource, MapSource, ObjectSource};
pub use value::{ObjectRef, PropertyBag, Value};
