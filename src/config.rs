use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Page-format parameters owned by a [`crate::document::Report`].
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PageFormat {
    /// Lines per page, `None` for continuous paper.
    #[serde(default)]
    pub page_length: Option<usize>,
    /// Characters per line.
    #[serde(default)]
    pub page_width: Option<usize>,
    #[serde(default)]
    pub left_margin: Option<usize>,
    #[serde(default)]
    pub right_margin: Option<usize>,
    #[serde(default)]
    pub bottom_margin: Option<usize>,
    #[serde(default)]
    pub line_spacing: Option<LineSpacing>,
    #[serde(default)]
    pub pitch: Option<CharacterPitch>,
    /// The printer feeds a line on carriage return by itself.
    #[serde(default)]
    pub auto_line_feed: bool,
    /// Every page ends with a hard page break.
    #[serde(default = "default_auto_form_feed")]
    pub auto_form_feed: bool,
}

fn default_auto_form_feed() -> bool {
    true
}

impl Default for PageFormat {
    fn default() -> Self {
        Self {
            page_length: None,
            page_width: None,
            left_margin: None,
            right_margin: None,
            bottom_margin: None,
            line_spacing: None,
            pitch: None,
            auto_line_feed: false,
            auto_form_feed: default_auto_form_feed(),
        }
    }
}

impl PageFormat {
    pub fn with_page_length(mut self, page_length: usize) -> Self {
        self.page_length = Some(page_length);
        self
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LineSpacing {
    OneEighthInch,
    OneSixthInch,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CharacterPitch {
    /// 10 cpi
    Pica,
    /// 12 cpi
    Elite,
    /// 15 cpi
    Micron,
}

/// Locale-like settings for the numeric formatters.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FormatSettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_grouping_separator")]
    pub grouping_separator: char,
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,
    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: usize,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            grouping_separator: default_grouping_separator(),
            decimal_separator: default_decimal_separator(),
            currency_decimals: default_currency_decimals(),
        }
    }
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_grouping_separator() -> char {
    ','
}

fn default_decimal_separator() -> char {
    '.'
}

fn default_currency_decimals() -> usize {
    2
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    #[default]
    Plain,
    Escp,
}

/// A fill job description as read by the command line tool.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FillConfig {
    #[serde(default)]
    pub page_format: PageFormat,
    #[serde(default)]
    pub format: FormatSettings,
    #[serde(default)]
    pub device: DeviceKind,
    #[serde(default)]
    pub header: Vec<String>,
    #[serde(default)]
    pub footer: Vec<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl FillConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: FillConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }
}
