//! Pipeline configuration: the case-number grammar, filename category rules,
//! the group color palette and the input column layout.
//!
//! Every field has a default matching the tribunal's export convention, so an
//! empty JSON object (`{}`) is a valid config file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ConfigError;
use crate::models::Category;

/// Points at a JSON config file used when `--config` is not given.
pub const CONFIG_ENV: &str = "DECISION_REPORT_CONFIG";
/// Overrides the input sheet name.
pub const SHEET_ENV: &str = "DECISION_REPORT_SHEET";

fn load_env() {
    let _ = dotenvy::dotenv();
}

/// Textual convention for case numbers embedded in a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaseGrammar {
    /// Tokens introducing a case number, matched case-insensitively.
    pub prefixes: Vec<String>,
    /// Characters chaining further numbers onto the previous one (`CAS 2020 A 1 + 2`).
    pub delimiters: Vec<char>,
    /// When true a case number needs `YEAR SERIES` before the number.
    pub require_qualifier: bool,
    /// Accept `(YEAR SERIES NUMBER)` without a prefix when a title has no
    /// prefixed case number.
    pub allow_bare_parenthesized: bool,
    /// Prefix given to case numbers found that way.
    pub bare_prefix: String,
}

impl Default for CaseGrammar {
    fn default() -> Self {
        Self {
            prefixes: vec!["CAS".to_string(), "TAS".to_string()],
            delimiters: vec!['+', '&'],
            require_qualifier: true,
            allow_bare_parenthesized: true,
            bare_prefix: "CAS".to_string(),
        }
    }
}

impl CaseGrammar {
    /// Grammar for titles like `Case 12` (no year/series part).
    pub fn unqualified(prefix: &str) -> Self {
        Self {
            prefixes: vec![prefix.to_string()],
            require_qualifier: false,
            bare_prefix: prefix.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.prefixes.is_empty() {
            return Err(ConfigError::NoPrefixes);
        }
        if let Some(bad) = self
            .prefixes
            .iter()
            .find(|p| !is_plain_prefix(p))
        {
            return Err(ConfigError::InvalidPrefix(bad.clone()));
        }
        if self.delimiters.is_empty() {
            return Err(ConfigError::NoDelimiters);
        }
        if self.allow_bare_parenthesized && !is_plain_prefix(&self.bare_prefix) {
            return Err(ConfigError::InvalidPrefix(self.bare_prefix.clone()));
        }
        Ok(())
    }
}

fn is_plain_prefix(prefix: &str) -> bool {
    !prefix.is_empty() && prefix.chars().all(char::is_alphanumeric)
}

/// How a category rule looks at the filename. Comparison ignores case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilenameMatch {
    Contains(String),
    StartsWith(String),
}

impl FilenameMatch {
    pub fn matches(&self, filename: &str) -> bool {
        let filename = filename.to_lowercase();
        match self {
            FilenameMatch::Contains(token) => filename.contains(&token.to_lowercase()),
            FilenameMatch::StartsWith(token) => filename.starts_with(&token.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRule {
    pub category: Category,
    pub matcher: FilenameMatch,
}

impl CategoryRule {
    pub fn contains(category: Category, token: &str) -> Self {
        Self {
            category,
            matcher: FilenameMatch::Contains(token.to_string()),
        }
    }

    pub fn starts_with(category: Category, token: &str) -> Self {
        Self {
            category,
            matcher: FilenameMatch::StartsWith(token.to_string()),
        }
    }
}

/// Input sheet layout (0-based column indices, header in row 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Sheet to read; first sheet when unset.
    pub sheet: Option<String>,
    pub filename_column: usize,
    pub date_column: usize,
    /// Column holding the case-number text; the filename is used when unset.
    pub case_text_column: Option<usize>,
    /// Fall back to a `YYYY MM DD` filename prefix when the date cell is empty.
    pub date_from_filename: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            sheet: None,
            filename_column: 0,
            date_column: 2,
            case_text_column: None,
            date_from_filename: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    pub grammar: CaseGrammar,
    /// Checked in order, first match wins.
    pub categories: Vec<CategoryRule>,
    /// Group fill colors as `RRGGBB` hex, cycled by group index.
    pub palette: Vec<String>,
    pub loader: LoaderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            grammar: CaseGrammar::default(),
            categories: vec![
                CategoryRule::contains(Category::Archive, "web archives"),
                CategoryRule::contains(Category::Bull, "bull"),
            ],
            palette: ["FFFF99", "FFCC99", "FF9999", "99CCFF", "99FF99"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            loader: LoaderConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Read and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Config from an explicit file, else from `DECISION_REPORT_CONFIG`, else defaults.
    /// `DECISION_REPORT_SHEET` overrides the input sheet in every case.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        load_env();
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match std::env::var(CONFIG_ENV) {
                Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
                _ => Self::default(),
            },
        };
        if let Ok(sheet) = std::env::var(SHEET_ENV) {
            if !sheet.trim().is_empty() {
                config.loader.sheet = Some(sheet.trim().to_string());
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grammar.validate()?;
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        for color in &self.palette {
            parse_hex_color(color)?;
        }
        Ok(())
    }

    pub fn palette_size(&self) -> usize {
        self.palette.len()
    }

    /// Palette as `0xRRGGBB` values. Call after `validate`.
    pub fn palette_rgb(&self) -> Result<Vec<u32>, ConfigError> {
        self.palette.iter().map(|c| parse_hex_color(c)).collect()
    }
}

/// `RRGGBB` or `#RRGGBB` to `0xRRGGBB`.
fn parse_hex_color(raw: &str) -> Result<u32, ConfigError> {
    let hex = raw.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidColor(raw.to_string()));
    }
    u32::from_str_radix(hex, 16).map_err(|_| ConfigError::InvalidColor(raw.to_string()))
}
