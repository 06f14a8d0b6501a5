//! Pipeline specification data structures.
//!
//! A [`PipelineSpec`] is the whole configuration of a run: where to read,
//! which columns to expect and how to type them, what to do with missing
//! values, and where to write. It round-trips through JSON so a run can be
//! reproduced from a file:
//!
//! ```json
//! {
//!   "version": "0.1",
//!   "name": "sales",
//!   "missing": "drop",
//!   "schema": {
//!     "match_mode": "strict",
//!     "fields": [
//!       { "name": "quantity", "aliases": ["qty"], "kind": "numeric",
//!         "required": true, "impute": "zero", "non_negative": true }
//!     ]
//!   }
//! }
//! ```
//!
//! Every section has defaults, so `{}` parses to [`PipelineSpec::default_sales`].

use crate::error::{Result, ResultExt as _};
use crate::utils::{DATA_PROCESSED_FILE, DATA_RAW_FILE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current pipeline spec version
pub const SPEC_VERSION: &str = "0.1";

/// Root pipeline specification structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Specification version for future migrations
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable pipeline name
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub input: InputConfig,

    /// Expected columns and how to treat them
    #[serde(default)]
    pub schema: SchemaConfig,

    /// What to do with rows missing a numeric value
    #[serde(default)]
    pub missing: MissingPolicy,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for PipelineSpec {
    fn default() -> Self {
        Self::default_sales()
    }
}

impl PipelineSpec {
    /// A spec with no declared fields: only names and whitespace are cleaned.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: SPEC_VERSION.to_owned(),
            name: name.into(),
            input: InputConfig::default(),
            schema: SchemaConfig {
                match_mode: SchemaMatchMode::Tolerant,
                fields: Vec::new(),
            },
            missing: MissingPolicy::default(),
            output: OutputConfig::default(),
        }
    }

    /// The built-in sales schema: `product`, `category`, `quantity` (alias
    /// `qty`, missing -> 0) and `price` (missing -> median).
    pub fn default_sales() -> Self {
        Self {
            schema: SchemaConfig::default(),
            ..Self::new(default_name())
        }
    }

    /// Load a pipeline spec from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline spec {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Parse a pipeline spec from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save pipeline spec to a JSON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write pipeline spec {}", path.display()))
    }

    /// Serialize pipeline spec to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Input file configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path of the raw file, relative to the base directory
    #[serde(default = "default_input_path")]
    pub path: String,

    /// Field delimiter (a single ASCII character)
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            delimiter: default_delimiter(),
        }
    }
}

/// Output file configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output path template (supports {date} substitution)
    #[serde(default = "default_output_path")]
    pub path_template: String,

    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Whether to overwrite existing files
    #[serde(default = "default_true")]
    pub overwrite: bool,

    /// Rows shown in the console preview
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path_template: default_output_path(),
            delimiter: default_delimiter(),
            overwrite: default_true(),
            preview_rows: default_preview_rows(),
        }
    }
}

/// Schema validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub match_mode: SchemaMatchMode,

    /// Expected columns, processed in this order by every stage
    #[serde(default = "default_sales_fields")]
    pub fields: Vec<FieldSpec>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            match_mode: SchemaMatchMode::Tolerant,
            fields: default_sales_fields(),
        }
    }
}

impl SchemaConfig {
    /// Match each field against the (already normalized) column names.
    pub fn resolve<S: AsRef<str>>(&self, columns: &[S]) -> Resolution<'_> {
        let mut resolution = Resolution::default();
        for field in &self.fields {
            let found = field
                .candidates()
                .find(|candidate| columns.iter().any(|c| c.as_ref() == *candidate));
            match found {
                Some(column) => resolution.present.push(ResolvedField {
                    spec: field,
                    column: column.to_owned(),
                }),
                None => resolution.missing.push(field),
            }
        }
        resolution
    }
}

/// Schema matching mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaMatchMode {
    /// Absent fields are skipped with a warning
    #[default]
    Tolerant,

    /// Absent required fields abort the run
    Strict,
}

/// One expected column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Normalized column name
    pub name: String,

    /// Other normalized names accepted for this column (e.g. `qty`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    pub kind: ColumnKind,

    #[serde(default)]
    pub required: bool,

    /// How to fill missing values under the impute policy (numeric only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impute: Option<ImputeStrategy>,

    /// Drop rows where this column is negative (numeric only)
    #[serde(default)]
    pub non_negative: bool,
}

impl FieldSpec {
    fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            kind,
            required: false,
            impute: None,
            non_negative: false,
        }
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Numeric)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn impute(mut self, strategy: ImputeStrategy) -> Self {
        self.impute = Some(strategy);
        self
    }

    #[must_use]
    pub fn non_negative(mut self) -> Self {
        self.non_negative = true;
        self
    }

    /// The field name followed by its aliases, in match priority order.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// A field matched to a column present in the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField<'a> {
    pub spec: &'a FieldSpec,
    /// The column name actually found (the field name or one of its aliases)
    pub column: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution<'a> {
    pub present: Vec<ResolvedField<'a>>,
    pub missing: Vec<&'a FieldSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
        }
    }
}

/// Imputation strategy for missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputeStrategy {
    Zero,
    Median,
    Mean,
}

impl ImputeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Median => "median",
            Self::Mean => "mean",
        }
    }
}

/// What happens to a row with a missing numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Fill each numeric field with its declared [`ImputeStrategy`]
    #[default]
    Impute,

    /// Drop the row
    Drop,
}

impl MissingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Impute => "impute",
            Self::Drop => "drop",
        }
    }
}

/// Parse a delimiter setting into the single byte the CSV reader expects.
pub fn parse_delimiter(delimiter: &str) -> Option<u8> {
    match delimiter.as_bytes() {
        [b] if b.is_ascii() => Some(*b),
        _ => None,
    }
}

fn default_sales_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("product"),
        FieldSpec::text("category"),
        FieldSpec::numeric("quantity")
            .alias("qty")
            .required()
            .impute(ImputeStrategy::Zero)
            .non_negative(),
        FieldSpec::numeric("price")
            .required()
            .impute(ImputeStrategy::Median)
            .non_negative(),
    ]
}

// Default value functions
fn default_version() -> String {
    SPEC_VERSION.to_owned()
}

fn default_name() -> String {
    "sales".to_owned()
}

fn default_input_path() -> String {
    DATA_RAW_FILE.to_owned()
}

fn default_output_path() -> String {
    DATA_PROCESSED_FILE.to_owned()
}

fn default_delimiter() -> String {
    ",".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_preview_rows() -> usize {
    5
}
