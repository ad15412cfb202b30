//! Command-line front end for criteria-query.
//!
//! `critq` loads a schema file, reads criteria and ordering as JSON, and
//! prints the translated query with its bound parameters.
//!
//! The schema file is YAML (`.yaml`, `.yml`) or JSON (`.json`):
//!
//! ```yaml
//! options:
//!   alias_prefix: _t
//!   parameter_prefix: parameter_
//! entities:
//!   User:
//!     fields: [id, name]
//!     associations:
//!       address: Address
//!   Address:
//!     fields: [id, city]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use criteria_query::{Criteria, Repository, Schema, SelectQuery, Sort, TranslatorOptions};
use serde::de::IgnoredAny;
use serde::Deserialize;

/// Translate criteria into a parameterized entity query.
#[derive(Debug, Parser)]
#[command(name = "critq")]
#[command(version)]
#[command(about = "Translate JSON criteria into a parameterized entity query")]
pub struct Cli {
    /// Schema file (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Root entity
    #[arg(short, long)]
    pub entity: String,

    /// Criteria as a JSON object, e.g. '{"address.city": "Paris"}'
    #[arg(short, long, default_value = "{}")]
    pub criteria: String,

    /// Ordering as a JSON object, e.g. '{"name": "ASC"}'
    #[arg(short, long, value_name = "JSON")]
    pub order_by: Option<String>,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Number of results to skip
    #[arg(long)]
    pub offset: Option<usize>,

    /// Count matching entities instead of selecting them
    #[arg(long, conflicts_with_all = ["one", "order_by", "limit", "offset"])]
    pub count: bool,

    /// Select at most one entity
    #[arg(long, conflicts_with_all = ["limit", "offset"])]
    pub one: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// How the translated query is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Query on the first line, one `name = value` line per parameter.
    Text,
    /// A `{"query": ..., "parameters": {...}}` object.
    Json,
}

/// Contents of a schema file.
///
/// Only `options` and `entities` are accepted at the top level.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "SchemaFileDef")]
pub struct SchemaFile {
    /// Translator options.
    pub options: TranslatorOptions,
    /// Entity metadata.
    pub schema: Schema,
}

#[derive(Deserialize)]
struct SchemaFileDef {
    #[serde(default)]
    options: TranslatorOptions,
    #[serde(flatten)]
    schema: Schema,
    #[serde(flatten)]
    unknown: BTreeMap<String, IgnoredAny>,
}

impl TryFrom<SchemaFileDef> for SchemaFile {
    type Error = String;

    fn try_from(def: SchemaFileDef) -> std::result::Result<Self, String> {
        if !def.unknown.is_empty() {
            let keys: Vec<&str> = def.unknown.keys().map(String::as_str).collect();
            return Err(format!(
                "unknown top-level key(s) {}, expected `options` or `entities`",
                keys.join(", ")
            ));
        }
        Ok(SchemaFile {
            options: def.options,
            schema: def.schema,
        })
    }
}

impl SchemaFile {
    /// Loads and validates a schema file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read schema file {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let file: SchemaFile = match extension.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&text)
                .with_context(|| format!("invalid YAML schema {}", path.display()))?,
            Some("json") => serde_json::from_str(&text)
                .with_context(|| format!("invalid JSON schema {}", path.display()))?,
            _ => bail!(
                "unsupported schema file extension: {} (expected .yaml, .yml or .json)",
                path.display()
            ),
        };

        file.schema
            .validate()
            .with_context(|| format!("inconsistent schema {}", path.display()))?;
        file.options
            .validate()
            .with_context(|| format!("invalid options in {}", path.display()))?;

        tracing::debug!(
            path = %path.display(),
            entities = file.schema.entity_names().count(),
            "loaded schema"
        );
        Ok(file)
    }
}

/// Which find operation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `find_by`
    Find,
    /// `find_one_by`
    One,
    /// `find_count_by`
    Count,
}

impl Cli {
    /// Operation selected by the flags.
    pub fn mode(&self) -> Mode {
        if self.count {
            Mode::Count
        } else if self.one {
            Mode::One
        } else {
            Mode::Find
        }
    }
}

/// Parses criteria JSON.
pub fn parse_criteria(json: &str) -> Result<Criteria> {
    serde_json::from_str(json).context("invalid criteria JSON")
}

/// Parses ordering JSON.
pub fn parse_order_by(json: &str) -> Result<Sort> {
    serde_json::from_str(json).context("invalid order-by JSON")
}

/// Translates `criteria` against `file` for the given operation.
pub fn translate(
    file: &SchemaFile,
    entity: &str,
    mode: Mode,
    criteria: &Criteria,
    order_by: Option<&Sort>,
    limit: Option<usize>,
    offset: Option<usize>,
) -> Result<SelectQuery> {
    let repository = Repository::new(&file.schema, entity)?.with_options(file.options.clone())?;

    let query = match mode {
        Mode::Find => repository.find_by(criteria, order_by, limit, offset)?,
        Mode::One => repository.find_one_by(criteria, order_by)?,
        Mode::Count => repository.find_count_by(criteria)?,
    };
    Ok(query)
}

/// Formats a translated query.
pub fn render(query: &SelectQuery, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = query.to_string();
            for (name, value) in query.parameters() {
                let value = serde_json::to_string(value)?;
                out.push_str(&format!("\n{name} = {value}"));
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let doc = serde_json::json!({
                "query": query.to_string(),
                "parameters": query.parameters(),
            });
            Ok(serde_json::to_string_pretty(&doc)?)
        }
    }
}

/// Runs the command described by `cli` and returns what to print.
pub fn run(cli: &Cli) -> Result<String> {
    let file = SchemaFile::load(&cli.schema)?;
    let criteria = parse_criteria(&cli.criteria)?;
    let order_by = cli.order_by.as_deref().map(parse_order_by).transpose()?;

    let query = translate(
        &file,
        &cli.entity,
        cli.mode(),
        &criteria,
        order_by.as_ref(),
        cli.limit,
        cli.offset,
    )
    .with_context(|| format!("failed to translate criteria for {}", cli.entity))?;

    render(&query, cli.output)
}
