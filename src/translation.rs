//! Translated page metadata: lookup, fallback and template selection.
//!
//! Page metadata lives in a translation catalog under a `metas` root, one
//! table per controller and action:
//!
//! ```toml
//! [metas.defaults]
//! title = "Welcome"
//!
//! [metas.users]
//! title = "Users"
//!
//! [metas.users.show.title]
//! anonymous = "Profile"
//! named = "Profile of %{name}"
//! ```
//!
//! ## Fallback
//!
//! [`resolve_metas`] walks a [`MetaPath`] from the most specific key up to the
//! root (`metas.users.show` → `metas.users` → `metas`) and returns the first
//! table that carries a `title`, `description` or `keywords`. When no level
//! matches, `metas.defaults` is returned; if that is missing as well the
//! lookup fails.
//!
//! ## Template variants
//!
//! A field may be a table of templates instead of a string. [`select_translation`]
//! picks the template that uses the most placeholders among those whose
//! placeholders are all available as variables, so `"Profile of %{name}"`
//! wins over `"Profile"` once `name` is set.
//!
//! ## Catalog files
//!
//! [`Catalog::load`] reads one or more TOML files and deep-merges them in
//! order, later files overriding earlier ones key by key.

use crate::config::merge_toml;
use crate::error::MetaError;
use crate::substitute::placeholders;
use crate::types::{MetaVars, TagValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Root segment of every metadata path.
pub const ROOT: &str = "metas";

/// Key of the global fallback record.
pub const DEFAULTS_KEY: &str = "metas.defaults";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A node of the translation tree.
///
/// Values that carry no page metadata (numbers, dates, arrays of tables)
/// are kept as [`TranslationNode::Other`] so catalogs shared with the rest
/// of an application still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationNode {
    Flag(bool),
    Text(String),
    List(Vec<String>),
    Table(IndexMap<String, TranslationNode>),
    Other(toml::Value),
}

/// A translated field: a plain string, or named templates to choose from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationField {
    Text(String),
    Variants(IndexMap<String, String>),
}

impl TranslationField {
    fn from_node(node: &TranslationNode) -> Option<Self> {
        match node {
            TranslationNode::Text(s) => Some(TranslationField::Text(s.clone())),
            TranslationNode::List(items) => Some(TranslationField::Text(items.join(", "))),
            TranslationNode::Table(table) => Some(TranslationField::Variants(
                table
                    .iter()
                    .filter_map(|(key, node)| match node {
                        TranslationNode::Text(s) => Some((key.clone(), s.clone())),
                        _ => None,
                    })
                    .collect(),
            )),
            TranslationNode::Flag(_) | TranslationNode::Other(_) => None,
        }
    }
}

/// The metadata found at one level of the translation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationRecord {
    pub title: Option<TranslationField>,
    pub description: Option<TranslationField>,
    pub keywords: Option<TranslationField>,
    pub noindex: Option<TagValue>,
    pub nofollow: Option<TagValue>,
    pub canonical: Option<TranslationField>,
}

impl TranslationRecord {
    /// Pick the metadata fields out of a table. Other keys (child actions,
    /// unrelated strings) are ignored.
    pub fn from_table(table: &IndexMap<String, TranslationNode>) -> Self {
        let field = |key: &str| table.get(key).and_then(TranslationField::from_node);
        let robots = |key: &str| {
            table.get(key).and_then(|node| match node {
                TranslationNode::Flag(b) => Some(TagValue::from(*b)),
                TranslationNode::Text(s) => Some(TagValue::from(s.as_str())),
                TranslationNode::List(items) => Some(TagValue::from(items.clone())),
                TranslationNode::Table(_) | TranslationNode::Other(_) => None,
            })
        };
        Self {
            title: field("title"),
            description: field("description"),
            keywords: field("keywords"),
            noindex: robots("noindex"),
            nofollow: robots("nofollow"),
            canonical: field("canonical"),
        }
    }

    /// True when the record carries a title, description or keywords.
    pub fn has_content(&self) -> bool {
        self.title.is_some() || self.description.is_some() || self.keywords.is_some()
    }
}

/// Key/value translation lookup.
pub trait TranslationBackend {
    /// Return the node at a dot-joined key, or
    /// [`MetaError::MissingTranslation`] when nothing is stored there.
    fn lookup(&self, key: &str) -> Result<TranslationNode, MetaError>;
}

/// A translation tree loaded from TOML.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    root: IndexMap<String, TranslationNode>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            root: IndexMap::new(),
        }
    }

    /// Parse a catalog from TOML source.
    pub fn parse(source: &str) -> Result<Self, CatalogError> {
        let root: IndexMap<String, TranslationNode> = toml::from_str(source)?;
        Ok(Self { root })
    }

    /// Load and merge catalog files in order, using the same merge rule as
    /// the config file.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, CatalogError> {
        let mut merged = toml::Value::Table(toml::Table::new());
        for path in paths {
            let content = fs::read_to_string(path.as_ref())?;
            debug!(path = %path.as_ref().display(), "loading translations");
            let value: toml::Value = toml::from_str(&content)?;
            merged = merge_toml(merged, value);
        }
        let root: IndexMap<String, TranslationNode> = merged.try_into()?;
        Ok(Self { root })
    }
}

impl TranslationBackend for Catalog {
    fn lookup(&self, key: &str) -> Result<TranslationNode, MetaError> {
        let missing = || MetaError::MissingTranslation {
            key: key.to_string(),
        };
        let mut segments = key.split('.');
        let first = segments.next().ok_or_else(missing)?;
        let mut node = self.root.get(first).ok_or_else(missing)?;
        for segment in segments {
            node = match node {
                TranslationNode::Table(table) => table.get(segment).ok_or_else(missing)?,
                _ => return Err(missing()),
            };
        }
        Ok(node.clone())
    }
}

/// Hierarchical metadata path of a request, e.g. `["metas", "users", "show"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaPath(Vec<String>);

impl MetaPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Path for a controller action. Namespaced controllers (`admin/users`)
    /// contribute one segment per namespace level.
    pub fn for_action(controller: &str, action: &str) -> Self {
        let mut segments = vec![ROOT.to_string()];
        segments.extend(
            controller
                .split('/')
                .filter(|s| !s.is_empty())
                .map(String::from),
        );
        segments.push(action.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Dot-joined lookup key.
    pub fn key(&self) -> String {
        self.0.join(".")
    }
}

/// Find the most specific record along `path`, falling back to
/// [`DEFAULTS_KEY`].
pub fn resolve_metas<B>(backend: &B, path: &MetaPath) -> Result<TranslationRecord, MetaError>
where
    B: TranslationBackend + ?Sized,
{
    let mut segments = path.segments().to_vec();
    while !segments.is_empty() {
        let key = segments.join(".");
        match backend.lookup(&key) {
            Ok(TranslationNode::Table(table)) => {
                let record = TranslationRecord::from_table(&table);
                if record.has_content() {
                    debug!(key = %key, "resolved translated metadata");
                    return Ok(record);
                }
            }
            Ok(_) | Err(MetaError::MissingTranslation { .. }) => {}
            Err(err) => return Err(err),
        }
        segments.pop();
    }

    debug!(path = %path.key(), "falling back to {DEFAULTS_KEY}");
    match backend.lookup(DEFAULTS_KEY)? {
        TranslationNode::Table(table) => Ok(TranslationRecord::from_table(&table)),
        _ => Err(MetaError::MissingTranslation {
            key: DEFAULTS_KEY.to_string(),
        }),
    }
}

/// Choose the template for `field` given the variables that are set.
///
/// Plain strings are returned as-is. For variants, a template is viable when
/// every placeholder it uses is in `vars`; the viable template with the most
/// placeholders wins, the first one written on a tie.
pub fn select_translation(field: &TranslationField, vars: &MetaVars) -> Result<String, MetaError> {
    let candidates = match field {
        TranslationField::Text(s) => return Ok(s.clone()),
        TranslationField::Variants(candidates) => candidates,
    };

    let mut best: Option<(&str, &str, usize)> = None;
    for (key, template) in candidates {
        let names = placeholders(template);
        if names.iter().any(|name| !vars.contains_key(name)) {
            continue;
        }
        if best.is_none_or(|(_, _, count)| names.len() > count) {
            best = Some((key.as_str(), template.as_str(), names.len()));
        }
    }

    match best {
        Some((key, template, _)) => {
            debug!(variant = key, "selected translation template");
            Ok(template.to_string())
        }
        None => Err(MetaError::NoMatchingTemplate {
            candidates: candidates.keys().cloned().collect(),
        }),
    }
}
