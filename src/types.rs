//! Shared value types for tag state and substitution variables.
//!
//! Tag values and variables can each hold either one value or a list of
//! values. Both shapes are explicit enum variants; consumers call
//! [`TagValue::to_list`] or [`VarValue`] accessors to get the canonical list
//! form instead of guessing from the runtime shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every key the accumulator and renderer understand.
///
/// The first seven are page metadata; the rest are layout options that only
/// shape how the `<title>` is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Title,
    Description,
    Keywords,
    Noindex,
    Nofollow,
    Canonical,
    Site,
    Prefix,
    Separator,
    Suffix,
    Lowercase,
    Reverse,
}

impl Tag {
    pub const ALL: [Tag; 12] = [
        Tag::Title,
        Tag::Description,
        Tag::Keywords,
        Tag::Noindex,
        Tag::Nofollow,
        Tag::Canonical,
        Tag::Site,
        Tag::Prefix,
        Tag::Separator,
        Tag::Suffix,
        Tag::Lowercase,
        Tag::Reverse,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Title => "title",
            Tag::Description => "description",
            Tag::Keywords => "keywords",
            Tag::Noindex => "noindex",
            Tag::Nofollow => "nofollow",
            Tag::Canonical => "canonical",
            Tag::Site => "site",
            Tag::Prefix => "prefix",
            Tag::Separator => "separator",
            Tag::Suffix => "suffix",
            Tag::Lowercase => "lowercase",
            Tag::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| format!("unknown tag: {s}"))
    }
}

/// A single tag value: text or a boolean switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Flag(bool),
    Text(String),
}

impl Scalar {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            Scalar::Flag(_) => None,
        }
    }
}

/// One value, or the ordered list built up by appends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl TagValue {
    /// Canonical list form. A single value becomes a one-element list.
    pub fn to_list(&self) -> Vec<Scalar> {
        match self {
            TagValue::One(s) => vec![s.clone()],
            TagValue::Many(list) => list.clone(),
        }
    }

    /// Text parts in order. Boolean entries are skipped.
    pub fn texts(&self) -> Vec<String> {
        self.to_list()
            .into_iter()
            .filter_map(|s| match s {
                Scalar::Text(t) => Some(t),
                Scalar::Flag(_) => None,
            })
            .collect()
    }

    /// The value as a boolean, if it is a single flag.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            TagValue::One(Scalar::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, TagValue::Many(_))
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::One(Scalar::Text(s.to_string()))
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::One(Scalar::Text(s))
    }
}

impl From<bool> for TagValue {
    fn from(b: bool) -> Self {
        TagValue::One(Scalar::Flag(b))
    }
}

impl From<Scalar> for TagValue {
    fn from(s: Scalar) -> Self {
        TagValue::One(s)
    }
}

impl From<Vec<&str>> for TagValue {
    fn from(list: Vec<&str>) -> Self {
        TagValue::Many(list.into_iter().map(|s| Scalar::Text(s.to_string())).collect())
    }
}

impl From<Vec<String>> for TagValue {
    fn from(list: Vec<String>) -> Self {
        TagValue::Many(list.into_iter().map(Scalar::Text).collect())
    }
}

/// A substitution variable: one value, or several candidates to expand over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for VarValue {
    fn from(s: &str) -> Self {
        VarValue::One(s.to_string())
    }
}

impl From<String> for VarValue {
    fn from(s: String) -> Self {
        VarValue::One(s)
    }
}

impl From<Vec<&str>> for VarValue {
    fn from(list: Vec<&str>) -> Self {
        VarValue::Many(list.into_iter().map(String::from).collect())
    }
}

impl From<Vec<String>> for VarValue {
    fn from(list: Vec<String>) -> Self {
        VarValue::Many(list)
    }
}

/// Substitution variables, in insertion order.
pub type MetaVars = IndexMap<String, VarValue>;

/// Accumulated tag values, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTagState(IndexMap<Tag, TagValue>);

impl MetaTagState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for assembling defaults inline.
    pub fn with(mut self, tag: Tag, value: impl Into<TagValue>) -> Self {
        self.0.insert(tag, value.into());
        self
    }

    pub fn insert(&mut self, tag: Tag, value: impl Into<TagValue>) {
        self.0.insert(tag, value.into());
    }

    pub fn get(&self, tag: Tag) -> Option<&TagValue> {
        self.0.get(&tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains_key(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &TagValue)> {
        self.0.iter()
    }

    /// Key-wise overwrite: every key in `other` replaces the one here.
    pub fn merge(&mut self, other: MetaTagState) {
        for (tag, value) in other.0 {
            self.0.insert(tag, value);
        }
    }

    /// Append `other` key by key.
    ///
    /// Existing single values are promoted to a one-element list, absent keys
    /// start as an empty list, and list values in `other` are flattened onto
    /// the end. After an append the key always holds a list.
    pub fn append(&mut self, other: MetaTagState) {
        for (tag, value) in other.0 {
            let mut list = self.0.get(&tag).map(TagValue::to_list).unwrap_or_default();
            list.extend(value.to_list());
            self.0.insert(tag, TagValue::Many(list));
        }
    }
}

impl FromIterator<(Tag, TagValue)> for MetaTagState {
    fn from_iter<I: IntoIterator<Item = (Tag, TagValue)>>(iter: I) -> Self {
        MetaTagState(iter.into_iter().collect())
    }
}

impl IntoIterator for MetaTagState {
    type Item = (Tag, TagValue);
    type IntoIter = indexmap::map::IntoIter<Tag, TagValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
