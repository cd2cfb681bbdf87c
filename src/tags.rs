//! Per-request accumulation of page metadata.
//!
//! A [`MetaTags`] value is created for each request. Controllers and views
//! call its setters while handling the request; at render time the caller
//! fills the gaps from translations ([`MetaTags::apply_translations`]) and
//! then renders ([`MetaTags::render`](crate::render)). Nothing is shared
//! between requests.
//!
//! ## Merge vs. append
//!
//! ```text
//! set_tags({title: "A"}, false); set_tags({title: "B"}, false)   → title = "B"
//! set_tags({title: "A"}, true);  set_tags({title: "B"}, true)    → title = ["A", "B"]
//! ```
//!
//! Appending promotes an existing single value to a list first, so
//! `title("Users")` followed by an append of `"Alice"` yields
//! `["Users", "Alice"]`, which the renderer joins into
//! `Site Users Alice`.

use crate::error::MetaError;
use crate::translation::{MetaPath, TranslationBackend, resolve_metas, select_translation};
use crate::types::{MetaTagState, MetaVars, Scalar, Tag, TagValue, VarValue};

/// Robots value meaning "every crawler".
pub const ROBOTS: &str = "robots";

/// Accumulated metadata and substitution variables for one request.
#[derive(Debug, Clone, Default)]
pub struct MetaTags {
    tags: MetaTagState,
    vars: MetaVars,
}

impl MetaTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags(&self) -> &MetaTagState {
        &self.tags
    }

    pub fn vars(&self) -> &MetaVars {
        &self.vars
    }

    /// Overwrite-merge `tags`, or append them when `append` is set.
    pub fn set_tags(&mut self, tags: MetaTagState, append: bool) {
        if append {
            self.append_tags(tags);
        } else {
            self.tags.merge(tags);
        }
    }

    /// Append every value in `tags` to the list already held for its key.
    pub fn append_tags(&mut self, tags: MetaTagState) {
        self.tags.append(tags);
    }

    /// Merge `vars` into the current variables, or replace them all.
    pub fn set_vars(&mut self, vars: MetaVars, append: bool) {
        if append {
            self.vars.extend(vars);
        } else {
            self.vars = vars;
        }
    }

    /// Set a single variable, keeping the others.
    pub fn add_var(&mut self, name: impl Into<String>, value: impl Into<VarValue>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Set the page title.
    ///
    /// Returns `headline` when given, otherwise the title itself, so a view
    /// can render an `<h1>` that differs from the `<title>`.
    pub fn title(&mut self, title: impl Into<String>, headline: Option<&str>) -> String {
        let title = title.into();
        self.set_tags(MetaTagState::new().with(Tag::Title, title.as_str()), false);
        headline.map(String::from).unwrap_or(title)
    }

    pub fn description(&mut self, description: impl Into<String>) -> String {
        let description = description.into();
        self.set_tags(
            MetaTagState::new().with(Tag::Description, description.as_str()),
            false,
        );
        description
    }

    /// Set the keywords.
    ///
    /// Keywords are lowercased before variables are substituted, so
    /// placeholders in them must use lowercase names: `%{Category}` looks up
    /// `category`.
    pub fn keywords(&mut self, keywords: impl Into<TagValue>) -> TagValue {
        let keywords = keywords.into();
        self.set_tags(MetaTagState::new().with(Tag::Keywords, keywords.clone()), false);
        keywords
    }

    pub fn canonical(&mut self, url: impl Into<String>) -> String {
        let url = url.into();
        self.set_tags(MetaTagState::new().with(Tag::Canonical, url.as_str()), false);
        url
    }

    /// Mark the page noindex. `true` targets all crawlers (`robots`); a name
    /// or list of names targets specific crawlers. Lists accumulate across
    /// calls.
    pub fn noindex(&mut self, value: impl Into<TagValue>) -> TagValue {
        self.robots(Tag::Noindex, value.into())
    }

    /// Mark the page nofollow. Same value rules as [`MetaTags::noindex`].
    pub fn nofollow(&mut self, value: impl Into<TagValue>) -> TagValue {
        self.robots(Tag::Nofollow, value.into())
    }

    fn robots(&mut self, tag: Tag, value: TagValue) -> TagValue {
        let value = match value {
            TagValue::One(scalar) => TagValue::One(robots_name(scalar)),
            TagValue::Many(items) => TagValue::Many(items.into_iter().map(robots_name).collect()),
        };
        match &value {
            TagValue::Many(items) => {
                for item in items {
                    self.append_tags(MetaTagState::new().with(tag, item.clone()));
                }
            }
            TagValue::One(_) => self.set_tags(MetaTagState::new().with(tag, value.clone()), false),
        }
        value
    }

    /// Fill every metadata field that has not been set explicitly from the
    /// most specific translation record for `path`.
    ///
    /// Template variants are resolved against the variables set so far, so
    /// call this after the last [`MetaTags::set_vars`].
    pub fn apply_translations<B>(&mut self, backend: &B, path: &MetaPath) -> Result<(), MetaError>
    where
        B: TranslationBackend + ?Sized,
    {
        let record = resolve_metas(backend, path)?;

        let fields = [
            (Tag::Title, record.title.as_ref()),
            (Tag::Description, record.description.as_ref()),
            (Tag::Keywords, record.keywords.as_ref()),
            (Tag::Canonical, record.canonical.as_ref()),
        ];
        for (tag, field) in fields {
            if let Some(field) = field
                && !self.tags.contains(tag)
            {
                let text = select_translation(field, &self.vars)?;
                self.tags.insert(tag, text);
            }
        }

        for (tag, value) in [(Tag::Noindex, record.noindex), (Tag::Nofollow, record.nofollow)] {
            if let Some(value) = value
                && !self.tags.contains(tag)
            {
                self.tags.insert(tag, value);
            }
        }
        Ok(())
    }
}

fn robots_name(scalar: Scalar) -> Scalar {
    match scalar {
        Scalar::Flag(true) => Scalar::Text(ROBOTS.to_string()),
        other => other,
    }
}
