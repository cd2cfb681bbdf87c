//! Head fragment rendering.
//!
//! Turns the accumulated [`MetaTags`] plus caller-supplied layout defaults
//! into the `<title>`, `<meta>` and `<link>` tags of a page head. Tags are
//! built with maud, which escapes every text and attribute value; the
//! joined fragment is returned as pre-escaped [`Markup`] ready to be
//! embedded in a layout.
//!
//! ## Title assembly
//!
//! ```text
//! site = "MySite", title = ["Users", "Alice"]
//!
//!   [site, "Users", "Alice"]              (reverse: ["Alice", "Users", site])
//!   joined with prefix + separator + suffix
//!   → "MySite Users Alice"               (defaults: " " + "" + " ")
//!   → "MySite | Users | Alice"           (separator = "|")
//! ```
//!
//! With an empty separator the delimiter collapses to a single space, so the
//! default prefix and suffix do not produce double spaces.

use crate::error::MetaError;
use crate::normalize::{normalize_description, normalize_keywords, normalize_title};
use crate::substitute::{Substituted, substitute, substitute_all};
use crate::tags::{MetaTags, ROBOTS};
use crate::translation::{MetaPath, TranslationBackend};
use crate::types::{MetaTagState, Scalar, Tag, TagValue};
use maud::{Markup, PreEscaped, html};

/// Separator used by [`MetaTags::render`] when none is set.
pub const RENDER_SEPARATOR: &str = "";

/// Separator used by [`MetaTags::display_title`] when none is set.
pub const TITLE_SEPARATOR: &str = "|";

const DEFAULT_SPACING: &str = " ";

/// Title layout options after defaults are applied.
#[derive(Debug, Clone, PartialEq)]
struct Layout {
    prefix: String,
    separator: String,
    suffix: String,
    lowercase: bool,
    reverse: bool,
}

impl Layout {
    fn from_state(meta: &MetaTagState, default_separator: &str) -> Self {
        Self {
            prefix: spacing(meta.get(Tag::Prefix), DEFAULT_SPACING),
            separator: spacing(meta.get(Tag::Separator), default_separator),
            suffix: spacing(meta.get(Tag::Suffix), DEFAULT_SPACING),
            lowercase: meta.get(Tag::Lowercase).and_then(TagValue::as_flag) == Some(true),
            reverse: meta.get(Tag::Reverse).and_then(TagValue::as_flag) == Some(true),
        }
    }

    fn delimiter(&self) -> String {
        let glue = format!("{}{}{}", self.prefix, self.separator, self.suffix);
        if self.separator.is_empty() {
            collapse_spaces(&glue)
        } else {
            glue
        }
    }
}

/// Resolve a spacing option: unset or `true` gives `default`, `false` gives
/// nothing, text is used verbatim.
fn spacing(value: Option<&TagValue>, default: &str) -> String {
    match value {
        None | Some(TagValue::One(Scalar::Flag(true))) => default.to_string(),
        Some(TagValue::One(Scalar::Flag(false))) => String::new(),
        Some(value) => value.texts().concat(),
    }
}

/// Replace every whitespace run with one space, keeping a space at either end.
fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn text_of(meta: &MetaTagState, tag: Tag) -> Vec<String> {
    meta.get(tag).map(TagValue::texts).unwrap_or_default()
}

/// Crawler names for a robots tag. `true` means `robots`, `false` and blank
/// names are dropped, repeats are removed.
fn robot_names(value: Option<&TagValue>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for scalar in value.map(TagValue::to_list).unwrap_or_default() {
        let name = match scalar {
            Scalar::Flag(true) => ROBOTS.to_string(),
            Scalar::Flag(false) => continue,
            Scalar::Text(t) => t.trim().to_string(),
        };
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

impl MetaTags {
    /// Apply translated defaults for `path`, then render.
    pub fn display<B>(
        &mut self,
        backend: &B,
        path: &MetaPath,
        defaults: &MetaTagState,
    ) -> Result<Markup, MetaError>
    where
        B: TranslationBackend + ?Sized,
    {
        self.apply_translations(backend, path)?;
        self.render(defaults)
    }

    /// Render the head fragment.
    ///
    /// `defaults` (site name, layout options, fallback metadata) sit under the
    /// accumulated tags: anything set on this request wins.
    pub fn render(&self, defaults: &MetaTagState) -> Result<Markup, MetaError> {
        let meta = self.merged(defaults);
        let layout = Layout::from_state(&meta, RENDER_SEPARATOR);
        let mut fragments: Vec<Markup> = Vec::new();

        let title = self.title_text(&meta, &layout)?;
        fragments.push(html! { title { (title) } });

        let description = self.description_text(&meta, &layout)?;
        if !description.is_empty() {
            fragments.push(html! { meta name="description" content=(description); });
        }

        let keywords = self.keywords_text(&meta)?;
        if !keywords.is_empty() {
            fragments.push(html! { meta name="keywords" content=(keywords); });
        }

        let noindex = robot_names(meta.get(Tag::Noindex));
        let nofollow = robot_names(meta.get(Tag::Nofollow));
        for name in &noindex {
            let content = if nofollow.contains(name) {
                "noindex, nofollow"
            } else {
                "noindex"
            };
            fragments.push(html! { meta name=(name) content=(content); });
        }
        for name in nofollow.iter().filter(|name| !noindex.contains(name)) {
            fragments.push(html! { meta name=(name) content="nofollow"; });
        }

        let canonical = text_of(&meta, Tag::Canonical).join(" ");
        if !canonical.trim().is_empty() {
            fragments.push(html! { link rel="canonical" href=(canonical.trim()); });
        }

        let joined = fragments
            .into_iter()
            .map(Markup::into_string)
            .collect::<Vec<_>>()
            .join("\n");
        Ok(PreEscaped(joined))
    }

    /// The page title as plain text, without the `<title>` element.
    ///
    /// Same assembly as [`MetaTags::render`], but the separator defaults to
    /// `|`, giving `Site | Page`.
    pub fn display_title(&self, defaults: &MetaTagState) -> Result<String, MetaError> {
        let meta = self.merged(defaults);
        let layout = Layout::from_state(&meta, TITLE_SEPARATOR);
        self.title_text(&meta, &layout)
    }

    fn merged(&self, defaults: &MetaTagState) -> MetaTagState {
        let mut meta = defaults.clone();
        meta.merge(self.tags().clone());
        meta
    }

    fn title_text(&self, meta: &MetaTagState, layout: &Layout) -> Result<String, MetaError> {
        let site = text_of(meta, Tag::Site).join(" ").trim().to_string();
        let mut parts = substitute_all(&text_of(meta, Tag::Title), self.vars())?;
        if layout.lowercase {
            parts = parts.into_iter().map(|p| p.to_lowercase()).collect();
        }
        let parts = normalize_title(&parts);
        if parts.is_empty() {
            return Ok(site);
        }

        let mut items: Vec<String> = Vec::with_capacity(parts.len() + 1);
        if !site.is_empty() {
            items.push(site);
        }
        items.extend(parts);
        if layout.reverse {
            items.reverse();
        }
        Ok(items.join(&layout.delimiter()).trim().to_string())
    }

    fn description_text(&self, meta: &MetaTagState, layout: &Layout) -> Result<String, MetaError> {
        let parts = substitute_all(&text_of(meta, Tag::Description), self.vars())?;
        Ok(normalize_description(&parts, &layout.separator))
    }

    fn keywords_text(&self, meta: &MetaTagState) -> Result<String, MetaError> {
        // Lowercasing happens first, placeholder names included.
        let normalized = normalize_keywords(&text_of(meta, Tag::Keywords));
        let expanded = match substitute(&normalized, self.vars())? {
            Substituted::One(s) => s,
            Substituted::Many(list) => list.join(","),
        };
        Ok(normalize_keywords(&[expanded]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::Catalog;
    use crate::types::VarValue;

    fn site(name: &str) -> MetaTagState {
        MetaTagState::new().with(Tag::Site, name)
    }

    fn render(meta: &MetaTags, defaults: &MetaTagState) -> String {
        meta.render(defaults).unwrap().into_string()
    }

    #[test]
    fn title_with_default_spacing() {
        let mut meta = MetaTags::new();
        meta.title("Login", None);
        assert_eq!(render(&meta, &site("MySite")), "<title>MySite Login</title>");
    }

    #[test]
    fn empty_title_renders_site_only() {
        let meta = MetaTags::new();
        assert_eq!(render(&meta, &site("  MySite ")), "<title>MySite</title>");
    }

    #[test]
    fn title_with_separator() {
        let mut meta = MetaTags::new();
        meta.title("Login", None);
        let defaults = site("MySite").with(Tag::Separator, "|");
        assert_eq!(render(&meta, &defaults), "<title>MySite | Login</title>");
    }

    #[test]
    fn prefix_and_suffix_false_remove_spacing() {
        let mut meta = MetaTags::new();
        meta.title("Login", None);
        let defaults = site("MySite")
            .with(Tag::Separator, "::")
            .with(Tag::Prefix, false)
            .with(Tag::Suffix, false);
        assert_eq!(render(&meta, &defaults), "<title>MySite::Login</title>");
    }

    #[test]
    fn reverse_and_lowercase() {
        let mut meta = MetaTags::new();
        meta.title("Login", None);
        let defaults = site("MySite")
            .with(Tag::Separator, "-")
            .with(Tag::Reverse, true)
            .with(Tag::Lowercase, true);
        assert_eq!(render(&meta, &defaults), "<title>login - MySite</title>");
    }

    #[test]
    fn appended_title_parts_are_joined() {
        let mut meta = MetaTags::new();
        meta.title("Users", None);
        meta.set_tags(MetaTagState::new().with(Tag::Title, "Alice"), true);
        let defaults = site("MySite").with(Tag::Separator, "|");
        assert_eq!(
            render(&meta, &defaults),
            "<title>MySite | Users | Alice</title>"
        );
    }

    #[test]
    fn title_is_stripped_and_escaped_once() {
        let mut meta = MetaTags::new();
        meta.title("<b>Tom & Jerry</b>", None);
        assert_eq!(
            render(&meta, &site("S")),
            "<title>S Tom &amp; Jerry</title>"
        );
    }

    #[test]
    fn title_substitutes_vars() {
        let mut meta = MetaTags::new();
        meta.title("Profile of %{name}", None);
        meta.add_var("name", "Alice");
        assert_eq!(
            render(&meta, &site("S")),
            "<title>S Profile of Alice</title>"
        );
    }

    #[test]
    fn title_with_missing_var_fails() {
        let mut meta = MetaTags::new();
        meta.title("Profile of %{name}", None);
        assert!(matches!(
            meta.render(&MetaTagState::new()),
            Err(MetaError::MissingVariable { .. })
        ));
    }

    #[test]
    fn accumulated_state_wins_over_defaults() {
        let mut meta = MetaTags::new();
        meta.title("Page", None);
        let defaults = site("S").with(Tag::Title, "Default");
        assert_eq!(render(&meta, &defaults), "<title>S Page</title>");
    }

    #[test]
    fn description_tag() {
        let mut meta = MetaTags::new();
        meta.description("A <em>fine</em>\n page");
        assert_eq!(
            render(&meta, &site("S")),
            "<title>S</title>\n<meta name=\"description\" content=\"A fine page\">"
        );
    }

    #[test]
    fn description_expands_list_vars() {
        let mut meta = MetaTags::new();
        meta.description("Tagged %{tag}.");
        meta.add_var("tag", vec!["rust", "seo"]);
        let defaults = site("S").with(Tag::Separator, " ");
        let html = render(&meta, &defaults);
        assert!(html.contains("content=\"Tagged rust. Tagged seo.\""));
    }

    #[test]
    fn empty_description_is_omitted() {
        let mut meta = MetaTags::new();
        meta.description("   ");
        assert!(!render(&meta, &site("S")).contains("description"));
    }

    #[test]
    fn keywords_tag_normalized() {
        let mut meta = MetaTags::new();
        meta.keywords(vec!["Rust", "SEO"]);
        assert!(render(&meta, &site("S")).contains("<meta name=\"keywords\" content=\"rust, seo\">"));
    }

    #[test]
    fn keywords_expand_list_vars() {
        let mut meta = MetaTags::new();
        meta.keywords("%{lang}");
        meta.add_var("lang", VarValue::from(vec!["rust", "go"]));
        assert!(render(&meta, &site("S")).contains("content=\"rust,go\""));
    }

    #[test]
    fn keyword_placeholders_are_lowercased() {
        let mut meta = MetaTags::new();
        meta.keywords("%{Category}");
        meta.add_var("category", "Chairs");
        assert!(render(&meta, &site("S")).contains("content=\"chairs\""));

        let mut upper = MetaTags::new();
        upper.keywords("%{Category}");
        upper.add_var("Category", "Chairs");
        assert_eq!(
            upper.render(&site("S")).unwrap_err(),
            MetaError::MissingVariable {
                name: "category".into(),
                template: "%{category}".into(),
            }
        );
    }

    #[test]
    fn noindex_and_nofollow_share_one_tag() {
        let mut meta = MetaTags::new();
        meta.noindex(vec!["googlebot"]);
        meta.nofollow(vec!["googlebot"]);
        let html = render(&meta, &site("S"));
        assert_eq!(html.matches("name=\"googlebot\"").count(), 1);
        assert!(html.contains("<meta name=\"googlebot\" content=\"noindex, nofollow\">"));
    }

    #[test]
    fn separate_noindex_and_nofollow_targets() {
        let mut meta = MetaTags::new();
        meta.noindex(true);
        meta.nofollow("googlebot");
        let html = render(&meta, &site("S"));
        assert!(html.contains("<meta name=\"robots\" content=\"noindex\">"));
        assert!(html.contains("<meta name=\"googlebot\" content=\"nofollow\">"));
    }

    #[test]
    fn false_robots_values_are_dropped() {
        let mut meta = MetaTags::new();
        meta.noindex(false);
        assert!(!render(&meta, &site("S")).contains("noindex"));
    }

    #[test]
    fn canonical_link() {
        let mut meta = MetaTags::new();
        meta.canonical("https://example.com/users/1");
        assert!(render(&meta, &site("S")).ends_with(
            "<link rel=\"canonical\" href=\"https://example.com/users/1\">"
        ));
    }

    #[test]
    fn display_title_defaults_to_pipe() {
        let mut meta = MetaTags::new();
        meta.title("Login", None);
        assert_eq!(meta.display_title(&site("MySite")).unwrap(), "MySite | Login");
    }

    #[test]
    fn display_applies_translations_first() {
        let catalog = Catalog::parse(
            r#"
[metas.defaults]
title = "Home"
description = "Everything about %{topic}"
"#,
        )
        .unwrap();
        let mut meta = MetaTags::new();
        meta.add_var("topic", "rust");
        let html = meta
            .display(&catalog, &MetaPath::for_action("pages", "index"), &site("S"))
            .unwrap()
            .into_string();
        assert_eq!(
            html,
            "<title>S Home</title>\n<meta name=\"description\" content=\"Everything about rust\">"
        );
    }

    #[test]
    fn collapse_spaces_keeps_single_edges() {
        assert_eq!(collapse_spaces("  "), " ");
        assert_eq!(collapse_spaces(" | "), " | ");
        assert_eq!(collapse_spaces(""), "");
    }
}
