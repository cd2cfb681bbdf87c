//! # meta-tags
//!
//! Builds the `<title>`, `<meta>` and `<link rel="canonical">` tags of a page
//! head from per-request metadata, layout-wide defaults and translated
//! templates.
//!
//! # Request Lifecycle
//!
//! ```text
//! 1. Collect    controller/view  →  MetaTags       (set title, vars, noindex…)
//! 2. Finalize   MetaTags + catalog → MetaTags      (translated defaults fill gaps)
//! 3. Render     MetaTags + layout → Markup         (head fragment)
//! ```
//!
//! ```rust
//! use meta_tags::{Catalog, MetaPath, MetaTagState, MetaTags, Tag};
//!
//! let catalog = Catalog::parse(r#"
//! [metas.defaults]
//! title = "Home"
//!
//! [metas.users.show.title]
//! anonymous = "Profile"
//! named = "Profile of %{name}"
//! "#).unwrap();
//!
//! let mut meta = MetaTags::new();
//! meta.add_var("name", "Alice");
//! meta.noindex("googlebot");
//!
//! let layout = MetaTagState::new()
//!     .with(Tag::Site, "MySite")
//!     .with(Tag::Separator, "|");
//! let html = meta
//!     .display(&catalog, &MetaPath::for_action("users", "show"), &layout)
//!     .unwrap();
//!
//! assert_eq!(
//!     html.into_string(),
//!     "<title>MySite | Profile of Alice</title>\n\
//!      <meta name=\"googlebot\" content=\"noindex\">"
//! );
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Tag names, single/list values, substitution variables |
//! | [`tags`] | Per-request accumulator with merge and append semantics |
//! | [`substitute`] | `%{name}` substitution with cross-product expansion over list variables |
//! | [`translation`] | Catalog lookup, most-specific fallback, template variant selection |
//! | [`normalize`] | Tag stripping, whitespace collapsing, casing, truncation |
//! | [`render`] | Assembles and serializes the head fragment with maud |
//! | [`config`] | `meta-tags.toml` loading: layout defaults and catalog files |
//!
//! # Design Decisions
//!
//! ## Explicit Context, No Globals
//!
//! All per-request state lives in a [`MetaTags`] value owned by the request.
//! The translation [`Catalog`] is immutable once loaded and can be shared
//! between requests.
//!
//! ## Two-Step Finalize and Render
//!
//! Translated defaults are applied by an explicit call
//! ([`MetaTags::apply_translations`]) before [`MetaTags::render`], instead of
//! hooking into the host framework's render call. [`MetaTags::display`] runs
//! both.
//!
//! ## Single or List, Never Ambiguous
//!
//! A tag value is either [`TagValue::One`] or [`TagValue::Many`]. Appending
//! always produces a list, and every consumer goes through
//! [`TagValue::to_list`] rather than inspecting the shape ad hoc.
//!
//! ## Maud for Markup
//!
//! Tags are emitted with maud's `html!` macro, which escapes all text and
//! attribute values. Normalization only strips markup; escaping happens
//! exactly once, at emission.

pub mod config;
pub mod error;
pub mod normalize;
pub mod render;
pub mod substitute;
pub mod tags;
pub mod translation;
pub mod types;

pub use error::MetaError;
pub use tags::MetaTags;
pub use translation::{Catalog, MetaPath, TranslationBackend};
pub use types::{MetaTagState, MetaVars, Scalar, Tag, TagValue, VarValue};
